//! On-demand zip archives for folder downloads.
//!
//! Archives are spooled to an unlinked temporary file on a blocking
//! thread so memory stays bounded and the response can carry an exact
//! Content-Length. A shared cancellation flag aborts the spool when
//! the client goes away before it finishes.

use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use filedeck_core::config::transfer::TransferConfig;
use filedeck_core::error::{AppError, ErrorKind};
use filedeck_core::result::AppResult;

/// Caps applied while building a single archive.
#[derive(Debug, Clone, Copy)]
pub struct ZipLimits {
    /// Maximum number of entries written into the archive.
    pub max_entries: usize,
    /// Maximum total uncompressed bytes across all files.
    pub max_total_bytes: u64,
}

impl From<&TransferConfig> for ZipLimits {
    fn from(cfg: &TransferConfig) -> Self {
        Self {
            max_entries: cfg.zip_max_entries,
            max_total_bytes: cfg.zip_max_total_bytes,
        }
    }
}

/// A finished zip archive spooled to an unlinked temporary file.
#[derive(Debug)]
pub struct SpooledArchive {
    /// The spool file, rewound to the start.
    pub file: tokio::fs::File,
    /// Exact archive size in bytes.
    pub size: u64,
}

/// Sets its paired cancellation flag when dropped.
///
/// A download handler creates the guard before spooling and holds it
/// across the await. If the request future is dropped mid-spool the
/// guard fires, and the blocking task stops at the next entry. Firing
/// after a completed spool is harmless since nothing reads the flag
/// anymore.
pub struct CancelGuard {
    flag: Arc<AtomicBool>,
}

impl CancelGuard {
    pub fn new() -> (Self, Arc<AtomicBool>) {
        let flag = Arc::new(AtomicBool::new(false));
        (Self { flag: flag.clone() }, flag)
    }
}

impl Drop for CancelGuard {
    fn drop(&mut self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

/// Builds a zip archive of `src` in a temporary spool file.
///
/// `src` may be a folder or a single file. Entry names are stored
/// relative to `src`, so unpacking yields the folder's contents
/// without any leading path. Unreadable files and subfolders are
/// skipped with a warning; symlinks are not followed.
pub async fn spool_archive(
    src: PathBuf,
    limits: ZipLimits,
    cancel: Arc<AtomicBool>,
) -> AppResult<SpooledArchive> {
    let (file, size) = tokio::task::spawn_blocking(move || build_zip(&src, limits, &cancel))
        .await
        .map_err(|err| AppError::with_source(ErrorKind::Internal, "Archive task failed", err))??;
    Ok(SpooledArchive {
        file: tokio::fs::File::from_std(file),
        size,
    })
}

fn build_zip(src: &Path, limits: ZipLimits, cancel: &AtomicBool) -> AppResult<(File, u64)> {
    let meta = fs::metadata(src)?;
    let mut writer = ZipWriter::new(tempfile::tempfile()?);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644)
        .large_file(true);

    let mut entries: usize = 0;
    let mut total_bytes: u64 = 0;

    if meta.is_file() {
        if cancel.load(Ordering::Relaxed) {
            return Err(AppError::internal("Archive generation cancelled"));
        }
        if meta.len() > limits.max_total_bytes {
            return Err(AppError::validation("Folder is too large to archive"));
        }
        let name = src
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string());
        writer.start_file(name.as_str(), options).map_err(zip_err)?;
        let mut reader = File::open(src)?;
        io::copy(&mut reader, &mut writer)?;
        entries = 1;
        total_bytes = meta.len();
    } else {
        for entry in WalkDir::new(src).follow_links(false) {
            if cancel.load(Ordering::Relaxed) {
                return Err(AppError::internal("Archive generation cancelled"));
            }
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    if err.depth() == 0 {
                        return Err(AppError::with_source(
                            ErrorKind::Storage,
                            "Failed to read folder for archiving",
                            err,
                        ));
                    }
                    warn!(error = %err, "skipping unreadable entry while archiving");
                    continue;
                }
            };
            if entry.depth() == 0 {
                continue;
            }
            let rel = match entry.path().strip_prefix(src) {
                Ok(rel) => rel,
                Err(_) => continue,
            };
            let name = rel.to_string_lossy().replace('\\', "/");

            if entry.file_type().is_dir() {
                if entries >= limits.max_entries {
                    return Err(AppError::validation("Folder has too many entries to archive"));
                }
                entries += 1;
                writer.add_directory(name.as_str(), options).map_err(zip_err)?;
            } else if entry.file_type().is_file() {
                let file_meta = match entry.metadata() {
                    Ok(meta) => meta,
                    Err(err) => {
                        warn!(path = %entry.path().display(), error = %err, "skipping unreadable file while archiving");
                        continue;
                    }
                };
                if entries >= limits.max_entries {
                    return Err(AppError::validation("Folder has too many entries to archive"));
                }
                if total_bytes + file_meta.len() > limits.max_total_bytes {
                    return Err(AppError::validation("Folder is too large to archive"));
                }
                let mut reader = match File::open(entry.path()) {
                    Ok(file) => file,
                    Err(err) => {
                        warn!(path = %entry.path().display(), error = %err, "skipping unreadable file while archiving");
                        continue;
                    }
                };
                entries += 1;
                total_bytes += file_meta.len();
                writer.start_file(name.as_str(), options).map_err(zip_err)?;
                io::copy(&mut reader, &mut writer)?;
            }
            // Symlinks and special files are left out of the archive.
        }
    }

    let mut file = writer.finish().map_err(zip_err)?;
    file.flush()?;
    let size = file.seek(SeekFrom::End(0))?;
    file.rewind()?;
    debug!(path = %src.display(), entries, total_bytes, size, "archive spooled");
    Ok((file, size))
}

fn zip_err(err: zip::result::ZipError) -> AppError {
    AppError::with_source(ErrorKind::Internal, format!("Zip write error: {err}"), err)
}
