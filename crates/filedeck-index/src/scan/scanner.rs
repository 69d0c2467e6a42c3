//! The background filesystem walker.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;

use crate::entry::{DirListing, Entry};
use crate::index::DirectoryIndex;
use crate::resolver::{PathResolver, ResolvedPath, join_rel};
use crate::scan::job::ScanJob;
use crate::scan::registry::ScanRegistry;

/// Drives scan jobs and publishes their listings into the index.
///
/// Cloning is cheap; all state is shared.
#[derive(Debug, Clone)]
pub struct Scanner {
    resolver: Arc<PathResolver>,
    index: Arc<DirectoryIndex>,
    registry: Arc<ScanRegistry>,
}

impl Scanner {
    pub fn new(
        resolver: Arc<PathResolver>,
        index: Arc<DirectoryIndex>,
        registry: Arc<ScanRegistry>,
    ) -> Self {
        Self {
            resolver,
            index,
            registry,
        }
    }

    /// Starts a background scan of `target`, or joins the one already
    /// running for it. Returns the job and whether it was newly started.
    pub fn start(&self, target: &ResolvedPath) -> (Arc<ScanJob>, bool) {
        let (job, created) = self.registry.begin(&target.rel);
        if created {
            let scanner = self.clone();
            let handle = Arc::clone(&job);
            tokio::spawn(async move { scanner.run_job(handle).await });
        }
        (job, created)
    }

    /// Walks the job's subtree breadth-first, publishing one listing per
    /// directory as it goes and yielding between directories.
    async fn run_job(&self, job: Arc<ScanJob>) {
        let target = job.target().to_string();
        info!(path = display_rel(&target), "scan started");

        let mut queue = VecDeque::from([target.clone()]);
        let mut visited: HashSet<String> = HashSet::new();
        let mut skipped: Vec<String> = Vec::new();

        while let Some(rel) = queue.pop_front() {
            let abs = self.resolver.abs_of(&rel);
            match scan_dir(&abs, &rel).await {
                Ok((listing, subdirs)) => {
                    let n_files = (listing.entries.len() - subdirs.len()) as u64;
                    if job.is_root() && rel.is_empty() {
                        job.visit_root(n_files, &subdirs);
                    } else {
                        job.visit(&rel, n_files, subdirs.len() as u64);
                    }
                    self.index.insert(listing);
                    visited.insert(rel.clone());
                    for name in &subdirs {
                        queue.push_back(join_rel(&rel, name));
                    }
                }
                // The job's own target being unreadable is fatal.
                Err(err) if rel == target => {
                    warn!(path = display_rel(&target), error = %err, "scan failed");
                    job.fail(err.to_string());
                    return;
                }
                Err(err) => {
                    warn!(path = %rel, error = %err, "skipping unreadable directory");
                    job.visit(&rel, 0, 0);
                    skipped.push(rel);
                }
            }
            tokio::task::yield_now().await;
        }

        // Unvisited listings under the target were deleted from disk;
        // skipped subtrees keep their last known state.
        for base in &skipped {
            visited.extend(self.index.keys_under(base));
        }
        self.index.retain_subtree(&target, &visited);

        job.finish();
        let snap = job.snapshot();
        let totals = self.index.totals();
        info!(
            path = display_rel(&target),
            folders = snap.num_folders,
            files = snap.num_files,
            indexed_dirs = totals.directories,
            "scan completed"
        );
    }

    /// Returns the listing for a directory, relisting it when its mtime no
    /// longer matches the cached copy. Does not descend.
    pub async fn listing(&self, path: &ResolvedPath) -> AppResult<Arc<DirListing>> {
        let meta = tokio::fs::metadata(&path.abs).await?;
        if !meta.is_dir() {
            return Err(AppError::validation("Path is not a directory"));
        }

        let modified = meta.modified().ok();
        if let Some(cached) = self.index.get(&path.rel) {
            if modified.is_some() && cached.dir_modified == modified {
                return Ok(cached);
            }
        }

        let (listing, _) = scan_dir(&path.abs, &path.rel).await?;
        Ok(self.index.insert(listing))
    }
}

/// Lists one directory into a publishable listing plus its subdirectory
/// names. Entries that fail to stat are logged and skipped; symlinks are
/// listed but never followed, so link cycles cannot trap the walker.
async fn scan_dir(abs: &Path, rel: &str) -> AppResult<(DirListing, Vec<String>)> {
    let dir_modified = tokio::fs::metadata(abs).await?.modified().ok();
    let mut reader = tokio::fs::read_dir(abs).await?;

    let mut entries = Vec::new();
    let mut subdirs = Vec::new();
    while let Some(dirent) = reader.next_entry().await? {
        let name = dirent.file_name().to_string_lossy().into_owned();
        let file_type = match dirent.file_type().await {
            Ok(ft) => ft,
            Err(err) => {
                warn!(path = %join_rel(rel, &name), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let is_dir = file_type.is_dir();
        let meta = dirent.metadata().await.ok();

        if is_dir {
            subdirs.push(name.clone());
        }
        entries.push(Entry {
            name,
            is_dir,
            size: if is_dir {
                None
            } else {
                meta.as_ref().map(|m| m.len())
            },
            modified: meta
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from),
        });
    }

    let mut listing = DirListing {
        rel_path: rel.to_string(),
        dir_modified,
        scanned_at: Utc::now(),
        entries,
    };
    listing.sort_entries();
    Ok((listing, subdirs))
}

fn display_rel(rel: &str) -> &str {
    if rel.is_empty() { "/" } else { rel }
}
