//! Single-file download source.

use std::io::SeekFrom;
use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, Take};

use filedeck_core::error::AppError;
use filedeck_core::result::AppResult;

use crate::range::{ByteRange, parse_range};

/// An open file positioned and limited to the requested byte range,
/// with the metadata a download response needs.
#[derive(Debug)]
pub struct FileSlice {
    /// Reader positioned at the slice start and capped to its length.
    pub reader: Take<File>,
    pub file_name: String,
    pub total_size: u64,
    /// The validated range, when the request carried one.
    pub range: Option<ByteRange>,
    /// Best-effort guess from the file extension.
    pub content_type: String,
}

impl FileSlice {
    /// Opens `abs` for download, honoring an optional `Range` header.
    pub async fn open(abs: &Path, range_header: Option<&str>) -> AppResult<Self> {
        let meta = tokio::fs::metadata(abs).await?;
        if !meta.is_file() {
            return Err(AppError::not_found("File not found"));
        }
        let total_size = meta.len();

        let range = match range_header {
            Some(header) => parse_range(header, total_size)?,
            None => None,
        };

        let mut file = File::open(abs).await?;
        let (start, len) = match range {
            Some(r) => (r.start, r.len()),
            None => (0, total_size),
        };
        if start > 0 {
            file.seek(SeekFrom::Start(start)).await?;
        }

        Ok(Self {
            reader: file.take(len),
            file_name: abs
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "download".to_string()),
            total_size,
            range,
            content_type: mime_guess::from_path(abs)
                .first_or_octet_stream()
                .to_string(),
        })
    }

    /// Bytes this slice will produce.
    pub fn content_length(&self) -> u64 {
        self.range.map(|r| r.len()).unwrap_or(self.total_size)
    }

    /// `Content-Range` value for partial responses.
    pub fn content_range(&self) -> Option<String> {
        self.range
            .map(|r| format!("bytes {}-{}/{}", r.start, r.end, self.total_size))
    }

    pub fn is_partial(&self) -> bool {
        self.range.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filedeck_core::error::ErrorKind;

    async fn read_all(mut slice: FileSlice) -> Vec<u8> {
        let mut buf = Vec::new();
        slice.reader.read_to_end(&mut buf).await.unwrap();
        buf
    }

    fn fixture_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("digits.txt");
        std::fs::write(&path, b"0123456789").unwrap();
        path
    }

    #[tokio::test]
    async fn whole_file_when_no_range_is_given() {
        let dir = tempfile::tempdir().unwrap();
        let slice = FileSlice::open(&fixture_file(&dir), None).await.unwrap();

        assert!(!slice.is_partial());
        assert_eq!(slice.content_length(), 10);
        assert_eq!(slice.content_range(), None);
        assert_eq!(slice.file_name, "digits.txt");
        assert_eq!(slice.content_type, "text/plain");
        assert_eq!(read_all(slice).await, b"0123456789");
    }

    #[tokio::test]
    async fn range_produces_the_exact_slice() {
        let dir = tempfile::tempdir().unwrap();
        let slice = FileSlice::open(&fixture_file(&dir), Some("bytes=2-5"))
            .await
            .unwrap();

        assert!(slice.is_partial());
        assert_eq!(slice.content_length(), 4);
        assert_eq!(slice.content_range().as_deref(), Some("bytes 2-5/10"));
        assert_eq!(read_all(slice).await, b"2345");
    }

    #[tokio::test]
    async fn suffix_range_reads_the_tail() {
        let dir = tempfile::tempdir().unwrap();
        let slice = FileSlice::open(&fixture_file(&dir), Some("bytes=-3"))
            .await
            .unwrap();
        assert_eq!(read_all(slice).await, b"789");
    }

    #[tokio::test]
    async fn out_of_bounds_range_is_416() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSlice::open(&fixture_file(&dir), Some("bytes=100-"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::RangeNotSatisfiable);
    }

    #[tokio::test]
    async fn directories_and_missing_paths_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSlice::open(dir.path(), None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = FileSlice::open(&dir.path().join("nope.bin"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn unknown_extensions_fall_back_to_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.weird");
        std::fs::write(&path, b"x").unwrap();
        let slice = FileSlice::open(&path, None).await.unwrap();
        assert_eq!(slice.content_type, "application/octet-stream");
    }
}
