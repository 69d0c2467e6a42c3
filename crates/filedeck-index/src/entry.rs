//! Index entry types.

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One filesystem node as known to the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// File or directory name within its parent.
    pub name: String,
    /// Whether this entry is a directory.
    pub is_dir: bool,
    /// File size in bytes. `None` for directories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Filesystem modification time, when readable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// One scanned directory: the atomic unit of index replacement.
///
/// A listing is immutable once published; rescans replace the whole
/// `Arc` so readers never observe a partially updated directory.
#[derive(Debug, Clone)]
pub struct DirListing {
    /// Path relative to the scan root ("" for the root itself).
    pub rel_path: String,
    /// The directory's own mtime at scan time; used as a freshness token
    /// for on-demand relisting.
    pub dir_modified: Option<SystemTime>,
    /// When this listing was produced.
    pub scanned_at: DateTime<Utc>,
    /// Children, sorted directories-first then case-insensitive by name.
    pub entries: Vec<Entry>,
}

impl DirListing {
    /// Sorts entries directories-first, then case-insensitive by name.
    /// Equal folded names fall back to byte order so the result is total.
    pub fn sort_entries(&mut self) {
        self.entries.sort_by(|a, b| {
            b.is_dir
                .cmp(&a.is_dir)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    /// Number of child entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
