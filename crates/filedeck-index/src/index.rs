//! In-memory directory index.
//!
//! Listings are stored per directory behind an [`Arc`] and replaced
//! wholesale on rescan, so browse and search never block a running scan.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use crate::entry::DirListing;
use crate::resolver::{in_subtree, join_rel};

/// Aggregate counters over every indexed listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexTotals {
    pub directories: u64,
    pub files: u64,
    pub bytes: u64,
}

/// One search result, addressed by root-relative path.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub name: String,
    pub is_dir: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// Concurrent map from root-relative directory path to its listing.
#[derive(Debug, Default)]
pub struct DirectoryIndex {
    listings: DashMap<String, Arc<DirListing>>,
}

impl DirectoryIndex {
    pub fn new() -> Self {
        Self {
            listings: DashMap::new(),
        }
    }

    /// Returns the listing for `rel`, if that directory has been scanned.
    pub fn get(&self, rel: &str) -> Option<Arc<DirListing>> {
        self.listings.get(rel).map(|l| Arc::clone(l.value()))
    }

    /// Publishes a listing, replacing any previous one for the same path.
    pub fn insert(&self, listing: DirListing) -> Arc<DirListing> {
        let listing = Arc::new(listing);
        self.listings
            .insert(listing.rel_path.clone(), Arc::clone(&listing));
        listing
    }

    /// Drops the listing for `rel` alone.
    pub fn remove(&self, rel: &str) {
        self.listings.remove(rel);
    }

    /// Drops `rel` and every listing underneath it.
    pub fn remove_subtree(&self, rel: &str) {
        self.listings.retain(|path, _| !in_subtree(path, rel));
    }

    /// After a completed walk of `base`, drops listings under `base` that
    /// the walk did not visit. This is how deletions on disk leave the
    /// index without ever taking a global lock.
    pub fn retain_subtree(&self, base: &str, visited: &HashSet<String>) {
        self.listings
            .retain(|path, _| !in_subtree(path, base) || visited.contains(path));
    }

    /// Number of children of `rel`, if scanned.
    pub fn child_count(&self, rel: &str) -> Option<usize> {
        self.listings.get(rel).map(|l| l.entries.len())
    }

    /// All listing keys within the `base` subtree, `base` included.
    pub fn keys_under(&self, base: &str) -> Vec<String> {
        self.listings
            .iter()
            .map(|l| l.key().clone())
            .filter(|path| in_subtree(path, base))
            .collect()
    }

    /// Number of indexed directories.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    /// Sums entry counts across all listings. Directories are counted from
    /// listing keys so the root itself is included once.
    pub fn totals(&self) -> IndexTotals {
        let mut totals = IndexTotals::default();
        for listing in self.listings.iter() {
            totals.directories += 1;
            for entry in &listing.entries {
                if entry.is_dir {
                    continue;
                }
                totals.files += 1;
                totals.bytes += entry.size.unwrap_or(0);
            }
        }
        totals
    }

    /// Case-insensitive substring search over indexed names.
    ///
    /// Hits are ordered by path and truncated to `limit`; a later rescan
    /// may reorder results but never yields duplicates within one call.
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let needle = query.to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for listing in self.listings.iter() {
            for entry in &listing.entries {
                if !entry.name.to_lowercase().contains(&needle) {
                    continue;
                }
                hits.push(SearchHit {
                    path: join_rel(&listing.rel_path, &entry.name),
                    name: entry.name.clone(),
                    is_dir: entry.is_dir,
                    size: entry.size,
                    modified: entry.modified,
                });
            }
        }

        hits.sort_by(|a, b| a.path.cmp(&b.path));
        hits.truncate(limit);
        hits
    }
}
