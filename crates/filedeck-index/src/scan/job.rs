//! Per-scan progress tracking.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of one scan job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    #[default]
    Idle,
    #[serde(rename = "scanning")]
    Running,
    #[serde(rename = "completed")]
    Done,
    Error,
}

impl ScanState {
    pub fn as_str(self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::Running => "scanning",
            ScanState::Done => "completed",
            ScanState::Error => "error",
        }
    }
}

/// Progress of one first-level folder, as shown in the status poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FolderProgress {
    pub scanned: u64,
    pub total: u64,
    pub current: String,
    pub done: bool,
}

#[derive(Debug, Default)]
struct JobInner {
    state: ScanState,
    scanned_dirs: u64,
    scanned_files: u64,
    total_dirs: u64,
    total_files: u64,
    current: String,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    error: Option<String>,
    folders: BTreeMap<String, FolderProgress>,
}

/// Point-in-time copy of a job's counters.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    pub target: String,
    pub state: ScanState,
    /// Directories and files handled so far.
    pub scanned: u64,
    /// Directories and files discovered so far. Grows during the walk, so
    /// it is a lower bound until the job finishes.
    pub total: u64,
    pub num_folders: u64,
    pub num_files: u64,
    pub current: String,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub folders: BTreeMap<String, FolderProgress>,
}

/// One run of the background walker, root ("" target) or subtree.
///
/// Counters are monotone within a run: `scanned <= total` holds at every
/// point because a directory is discovered (counted into `total`) before it
/// is visited, and a directory's files enter both counters at the same
/// visit. The walker owns all mutation; everyone else reads snapshots.
#[derive(Debug)]
pub struct ScanJob {
    target: String,
    inner: Mutex<JobInner>,
}

impl ScanJob {
    /// Creates the job already running, so a registry insert never exposes
    /// an idle-but-registered window.
    pub fn start(target: &str) -> Self {
        let mut inner = JobInner {
            state: ScanState::Running,
            started_at: Some(Utc::now()),
            total_dirs: 1,
            ..JobInner::default()
        };
        if let Some(top) = top_component(target) {
            inner.folders.insert(
                top.to_string(),
                FolderProgress {
                    total: 1,
                    ..FolderProgress::default()
                },
            );
        }
        Self {
            target: target.to_string(),
            inner: Mutex::new(inner),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether this job walks the whole scan root.
    pub fn is_root(&self) -> bool {
        self.target.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.lock().state == ScanState::Running
    }

    /// Records the visit of the root directory itself and creates one
    /// progress slot per first-level folder. Root-level files are counted
    /// globally but belong to no folder slot.
    pub fn visit_root(&self, n_files: u64, subdirs: &[String]) {
        let mut inner = self.lock();
        inner.scanned_dirs += 1;
        inner.scanned_files += n_files;
        inner.total_files += n_files;
        inner.total_dirs += subdirs.len() as u64;
        inner.current.clear();
        for name in subdirs {
            inner.folders.insert(
                name.clone(),
                FolderProgress {
                    total: 1,
                    ..FolderProgress::default()
                },
            );
        }
    }

    /// Records one visited directory: its files are discovered and handled
    /// in the same step, its subdirectories only discovered.
    pub fn visit(&self, rel: &str, n_files: u64, n_subdirs: u64) {
        let key = if self.target.is_empty() {
            top_component(rel)
        } else {
            top_component(&self.target)
        }
        .map(str::to_string);

        let mut inner = self.lock();
        inner.scanned_dirs += 1;
        inner.scanned_files += n_files;
        inner.total_files += n_files;
        inner.total_dirs += n_subdirs;
        inner.current = rel.to_string();

        if let Some(key) = key {
            let folder = inner.folders.entry(key).or_default();
            folder.scanned += 1 + n_files;
            folder.total += n_files + n_subdirs;
            folder.current = rel.to_string();
            // Discovery always precedes the visit, so equality means the
            // walker has exhausted this folder's subtree.
            folder.done = folder.scanned >= folder.total;
        }
    }

    /// Marks the job completed.
    pub fn finish(&self) {
        let mut inner = self.lock();
        inner.state = ScanState::Done;
        inner.finished_at = Some(Utc::now());
        inner.current.clear();
        for folder in inner.folders.values_mut() {
            folder.done = true;
        }
    }

    /// Marks the job failed. Already-published listings stay in the index.
    pub fn fail(&self, message: impl Into<String>) {
        let mut inner = self.lock();
        inner.state = ScanState::Error;
        inner.error = Some(message.into());
        inner.finished_at = Some(Utc::now());
    }

    pub fn snapshot(&self) -> JobSnapshot {
        let inner = self.lock();
        JobSnapshot {
            target: self.target.clone(),
            state: inner.state,
            scanned: inner.scanned_dirs + inner.scanned_files,
            total: inner.total_dirs + inner.total_files,
            num_folders: inner.total_dirs,
            num_files: inner.total_files,
            current: inner.current.clone(),
            started_at: inner.started_at,
            finished_at: inner.finished_at,
            error: inner.error.clone(),
            folders: inner.folders.clone(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, JobInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// First path segment of a non-empty relative path.
pub(crate) fn top_component(rel: &str) -> Option<&str> {
    rel.split('/').next().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_job_opens_a_slot_for_its_top_folder() {
        let job = ScanJob::start("docs/api");
        let snap = job.snapshot();
        assert_eq!(snap.state, ScanState::Running);
        assert_eq!(snap.folders["docs"].total, 1);
        assert!(!snap.folders["docs"].done);
    }

    #[test]
    fn counters_stay_monotone_and_folders_complete_on_exhaustion() {
        let job = ScanJob::start("");
        job.visit_root(1, &["docs".to_string(), "empty".to_string()]);
        job.visit("docs", 1, 1);
        let mid = job.snapshot();
        assert!(mid.scanned <= mid.total);
        assert!(!mid.folders["docs"].done);

        job.visit("empty", 0, 0);
        assert!(job.snapshot().folders["empty"].done);

        job.visit("docs/sub", 1, 0);
        job.finish();

        let snap = job.snapshot();
        assert_eq!(snap.state, ScanState::Done);
        assert_eq!(snap.scanned, snap.total);
        assert_eq!(snap.num_folders, 4);
        assert_eq!(snap.num_files, 3);
        assert!(snap.folders["docs"].done);
        assert!(snap.current.is_empty());
        assert!(snap.finished_at.is_some());
    }

    #[test]
    fn fail_records_the_error_and_stops_the_job() {
        let job = ScanJob::start("gone");
        job.fail("target vanished");
        let snap = job.snapshot();
        assert_eq!(snap.state, ScanState::Error);
        assert_eq!(snap.error.as_deref(), Some("target vanished"));
        assert!(!job.is_running());
    }

    #[test]
    fn scan_state_wire_names_match_the_status_endpoint() {
        assert_eq!(ScanState::Running.as_str(), "scanning");
        assert_eq!(ScanState::Done.as_str(), "completed");
        assert_eq!(
            serde_json::to_string(&ScanState::Running).unwrap(),
            "\"scanning\""
        );
    }
}
