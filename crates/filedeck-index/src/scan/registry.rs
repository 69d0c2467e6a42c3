//! Scan job registry and the aggregated status snapshot.
//!
//! Jobs are keyed by target path ("" is the root job). The registry holds
//! the latest job per target; a new scan of a finished target replaces it,
//! while a scan of a still-running target is deduplicated onto the running
//! job so repeated triggers cannot pile up walkers.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;

use crate::scan::job::{FolderProgress, JobSnapshot, ScanJob, ScanState, top_component};

/// Pollable snapshot over every known job, shaped for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ScanStatus {
    pub status: ScanState,
    pub done: bool,
    pub scanned: u64,
    pub total: u64,
    pub progress_percent: f64,
    pub current: String,
    pub folders: BTreeMap<String, FolderProgress>,
    pub num_files: u64,
    pub num_folders: u64,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_remaining_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanStatus {
    /// Status before any scan has been triggered.
    pub fn idle() -> Self {
        Self {
            status: ScanState::Idle,
            done: false,
            scanned: 0,
            total: 0,
            progress_percent: 0.0,
            current: String::new(),
            folders: BTreeMap::new(),
            num_files: 0,
            num_folders: 0,
            start_time: None,
            end_time: None,
            elapsed_seconds: None,
            estimated_remaining_seconds: None,
            error: None,
        }
    }
}

/// Arena of scan jobs keyed by target path.
#[derive(Debug, Default)]
pub struct ScanRegistry {
    jobs: DashMap<String, Arc<ScanJob>>,
}

impl ScanRegistry {
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }

    /// Registers a running job for `target`. Returns the job and whether it
    /// was newly created; a still-running job for the same target is reused
    /// instead of being raced.
    pub fn begin(&self, target: &str) -> (Arc<ScanJob>, bool) {
        match self.jobs.entry(target.to_string()) {
            Entry::Occupied(mut slot) => {
                if slot.get().is_running() {
                    (Arc::clone(slot.get()), false)
                } else {
                    let job = Arc::new(ScanJob::start(target));
                    slot.insert(Arc::clone(&job));
                    (job, true)
                }
            }
            Entry::Vacant(slot) => {
                let job = Arc::new(ScanJob::start(target));
                slot.insert(Arc::clone(&job));
                (job, true)
            }
        }
    }

    pub fn get(&self, target: &str) -> Option<Arc<ScanJob>> {
        self.jobs.get(target).map(|j| Arc::clone(j.value()))
    }

    pub fn is_running(&self, target: &str) -> bool {
        self.jobs
            .get(target)
            .map(|j| j.is_running())
            .unwrap_or(false)
    }

    /// Aggregates all jobs into one status snapshot.
    ///
    /// The root job supplies the baseline; running subtree jobs overlay
    /// their live numbers into the `folders` map under their first-level
    /// folder name, and drive the top-level counters while the root job is
    /// not itself running.
    pub fn status(&self) -> ScanStatus {
        let mut snaps: Vec<JobSnapshot> =
            self.jobs.iter().map(|job| job.value().snapshot()).collect();
        if snaps.is_empty() {
            return ScanStatus::idle();
        }
        // "" sorts first, so the root job leads every scan below.
        snaps.sort_by(|a, b| a.target.cmp(&b.target));

        let root = snaps.iter().find(|s| s.target.is_empty()).cloned();
        let running: Vec<&JobSnapshot> = snaps
            .iter()
            .filter(|s| s.state == ScanState::Running)
            .collect();

        let status = if !running.is_empty() {
            ScanState::Running
        } else if snaps.iter().all(|s| s.state == ScanState::Error) {
            ScanState::Error
        } else {
            ScanState::Done
        };

        // Counter source: the root walk covers subtree walks' territory, so
        // while it runs it alone feeds the top-level numbers; otherwise the
        // running subtree jobs are summed; at rest the root's final numbers
        // (or the sum of everything, if no root scan ever ran) stand.
        let running_root = running.iter().find(|s| s.target.is_empty());
        let (scanned, total) = if let Some(r) = running_root {
            (r.scanned, r.total)
        } else if !running.is_empty() {
            (
                running.iter().map(|s| s.scanned).sum(),
                running.iter().map(|s| s.total).sum(),
            )
        } else if let Some(r) = &root {
            (r.scanned, r.total)
        } else {
            (
                snaps.iter().map(|s| s.scanned).sum(),
                snaps.iter().map(|s| s.total).sum(),
            )
        };

        let (num_folders, num_files) = match &root {
            Some(r) => (r.num_folders, r.num_files),
            None => (
                snaps.iter().map(|s| s.num_folders).sum(),
                snaps.iter().map(|s| s.num_files).sum(),
            ),
        };

        let current = running
            .first()
            .map(|s| s.current.clone())
            .or_else(|| root.as_ref().map(|r| r.current.clone()))
            .unwrap_or_default();

        let start_time = if running.is_empty() {
            snaps.iter().filter_map(|s| s.started_at).min()
        } else {
            running.iter().filter_map(|s| s.started_at).min()
        };
        let end_time = if running.is_empty() {
            snaps.iter().filter_map(|s| s.finished_at).max()
        } else {
            None
        };
        let error = snaps.iter().find_map(|s| s.error.clone());

        let mut folders = root.map(|r| r.folders).unwrap_or_default();
        for snap in snaps.iter().filter(|s| !s.target.is_empty()) {
            let Some(top) = top_component(&snap.target) else {
                continue;
            };
            if snap.state == ScanState::Running || !folders.contains_key(top) {
                if let Some(progress) = snap.folders.get(top) {
                    folders.insert(top.to_string(), progress.clone());
                }
            }
        }

        let progress_percent = if total > 0 {
            round1(scanned as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        let mut elapsed_seconds = None;
        let mut estimated_remaining_seconds = None;
        if status == ScanState::Running {
            if let Some(started) = start_time {
                let elapsed = (Utc::now() - started)
                    .num_microseconds()
                    .unwrap_or(i64::MAX) as f64
                    / 1_000_000.0;
                if scanned > 0 && elapsed > 0.0 {
                    let rate = scanned as f64 / elapsed;
                    let remaining = total.saturating_sub(scanned) as f64 / rate;
                    elapsed_seconds = Some(round1(elapsed));
                    estimated_remaining_seconds = Some(round1(remaining));
                }
            }
        }

        ScanStatus {
            status,
            done: matches!(status, ScanState::Done | ScanState::Error),
            scanned,
            total,
            progress_percent,
            current,
            folders,
            num_files,
            num_folders,
            start_time,
            end_time,
            elapsed_seconds,
            estimated_remaining_seconds,
            error,
        }
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_reuses_a_running_job_for_the_same_target() {
        let registry = ScanRegistry::new();
        let (first, created) = registry.begin("docs");
        assert!(created);

        let (second, created) = registry.begin("docs");
        assert!(!created);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn begin_replaces_a_finished_job() {
        let registry = ScanRegistry::new();
        let (first, _) = registry.begin("docs");
        first.finish();

        let (second, created) = registry.begin("docs");
        assert!(created);
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(registry.is_running("docs"));
    }

    #[test]
    fn status_is_idle_before_any_job() {
        let status = ScanRegistry::new().status();
        assert_eq!(status.status, ScanState::Idle);
        assert!(!status.done);
        assert_eq!(status.total, 0);
        assert!(status.folders.is_empty());
    }

    #[test]
    fn status_reports_the_root_job_baseline() {
        let registry = ScanRegistry::new();
        let (job, _) = registry.begin("");
        job.visit_root(1, &["docs".to_string()]);
        job.visit("docs", 2, 0);
        job.finish();

        let status = registry.status();
        assert_eq!(status.status, ScanState::Done);
        assert!(status.done);
        assert_eq!(status.scanned, status.total);
        assert_eq!(status.num_folders, 2);
        assert_eq!(status.num_files, 3);
        assert_eq!(status.progress_percent, 100.0);
        assert!(status.end_time.is_some());
        assert!(status.folders["docs"].done);
    }

    #[test]
    fn running_subtree_job_overlays_its_folder_and_counters() {
        let registry = ScanRegistry::new();
        let (root, _) = registry.begin("");
        root.visit_root(0, &["docs".to_string()]);
        root.visit("docs", 10, 0);
        root.finish();

        let (sub, _) = registry.begin("docs/api");
        sub.visit("docs/api", 1, 2);
        // give the clock a tick so elapsed time is nonzero
        std::thread::sleep(std::time::Duration::from_millis(2));

        let status = registry.status();
        assert_eq!(status.status, ScanState::Running);
        assert!(!status.done);
        assert_eq!(status.current, "docs/api");
        // live rescan numbers replace the finished root's folder entry
        assert_eq!(status.folders["docs"].scanned, 2);
        assert_eq!(status.folders["docs"].total, 4);
        assert!(!status.folders["docs"].done);
        assert_eq!(status.scanned, 2);
        assert_eq!(status.total, 4);
        assert!(status.end_time.is_none());
        assert!(status.elapsed_seconds.is_some());
    }

    #[test]
    fn failed_root_job_surfaces_the_error() {
        let registry = ScanRegistry::new();
        let (job, _) = registry.begin("");
        job.fail("scan root vanished");

        let status = registry.status();
        assert_eq!(status.status, ScanState::Error);
        assert!(status.done);
        assert_eq!(status.error.as_deref(), Some("scan root vanished"));
    }
}
