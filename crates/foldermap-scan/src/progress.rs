//! Reconciliation progress reporting.

use std::time::{Duration, Instant};

use strum::Display;

/// Stage a reconciliation has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReconcilePhase {
    #[strum(to_string = "Reading catalog")]
    ReadingCatalog,
    #[strum(to_string = "Enumerating folders")]
    EnumeratingFolders,
    #[strum(to_string = "Merging")]
    Merging,
    #[strum(to_string = "Done")]
    Done,
}

/// Progress information during a reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileProgress {
    /// Current stage.
    pub phase: ReconcilePhase,
    /// Paths the catalog reported as having data.
    pub known_paths: usize,
    /// Folders found on disk.
    pub folders_found: usize,
    /// Records in the merged store, once merging is done.
    pub records: usize,
    /// Time elapsed since the reconciliation started.
    pub elapsed: Duration,
}

impl ReconcileProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            phase: ReconcilePhase::ReadingCatalog,
            known_paths: 0,
            folders_found: 0,
            records: 0,
            elapsed: Duration::ZERO,
        }
    }
}

impl Default for ReconcileProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal progress tracker with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    progress: ReconcileProgress,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            progress: ReconcileProgress::new(),
        }
    }

    pub fn enter(&mut self, phase: ReconcilePhase) {
        self.progress.phase = phase;
    }

    pub fn record_known_paths(&mut self, count: usize) {
        self.progress.known_paths = count;
    }

    pub fn record_folders(&mut self, count: usize) {
        self.progress.folders_found = count;
    }

    pub fn record_records(&mut self, count: usize) {
        self.progress.records = count;
    }

    pub fn snapshot(&self) -> ReconcileProgress {
        ReconcileProgress {
            elapsed: self.start_time.elapsed(),
            ..self.progress.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_snapshot() {
        let mut tracker = ProgressTracker::new();
        tracker.enter(ReconcilePhase::EnumeratingFolders);
        tracker.record_known_paths(3);
        tracker.record_folders(7);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.phase, ReconcilePhase::EnumeratingFolders);
        assert_eq!(snapshot.known_paths, 3);
        assert_eq!(snapshot.folders_found, 7);
        assert_eq!(snapshot.phase.to_string(), "Enumerating folders");
    }
}
