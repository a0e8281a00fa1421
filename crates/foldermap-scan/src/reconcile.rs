//! Merge the catalog's known paths with the folders on disk.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use foldermap_core::{
    FolderProvider, PathRecord, PathRecordStore, PersistedStore, ReconcileError, relpath,
};

use crate::progress::{ProgressTracker, ReconcilePhase, ReconcileProgress};

/// Channel capacity for reconciliation events.
const RECONCILE_CHANNEL_SIZE: usize = 16;

/// Build a record store from the catalog's paths and the physical folders.
///
/// Every catalog path becomes a record with data. Ancestors of those paths
/// and every physical folder that is not already known become records
/// without data. The root is always present. Paths that differ from an
/// earlier one only by case are dropped.
pub fn reconcile<P, F>(persisted_paths: P, physical_folders: F) -> PathRecordStore
where
    P: IntoIterator,
    P::Item: AsRef<str>,
    F: IntoIterator,
    F::Item: AsRef<str>,
{
    let mut store = PathRecordStore::new();

    let seeded: Vec<String> = persisted_paths
        .into_iter()
        .map(|p| relpath::normalize(p.as_ref()))
        .collect();
    for path in &seeded {
        insert_reporting_case_clash(&mut store, PathRecord::with_data(path.as_str()));
    }

    for path in &seeded {
        for ancestor in relpath::ancestors(path) {
            if !store.contains(ancestor) {
                store.insert(PathRecord::empty(ancestor));
            }
        }
    }

    for folder in physical_folders {
        let path = relpath::normalize(folder.as_ref());
        insert_reporting_case_clash(&mut store, PathRecord::empty(path));
    }

    if !store.contains("") {
        store.insert(PathRecord::empty(""));
    }

    store
}

fn insert_reporting_case_clash(store: &mut PathRecordStore, record: PathRecord) {
    let existing = store.get(&record.path).map(|r| r.path.clone());
    match existing {
        None => {
            store.insert(record);
        }
        Some(existing) if existing != record.path => {
            warn!(
                kept = %existing,
                dropped = %record.path,
                "Dropping path that differs from a known path only by case"
            );
        }
        Some(_) => {}
    }
}

/// Runs a reconciliation against a disk and a catalog.
#[derive(Debug, Clone)]
pub struct Reconciler<F, S> {
    folders: F,
    store: S,
    excluded: Vec<String>,
}

impl<F: FolderProvider, S: PersistedStore> Reconciler<F, S> {
    /// Create a reconciler that enumerates every folder.
    pub fn new(folders: F, store: S) -> Self {
        Self {
            folders,
            store,
            excluded: Vec::new(),
        }
    }

    /// Skip folders with these names while enumerating.
    pub fn excluding(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded = names.into_iter().map(Into::into).collect();
        self
    }

    /// Run to completion.
    pub fn run(&self, cancelled: &dyn Fn() -> bool) -> Result<PathRecordStore, ReconcileError> {
        self.run_with_progress(cancelled, |_| {})
    }

    /// Run to completion, reporting each phase as it starts and finishes.
    ///
    /// Nothing is returned unless both sources were read in full.
    pub fn run_with_progress(
        &self,
        cancelled: &dyn Fn() -> bool,
        mut on_progress: impl FnMut(ReconcileProgress),
    ) -> Result<PathRecordStore, ReconcileError> {
        let mut tracker = ProgressTracker::new();

        tracker.enter(ReconcilePhase::ReadingCatalog);
        on_progress(tracker.snapshot());
        if cancelled() {
            return Err(ReconcileError::Cancelled);
        }
        let persisted = self.store.known_relative_paths()?;
        tracker.record_known_paths(persisted.len());
        debug!(count = persisted.len(), "Read known paths from catalog");

        tracker.enter(ReconcilePhase::EnumeratingFolders);
        on_progress(tracker.snapshot());
        if cancelled() {
            return Err(ReconcileError::Cancelled);
        }
        let physical = self.folders.enumerate_subfolders(&self.excluded, cancelled)?;
        tracker.record_folders(physical.len());
        debug!(count = physical.len(), "Enumerated folders on disk");

        tracker.enter(ReconcilePhase::Merging);
        on_progress(tracker.snapshot());
        if cancelled() {
            return Err(ReconcileError::Cancelled);
        }
        let store = reconcile(&persisted, &physical);
        tracker.record_records(store.len());

        tracker.enter(ReconcilePhase::Done);
        let progress = tracker.snapshot();
        info!(
            records = store.len(),
            known = persisted.len(),
            folders = physical.len(),
            elapsed_ms = progress.elapsed.as_millis() as u64,
            "Reconciled folder hierarchy"
        );
        on_progress(progress);

        Ok(store)
    }

    /// Give back the providers.
    pub fn into_parts(self) -> (F, S) {
        (self.folders, self.store)
    }
}

/// Messages from a background reconciliation.
#[derive(Debug)]
pub enum ReconcileEvent {
    /// A phase started or finished.
    Progress(ReconcileProgress),
    /// The reconciliation ended. This is always the last event.
    Complete(Result<PathRecordStore, ReconcileError>),
}

/// Start a reconciliation on a blocking thread.
///
/// Returns a receiver that yields progress and finally the result.
/// Cancelling `cancel` stops the scan and completes with
/// [`ReconcileError::Cancelled`].
pub fn start_reconcile<F, S>(
    reconciler: Reconciler<F, S>,
    cancel: CancellationToken,
) -> mpsc::Receiver<ReconcileEvent>
where
    F: FolderProvider + 'static,
    S: PersistedStore + 'static,
{
    let (tx, rx) = mpsc::channel(RECONCILE_CHANNEL_SIZE);

    tokio::spawn(async move {
        let tx_progress = tx.clone();
        let token = cancel.clone();

        // Folder enumeration is blocking I/O
        let result = tokio::task::spawn_blocking(move || {
            reconciler.run_with_progress(&|| token.is_cancelled(), |progress| {
                let _ = tx_progress.blocking_send(ReconcileEvent::Progress(progress));
            })
        })
        .await
        .unwrap_or_else(|e| {
            Err(ReconcileError::Filesystem(foldermap_core::FsError::Other {
                message: e.to_string(),
            }))
        });

        let result = match result {
            Ok(_) if cancel.is_cancelled() => Err(ReconcileError::Cancelled),
            other => other,
        };
        let _ = tx.send(ReconcileEvent::Complete(result)).await;
    });

    rx
}
