//! Deletion of empty folders.

use tracing::info;

use foldermap_core::{FolderProvider, PersistedStore, Rejection};

use crate::conflict::{ensure_exists, ensure_known, ensure_not_root};
use crate::engine::MutationEngine;
use crate::operation::{OperationError, OperationKind, OperationOutcome};

impl<F: FolderProvider, S: PersistedStore> MutationEngine<F, S> {
    /// Delete the folder at `target`.
    ///
    /// Only folders that exist, hold nothing on disk and have no data in
    /// the catalog (directly or below them) can be deleted.
    pub fn delete(&mut self, target: &str) -> Result<OperationOutcome, OperationError> {
        let target = self.resolve(target);
        self.check_delete(&target)?;

        let snapshot = self.records.snapshot();
        self.records.remove(&target);
        self.keep_orphaned_parent(&target);

        self.commit_disk(snapshot, OperationKind::Delete, &target, |folders| {
            folders.delete_empty_folder(&target)
        })?;
        self.rebuild();

        info!(path = %target, "Deleted folder");
        Ok(OperationOutcome::Deleted { path: target })
    }

    fn check_delete(&self, target: &str) -> Result<(), OperationError> {
        ensure_not_root(target)?;
        ensure_known(&self.records, target)?;
        ensure_exists(&self.folders, target)?;

        if self.records.has_data_at_or_below(target) {
            return Err(Rejection::HasData {
                path: target.to_string(),
            }
            .into());
        }

        let empty = self
            .folders
            .is_empty_folder(target)
            .map_err(|e| OperationError::filesystem(OperationKind::Delete, target, e))?;
        if !empty || self.records.has_descendants(target) {
            return Err(Rejection::NotEmpty {
                path: target.to_string(),
            }
            .into());
        }

        Ok(())
    }
}
