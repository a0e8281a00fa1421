//! Rename operation.

use tracing::info;

use foldermap_core::{FolderProvider, PersistedStore, Rejection, ReplaceScope, relpath};

use crate::conflict::{ensure_exists, ensure_known, ensure_not_root, find_path_collision, is_interior};
use crate::engine::MutationEngine;
use crate::operation::{OperationError, OperationKind, OperationOutcome};

impl<F: FolderProvider, S: PersistedStore> MutationEngine<F, S> {
    /// Rename the folder at `target` to `new_name`, keeping its parent.
    ///
    /// Every record at or below `target` is re-rooted under the new path and
    /// the catalog is updated to match.
    pub fn rename(
        &mut self,
        target: &str,
        new_name: &str,
    ) -> Result<OperationOutcome, OperationError> {
        let target = self.resolve(target);
        let new_name = self.check_rename(&target, new_name)?;
        let new_path = relpath::with_name(&target, &new_name);
        let scope = ReplaceScope::for_interior(is_interior(&self.records, &target));

        let snapshot = self.records.snapshot();
        self.records.rewrite_prefix(&target, &new_path);

        self.commit_disk(snapshot, OperationKind::Rename, &target, |folders| {
            folders.move_or_rename_folder(&target, &new_path)
        })?;
        self.update_catalog(&target, &new_path, scope)?;

        info!(from = %target, to = %new_path, %scope, "Renamed folder");
        Ok(OperationOutcome::Renamed {
            old_path: target,
            new_path,
        })
    }

    /// Validate a rename and return the cleaned-up name.
    fn check_rename(&self, target: &str, new_name: &str) -> Result<String, Rejection> {
        ensure_not_root(target)?;
        ensure_known(&self.records, target)?;
        let new_name = relpath::validate_folder_name(new_name)?;

        let old_name = relpath::name_of(target);
        if new_name == old_name {
            return Err(Rejection::NameUnchanged);
        }

        ensure_exists(&self.folders, target)?;

        let new_path = relpath::with_name(target, &new_name);
        if let Some(existing) = find_path_collision(&self.records, target, &new_path) {
            return Err(Rejection::PathCollision {
                path: existing.to_string(),
            });
        }

        // A case-only rename finds the folder itself on disk.
        if !relpath::name_eq(&new_name, old_name)
            && self
                .folders
                .entry_exists(relpath::parent_of(target), &new_name)
        {
            return Err(Rejection::PathCollision { path: new_path });
        }

        Ok(new_name)
    }
}
