//! Move operation.

use tracing::info;

use foldermap_core::{FolderProvider, PersistedStore, ReplaceScope, relpath};

use crate::conflict::{check_move, ensure_exists, ensure_known, ensure_not_root, is_interior};
use crate::engine::MutationEngine;
use crate::operation::{OperationError, OperationKind, OperationOutcome};

impl<F: FolderProvider, S: PersistedStore> MutationEngine<F, S> {
    /// Move the folder at `source` into `destination`, naming it `name` there.
    ///
    /// If the source's parent would drop out of the hierarchy once the folder
    /// leaves, it is kept as an empty record.
    pub fn move_folder(
        &mut self,
        source: &str,
        name: &str,
        destination: &str,
    ) -> Result<OperationOutcome, OperationError> {
        let source = self.resolve(source);
        let destination = self.resolve(destination);

        ensure_not_root(&source)?;
        ensure_known(&self.records, &source)?;
        ensure_known(&self.records, &destination)?;
        let name = relpath::validate_folder_name(name)?;
        check_move(&self.records, &self.folders, &source, &name, &destination)?;
        ensure_exists(&self.folders, &source)?;

        let new_path = relpath::join(&destination, &name);
        let scope = ReplaceScope::for_interior(is_interior(&self.records, &source));

        let snapshot = self.records.snapshot();
        self.records.rewrite_prefix(&source, &new_path);
        self.keep_orphaned_parent(&source);

        self.commit_disk(snapshot, OperationKind::Move, &source, |folders| {
            folders.move_or_rename_folder(&source, &new_path)
        })?;
        self.update_catalog(&source, &new_path, scope)?;

        info!(from = %source, to = %new_path, %scope, "Moved folder");
        Ok(OperationOutcome::Moved {
            old_path: source,
            new_path,
        })
    }
}
