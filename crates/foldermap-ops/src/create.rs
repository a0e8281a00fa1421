//! Folder creation.

use tracing::info;

use foldermap_core::{FolderProvider, PathRecord, PersistedStore, Rejection, relpath};

use crate::conflict::{ensure_exists, ensure_known, unique_child_name};
use crate::engine::MutationEngine;
use crate::operation::{OperationError, OperationKind};

impl<F: FolderProvider, S: PersistedStore> MutationEngine<F, S> {
    /// Create a folder under `parent`, returning its path.
    ///
    /// If `desired_name` is taken on disk or in the hierarchy a numbered
    /// variant is used instead (`name_1`, `name_2`, ...). The catalog is not
    /// touched since nothing can be filed under a brand new folder.
    pub fn create_child(
        &mut self,
        parent: &str,
        desired_name: &str,
    ) -> Result<String, OperationError> {
        let parent = self.resolve(parent);
        ensure_known(&self.records, &parent)?;
        ensure_exists(&self.folders, &parent)?;
        let desired_name = relpath::validate_folder_name(desired_name)?;

        let name = unique_child_name(&self.records, &self.folders, &parent, &desired_name);
        let new_path = relpath::join(&parent, &name);
        if self.records.is_known(&new_path) {
            return Err(Rejection::NameGenerationCollision { path: new_path }.into());
        }

        let snapshot = self.records.snapshot();
        self.records.insert(PathRecord::empty(new_path.as_str()));

        self.commit_disk(snapshot, OperationKind::CreateChild, &new_path, |folders| {
            folders.create_subfolder(&parent, &name)
        })?;
        self.rebuild();

        info!(path = %new_path, "Created folder");
        Ok(new_path)
    }

    /// Create a folder with the configured default name under `parent`.
    pub fn create_new_folder(&mut self, parent: &str) -> Result<String, OperationError> {
        let name = self.new_folder_name.clone();
        self.create_child(parent, &name)
    }
}
