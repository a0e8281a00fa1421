//! The mutation engine: owns the record store and applies folder operations.

use tracing::{debug, error, warn};

use foldermap_core::{
    FolderProvider, FsError, Node, PathRecord, PathRecordStore, PersistedStore, ReplaceScope,
    StoreSnapshot, relpath,
};

use crate::operation::{FolderOperation, OperationError, OperationKind, OperationOutcome};

/// Default name for folders created without an explicit name.
pub const DEFAULT_NEW_FOLDER_NAME: &str = "New folder";

/// Applies structural changes to the hierarchy, the disk and the catalog.
///
/// Operations are synchronous and must not be issued concurrently. Each one
/// validates first, then updates the record store, then touches the disk.
/// A disk failure restores the store; a catalog failure after a successful
/// disk change is reported as [`OperationError::PersistedStore`].
#[derive(Debug)]
pub struct MutationEngine<F, S> {
    pub(crate) folders: F,
    pub(crate) catalog: S,
    pub(crate) records: PathRecordStore,
    pub(crate) hierarchy: Node,
    pub(crate) new_folder_name: String,
    pub(crate) edits_made: bool,
}

impl<F: FolderProvider, S: PersistedStore> MutationEngine<F, S> {
    /// Create an engine over a reconciled record store.
    pub fn new(folders: F, catalog: S, records: PathRecordStore) -> Self {
        let mut engine = Self {
            folders,
            catalog,
            records,
            hierarchy: Node::root(),
            new_folder_name: DEFAULT_NEW_FOLDER_NAME.to_string(),
            edits_made: false,
        };
        engine.rebuild();
        engine
    }

    /// Use `name` for folders created by [`create_new_folder`](Self::create_new_folder)
    /// and [`extract_files`](Self::extract_files).
    pub fn with_new_folder_name(mut self, name: impl Into<String>) -> Self {
        self.new_folder_name = name.into();
        self
    }

    /// Current records.
    pub fn records(&self) -> &PathRecordStore {
        &self.records
    }

    /// The hierarchy built from the current records.
    pub fn hierarchy(&self) -> &Node {
        &self.hierarchy
    }

    /// Whether any operation has changed the disk.
    pub fn edits_made(&self) -> bool {
        self.edits_made
    }

    /// The folder provider.
    pub fn folders(&self) -> &F {
        &self.folders
    }

    /// The catalog.
    pub fn catalog(&self) -> &S {
        &self.catalog
    }

    /// Give back the providers and the final records.
    pub fn into_parts(self) -> (F, S, PathRecordStore) {
        (self.folders, self.catalog, self.records)
    }

    /// Apply any operation.
    pub fn apply(&mut self, operation: FolderOperation) -> Result<OperationOutcome, OperationError> {
        debug!(kind = %operation.kind(), ?operation, "Applying folder operation");
        match operation {
            FolderOperation::Rename { target, new_name } => self.rename(&target, &new_name),
            FolderOperation::Move {
                source,
                name,
                destination,
            } => self.move_folder(&source, &name, &destination),
            FolderOperation::CreateChild {
                parent,
                desired_name,
            } => self
                .create_child(&parent, &desired_name)
                .map(|path| OperationOutcome::Created { path }),
            FolderOperation::Delete { target } => self.delete(&target),
            FolderOperation::ExtractFiles { source } => self.extract_files(&source),
        }
    }

    /// Normalize `path` and give it the spelling the records use.
    ///
    /// Unknown paths are returned as typed so validation can reject them.
    pub(crate) fn resolve(&self, path: &str) -> String {
        let path = relpath::normalize(path);
        self.records.stored_spelling(&path).unwrap_or(path)
    }

    /// Rebuild the hierarchy from the records.
    pub(crate) fn rebuild(&mut self) {
        self.records.order_by_path();
        let folders = &self.folders;
        self.hierarchy = Node::build(&self.records, folders.exists(""), |path| {
            folders.exists(path)
        });
    }

    /// Run a disk step, restoring `snapshot` if it fails.
    pub(crate) fn commit_disk(
        &mut self,
        snapshot: StoreSnapshot,
        kind: OperationKind,
        path: &str,
        step: impl FnOnce(&F) -> Result<(), FsError>,
    ) -> Result<(), OperationError> {
        match step(&self.folders) {
            Ok(()) => {
                self.edits_made = true;
                Ok(())
            }
            Err(err) => {
                warn!(%kind, path, error = %err, "Disk change failed, restoring records");
                self.records.restore(snapshot);
                Err(OperationError::filesystem(kind, path, err))
            }
        }
    }

    /// Re-file catalog entries after a folder moved. Rebuilds either way.
    pub(crate) fn update_catalog(
        &mut self,
        old_prefix: &str,
        new_prefix: &str,
        scope: ReplaceScope,
    ) -> Result<(), OperationError> {
        let result = self
            .catalog
            .replace_path_prefix(old_prefix, new_prefix, scope);
        self.rebuild();
        match result {
            Ok(count) => {
                debug!(old_prefix, new_prefix, %scope, count, "Catalog updated");
                Ok(())
            }
            Err(err) => {
                error!(
                    old_prefix,
                    new_prefix,
                    error = %err,
                    "Catalog update failed after folders were changed"
                );
                Err(OperationError::PersistedStore {
                    old_prefix: old_prefix.to_string(),
                    new_prefix: new_prefix.to_string(),
                    source: err,
                })
            }
        }
    }

    /// Keep `path` visible after its last occupant left.
    pub(crate) fn keep_orphaned_parent(&mut self, path: &str) {
        let parent = relpath::parent_of(path);
        if !self.records.is_known(parent) {
            debug!(parent, "Re-adding folder left empty");
            self.records.insert(PathRecord::empty(parent));
        }
    }
}
