//! Folder operation types.

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use foldermap_core::{FsError, Rejection, StoreError, relpath};

/// A structural change to the folder hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderOperation {
    /// Give a folder a new name in place.
    Rename { target: String, new_name: String },
    /// Move a folder (and everything below it) under another folder.
    Move {
        source: String,
        name: String,
        destination: String,
    },
    /// Create a new empty folder.
    CreateChild { parent: String, desired_name: String },
    /// Delete an empty folder with no data.
    Delete { target: String },
    /// Move a folder's media files into a new subfolder.
    ExtractFiles { source: String },
}

impl FolderOperation {
    /// Create a rename operation.
    pub fn rename(target: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self::Rename {
            target: target.into(),
            new_name: new_name.into(),
        }
    }

    /// Create a move operation that keeps the folder's name.
    pub fn move_to(source: impl Into<String>, destination: impl Into<String>) -> Self {
        let source = relpath::normalize(&source.into());
        let name = relpath::name_of(&source).to_string();
        Self::Move {
            source,
            name,
            destination: destination.into(),
        }
    }

    /// Create a folder creation operation.
    pub fn create_child(parent: impl Into<String>, desired_name: impl Into<String>) -> Self {
        Self::CreateChild {
            parent: parent.into(),
            desired_name: desired_name.into(),
        }
    }

    /// Create a delete operation.
    pub fn delete(target: impl Into<String>) -> Self {
        Self::Delete {
            target: target.into(),
        }
    }

    /// Create an extract-files operation.
    pub fn extract_files(source: impl Into<String>) -> Self {
        Self::ExtractFiles {
            source: source.into(),
        }
    }

    /// The kind of this operation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Rename { .. } => OperationKind::Rename,
            Self::Move { .. } => OperationKind::Move,
            Self::CreateChild { .. } => OperationKind::CreateChild,
            Self::Delete { .. } => OperationKind::Delete,
            Self::ExtractFiles { .. } => OperationKind::ExtractFiles,
        }
    }
}

/// The type of operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum OperationKind {
    Rename,
    Move,
    #[strum(to_string = "Create folder")]
    CreateChild,
    Delete,
    #[strum(to_string = "Extract files")]
    ExtractFiles,
}

/// What a successful operation changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationOutcome {
    Renamed { old_path: String, new_path: String },
    Moved { old_path: String, new_path: String },
    Created { path: String },
    Deleted { path: String },
    Extracted {
        source: String,
        destination: String,
        files_moved: usize,
    },
}

impl std::fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Renamed { old_path, new_path } => {
                write!(f, "Renamed '{old_path}' to '{new_path}'")
            }
            Self::Moved { old_path, new_path } => write!(f, "Moved '{old_path}' to '{new_path}'"),
            Self::Created { path } => write!(f, "Created '{path}'"),
            Self::Deleted { path } => write!(f, "Deleted '{path}'"),
            Self::Extracted {
                source,
                destination,
                files_moved,
            } => write!(
                f,
                "Moved {files_moved} files from '{}' into '{destination}'",
                display_path(source)
            ),
        }
    }
}

/// An error that stopped or disturbed a folder operation.
#[derive(Debug, Error)]
pub enum OperationError {
    /// The operation was refused before anything changed.
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The disk change failed. The record store was rolled back.
    #[error("{kind} failed for '{path}': {source}")]
    Filesystem {
        kind: OperationKind,
        path: String,
        #[source]
        source: FsError,
    },

    /// The disk change happened but the catalog could not be updated to match.
    #[error(
        "Folders were changed but the catalog could not be updated from '{old_prefix}' to \
         '{new_prefix}'. The catalog must be repaired by hand: {source}"
    )]
    PersistedStore {
        old_prefix: String,
        new_prefix: String,
        #[source]
        source: StoreError,
    },

    /// Only some files were moved into the new folder.
    #[error(
        "Moving files was interrupted: {moved}/{total} files were moved from '{}' into \
         '{destination}'",
        display_path(.from)
    )]
    PartialMigration {
        from: String,
        destination: String,
        moved: usize,
        total: usize,
        #[source]
        cause: FsError,
    },
}

impl OperationError {
    /// Create a filesystem error.
    pub fn filesystem(kind: OperationKind, path: impl Into<String>, source: FsError) -> Self {
        Self::Filesystem {
            kind,
            path: path.into(),
            source,
        }
    }

    /// Whether the record store was left as it was before the call.
    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::Filesystem { .. })
    }

    /// Whether memory, disk and catalog no longer agree.
    pub fn is_divergence(&self) -> bool {
        matches!(
            self,
            Self::PersistedStore { .. } | Self::PartialMigration { .. }
        )
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "(root)" } else { path }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_to_takes_name_from_source() {
        let op = FolderOperation::move_to("a\\b", "d");
        assert_eq!(
            op,
            FolderOperation::Move {
                source: "a/b".into(),
                name: "b".into(),
                destination: "d".into(),
            }
        );
        assert_eq!(op.kind(), OperationKind::Move);
    }

    #[test]
    fn test_error_classification() {
        let rejected: OperationError = Rejection::EmptyName.into();
        assert!(rejected.is_rolled_back());
        assert!(!rejected.is_divergence());

        let partial = OperationError::PartialMigration {
            from: String::new(),
            destination: "New folder".into(),
            moved: 2,
            total: 5,
            cause: FsError::Other {
                message: "disk full".into(),
            },
        };
        assert!(partial.is_divergence());
        assert!(partial.to_string().contains("2/5"));
        assert!(partial.to_string().contains("(root)"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(OperationKind::CreateChild.to_string(), "Create folder");
        assert_eq!(OperationKind::Rename.to_string(), "Rename");
    }
}
