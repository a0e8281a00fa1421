//! Error types shared by the reconciler, the mutation engine and the providers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by a [`FolderProvider`](crate::FolderProvider).
#[derive(Debug, Error)]
pub enum FsError {
    /// The path does not exist.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// The destination of a create/move already exists.
    #[error("Already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// A folder that had to be empty still has entries.
    #[error("Folder is not empty: {path}")]
    NotEmpty { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The enumeration was cancelled by the caller.
    #[error("Operation interrupted")]
    Interrupted,

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl FsError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            std::io::ErrorKind::DirectoryNotEmpty => Self::NotEmpty { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether this error is the result of a cancellation.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

/// Errors reported by a [`PersistedStore`](crate::PersistedStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store cannot be queried or written.
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    /// I/O failure while reading or writing the store.
    #[error("Store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store contents could not be decoded.
    #[error("Store at {path} is corrupt: {message}")]
    Corrupt { path: PathBuf, message: String },
}

impl StoreError {
    /// Create an unavailable error from any displayable cause.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Why a structural change was refused before any side effect happened.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Rejection {
    #[error("Folder name cannot be empty")]
    EmptyName,

    #[error("Folder names cannot end with a '.'")]
    TrailingDot,

    #[error("'{name}' is a reserved device name")]
    ReservedName { name: String },

    #[error("Folder names cannot contain {character:?}")]
    InvalidCharacter { character: char },

    #[error("The new name is the same as the current one")]
    NameUnchanged,

    #[error("A path with that name already exists: {path}")]
    PathCollision { path: String },

    #[error("'{path}' is already directly inside '{destination}'")]
    NoOpMove { path: String, destination: String },

    #[error("'{destination}' already contains a folder named '{name}'")]
    SiblingNameCollision { destination: String, name: String },

    #[error("Cannot move '{path}' onto itself")]
    SameAsSource { path: String },

    #[error("Cannot move '{path}' into its own subfolder '{destination}'")]
    Cycle { path: String, destination: String },

    #[error("Folder does not exist on disk: {path}")]
    FolderMissing { path: String },

    #[error("Folder is not empty: {path}")]
    NotEmpty { path: String },

    #[error("Folder has data associated with it: {path}")]
    HasData { path: String },

    #[error("Folder has no data associated with it: {path}")]
    NoData { path: String },

    #[error("Folder has no image or video files to move: {path}")]
    NothingToExtract { path: String },

    #[error("The root folder cannot be renamed, moved or deleted")]
    RootImmutable,

    #[error("Unknown folder: {path}")]
    UnknownPath { path: String },

    #[error("A folder called {path} already exists")]
    NameGenerationCollision { path: String },
}

/// Errors that stop a reconciliation from producing a store.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The caller cancelled the scan.
    #[error("Reconciliation cancelled")]
    Cancelled,

    /// The persisted store could not be queried.
    #[error("Could not read known paths: {0}")]
    Store(#[from] StoreError),

    /// The physical folders could not be enumerated.
    #[error("Could not enumerate folders: {0}")]
    Filesystem(FsError),
}

impl From<FsError> for ReconcileError {
    fn from(err: FsError) -> Self {
        match err {
            FsError::Interrupted => Self::Cancelled,
            other => Self::Filesystem(other),
        }
    }
}
