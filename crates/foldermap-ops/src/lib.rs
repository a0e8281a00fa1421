//! Folder operations engine for foldermap.
//!
//! This crate applies structural changes (rename, move, create, delete and
//! extracting files into a new subfolder) to the folder hierarchy, keeping
//! the record store, the disk and the catalog in step. Every operation
//! validates before touching anything and restores the record store when
//! the disk step fails.

mod conflict;
mod create;
mod delete;
mod engine;
mod extract;
mod local;
mod move_op;
mod operation;
mod rename;

pub use conflict::{check_move, find_path_collision, is_interior, unique_child_name};
pub use engine::{DEFAULT_NEW_FOLDER_NAME, MutationEngine};
pub use local::LocalFolders;
pub use operation::{FolderOperation, OperationError, OperationKind, OperationOutcome};
