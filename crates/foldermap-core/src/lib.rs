//! Core types and traits for foldermap.
//!
//! This crate provides the data structures shared by the reconciler and the
//! mutation engine: relative path helpers, the path record store, the folder
//! hierarchy, configuration, and the traits for the disk and the catalog.

mod config;
mod error;
mod node;
mod provider;
mod record;
pub mod relpath;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use error::{FsError, ReconcileError, Rejection, StoreError};
pub use node::{ExpandState, Node, Walk};
pub use provider::{FolderProvider, PersistedStore, ReplaceScope};
pub use record::{PathRecord, PathRecordStore, StoreSnapshot};
