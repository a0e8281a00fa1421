//! Folder enumeration and startup reconciliation for foldermap.
//!
//! This crate walks the physical folder tree with jwalk and merges it with
//! the paths the catalog already knows, producing the record store the
//! mutation engine starts from.
//!
//! # Overview
//!
//! - **Folder walking** via jwalk, skipping excluded folder names at every level
//! - **Reconciliation** of catalog paths, their ancestors and physical folders
//! - **Background runs** with progress events and cancellation
//!
//! # Example
//!
//! ```rust
//! use foldermap_scan::reconcile;
//!
//! let store = reconcile(["a/b"], ["a", "a/b", "a/c"]);
//! assert!(store.get("a/b").unwrap().has_data);
//! assert!(store.contains(""));
//! ```
//!
//! # Background Reconciliation
//!
//! ```rust,ignore
//! use foldermap_scan::{start_reconcile, ReconcileEvent, Reconciler};
//! use tokio_util::sync::CancellationToken;
//!
//! let reconciler = Reconciler::new(folders, catalog).excluding(["Backups"]);
//! let mut rx = start_reconcile(reconciler, CancellationToken::new());
//! while let Some(event) = rx.recv().await {
//!     match event {
//!         ReconcileEvent::Progress(p) => println!("{}", p.phase),
//!         ReconcileEvent::Complete(result) => break,
//!     }
//! }
//! ```

mod progress;
mod reconcile;
mod walker;

pub use progress::{ReconcilePhase, ReconcileProgress};
pub use reconcile::{ReconcileEvent, Reconciler, reconcile, start_reconcile};
pub use walker::{WalkOptions, to_relative, walk_subfolders};

// Re-export core types for convenience
pub use foldermap_core::{PathRecord, PathRecordStore, ReconcileError};
