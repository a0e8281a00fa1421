//! Catalogs that file data entries under relative folder paths.
//!
//! The mutation engine only sees these through
//! [`PersistedStore`](foldermap_core::PersistedStore). [`MemoryCatalog`]
//! keeps everything in process; [`JsonCatalog`] saves every change to a
//! JSON file with an atomic replace.

mod entry;
mod json;
mod memory;

pub use entry::CatalogEntry;
pub use json::{CATALOG_VERSION, JsonCatalog};
pub use memory::MemoryCatalog;
