//! In-process catalog.

use std::sync::{Mutex, MutexGuard};

use foldermap_core::{PersistedStore, ReplaceScope, StoreError, relpath};

use crate::entry::{self, CatalogEntry};

/// A catalog held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    entries: Mutex<Vec<CatalogEntry>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding `entries`.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        Self {
            entries: Mutex::new(entries.into_iter().collect()),
        }
    }

    /// Add an entry.
    pub fn insert(&self, entry: CatalogEntry) -> Result<(), StoreError> {
        self.lock()?.push(entry);
        Ok(())
    }

    /// A copy of every entry.
    pub fn entries(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        Ok(self.lock()?.clone())
    }

    /// Files filed under exactly `path`.
    pub fn files_under(&self, path: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|e| relpath::path_eq(&e.relative_path, path))
            .map(|e| e.file.clone())
            .collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<CatalogEntry>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::unavailable("catalog lock poisoned"))
    }
}

impl PersistedStore for MemoryCatalog {
    fn known_relative_paths(&self) -> Result<Vec<String>, StoreError> {
        Ok(entry::known_paths(&self.lock()?))
    }

    fn replace_path_prefix(
        &self,
        old_prefix: &str,
        new_prefix: &str,
        scope: ReplaceScope,
    ) -> Result<usize, StoreError> {
        Ok(entry::replace_prefix(
            &mut self.lock()?,
            old_prefix,
            new_prefix,
            scope,
        ))
    }

    fn relocate_files(
        &self,
        old_folder: &str,
        new_folder: &str,
        files: &[String],
    ) -> Result<usize, StoreError> {
        Ok(entry::relocate(&mut self.lock()?, old_folder, new_folder, files))
    }
}
