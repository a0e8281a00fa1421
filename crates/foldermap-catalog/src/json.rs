//! File-backed catalog stored as JSON.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use foldermap_core::{PersistedStore, ReplaceScope, StoreError};

use crate::entry::{self, CatalogEntry};

/// Current on-disk format version.
pub const CATALOG_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    version: u32,
    #[serde(default)]
    entries: Vec<CatalogEntry>,
}

/// A catalog persisted to a JSON file.
///
/// Every change is written to a temporary file next to the catalog and
/// renamed over it, and only then applied in memory. A failed write leaves
/// both the file and the in-memory entries unchanged.
#[derive(Debug)]
pub struct JsonCatalog {
    path: PathBuf,
    entries: Mutex<Vec<CatalogEntry>>,
}

impl JsonCatalog {
    /// Open the catalog at `path`. A missing file is an empty catalog.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let file: CatalogFile =
                    serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                        path: path.clone(),
                        message: e.to_string(),
                    })?;
                if file.version > CATALOG_VERSION {
                    return Err(StoreError::Corrupt {
                        path,
                        message: format!("unsupported catalog version {}", file.version),
                    });
                }
                file.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StoreError::Io { path, source: e }),
        };

        debug!(path = %path.display(), entries = entries.len(), "Opened catalog");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A copy of every entry.
    pub fn entries(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        Ok(self.lock()?.clone())
    }

    /// Add an entry and save.
    pub fn insert(&self, entry: CatalogEntry) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.push(entry);
            1
        })
        .map(|_| ())
    }

    /// Write the current entries to disk.
    pub fn save(&self) -> Result<(), StoreError> {
        let entries = self.lock()?;
        write_atomic(&self.path, &entries)
    }

    /// Apply `change` to a copy of the entries, save the copy and keep it.
    fn update(
        &self,
        change: impl FnOnce(&mut Vec<CatalogEntry>) -> usize,
    ) -> Result<usize, StoreError> {
        let mut entries = self.lock()?;
        let mut updated = entries.clone();
        let changed = change(&mut updated);
        if changed > 0 {
            write_atomic(&self.path, &updated)?;
            *entries = updated;
        }
        Ok(changed)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<CatalogEntry>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::unavailable("catalog lock poisoned"))
    }
}

impl PersistedStore for JsonCatalog {
    fn known_relative_paths(&self) -> Result<Vec<String>, StoreError> {
        Ok(entry::known_paths(&self.lock()?))
    }

    fn replace_path_prefix(
        &self,
        old_prefix: &str,
        new_prefix: &str,
        scope: ReplaceScope,
    ) -> Result<usize, StoreError> {
        self.update(|entries| entry::replace_prefix(entries, old_prefix, new_prefix, scope))
    }

    fn relocate_files(
        &self,
        old_folder: &str,
        new_folder: &str,
        files: &[String],
    ) -> Result<usize, StoreError> {
        self.update(|entries| entry::relocate(entries, old_folder, new_folder, files))
    }
}

fn write_atomic(path: &Path, entries: &[CatalogEntry]) -> Result<(), StoreError> {
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let file = CatalogFile {
        version: CATALOG_VERSION,
        entries: entries.to_vec(),
    };
    let content = serde_json::to_vec_pretty(&file).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    // Same directory so the final rename stays on one filesystem
    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(io_error)?;
    temp.write_all(&content).map_err(io_error)?;
    temp.persist(path).map_err(|e| io_error(e.error))?;

    debug!(path = %path.display(), entries = entries.len(), "Saved catalog");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let catalog = JsonCatalog::open(temp.path().join("catalog.json")).unwrap();
        assert!(catalog.known_relative_paths().unwrap().is_empty());
    }

    #[test]
    fn test_changes_are_saved() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.json");

        let catalog = JsonCatalog::open(&path).unwrap();
        catalog.insert(CatalogEntry::new("a/b", "1.jpg")).unwrap();
        catalog.insert(CatalogEntry::new("a/b/c", "2.jpg")).unwrap();
        catalog
            .replace_path_prefix("a/b", "z", ReplaceScope::Subtree)
            .unwrap();

        let reopened = JsonCatalog::open(&path).unwrap();
        assert_eq!(reopened.known_relative_paths().unwrap(), vec!["z", "z/c"]);
    }

    #[test]
    fn test_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonCatalog::open(&path),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_failed_write_keeps_entries() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("gone");
        std::fs::create_dir(&dir).unwrap();
        let catalog = JsonCatalog::open(dir.join("catalog.json")).unwrap();
        catalog.insert(CatalogEntry::new("a", "1.jpg")).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        let result = catalog.replace_path_prefix("a", "b", ReplaceScope::Leaf);
        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert_eq!(catalog.known_relative_paths().unwrap(), vec!["a"]);
    }
}
