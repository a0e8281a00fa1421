//! Catalog entries and the re-filing rules shared by every catalog.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use foldermap_core::{ReplaceScope, relpath};

/// A file the catalog knows about and the folder it is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// File name, without any folder.
    pub file: String,
    /// Root-relative folder the file lives in.
    pub relative_path: String,
}

impl CatalogEntry {
    /// Create a new entry, normalizing the folder path.
    pub fn new(relative_path: impl AsRef<str>, file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            relative_path: relpath::normalize(relative_path.as_ref()),
        }
    }

    /// Root-relative path of the file itself.
    pub fn file_path(&self) -> String {
        relpath::join(&self.relative_path, &self.file)
    }
}

/// Distinct folder paths, first spelling wins.
pub(crate) fn known_paths(entries: &[CatalogEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|e| seen.insert(relpath::fold_key(&e.relative_path)))
        .map(|e| e.relative_path.clone())
        .collect()
}

/// Re-file entries under `old_prefix` to `new_prefix`. Returns the number changed.
pub(crate) fn replace_prefix(
    entries: &mut [CatalogEntry],
    old_prefix: &str,
    new_prefix: &str,
    scope: ReplaceScope,
) -> usize {
    let mut changed = 0;
    for entry in entries.iter_mut() {
        let rewritten = match scope {
            ReplaceScope::Leaf => relpath::path_eq(&entry.relative_path, old_prefix)
                .then(|| new_prefix.to_string()),
            ReplaceScope::Subtree => {
                relpath::replace_prefix(&entry.relative_path, old_prefix, new_prefix)
            }
        };
        if let Some(path) = rewritten {
            entry.relative_path = path;
            changed += 1;
        }
    }
    changed
}

/// Re-file the named files from `old_folder` to `new_folder`. Returns the number changed.
pub(crate) fn relocate(
    entries: &mut [CatalogEntry],
    old_folder: &str,
    new_folder: &str,
    files: &[String],
) -> usize {
    let wanted: HashSet<String> = files.iter().map(|f| f.to_lowercase()).collect();
    let mut changed = 0;
    for entry in entries.iter_mut() {
        if relpath::path_eq(&entry.relative_path, old_folder)
            && wanted.contains(&entry.file.to_lowercase())
        {
            entry.relative_path = new_folder.to_string();
            changed += 1;
        }
    }
    changed
}
