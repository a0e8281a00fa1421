//! Traits for the collaborators the engine drives: the disk and the catalog.
//!
//! All paths passed through these traits are root-relative and use `/` as
//! the separator. Implementations resolve them against their own root.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::{FsError, StoreError};

/// Physical folder operations under a fixed root.
pub trait FolderProvider: Send + Sync {
    /// Whether a folder exists at `path`. The empty path is the root itself.
    fn exists(&self, path: &str) -> bool;

    /// Whether any entry (file or folder) called `name` exists in `parent`.
    fn entry_exists(&self, parent: &str, name: &str) -> bool;

    /// Every folder below the root, skipping folders whose name is in `excluding`.
    ///
    /// `cancelled` is polled between entries; once it returns `true` the
    /// enumeration stops with [`FsError::Interrupted`].
    fn enumerate_subfolders(
        &self,
        excluding: &[String],
        cancelled: &dyn Fn() -> bool,
    ) -> Result<Vec<String>, FsError>;

    /// Move or rename a folder. Fails without side effects if `new_path` exists.
    fn move_or_rename_folder(&self, old_path: &str, new_path: &str) -> Result<(), FsError>;

    /// Create the folder `name` inside `parent`.
    fn create_subfolder(&self, parent: &str, name: &str) -> Result<(), FsError>;

    /// Whether the folder at `path` has no entries at all.
    fn is_empty_folder(&self, path: &str) -> Result<bool, FsError>;

    /// Delete the folder at `path`, which must be empty.
    fn delete_empty_folder(&self, path: &str) -> Result<(), FsError>;

    /// Names of the media files directly inside `folder`.
    fn enumerate_media_files(&self, folder: &str) -> Result<Vec<String>, FsError>;

    /// Move a single file. Both paths include the file name.
    fn move_file(&self, old_path: &str, new_path: &str) -> Result<(), FsError>;
}

/// How far a prefix replacement reaches in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum ReplaceScope {
    /// Only entries filed under exactly the old path.
    Leaf,
    /// Entries under the old path and under any folder below it.
    Subtree,
}

impl ReplaceScope {
    /// Pick the scope for a folder, given whether other known paths sit below it.
    pub fn for_interior(interior: bool) -> Self {
        if interior { Self::Subtree } else { Self::Leaf }
    }
}

/// The external catalog that files data entries under relative paths.
pub trait PersistedStore: Send + Sync {
    /// Distinct relative paths that currently have entries filed under them.
    fn known_relative_paths(&self) -> Result<Vec<String>, StoreError>;

    /// Re-file entries from `old_prefix` to `new_prefix`.
    ///
    /// Either every matching entry is rewritten or none is. Returns the
    /// number of entries changed.
    fn replace_path_prefix(
        &self,
        old_prefix: &str,
        new_prefix: &str,
        scope: ReplaceScope,
    ) -> Result<usize, StoreError>;

    /// Re-file the entries for the named files from `old_folder` to `new_folder`.
    ///
    /// Used when only some of a folder's files were moved. Atomic like
    /// [`replace_path_prefix`](Self::replace_path_prefix).
    fn relocate_files(
        &self,
        old_folder: &str,
        new_folder: &str,
        files: &[String],
    ) -> Result<usize, StoreError>;
}

impl<T: FolderProvider + ?Sized> FolderProvider for &T {
    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }

    fn entry_exists(&self, parent: &str, name: &str) -> bool {
        (**self).entry_exists(parent, name)
    }

    fn enumerate_subfolders(
        &self,
        excluding: &[String],
        cancelled: &dyn Fn() -> bool,
    ) -> Result<Vec<String>, FsError> {
        (**self).enumerate_subfolders(excluding, cancelled)
    }

    fn move_or_rename_folder(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        (**self).move_or_rename_folder(old_path, new_path)
    }

    fn create_subfolder(&self, parent: &str, name: &str) -> Result<(), FsError> {
        (**self).create_subfolder(parent, name)
    }

    fn is_empty_folder(&self, path: &str) -> Result<bool, FsError> {
        (**self).is_empty_folder(path)
    }

    fn delete_empty_folder(&self, path: &str) -> Result<(), FsError> {
        (**self).delete_empty_folder(path)
    }

    fn enumerate_media_files(&self, folder: &str) -> Result<Vec<String>, FsError> {
        (**self).enumerate_media_files(folder)
    }

    fn move_file(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        (**self).move_file(old_path, new_path)
    }
}

impl<T: FolderProvider + ?Sized> FolderProvider for Arc<T> {
    fn exists(&self, path: &str) -> bool {
        (**self).exists(path)
    }

    fn entry_exists(&self, parent: &str, name: &str) -> bool {
        (**self).entry_exists(parent, name)
    }

    fn enumerate_subfolders(
        &self,
        excluding: &[String],
        cancelled: &dyn Fn() -> bool,
    ) -> Result<Vec<String>, FsError> {
        (**self).enumerate_subfolders(excluding, cancelled)
    }

    fn move_or_rename_folder(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        (**self).move_or_rename_folder(old_path, new_path)
    }

    fn create_subfolder(&self, parent: &str, name: &str) -> Result<(), FsError> {
        (**self).create_subfolder(parent, name)
    }

    fn is_empty_folder(&self, path: &str) -> Result<bool, FsError> {
        (**self).is_empty_folder(path)
    }

    fn delete_empty_folder(&self, path: &str) -> Result<(), FsError> {
        (**self).delete_empty_folder(path)
    }

    fn enumerate_media_files(&self, folder: &str) -> Result<Vec<String>, FsError> {
        (**self).enumerate_media_files(folder)
    }

    fn move_file(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        (**self).move_file(old_path, new_path)
    }
}

impl<T: PersistedStore + ?Sized> PersistedStore for &T {
    fn known_relative_paths(&self) -> Result<Vec<String>, StoreError> {
        (**self).known_relative_paths()
    }

    fn replace_path_prefix(
        &self,
        old_prefix: &str,
        new_prefix: &str,
        scope: ReplaceScope,
    ) -> Result<usize, StoreError> {
        (**self).replace_path_prefix(old_prefix, new_prefix, scope)
    }

    fn relocate_files(
        &self,
        old_folder: &str,
        new_folder: &str,
        files: &[String],
    ) -> Result<usize, StoreError> {
        (**self).relocate_files(old_folder, new_folder, files)
    }
}

impl<T: PersistedStore + ?Sized> PersistedStore for Arc<T> {
    fn known_relative_paths(&self) -> Result<Vec<String>, StoreError> {
        (**self).known_relative_paths()
    }

    fn replace_path_prefix(
        &self,
        old_prefix: &str,
        new_prefix: &str,
        scope: ReplaceScope,
    ) -> Result<usize, StoreError> {
        (**self).replace_path_prefix(old_prefix, new_prefix, scope)
    }

    fn relocate_files(
        &self,
        old_folder: &str,
        new_folder: &str,
        files: &[String],
    ) -> Result<usize, StoreError> {
        (**self).relocate_files(old_folder, new_folder, files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_for_interior() {
        assert_eq!(ReplaceScope::for_interior(true), ReplaceScope::Subtree);
        assert_eq!(ReplaceScope::for_interior(false), ReplaceScope::Leaf);
        assert_eq!(ReplaceScope::Subtree.to_string(), "subtree");
        assert_eq!("leaf".parse::<ReplaceScope>().unwrap(), ReplaceScope::Leaf);
    }
}
