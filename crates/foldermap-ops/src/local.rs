//! Folder provider backed by the local filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use foldermap_core::{EngineConfig, FolderProvider, FsError, relpath};
use foldermap_scan::{WalkOptions, walk_subfolders};

/// Resolves relative paths under a root folder and operates on them with `std::fs`.
#[derive(Debug, Clone)]
pub struct LocalFolders {
    config: EngineConfig,
}

impl LocalFolders {
    /// Create a provider for the configured root.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The root folder.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Native path for a relative path.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        relpath::segments(relative).fold(self.config.root.clone(), |path, segment| {
            path.join(segment)
        })
    }
}

impl FolderProvider for LocalFolders {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_dir()
    }

    fn entry_exists(&self, parent: &str, name: &str) -> bool {
        fs::symlink_metadata(self.resolve(parent).join(name)).is_ok()
    }

    fn enumerate_subfolders(
        &self,
        excluding: &[String],
        cancelled: &dyn Fn() -> bool,
    ) -> Result<Vec<String>, FsError> {
        let options = WalkOptions {
            excluded: excluding.to_vec(),
            follow_symlinks: self.config.follow_symlinks,
        };
        walk_subfolders(&self.config.root, &options, cancelled)
    }

    fn move_or_rename_folder(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        let source = self.resolve(old_path);
        let dest = self.resolve(new_path);

        // On case-insensitive filesystems a case-only rename sees itself.
        if !relpath::path_eq(old_path, new_path) && fs::symlink_metadata(&dest).is_ok() {
            return Err(FsError::AlreadyExists { path: dest });
        }
        if !source.is_dir() {
            return Err(FsError::NotFound { path: source });
        }

        move_item(&source, &dest)
    }

    fn create_subfolder(&self, parent: &str, name: &str) -> Result<(), FsError> {
        let path = self.resolve(parent).join(name);
        fs::create_dir(&path).map_err(|e| FsError::io(&path, e))
    }

    fn is_empty_folder(&self, path: &str) -> Result<bool, FsError> {
        let path = self.resolve(path);
        let mut entries = fs::read_dir(&path).map_err(|e| FsError::io(&path, e))?;
        Ok(entries.next().is_none())
    }

    fn delete_empty_folder(&self, path: &str) -> Result<(), FsError> {
        let path = self.resolve(path);
        fs::remove_dir(&path).map_err(|e| FsError::io(&path, e))
    }

    fn enumerate_media_files(&self, folder: &str) -> Result<Vec<String>, FsError> {
        let path = self.resolve(folder);
        let entries = fs::read_dir(&path).map_err(|e| FsError::io(&path, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| FsError::io(&path, e))?;
            let file_type = entry.file_type().map_err(|e| FsError::io(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.config.is_media_file(&name) {
                files.push(name);
            }
        }
        files.sort();
        Ok(files)
    }

    fn move_file(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        let source = self.resolve(old_path);
        let dest = self.resolve(new_path);
        if fs::symlink_metadata(&dest).is_ok() {
            return Err(FsError::AlreadyExists { path: dest });
        }
        move_item(&source, &dest)
    }
}

/// Move a single item (file or directory).
fn move_item(source: &Path, dest: &Path) -> Result<(), FsError> {
    // Try rename first (fast path for same filesystem)
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }

    debug!(
        source = %source.display(),
        dest = %dest.display(),
        "Rename failed, falling back to copy and delete"
    );

    // Fall back to copy + delete for cross-filesystem moves
    if source.is_dir() {
        copy_dir_recursive(source, dest)?;
        fs::remove_dir_all(source).map_err(|e| FsError::io(source, e))?;
    } else {
        fs::copy(source, dest).map_err(|e| FsError::io(dest, e))?;
        fs::remove_file(source).map_err(|e| FsError::io(source, e))?;
    }

    Ok(())
}

/// Recursively copy a directory (for cross-filesystem moves).
fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<(), FsError> {
    fs::create_dir(dest).map_err(|e| FsError::io(dest, e))?;

    let entries = fs::read_dir(source).map_err(|e| FsError::io(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| FsError::io(source, e))?;
        let path = entry.path();
        let dest_path = dest.join(entry.file_name());

        if path.is_dir() {
            copy_dir_recursive(&path, &dest_path)?;
        } else {
            fs::copy(&path, &dest_path).map_err(|e| FsError::io(&path, e))?;
        }
    }

    Ok(())
}
