//! JWalk-based enumeration of the folders below a root.

use std::path::{Component, Path};
use std::sync::Arc;

use jwalk::WalkDir;
use tracing::debug;

use foldermap_core::{FsError, relpath};

/// Options controlling a folder walk.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Folder names to skip, together with everything below them.
    pub excluded: Vec<String>,
    /// Follow symbolic links to folders.
    pub follow_symlinks: bool,
}

impl WalkOptions {
    /// Options that skip the given folder names.
    pub fn excluding(excluded: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
            follow_symlinks: false,
        }
    }
}

/// Enumerate every folder below `root` as a root-relative path.
///
/// Folders are returned parents first, siblings in name order. Any read
/// error fails the whole walk. `cancelled` is polled between entries.
pub fn walk_subfolders(
    root: &Path,
    options: &WalkOptions,
    cancelled: &dyn Fn() -> bool,
) -> Result<Vec<String>, FsError> {
    let metadata = std::fs::metadata(root).map_err(|e| FsError::io(root, e))?;
    if !metadata.is_dir() {
        return Err(FsError::NotFound {
            path: root.to_path_buf(),
        });
    }

    let excluded: Arc<Vec<String>> = Arc::new(
        options
            .excluded
            .iter()
            .map(|name| name.to_lowercase())
            .collect(),
    );

    let walker = WalkDir::new(root)
        .follow_links(options.follow_symlinks)
        .skip_hidden(false)
        .sort(true)
        .min_depth(1)
        .process_read_dir(move |_depth, _path, _state, children| {
            children.retain(|entry| match entry {
                Ok(entry) => {
                    entry.file_type().is_dir()
                        && !excluded.contains(&entry.file_name().to_string_lossy().to_lowercase())
                }
                // Keep errors so the walk reports them.
                Err(_) => true,
            });
        });

    let mut folders = Vec::new();
    for entry in walker {
        if cancelled() {
            debug!(root = %root.display(), found = folders.len(), "Folder walk cancelled");
            return Err(FsError::Interrupted);
        }

        let entry = entry.map_err(|err| walk_error(root, err))?;
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .map_err(|_| FsError::Other {
                message: format!("{} is not below {}", path.display(), root.display()),
            })?;
        folders.push(to_relative(relative));
    }

    debug!(root = %root.display(), found = folders.len(), "Folder walk finished");
    Ok(folders)
}

/// Convert a native relative path to the `/`-joined form.
pub fn to_relative(path: &Path) -> String {
    let joined = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    relpath::normalize(&joined)
}

fn walk_error(root: &Path, err: jwalk::Error) -> FsError {
    let message = err.to_string();
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    match err.into_io_error() {
        Some(io) => FsError::io(path, io),
        None => FsError::Other { message },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir_all(root.join("Site1/Cam1")).unwrap();
        fs::create_dir_all(root.join("Site1/Backups/old")).unwrap();
        fs::create_dir_all(root.join("Site2")).unwrap();
        fs::create_dir_all(root.join("DeletedFiles")).unwrap();
        fs::write(root.join("Site1/IMG_0001.JPG"), "jpg").unwrap();
        fs::write(root.join("top.txt"), "text").unwrap();

        temp
    }

    #[test]
    fn test_walk_lists_folders_only() {
        let temp = create_test_tree();
        let folders = walk_subfolders(temp.path(), &WalkOptions::default(), &|| false).unwrap();

        assert!(folders.contains(&"Site1".to_string()));
        assert!(folders.contains(&"Site1/Cam1".to_string()));
        assert!(folders.contains(&"Site1/Backups/old".to_string()));
        assert!(!folders.iter().any(|f| f.ends_with(".JPG") || f.ends_with(".txt")));
        assert!(!folders.contains(&String::new()));
    }

    #[test]
    fn test_walk_skips_excluded_subtrees() {
        let temp = create_test_tree();
        let options = WalkOptions::excluding(["backups", "DeletedFiles"]);
        let folders = walk_subfolders(temp.path(), &options, &|| false).unwrap();

        assert_eq!(folders, vec!["Site1", "Site1/Cam1", "Site2"]);
    }

    #[test]
    fn test_walk_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let result = walk_subfolders(&missing, &WalkOptions::default(), &|| false);
        assert!(result.is_err());
    }

    #[test]
    fn test_walk_cancelled() {
        let temp = create_test_tree();
        let result = walk_subfolders(temp.path(), &WalkOptions::default(), &|| true);
        assert!(matches!(result, Err(FsError::Interrupted)));
    }

    #[test]
    fn test_to_relative() {
        assert_eq!(to_relative(Path::new("a/b")), "a/b");
        assert_eq!(to_relative(Path::new("")), "");
    }
}
