//! Collision and cycle detection for folder operations.
//!
//! Everything here is a pure check against the record store (and, where
//! noted, the disk). Nothing is changed.

use foldermap_core::{FolderProvider, PathRecordStore, Rejection, relpath};

/// Find a record that would clash with `target` being renamed or moved to `new_path`.
///
/// A record clashes when it is `new_path` or lies below it, unless it is
/// `target` itself or one of its descendants (those travel with the folder).
pub fn find_path_collision<'a>(
    records: &'a PathRecordStore,
    target: &str,
    new_path: &str,
) -> Option<&'a str> {
    records
        .iter()
        .filter(|r| !relpath::is_same_or_descendant(&r.path, target))
        .find(|r| relpath::is_same_or_descendant(&r.path, new_path))
        .map(|r| r.path.as_str())
}

/// Whether other known paths sit below `path`.
///
/// Decides whether the catalog update covers the whole subtree or only
/// entries filed under exactly `path`.
pub fn is_interior(records: &PathRecordStore, path: &str) -> bool {
    records.has_descendants(path)
}

/// Reject operations that would rename, move or delete the root.
pub fn ensure_not_root(path: &str) -> Result<(), Rejection> {
    if path.is_empty() {
        Err(Rejection::RootImmutable)
    } else {
        Ok(())
    }
}

/// Reject paths the hierarchy does not show.
pub fn ensure_known(records: &PathRecordStore, path: &str) -> Result<(), Rejection> {
    if path.is_empty() || records.is_known(path) {
        Ok(())
    } else {
        Err(Rejection::UnknownPath {
            path: path.to_string(),
        })
    }
}

/// Reject folders that are not on disk.
pub fn ensure_exists<F: FolderProvider + ?Sized>(folders: &F, path: &str) -> Result<(), Rejection> {
    if folders.exists(path) {
        Ok(())
    } else {
        Err(Rejection::FolderMissing {
            path: path.to_string(),
        })
    }
}

/// Validate moving `source` under `destination` with the name `name`.
///
/// Checks run in a fixed order so the first broken rule is the one reported.
pub fn check_move<F: FolderProvider + ?Sized>(
    records: &PathRecordStore,
    folders: &F,
    source: &str,
    name: &str,
    destination: &str,
) -> Result<(), Rejection> {
    if relpath::path_eq(destination, relpath::parent_of(source)) {
        return Err(Rejection::NoOpMove {
            path: source.to_string(),
            destination: destination.to_string(),
        });
    }

    if records.has_child_named(destination, name) || folders.entry_exists(destination, name) {
        return Err(Rejection::SiblingNameCollision {
            destination: destination.to_string(),
            name: name.to_string(),
        });
    }

    if relpath::path_eq(destination, source) {
        return Err(Rejection::SameAsSource {
            path: source.to_string(),
        });
    }

    if relpath::is_descendant_of(destination, source) {
        return Err(Rejection::Cycle {
            path: source.to_string(),
            destination: destination.to_string(),
        });
    }

    ensure_exists(folders, destination)
}

/// Pick a name for a new folder in `parent` that is free on disk and in the store.
///
/// Tries `desired`, then `desired_1`, `desired_2`, and so on.
pub fn unique_child_name<F: FolderProvider + ?Sized>(
    records: &PathRecordStore,
    folders: &F,
    parent: &str,
    desired: &str,
) -> String {
    relpath::unique_name(desired, |candidate| {
        records.has_child_named(parent, candidate) || folders.entry_exists(parent, candidate)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use foldermap_core::PathRecord;

    fn store(items: &[(&str, bool)]) -> PathRecordStore {
        PathRecordStore::from_records(items.iter().map(|(p, d)| PathRecord::new(*p, *d)))
    }

    #[test]
    fn test_collision_ignores_own_subtree() {
        let records = store(&[("a", false), ("a/b", false), ("a/b/c", true), ("a/x", false)]);
        assert_eq!(find_path_collision(&records, "a/b", "a/x"), Some("a/x"));
        assert_eq!(find_path_collision(&records, "a/b", "a/B"), None);
        assert_eq!(find_path_collision(&records, "a/b", "a/z"), None);
    }

    #[test]
    fn test_collision_with_record_below_new_path() {
        let records = store(&[("a/b", false), ("a/x/deep", true)]);
        assert_eq!(find_path_collision(&records, "a/b", "a/x"), Some("a/x/deep"));
    }

    #[test]
    fn test_interior() {
        let records = store(&[("a/b", false), ("a/b/c", true)]);
        assert!(is_interior(&records, "a/b"));
        assert!(!is_interior(&records, "a/b/c"));
    }

    #[test]
    fn test_root_guards() {
        assert_eq!(ensure_not_root(""), Err(Rejection::RootImmutable));
        assert!(ensure_not_root("a").is_ok());
        let records = store(&[("a/b", false)]);
        assert!(ensure_known(&records, "").is_ok());
        assert!(ensure_known(&records, "A").is_ok());
        assert!(ensure_known(&records, "q").is_err());
    }
}
