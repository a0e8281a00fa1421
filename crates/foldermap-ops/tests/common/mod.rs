//! In-memory providers for engine tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use foldermap_catalog::{CatalogEntry, MemoryCatalog};
use foldermap_core::{
    FolderProvider, FsError, PathRecord, PathRecordStore, PersistedStore, ReplaceScope,
    StoreError, relpath,
};
use foldermap_ops::MutationEngine;

/// A disk made of folder and file paths.
#[derive(Debug, Default)]
pub struct FakeFolders {
    folders: Mutex<Vec<String>>,
    files: Mutex<Vec<String>>,
    fail_folder_moves: AtomicBool,
    fail_creates: AtomicBool,
    file_moves_left: Mutex<Option<usize>>,
}

impl FakeFolders {
    pub fn new(folders: &[&str], files: &[&str]) -> Self {
        Self {
            folders: Mutex::new(folders.iter().map(|f| f.to_string()).collect()),
            files: Mutex::new(files.iter().map(|f| f.to_string()).collect()),
            ..Self::default()
        }
    }

    pub fn fail_folder_moves(&self) {
        self.fail_folder_moves.store(true, Ordering::SeqCst);
    }

    pub fn fail_creates(&self) {
        self.fail_creates.store(true, Ordering::SeqCst);
    }

    /// Let `count` file moves succeed, then fail the rest.
    pub fn fail_file_moves_after(&self, count: usize) {
        *self.file_moves_left.lock().unwrap() = Some(count);
    }

    pub fn add_file(&self, path: &str) {
        self.files.lock().unwrap().push(path.to_string());
    }

    pub fn has_folder(&self, path: &str) -> bool {
        self.exists(path)
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.files
            .lock()
            .unwrap()
            .iter()
            .any(|f| relpath::path_eq(f, path))
    }

    fn failure(path: &str) -> FsError {
        FsError::Other {
            message: format!("injected failure at {path}"),
        }
    }
}

impl FolderProvider for FakeFolders {
    fn exists(&self, path: &str) -> bool {
        path.is_empty()
            || self
                .folders
                .lock()
                .unwrap()
                .iter()
                .any(|f| relpath::path_eq(f, path))
    }

    fn entry_exists(&self, parent: &str, name: &str) -> bool {
        let path = relpath::join(parent, name);
        self.exists(&path) || self.has_file(&path)
    }

    fn enumerate_subfolders(
        &self,
        excluding: &[String],
        _cancelled: &dyn Fn() -> bool,
    ) -> Result<Vec<String>, FsError> {
        let mut found: Vec<String> = self
            .folders
            .lock()
            .unwrap()
            .iter()
            .filter(|f| {
                !relpath::segments(f).any(|s| excluding.iter().any(|x| x.eq_ignore_ascii_case(s)))
            })
            .cloned()
            .collect();
        found.sort();
        Ok(found)
    }

    fn move_or_rename_folder(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        if self.fail_folder_moves.load(Ordering::SeqCst) {
            return Err(Self::failure(old_path));
        }
        if !self.exists(old_path) {
            return Err(FsError::NotFound {
                path: PathBuf::from(old_path),
            });
        }
        if !relpath::path_eq(old_path, new_path) && self.exists(new_path) {
            return Err(FsError::AlreadyExists {
                path: PathBuf::from(new_path),
            });
        }

        for list in [&self.folders, &self.files] {
            for path in list.lock().unwrap().iter_mut() {
                if let Some(moved) = relpath::replace_prefix(path, old_path, new_path) {
                    *path = moved;
                }
            }
        }
        Ok(())
    }

    fn create_subfolder(&self, parent: &str, name: &str) -> Result<(), FsError> {
        let path = relpath::join(parent, name);
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(Self::failure(&path));
        }
        if self.entry_exists(parent, name) {
            return Err(FsError::AlreadyExists {
                path: PathBuf::from(path),
            });
        }
        self.folders.lock().unwrap().push(path);
        Ok(())
    }

    fn is_empty_folder(&self, path: &str) -> Result<bool, FsError> {
        let inside = |p: &String| relpath::is_descendant_of(p, path);
        Ok(!self.folders.lock().unwrap().iter().any(inside)
            && !self.files.lock().unwrap().iter().any(inside))
    }

    fn delete_empty_folder(&self, path: &str) -> Result<(), FsError> {
        if !self.is_empty_folder(path)? {
            return Err(FsError::NotEmpty {
                path: PathBuf::from(path),
            });
        }
        self.folders
            .lock()
            .unwrap()
            .retain(|f| !relpath::path_eq(f, path));
        Ok(())
    }

    fn enumerate_media_files(&self, folder: &str) -> Result<Vec<String>, FsError> {
        let mut names: Vec<String> = self
            .files
            .lock()
            .unwrap()
            .iter()
            .filter(|f| relpath::path_eq(relpath::parent_of(f), folder))
            .map(|f| relpath::name_of(f).to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    fn move_file(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        if let Some(left) = self.file_moves_left.lock().unwrap().as_mut() {
            if *left == 0 {
                return Err(Self::failure(old_path));
            }
            *left -= 1;
        }
        let mut files = self.files.lock().unwrap();
        let file = files
            .iter_mut()
            .find(|f| relpath::path_eq(f, old_path))
            .ok_or_else(|| FsError::NotFound {
                path: PathBuf::from(old_path),
            })?;
        *file = new_path.to_string();
        Ok(())
    }
}

/// A catalog whose writes can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyCatalog {
    pub inner: MemoryCatalog,
    fail_writes: AtomicBool,
    pub writes: AtomicUsize,
}

impl FlakyCatalog {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            inner: MemoryCatalog::from_entries(
                entries.iter().map(|(path, file)| CatalogEntry::new(path, *file)),
            ),
            ..Self::default()
        }
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected catalog failure"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl PersistedStore for FlakyCatalog {
    fn known_relative_paths(&self) -> Result<Vec<String>, StoreError> {
        self.inner.known_relative_paths()
    }

    fn replace_path_prefix(
        &self,
        old_prefix: &str,
        new_prefix: &str,
        scope: ReplaceScope,
    ) -> Result<usize, StoreError> {
        self.check()?;
        self.inner.replace_path_prefix(old_prefix, new_prefix, scope)
    }

    fn relocate_files(
        &self,
        old_folder: &str,
        new_folder: &str,
        files: &[String],
    ) -> Result<usize, StoreError> {
        self.check()?;
        self.inner.relocate_files(old_folder, new_folder, files)
    }
}

pub type TestEngine = MutationEngine<Arc<FakeFolders>, Arc<FlakyCatalog>>;

/// Build an engine over `records`, with every record's folder present on disk.
pub fn engine(
    records: &[(&str, bool)],
    catalog: &[(&str, &str)],
) -> (TestEngine, Arc<FakeFolders>, Arc<FlakyCatalog>) {
    let mut folders: Vec<&str> = Vec::new();
    for (path, _) in records {
        for folder in std::iter::once(*path).chain(relpath::ancestors(path)) {
            if !folder.is_empty() && !folders.iter().any(|f| relpath::path_eq(f, folder)) {
                folders.push(folder);
            }
        }
    }
    let files: Vec<String> = catalog
        .iter()
        .map(|(path, file)| relpath::join(path, file))
        .collect();
    let files: Vec<&str> = files.iter().map(String::as_str).collect();
    engine_with_disk(records, catalog, FakeFolders::new(&folders, &files))
}

pub fn engine_with_disk(
    records: &[(&str, bool)],
    catalog: &[(&str, &str)],
    disk: FakeFolders,
) -> (TestEngine, Arc<FakeFolders>, Arc<FlakyCatalog>) {
    let folders = Arc::new(disk);
    let catalog = Arc::new(FlakyCatalog::new(catalog));
    let store = PathRecordStore::from_records(
        std::iter::once(PathRecord::empty(""))
            .chain(records.iter().map(|(path, data)| PathRecord::new(*path, *data))),
    );
    let engine = MutationEngine::new(Arc::clone(&folders), Arc::clone(&catalog), store);
    (engine, folders, catalog)
}

/// `(path, has_data)` pairs for every record, in store order.
pub fn records_of(engine: &TestEngine) -> Vec<(String, bool)> {
    engine
        .records()
        .iter()
        .map(|r| (r.path.clone(), r.has_data))
        .collect()
}

pub fn pairs(items: &[(&str, bool)]) -> Vec<(String, bool)> {
    let mut v: Vec<_> = items.iter().map(|(p, d)| (p.to_string(), *d)).collect();
    v.sort();
    v
}

pub fn sorted(mut v: Vec<(String, bool)>) -> Vec<(String, bool)> {
    v.sort();
    v
}

/// Folder paths the catalog files entries under.
pub fn catalog_paths(catalog: &FlakyCatalog) -> Vec<String> {
    catalog.inner.known_relative_paths().unwrap()
}
