//! Path records and the ordered store that holds them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::relpath;

/// A known relative path and whether the catalog files data under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathRecord {
    /// Root-relative path; empty for the root folder.
    pub path: String,
    /// The catalog has one or more entries filed under exactly this path.
    pub has_data: bool,
}

impl PathRecord {
    /// Create a new record.
    pub fn new(path: impl Into<String>, has_data: bool) -> Self {
        Self {
            path: path.into(),
            has_data,
        }
    }

    /// Create a record for a path the catalog files data under.
    pub fn with_data(path: impl Into<String>) -> Self {
        Self::new(path, true)
    }

    /// Create a record for a folder with no data of its own.
    pub fn empty(path: impl Into<String>) -> Self {
        Self::new(path, false)
    }

    /// Whether this is the root record.
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

/// A frozen copy of a [`PathRecordStore`], used to roll back failed mutations.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    records: Arc<Vec<PathRecord>>,
    index: Arc<HashMap<String, usize>>,
}

impl StoreSnapshot {
    /// Records captured by this snapshot.
    pub fn records(&self) -> &[PathRecord] {
        &self.records
    }
}

/// Ordered collection of path records, unique by case-insensitive path.
///
/// The records live behind an `Arc`, so taking a snapshot is a reference
/// count bump and the first write after a snapshot copies the list. Lookups
/// by path go through an index keyed by [`relpath::fold_key`].
#[derive(Debug, Clone, Default)]
pub struct PathRecordStore {
    records: Arc<Vec<PathRecord>>,
    index: Arc<HashMap<String, usize>>,
}

impl PartialEq for PathRecordStore {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Eq for PathRecordStore {}

impl PathRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, keeping the first of any case-insensitive duplicates.
    pub fn from_records(records: impl IntoIterator<Item = PathRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in their current order.
    pub fn all(&self) -> &[PathRecord] {
        &self.records
    }

    /// Iterate over all records.
    pub fn iter(&self) -> std::slice::Iter<'_, PathRecord> {
        self.records.iter()
    }

    /// Find the record for `path`.
    pub fn get(&self, path: &str) -> Option<&PathRecord> {
        self.index
            .get(&relpath::fold_key(path))
            .map(|&index| &self.records[index])
    }

    /// Whether a record exists for `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// The stored spelling of `path`.
    ///
    /// Taken from the record for `path`, or from the first record below it
    /// when `path` is only an ancestor. `None` if `path` is not known.
    pub fn stored_spelling(&self, path: &str) -> Option<String> {
        if let Some(record) = self.get(path) {
            return Some(record.path.clone());
        }
        let depth = relpath::segments(path).count();
        self.records
            .iter()
            .find(|r| relpath::is_descendant_of(&r.path, path))
            .map(|r| relpath::segments(&r.path).take(depth).join("/"))
    }

    /// Whether `path` is a record or an ancestor of one.
    pub fn is_known(&self, path: &str) -> bool {
        self.records
            .iter()
            .any(|r| relpath::is_same_or_descendant(&r.path, path))
    }

    /// Whether any record lies strictly below `path` (an interior record).
    pub fn has_descendants(&self, path: &str) -> bool {
        self.records
            .iter()
            .any(|r| relpath::is_descendant_of(&r.path, path))
    }

    /// Whether `path` or anything below it has data filed under it.
    pub fn has_data_at_or_below(&self, path: &str) -> bool {
        self.records
            .iter()
            .any(|r| r.has_data && relpath::is_same_or_descendant(&r.path, path))
    }

    /// Whether the hierarchy shows a child named `name` directly under `parent`.
    pub fn has_child_named(&self, parent: &str, name: &str) -> bool {
        let child = relpath::join(parent, name);
        self.records
            .iter()
            .any(|r| relpath::is_same_or_descendant(&r.path, &child))
    }

    /// Insert `record` unless a record with the same path already exists.
    ///
    /// Returns `false` when the record was dropped as a duplicate.
    pub fn insert(&mut self, record: PathRecord) -> bool {
        let key = relpath::fold_key(&record.path);
        if self.index.contains_key(&key) {
            return false;
        }
        Arc::make_mut(&mut self.index).insert(key, self.records.len());
        Arc::make_mut(&mut self.records).push(record);
        true
    }

    /// Insert `record`, replacing any record with the same path in place.
    pub fn add_or_replace(&mut self, record: PathRecord) {
        let key = relpath::fold_key(&record.path);
        match self.index.get(&key) {
            Some(&index) => Arc::make_mut(&mut self.records)[index] = record,
            None => {
                Arc::make_mut(&mut self.index).insert(key, self.records.len());
                Arc::make_mut(&mut self.records).push(record);
            }
        }
    }

    /// Remove the record for `path`.
    pub fn remove(&mut self, path: &str) -> Option<PathRecord> {
        let index = *self.index.get(&relpath::fold_key(path))?;
        let removed = Arc::make_mut(&mut self.records).remove(index);
        self.reindex();
        Some(removed)
    }

    /// Rewrite every record equal to or under `old_prefix` to sit under `new_prefix`.
    ///
    /// Returns the number of records rewritten.
    pub fn rewrite_prefix(&mut self, old_prefix: &str, new_prefix: &str) -> usize {
        let mut rewritten = 0;
        for record in Arc::make_mut(&mut self.records).iter_mut() {
            if let Some(path) = relpath::replace_prefix(&record.path, old_prefix, new_prefix) {
                record.path = path;
                rewritten += 1;
            }
        }
        if rewritten > 0 {
            self.reindex();
        }
        rewritten
    }

    /// Stable ordinal sort by path, so sibling order is deterministic.
    pub fn order_by_path(&mut self) {
        Arc::make_mut(&mut self.records).sort_by(|a, b| a.path.cmp(&b.path));
        self.reindex();
    }

    /// Drop later records whose path matches an earlier one case-insensitively.
    ///
    /// Returns the dropped records.
    pub fn dedup(&mut self) -> Vec<PathRecord> {
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();
        Arc::make_mut(&mut self.records).retain(|r| {
            if seen.insert(relpath::fold_key(&r.path)) {
                true
            } else {
                dropped.push(r.clone());
                false
            }
        });
        self.reindex();
        dropped
    }

    /// Capture the current state.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            records: Arc::clone(&self.records),
            index: Arc::clone(&self.index),
        }
    }

    /// Return to a previously captured state.
    pub fn restore(&mut self, snapshot: StoreSnapshot) {
        self.records = snapshot.records;
        self.index = snapshot.index;
    }

    /// Rebuild the path index after positions or paths changed.
    fn reindex(&mut self) {
        let mut index = HashMap::with_capacity(self.records.len());
        for (position, record) in self.records.iter().enumerate() {
            index.entry(relpath::fold_key(&record.path)).or_insert(position);
        }
        self.index = Arc::new(index);
    }
}

impl<'a> IntoIterator for &'a PathRecordStore {
    type Item = &'a PathRecord;
    type IntoIter = std::slice::Iter<'a, PathRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
