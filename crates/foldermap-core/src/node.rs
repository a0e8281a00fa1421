//! Folder hierarchy built from a flat list of path records.

use std::collections::HashMap;

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::record::PathRecord;
use crate::relpath;

/// A single folder in the hierarchy.
///
/// Nodes are rebuilt from the record store after every change, so nothing
/// should hold on to one across a mutation. Use the path string as a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Folder name (the last path segment). Empty for the root.
    pub name: CompactString,

    /// Root-relative path of this folder.
    pub path: String,

    /// The catalog files data under exactly this path.
    pub has_data: bool,

    /// The folder is present on disk.
    pub folder_exists: bool,

    /// Child folders keyed by case-folded name, in first-seen order.
    pub children: IndexMap<CompactString, Node>,
}

impl Node {
    /// Create a node with no children.
    pub fn new(name: impl Into<CompactString>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            has_data: false,
            folder_exists: false,
            children: IndexMap::new(),
        }
    }

    /// Create an empty root node.
    pub fn root() -> Self {
        Self::new("", "")
    }

    /// Build the hierarchy for `records`.
    ///
    /// `folder_exists` is asked about every non-root path; the root uses
    /// `root_folder_exists`. Records should already be ordered if a stable
    /// sibling order matters.
    pub fn build<'a>(
        records: impl IntoIterator<Item = &'a PathRecord>,
        root_folder_exists: bool,
        mut folder_exists: impl FnMut(&str) -> bool,
    ) -> Self {
        let mut root = Self::root();
        root.folder_exists = root_folder_exists;

        for record in records {
            let mut current = &mut root;
            let mut traversed = String::new();
            for segment in relpath::segments(&record.path) {
                traversed = relpath::join(&traversed, segment);
                let key = fold(segment);
                current = current.children.entry(key).or_insert_with(|| {
                    let mut child = Node::new(segment, traversed.clone());
                    child.folder_exists = folder_exists(&traversed);
                    child
                });
            }
            if record.has_data {
                current.has_data = true;
            }
        }

        root
    }

    /// Whether this is the root node.
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Whether any folder is nested below this one.
    pub fn is_interior(&self) -> bool {
        !self.children.is_empty()
    }

    /// Look up a direct child by name, ignoring case.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(&fold(name))
    }

    /// Look up a node anywhere below (or at) this one by its full path.
    pub fn find(&self, path: &str) -> Option<&Node> {
        let rest = relpath::normalize(path);
        let mut current = self;
        for segment in relpath::segments(&rest) {
            current = current.child(segment)?;
        }
        Some(current)
    }

    /// Iterate over this node and all of its descendants in pre-order.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        self.walk().count()
    }

    /// Depth of the node below the root.
    pub fn depth(&self) -> usize {
        relpath::segments(&self.path).count()
    }
}

/// Pre-order iterator over a [`Node`] subtree.
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.values().rev());
        Some(node)
    }
}

fn fold(name: &str) -> CompactString {
    CompactString::from(name.to_lowercase())
}

/// Expanded/collapsed state for folders, keyed by path so it survives rebuilds.
///
/// Paths that were never recorded count as expanded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpandState {
    expanded: HashMap<String, bool>,
}

impl ExpandState {
    /// Create a state where everything is expanded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the folder at `path` is expanded.
    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded
            .get(&relpath::fold_key(path))
            .copied()
            .unwrap_or(true)
    }

    /// Record whether `path` is expanded.
    pub fn set_expanded(&mut self, path: &str, expanded: bool) {
        self.expanded.insert(relpath::fold_key(path), expanded);
    }

    /// Flip the state of `path` and return the new value.
    pub fn toggle(&mut self, path: &str) -> bool {
        let expanded = !self.is_expanded(path);
        self.set_expanded(path, expanded);
        expanded
    }

    /// Carry the state of `old` (and everything under it) over to `new`.
    ///
    /// Called after a rename or move so a collapsed folder stays collapsed.
    pub fn rename_prefix(&mut self, old: &str, new: &str) {
        let moved: Vec<_> = self
            .expanded
            .iter()
            .filter_map(|(path, expanded)| {
                relpath::replace_prefix(path, old, new).map(|p| (path.clone(), p, *expanded))
            })
            .collect();
        for (from, to, expanded) in moved {
            self.expanded.remove(&from);
            self.expanded.insert(relpath::fold_key(&to), expanded);
        }
    }

    /// Drop state for paths not present in `root`.
    pub fn retain_known(&mut self, root: &Node) {
        self.expanded.retain(|path, _| root.find(path).is_some());
    }
}
