use foldermap_core::{
    EngineConfig, ExpandState, Node, PathRecord, PathRecordStore, Rejection, relpath,
};
use std::collections::BTreeSet;

fn store(items: &[(&str, bool)]) -> PathRecordStore {
    PathRecordStore::from_records(items.iter().map(|(p, d)| PathRecord::new(*p, *d)))
}

fn flatten(root: &Node) -> BTreeSet<(String, bool, bool)> {
    root.walk()
        .map(|n| (n.path.clone(), n.has_data, n.folder_exists))
        .collect()
}

#[test]
fn test_rebuild_is_idempotent() {
    let mut records = store(&[
        ("", false),
        ("Site2/Cam1", true),
        ("Site1", false),
        ("Site1/Cam1", true),
        ("Site1/Cam2", false),
    ]);
    records.order_by_path();

    let exists = |p: &str| p != "Site1/Cam2";
    let first = Node::build(&records, true, exists);
    let second = Node::build(&records, true, exists);

    assert_eq!(flatten(&first), flatten(&second));
    assert_eq!(first, second);
}

#[test]
fn test_ordered_store_gives_sorted_siblings() {
    let mut records = store(&[("b", false), ("a/z", false), ("a/m", true), ("C", false)]);
    records.order_by_path();
    let root = Node::build(&records, true, |_| true);

    let names: Vec<_> = root.children.values().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["C", "a", "b"]);
    let names: Vec<_> = root
        .child("a")
        .unwrap()
        .children
        .values()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(names, vec!["m", "z"]);
}

#[test]
fn test_intermediate_nodes_do_not_inherit_data() {
    let records = store(&[("a/b/c", true), ("a", true)]);
    let root = Node::build(&records, true, |_| true);

    assert!(root.find("a").unwrap().has_data);
    assert!(!root.find("a/b").unwrap().has_data);
    assert!(root.find("A/B/C").unwrap().has_data);
    assert!(!root.has_data);
    assert!(root.find("a/x").is_none());
}

#[test]
fn test_node_paths_join_ancestor_names() {
    let records = store(&[("x/y/z", false)]);
    let root = Node::build(&records, true, |_| true);

    for node in root.walk().filter(|n| !n.is_root()) {
        let parent = root.find(relpath::parent_of(&node.path)).unwrap();
        assert_eq!(relpath::join(&parent.path, &node.name), node.path);
        assert_eq!(node.depth(), parent.depth() + 1);
    }
}

#[test]
fn test_snapshot_restore_round_trip() {
    let mut records = store(&[("a", false), ("a/b", true)]);
    let before = records.clone();
    let snapshot = records.snapshot();

    records.rewrite_prefix("a", "q");
    records.add_or_replace(PathRecord::empty("a"));
    records.remove("q/b");
    assert_ne!(records, before);

    records.restore(snapshot);
    assert_eq!(records, before);
}

#[test]
fn test_expand_state_survives_rebuild() {
    let records = store(&[("a/b", false), ("c", false)]);
    let mut state = ExpandState::new();
    state.set_expanded("a", false);

    let root = Node::build(&records, true, |_| true);
    state.retain_known(&root);
    let rebuilt = Node::build(&records, true, |_| true);

    assert!(!state.is_expanded(&rebuilt.find("a").unwrap().path));
    assert!(state.is_expanded(&rebuilt.find("c").unwrap().path));
}

#[test]
fn test_name_validation_rules() {
    for reserved in ["con", "PRN", "Aux", "nul", "COM0", "com9", "LPT5"] {
        assert!(matches!(
            relpath::validate_folder_name(reserved),
            Err(Rejection::ReservedName { .. })
        ));
    }
    for bad in ["a<b", "a>b", "a:b", "a\"b", "a|b", "a?b", "a*b", "a\\b", "tab\there"] {
        assert!(matches!(
            relpath::validate_folder_name(bad),
            Err(Rejection::InvalidCharacter { .. })
        ));
    }
    assert_eq!(relpath::validate_folder_name(" end. "), Err(Rejection::TrailingDot));
    assert_eq!(relpath::validate_folder_name("Camera 1").unwrap(), "Camera 1");
}

#[test]
fn test_engine_config_defaults() {
    let config = EngineConfig::new("/data/images");
    assert_eq!(
        config.excluded_folders,
        vec!["Backups", "DeletedFiles", ".vthumb"]
    );
    assert!(config.is_media_file("a.AVI"));
    assert!(config.is_media_file("b.asf"));
    assert!(!config.is_media_file("c.png"));
}
