//! Helpers for root-relative folder paths.
//!
//! A relative path is a sequence of folder names joined by [`SEPARATOR`]. It
//! never starts or ends with a separator and the empty string is the root.
//! Comparisons between paths are case-insensitive, matching how the catalog
//! and the platforms we care about treat folder names.

use itertools::Itertools;

use crate::error::Rejection;

/// Canonical separator between path segments.
pub const SEPARATOR: char = '/';

/// Device names that cannot be used as folder names.
pub const RESERVED_NAMES: [&str; 24] = [
    "CON", "PRN", "AUX", "NUL", "COM0", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
    "COM8", "COM9", "LPT0", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8",
    "LPT9",
];

/// Characters that are not allowed in folder names on any supported platform.
pub const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Bring a path in any common spelling into canonical form.
///
/// Accepts either separator and drops empty segments, so `"\\a//b/"` becomes `"a/b"`.
pub fn normalize(raw: &str) -> String {
    raw.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .join("/")
}

/// Iterate over the segments of a path. The root has no segments.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// The parent of a path, or the root for top-level folders and the root itself.
pub fn parent_of(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(index) => &path[..index],
        None => "",
    }
}

/// The final segment of a path.
pub fn name_of(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Join a folder name onto a parent path.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else if name.is_empty() {
        parent.to_string()
    } else {
        format!("{parent}{SEPARATOR}{name}")
    }
}

/// Replace the final segment of `path` with `new_name`.
pub fn with_name(path: &str, new_name: &str) -> String {
    join(parent_of(path), new_name)
}

/// Every strict ancestor of `path`, nearest first, ending with the root.
pub fn ancestors(path: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut current = path;
    while !current.is_empty() {
        current = parent_of(current);
        out.push(current);
    }
    out
}

/// Case-insensitive segment comparison.
pub fn name_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
        || a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
}

/// Case-insensitive path equality.
pub fn path_eq(a: &str, b: &str) -> bool {
    segments(a).count() == segments(b).count()
        && segments(a).zip(segments(b)).all(|(x, y)| name_eq(x, y))
}

/// Key used to detect paths that differ only by case.
pub fn fold_key(path: &str) -> String {
    segments(path)
        .flat_map(|s| std::iter::once(SEPARATOR).chain(s.chars().flat_map(char::to_lowercase)))
        .skip(1)
        .collect()
}

/// Whether `path` lies strictly below `ancestor`.
pub fn is_descendant_of(path: &str, ancestor: &str) -> bool {
    strip_ancestor(path, ancestor).is_some_and(|rest| !rest.is_empty())
}

/// Whether `path` equals `ancestor` or lies below it.
pub fn is_same_or_descendant(path: &str, ancestor: &str) -> bool {
    strip_ancestor(path, ancestor).is_some()
}

/// Whether `ancestor` lies strictly above `path`.
pub fn is_ancestor_of(ancestor: &str, path: &str) -> bool {
    is_descendant_of(path, ancestor)
}

/// Whether two distinct paths share a parent.
pub fn are_siblings(a: &str, b: &str) -> bool {
    !path_eq(a, b) && path_eq(parent_of(a), parent_of(b))
}

/// Rewrite `path` if it equals or lies under `old_prefix`.
///
/// The matched prefix is replaced by `new_prefix` and the remaining
/// segments keep their original spelling.
pub fn replace_prefix(path: &str, old_prefix: &str, new_prefix: &str) -> Option<String> {
    strip_ancestor(path, old_prefix).map(|rest| join(new_prefix, &rest))
}

/// Remaining segments of `path` below `ancestor`, or `None` if it is not below it.
fn strip_ancestor(path: &str, ancestor: &str) -> Option<String> {
    let mut path_segments = segments(path);
    for expected in segments(ancestor) {
        match path_segments.next() {
            Some(actual) if name_eq(actual, expected) => {}
            _ => return None,
        }
    }
    Some(path_segments.join("/"))
}

/// Validate a user-supplied folder name.
///
/// Returns the trimmed name on success.
pub fn validate_folder_name(name: &str) -> Result<String, Rejection> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Rejection::EmptyName);
    }

    if name.ends_with('.') {
        return Err(Rejection::TrailingDot);
    }

    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(name)) {
        return Err(Rejection::ReservedName {
            name: name.to_string(),
        });
    }

    if let Some(character) = name
        .chars()
        .find(|c| INVALID_CHARS.contains(c) || c.is_control())
    {
        return Err(Rejection::InvalidCharacter { character });
    }

    Ok(name.to_string())
}

/// Generate a name that `is_taken` does not reject.
///
/// Tries `name`, then `stem_1.ext`, `stem_2.ext`, and so on.
pub fn unique_name(desired: &str, mut is_taken: impl FnMut(&str) -> bool) -> String {
    if !is_taken(desired) {
        return desired.to_string();
    }

    let (stem, extension) = match desired.rfind('.') {
        Some(index) if index > 0 => (&desired[..index], &desired[index..]),
        _ => (desired, ""),
    };

    let mut index = 1usize;
    loop {
        let candidate = format!("{stem}_{index}{extension}");
        if !is_taken(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a\\b\\c"), "a/b/c");
        assert_eq!(normalize("/a//b/"), "a/b");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("./a"), "a");
    }

    #[test]
    fn test_parent_and_name() {
        assert_eq!(parent_of("a/b/c"), "a/b");
        assert_eq!(parent_of("a"), "");
        assert_eq!(parent_of(""), "");
        assert_eq!(name_of("a/b/c"), "c");
        assert_eq!(name_of("a"), "a");
        assert_eq!(with_name("a/b", "z"), "a/z");
        assert_eq!(with_name("b", "z"), "z");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a", "b"), "a/b");
        assert_eq!(join("a", ""), "a");
    }

    #[test]
    fn test_ancestors_end_at_root() {
        assert_eq!(ancestors("a/b/c"), vec!["a/b", "a", ""]);
        assert_eq!(ancestors("a"), vec![""]);
        assert!(ancestors("").is_empty());
    }

    #[test]
    fn test_descendant_checks() {
        assert!(is_descendant_of("a/b", "a"));
        assert!(is_descendant_of("A/b", "a"));
        assert!(!is_descendant_of("a", "a"));
        assert!(!is_descendant_of("ab", "a"));
        assert!(is_descendant_of("a", ""));
        assert!(is_same_or_descendant("a", "A"));
        assert!(is_ancestor_of("a", "a/b/c"));
        assert!(are_siblings("a/b", "a/c"));
        assert!(!are_siblings("a/b", "A/B"));
    }

    #[test]
    fn test_case_folding() {
        assert!(name_eq("Kamera", "KAMERA"));
        assert!(name_eq("Ärzte", "ärzte"));
        assert!(!name_eq("a", "ab"));
        assert_eq!(fold_key("Site/Ärzte"), "site/ärzte");
        assert_eq!(fold_key("/A//b/"), "a/b");
        assert_eq!(fold_key(""), "");
        assert!(path_eq("Site/Ärzte", "site/ÄRZTE"));
    }

    #[test]
    fn test_replace_prefix() {
        assert_eq!(replace_prefix("a/b", "a/b", "a/z").as_deref(), Some("a/z"));
        assert_eq!(replace_prefix("a/b/c", "A/B", "x").as_deref(), Some("x/c"));
        assert_eq!(replace_prefix("a/bc", "a/b", "x"), None);
        assert_eq!(replace_prefix("q", "a", "x"), None);
    }

    #[test]
    fn test_validate_folder_name() {
        assert_eq!(validate_folder_name("  Site 1 ").unwrap(), "Site 1");
        assert_eq!(validate_folder_name("   "), Err(Rejection::EmptyName));
        assert_eq!(validate_folder_name("abc."), Err(Rejection::TrailingDot));
        assert!(matches!(
            validate_folder_name("lpt0"),
            Err(Rejection::ReservedName { .. })
        ));
        assert_eq!(
            validate_folder_name("a/b"),
            Err(Rejection::InvalidCharacter { character: '/' })
        );
        assert!(validate_folder_name("CONSOLE").is_ok());
    }

    #[test]
    fn test_unique_name() {
        let taken = ["New folder", "New folder_1"];
        assert_eq!(
            unique_name("New folder", |n| taken.contains(&n)),
            "New folder_2"
        );
        assert_eq!(unique_name("free", |_| false), "free");
        assert_eq!(unique_name("a.b", |n| n == "a.b"), "a_1.b");
    }
}
