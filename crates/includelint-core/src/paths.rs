//! Lexical path helpers
//!
//! Include directories are compared as text, so every path that enters a
//! provided or used set goes through [`normalize`] first. Nothing here touches
//! the filesystem.

use std::path::{Component, Path, PathBuf};

/// Normalize a path lexically.
///
/// Drops `.` components, repeated and trailing separators, and folds `..`
/// into a preceding normal component. Leading `..` of a relative path is
/// kept, `..` directly below the root is dropped. An empty result becomes `.`.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }

    parts.iter().collect()
}

/// Resolve `path` against `base` unless it is already absolute, then normalize.
pub fn absolutize(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(base.join(path))
    }
}

/// Remove `suffix` from the end of `text` if present, otherwise return `text`.
pub fn remove_suffix<'a>(text: &'a str, suffix: &str) -> &'a str {
    text.strip_suffix(suffix).unwrap_or(text)
}
