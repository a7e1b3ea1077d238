//! Lexical path normalization and containment checks.
//!
//! These helpers never touch the filesystem. The archive extractor uses them to
//! decide, per entry, whether a path stays inside the extraction target before
//! anything is written.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path by resolving `.` and `..` components.
///
/// Performs logical path resolution without accessing the filesystem. A `..`
/// that cannot be resolved is kept for relative paths (so `../x` stays `../x`)
/// and dropped at the root of absolute paths (so `/../x` becomes `/x`).
///
/// # Examples
///
/// ```rust,no_run
/// use deploykf_cli::utils::fs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("/foo/./bar/../baz")), PathBuf::from("/foo/baz"));
/// assert_eq!(normalize_path(Path::new("a/../../b")), PathBuf::from("../b"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Checks that `path` stays inside `base` after lexical normalization.
///
/// Relative paths are interpreted against `base`. Absolute paths must still
/// normalize to somewhere under `base`.
///
/// # Examples
///
/// ```rust,no_run
/// use deploykf_cli::utils::fs::is_safe_path;
/// use std::path::Path;
///
/// let base = Path::new("/tmp/scratch");
/// assert!(is_safe_path(base, Path::new("templates/a.yaml")));
/// assert!(!is_safe_path(base, Path::new("../../etc/passwd")));
/// ```
#[must_use]
pub fn is_safe_path(base: &Path, path: &Path) -> bool {
    let normalized_base = normalize_path(base);
    let normalized_path = if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    };

    normalized_path.starts_with(normalized_base)
}
