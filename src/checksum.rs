//! Deterministic content hashing for generator sources.
//!
//! The hash of a generator source is recorded in the output marker so a later
//! reader can tell whether two generation runs used the same templates. It must
//! therefore be identical on every platform for the same content.
//!
//! # Algorithm
//!
//! - A file hashes to the hex SHA-256 of its bytes.
//! - A directory hashes to the hex SHA-256 of the concatenation, over every
//!   regular file below it whose base name is not ignored, of
//!   `relative_path + file_hash`, where `relative_path` uses `/` separators and
//!   the files are ordered by a stable, case-insensitive sort of those paths.
//!
//! Directory entries themselves contribute nothing, so empty directories do not
//! change the hash.
//!
//! # Examples
//!
//! ```rust,no_run
//! use deploykf_cli::checksum::hash_path;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let hash = hash_path(Path::new("/tmp/generator"), &[".gomplateignore"])?;
//! assert_eq!(hash.len(), 64);
//! # Ok(())
//! # }
//! ```

use crate::utils::platform::to_slash;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Hex SHA-256 of a file's bytes.
pub fn hash_file(path: &Path) -> Result<String> {
    let content = fs::read(path)
        .with_context(|| format!("Failed to read file for checksum: {}", path.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(hex::encode(hasher.finalize()))
}

/// Hash a file or a directory tree.
///
/// `ignored_names` are compared against the base name of each file; a match
/// excludes the file wherever it appears in the tree. Ignored names have no
/// effect when `path` is a single file.
pub fn hash_path(path: &Path, ignored_names: &[&str]) -> Result<String> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Failed to stat path for hashing: {}", path.display()))?;

    if metadata.is_dir() {
        hash_directory(path, ignored_names)
    } else {
        hash_file(path)
    }
}

fn hash_directory(root: &Path, ignored_names: &[&str]) -> Result<String> {
    let mut files: Vec<(String, PathBuf)> = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry
            .with_context(|| format!("Failed to walk directory for hashing: {}", root.display()))?;

        if entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if ignored_names.iter().any(|ignored| *ignored == name) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).with_context(|| {
            format!("Walked path {} is outside {}", entry.path().display(), root.display())
        })?;
        files.push((to_slash(relative), entry.path().to_path_buf()));
    }

    // `sort_by_key` is stable, equal lowercase keys keep walk order
    files.sort_by_key(|(relative, _)| relative.to_lowercase());

    let mut hasher = Sha256::new();
    for (relative, absolute) in &files {
        let file_hash = hash_file(absolute)?;
        hasher.update(relative.as_bytes());
        hasher.update(file_hash.as_bytes());
    }

    let digest = hex::encode(hasher.finalize());
    debug!("Hashed {} files under {}: {digest}", files.len(), root.display());
    Ok(digest)
}
