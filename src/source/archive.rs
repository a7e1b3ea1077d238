//! Subtree extraction from zip archives.
//!
//! Generator artifacts are zip files whose generator source lives under a
//! top-level `generator/` directory. [`extract_subtree`] unpacks just that
//! subtree into a target directory.
//!
//! # Security
//!
//! Every selected entry is checked on its own before anything is written for it:
//! its path relative to the subtree is joined onto the target, normalized, and
//! rejected with [`DeployKfError::InvalidPath`] if it would land outside the
//! target. The first offending entry aborts the extraction.

use crate::core::DeployKfError;
use crate::utils::fs::{ensure_dir, ensure_parent_dir, is_safe_path, normalize_path};
use anyhow::{Context, Result};
use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use zip::ZipArchive;

/// Extracts every entry under `subtree` of the zip at `archive_path` into `target_dir`.
///
/// Entries outside `subtree` are skipped. Entry paths are re-rooted so that
/// `generator/templates/a.yaml` extracted with subtree `generator` becomes
/// `{target_dir}/templates/a.yaml`. File entries keep their Unix permission bits
/// when the archive records them.
///
/// # Errors
///
/// - [`DeployKfError::InvalidPath`] if an entry would be written outside `target_dir`
/// - [`DeployKfError::SubtreeNotFound`] if no entry lives under `subtree`
/// - I/O and zip format errors
///
/// # Examples
///
/// ```rust,no_run
/// use deploykf_cli::source::archive::extract_subtree;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// extract_subtree(
///     Path::new("deploykf-0.1.5-generator.zip"),
///     Path::new("/tmp/scratch"),
///     "generator",
/// )?;
/// # Ok(())
/// # }
/// ```
pub fn extract_subtree(archive_path: &Path, target_dir: &Path, subtree: &str) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .map_err(DeployKfError::from)
        .with_context(|| format!("Failed to read zip archive: {}", archive_path.display()))?;

    let prefix = normalize_path(Path::new(subtree));
    let mut matched = 0usize;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(DeployKfError::from)?;
        let entry_name = entry.name().to_string();

        let Some(relative) = relative_to_prefix(&entry_name, &prefix) else {
            trace!("Skipping archive entry outside '{subtree}': {entry_name}");
            continue;
        };
        matched += 1;

        let destination = target_dir.join(&relative);
        if !is_safe_path(target_dir, &destination) {
            return Err(DeployKfError::InvalidPath {
                entry: entry_name,
            }
            .into());
        }
        let destination = normalize_path(&destination);

        if entry.is_dir() {
            ensure_dir(&destination)?;
            continue;
        }

        ensure_parent_dir(&destination)?;
        let mut out = File::create(&destination)
            .with_context(|| format!("Failed to create file: {}", destination.display()))?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("Failed to extract archive entry: {entry_name}"))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&destination, std::fs::Permissions::from_mode(mode & 0o7777))
                .with_context(|| format!("Failed to set permissions on {}", destination.display()))?;
        }
    }

    if matched == 0 {
        return Err(DeployKfError::SubtreeNotFound {
            subtree: subtree.to_string(),
            archive: archive_path.display().to_string(),
        }
        .into());
    }

    debug!("Extracted {matched} entries from {} into {}", archive_path.display(), target_dir.display());
    Ok(())
}

/// Returns the part of an entry path below `prefix`, or `None` if the entry is
/// not under `prefix`.
///
/// Matching is per path component on the entry name with `.` components removed.
/// `..` components are kept as-is so the containment check sees them.
fn relative_to_prefix(entry_name: &str, prefix: &Path) -> Option<PathBuf> {
    let components: Vec<Component<'_>> =
        Path::new(entry_name).components().filter(|c| !matches!(c, Component::CurDir)).collect();

    let prefix_components: Vec<Component<'_>> = prefix.components().collect();
    if components.len() < prefix_components.len()
        || components[..prefix_components.len()] != prefix_components[..]
    {
        return None;
    }

    Some(components[prefix_components.len()..].iter().collect())
}
