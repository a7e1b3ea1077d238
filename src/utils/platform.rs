//! Platform-specific utilities and cross-platform compatibility helpers
//!
//! deployKF must produce the same cache layout, marker contents and source hashes
//! on Windows, macOS and Linux. The helpers here cover the places where the
//! platforms differ:
//!
//! - Home directory resolution
//! - `~` and environment variable expansion in configured paths
//! - Path separators (hashes and markers always use `/`)
//!
//! # Examples
//!
//! ```rust,no_run
//! use deploykf_cli::utils::platform::{get_home_dir, resolve_path, to_slash};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let home = get_home_dir()?;
//! let cache = resolve_path("~/.deploykf/assets")?;
//! assert!(cache.starts_with(&home));
//! assert_eq!(to_slash(Path::new("templates/a.yaml")), "templates/a.yaml");
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Gets the home directory path for the current user.
///
/// Resolved with the `dirs` crate: `HOME` on Unix, the user profile on Windows.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Resolves a configured path, expanding a leading `~` and `$VAR` references.
///
/// Relative results stay relative; the caller decides what they are relative to.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full_with_context(
        path,
        || dirs::home_dir().map(|h| h.to_string_lossy().into_owned()),
        |var| std::env::var(var).map(Some),
    )
    .with_context(|| {
        format!(
            "Failed to expand path: {path}\n\n\
            Use '~/' for the home directory and $VAR or ${{VAR}} for environment variables"
        )
    })?;

    Ok(PathBuf::from(expanded.into_owned()))
}

/// Renders a relative path with `/` separators regardless of platform.
///
/// Only the separators of the path's own components are rewritten; used for
/// hashing and for anything written into marker files.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Canonicalizes a path, following symlinks, with a readable error on failure.
pub fn safe_canonicalize(path: &Path) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve path: {}", path.display()))?;

    // Strip the verbatim prefix Windows adds so paths stay readable in markers
    #[cfg(windows)]
    {
        let s = canonical.to_string_lossy();
        if let Some(stripped) = s.strip_prefix(r"\\?\") {
            return Ok(PathBuf::from(stripped));
        }
    }

    Ok(canonical)
}
