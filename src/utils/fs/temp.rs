//! Scratch directories that clean themselves up.
//!
//! Each `generate` run unpacks or copies the generator source into a [`TempDir`].
//! The directory is removed when the guard is dropped, which covers every exit
//! path of the run including early returns through `?` and panics.

use crate::utils::fs::dirs::{ensure_dir, remove_dir_all};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A temporary directory that is removed recursively when dropped.
///
/// The directory lives under the system temporary directory and is named
/// `deploykf_{prefix}_{uuid}`, so concurrent runs never collide.
///
/// # Examples
///
/// ```rust,no_run
/// use deploykf_cli::utils::fs::TempDir;
///
/// # fn example() -> anyhow::Result<()> {
/// {
///     let scratch = TempDir::new("generator-source")?;
///     std::fs::write(scratch.path().join("default_values.yaml"), "a: 1")?;
/// } // removed here
/// # Ok(())
/// # }
/// ```
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    /// Creates a new temporary directory with the given prefix.
    pub fn new(prefix: &str) -> Result<Self> {
        Self::new_in(&std::env::temp_dir(), prefix)
    }

    /// Creates a new temporary directory with the given prefix under `parent`.
    pub fn new_in(parent: &Path, prefix: &str) -> Result<Self> {
        let unique_name = format!("deploykf_{}_{}", prefix, uuid::Uuid::new_v4());
        let path = parent.join(unique_name);

        ensure_dir(&path)?;
        debug!("Created scratch directory {}", path.display());

        Ok(Self {
            path,
        })
    }

    /// Returns the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        if let Err(e) = remove_dir_all(&self.path) {
            debug!("Failed to remove scratch directory {}: {e}", self.path.display());
        }
    }
}
