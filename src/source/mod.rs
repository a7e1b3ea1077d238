//! Generator source acquisition.
//!
//! A `generate` run starts by placing a generator source into its scratch
//! directory. Where the source comes from is a [`SourceSelection`]:
//!
//! - [`SourceSelection::Version`]: a published release, fetched through the
//!   [`cache::SourceCache`] and extracted from its artifact zip
//! - [`SourceSelection::Path`] to a `.zip` file: extracted like a release artifact
//! - [`SourceSelection::Path`] to a directory: copied as-is
//!
//! # Modules
//!
//! - [`archive`]: zip subtree extraction with per-entry traversal checks
//! - [`cache`]: the per-user artifact cache and download logic
//! - [`github`]: release lookup through the GitHub API
//! - [`verify`]: generator source layout checks and published checksums

pub mod archive;
pub mod cache;
pub mod github;
pub mod verify;

use crate::constants::GENERATOR_ZIP_SUBTREE;
use crate::core::DeployKfError;
use crate::utils::fs::{PathKind, copy_dir, path_kind};
use crate::utils::platform::safe_canonicalize;
use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

pub use cache::SourceCache;
pub use github::{GitHubResolver, Release, ReleaseAsset, ReleaseResolver};
pub use verify::verify_generator_source;

/// Where the generator source for a run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    /// A published release version, without the `v` tag prefix
    Version(String),
    /// A local `.zip` artifact or generator source directory
    Path(PathBuf),
}

impl SourceSelection {
    /// Builds a selection from the mutually exclusive CLI inputs.
    pub fn from_args(version: Option<String>, path: Option<PathBuf>) -> Result<Self> {
        match (version, path) {
            (Some(_), Some(_)) => Err(DeployKfError::ConfigError {
                message: "--source-version and --source-path cannot be used together".to_string(),
            }
            .into()),
            (Some(version), None) => Ok(Self::Version(version)),
            (None, Some(path)) => Ok(Self::Path(path)),
            (None, None) => Err(DeployKfError::ConfigError {
                message: "at least one of `--source-version` or `--source-path` must be provided"
                    .to_string(),
            }
            .into()),
        }
    }

    /// The version, when the source is a published release.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::Version(version) => Some(version),
            Self::Path(_) => None,
        }
    }
}

impl fmt::Display for SourceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version(version) => write!(f, "version '{version}'"),
            Self::Path(path) => write!(f, "path '{}'", path.display()),
        }
    }
}

/// The outcome of placing a generator source into a scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredSource {
    /// Release version, for [`SourceSelection::Version`]
    pub version: Option<String>,
    /// What was unpacked or copied: the cached artifact, the user's zip, or the
    /// user's directory, with symlinks resolved
    pub origin: PathBuf,
}

/// Places the selected generator source into `target_dir`.
///
/// `target_dir` should be empty; the scratch directory of a run always is.
///
/// # Errors
///
/// - [`DeployKfError::SourcePathNotFound`] if a selected path does not exist
/// - [`DeployKfError::UnsupportedSourcePath`] if it is neither a directory nor a `.zip` file
/// - Errors of [`SourceCache::acquire`] and [`archive::extract_subtree`]
pub async fn acquire_source(
    selection: &SourceSelection,
    cache: &SourceCache,
    target_dir: &Path,
) -> Result<AcquiredSource> {
    match selection {
        SourceSelection::Version(version) => {
            if cache.is_cached(version)? {
                println!(
                    "Using cached deployKF generator source: {}",
                    cache.artifact_path(version).display()
                );
            } else {
                println!(
                    "Downloading deployKF generator source version '{version}' from github repo '{}'",
                    cache.repository()
                );
            }

            let artifact = cache.acquire(version, target_dir).await?;
            Ok(AcquiredSource {
                version: Some(version.clone()),
                origin: artifact,
            })
        }
        SourceSelection::Path(path) => {
            let origin = copy_local_source(path, target_dir)?;
            Ok(AcquiredSource {
                version: None,
                origin,
            })
        }
    }
}

/// Unpacks or copies a local source into `target_dir`, returning its resolved path.
pub fn copy_local_source(path: &Path, target_dir: &Path) -> Result<PathBuf> {
    let display = path.display().to_string();
    if path_kind(path)? == PathKind::Missing {
        return Err(DeployKfError::SourcePathNotFound {
            path: display,
        }
        .into());
    }
    let resolved = safe_canonicalize(path)?;

    match path_kind(&resolved)? {
        PathKind::File if is_zip(&resolved) => {
            println!("Using custom source file: {display}");
            info!("Extracting {} into {}", resolved.display(), target_dir.display());
            archive::extract_subtree(&resolved, target_dir, GENERATOR_ZIP_SUBTREE)?;
        }
        PathKind::Directory => {
            println!("Using custom source folder: {display}");
            info!("Copying {} into {}", resolved.display(), target_dir.display());
            copy_dir(&resolved, target_dir)?;
        }
        _ => {
            return Err(DeployKfError::UnsupportedSourcePath {
                path: display,
            }
            .into());
        }
    }

    Ok(resolved)
}

fn is_zip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "zip")
}
