//! Output directory lifecycle and the `.deploykf_output` marker.
//!
//! An output directory may only be wiped when deployKF can prove it created it.
//! The proof is the marker file written by [`record_run`]: a JSON
//! [`RunMarker`] recording when the directory was generated, from which source,
//! and by which CLI version.
//!
//! A generation run therefore always does, in order:
//!
//! 1. [`prepare_for_clean`]: wipe the directory if it is marked, refuse if it holds
//!    anything unmarked
//! 2. [`record_run`]: write the new marker
//! 3. render into the directory
//!
//! # Directory States
//!
//! | State                  | `prepare_for_clean`           |
//! |------------------------|-------------------------------|
//! | absent                 | nothing to do                 |
//! | empty                  | nothing to do                 |
//! | non-empty, marked      | every entry removed           |
//! | non-empty, unmarked    | [`DeployKfError::UnsafeToClean`], nothing removed |

use crate::constants::OUTPUT_MARKER_FILE;
use crate::core::DeployKfError;
use crate::utils::fs::{PathKind, ensure_dir, path_kind, read_json_file, write_json_file};
use crate::version::BuildInfo;
use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Provenance record stored in `.deploykf_output`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMarker {
    /// RFC 3339 UTC timestamp of the run
    pub generated_at: String,
    /// Release version the source came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_version: Option<String>,
    /// Path of the artifact or directory the source came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    /// [`crate::checksum::hash_path`] of the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_hash: Option<String>,
    /// Version of the CLI that generated the directory
    pub cli_version: String,
}

/// Location of the marker file inside `output_dir`.
#[must_use]
pub fn marker_path(output_dir: &Path) -> PathBuf {
    output_dir.join(OUTPUT_MARKER_FILE)
}

/// Empties `output_dir` if, and only if, it is safe to do so.
///
/// # Errors
///
/// [`DeployKfError::UnsafeToClean`] when the directory is non-empty and has no
/// marker file. Nothing is deleted in that case.
pub fn prepare_for_clean(output_dir: &Path) -> Result<()> {
    match path_kind(output_dir)? {
        PathKind::Missing => {
            debug!("Output directory {} does not exist yet", output_dir.display());
            return Ok(());
        }
        PathKind::File => {
            return Err(anyhow::anyhow!(
                "Output path exists but is not a directory: {}",
                output_dir.display()
            ));
        }
        PathKind::Directory => {}
    }

    let entries: Vec<fs::DirEntry> = fs::read_dir(output_dir)
        .with_context(|| format!("Failed to read output directory: {}", output_dir.display()))?
        .collect::<std::io::Result<_>>()?;

    if entries.is_empty() {
        return Ok(());
    }

    if path_kind(&marker_path(output_dir))? != PathKind::File {
        return Err(DeployKfError::UnsafeToClean {
            path: output_dir.display().to_string(),
            marker: OUTPUT_MARKER_FILE.to_string(),
        }
        .into());
    }

    info!("Cleaning {} entries from {}", entries.len(), output_dir.display());
    for entry in entries {
        let path = entry.path();
        let result = if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.with_context(|| format!("Failed to remove {}", path.display()))?;
    }

    Ok(())
}

/// Writes the marker for a generation run into `output_dir`.
///
/// Creates `output_dir` when missing and replaces any existing marker.
pub fn record_run(
    output_dir: &Path,
    source_version: Option<&str>,
    source_path: Option<&str>,
    source_hash: Option<&str>,
    build_info: &BuildInfo,
) -> Result<RunMarker> {
    ensure_dir(output_dir)?;

    let marker = RunMarker {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        source_version: non_empty(source_version),
        source_path: non_empty(source_path),
        source_hash: non_empty(source_hash),
        cli_version: build_info.version.clone(),
    };

    let path = marker_path(output_dir);
    write_json_file(&path, &marker, true)
        .with_context(|| format!("Failed to write output marker: {}", path.display()))?;
    debug!("Wrote output marker {}", path.display());

    Ok(marker)
}

/// Reads the marker of a previously generated directory, if there is one.
pub fn read_marker(output_dir: &Path) -> Result<Option<RunMarker>> {
    let path = marker_path(output_dir);
    if path_kind(&path)? != PathKind::File {
        return Ok(None);
    }
    read_json_file(&path).map(Some)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}
