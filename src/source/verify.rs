//! Integrity checks for generator sources.
//!
//! Two different things are verified here:
//!
//! - [`verify_generator_source`] checks that an unpacked source has the layout
//!   and schema this CLI understands.
//! - [`ChecksumVerifier`] compares downloaded artifact bytes against the
//!   checksum published next to the artifact in the release.

use crate::constants::{
    DEFAULT_VALUES_FILE, GENERATOR_MARKER_FILE, HELPERS_DIR, SUPPORTED_GENERATOR_SCHEMA,
    TEMPLATES_DIR,
};
use crate::core::DeployKfError;
use crate::utils::fs::{PathKind, path_kind};
use anyhow::Result;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

/// Contents of the `.deploykf_generator` marker at the root of a generator source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratorMarker {
    /// Layout version of the generator source
    #[serde(default)]
    pub generator_schema: String,
}

fn invalid(reason: impl Into<String>) -> anyhow::Error {
    DeployKfError::InvalidGeneratorSource {
        reason: reason.into(),
    }
    .into()
}

/// Reads the `generator_schema` from a generator marker file.
pub fn read_generator_schema(marker_path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(marker_path)
        .map_err(|e| invalid(format!("failed to read generator marker file: {e}")))?;

    let marker: GeneratorMarker = serde_json::from_str(&content)
        .map_err(|e| invalid(format!("failed to parse generator marker file: {e}")))?;

    if marker.generator_schema.is_empty() {
        return Err(invalid("generator marker file is missing 'generator_schema' field"));
    }

    Ok(marker.generator_schema)
}

/// Checks that `source_dir` is a generator source this CLI can render.
///
/// The marker and its schema are checked first, then the `templates/` and
/// `helpers/` directories and the `default_values.yaml` file.
pub fn verify_generator_source(source_dir: &Path) -> Result<()> {
    let marker_path = source_dir.join(GENERATOR_MARKER_FILE);
    if path_kind(&marker_path)? != PathKind::File {
        return Err(invalid("marker file is missing"));
    }

    let schema = read_generator_schema(&marker_path)?;
    if schema != SUPPORTED_GENERATOR_SCHEMA {
        return Err(invalid(format!("unsupported schema version '{schema}'")));
    }

    if path_kind(&source_dir.join(TEMPLATES_DIR))? != PathKind::Directory {
        return Err(invalid("templates directory is missing"));
    }
    if path_kind(&source_dir.join(HELPERS_DIR))? != PathKind::Directory {
        return Err(invalid("helpers directory is missing"));
    }
    if path_kind(&source_dir.join(DEFAULT_VALUES_FILE))? != PathKind::File {
        return Err(invalid("default values file is missing"));
    }

    debug!("Generator source at {} uses schema {schema}", source_dir.display());
    Ok(())
}

/// Verifies downloaded bytes against a published SHA-256 checksum.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Hex SHA-256 of a byte slice.
    #[must_use]
    pub fn compute_sha256(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    /// Extracts the checksum for `artifact_name` from a published checksum file.
    ///
    /// Accepts the `sha256sum` format (`<hex>  <name>`, optionally with a `*`
    /// before the name) as well as a file holding only the hex digest. Returns
    /// `None` when no line applies to the artifact.
    #[must_use]
    pub fn parse_checksum_file(content: &str, artifact_name: &str) -> Option<String> {
        for line in content.lines() {
            let mut parts = line.split_whitespace();
            let Some(checksum) = parts.next() else {
                continue;
            };
            let is_hex = checksum.len() == 64 && checksum.chars().all(|c| c.is_ascii_hexdigit());
            if !is_hex {
                continue;
            }

            match parts.next() {
                None => return Some(checksum.to_lowercase()),
                Some(name) => {
                    let name = name.trim_start_matches('*');
                    if name == artifact_name || name.ends_with(&format!("/{artifact_name}")) {
                        return Some(checksum.to_lowercase());
                    }
                }
            }
        }
        None
    }

    /// Compares a computed checksum against the expected one, case-insensitively.
    pub fn verify(artifact_name: &str, expected: &str, actual: &str) -> Result<()> {
        if !expected.eq_ignore_ascii_case(actual) {
            return Err(DeployKfError::ChecksumMismatch {
                name: artifact_name.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            }
            .into());
        }
        debug!("Checksum verified for {artifact_name}");
        Ok(())
    }
}
