//! Error handling for deployKF
//!
//! This module provides the error types and user-friendly error reporting for the
//! deployKF CLI. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise handling of the failure modes that matter
//!    (path traversal, missing releases, unsafe output directories)
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`DeployKfError`] - Enumerated error types for every failure case of the generator
//! - [`ErrorContext`] - Wrapper that adds details and suggestions for display
//!
//! Errors are raised close to their source, wrapped in [`anyhow::Error`] while they
//! propagate, and converted back with [`user_friendly_error`] at the top of `main`.
//!
//! # Examples
//!
//! ```rust,no_run
//! use deploykf_cli::core::{DeployKfError, user_friendly_error};
//!
//! let error = DeployKfError::UnsafeToClean {
//!     path: "./out".to_string(),
//!     marker: ".deploykf_output".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for deployKF operations
///
/// # Error Categories
///
/// ## Archive Extraction
/// - [`InvalidPath`] - An archive entry would escape the extraction target
/// - [`SubtreeNotFound`] - The archive does not contain the requested subtree
///
/// ## Source Acquisition
/// - [`ReleaseNotFound`] - No GitHub release matches the requested version
/// - [`AssetNotFound`] - The release exists but lacks the generator artifact
/// - [`ChecksumMismatch`] - Downloaded bytes differ from the published checksum
/// - [`DownloadCancelled`] - The download was interrupted or timed out
/// - [`NetworkError`] - Any other HTTP failure
/// - [`SourcePathNotFound`] / [`UnsupportedSourcePath`] - Bad `--source-path`
/// - [`InvalidGeneratorSource`] - The source tree has the wrong layout or schema
///
/// ## Output Directory
/// - [`UnsafeToClean`] - The output directory holds content this tool did not create
///
/// ## Rendering
/// - [`RendererNotFound`] - The template engine binary is not installed
/// - [`RenderFailed`] - The template engine returned an error
///
/// [`InvalidPath`]: DeployKfError::InvalidPath
/// [`SubtreeNotFound`]: DeployKfError::SubtreeNotFound
/// [`ReleaseNotFound`]: DeployKfError::ReleaseNotFound
/// [`AssetNotFound`]: DeployKfError::AssetNotFound
/// [`ChecksumMismatch`]: DeployKfError::ChecksumMismatch
/// [`DownloadCancelled`]: DeployKfError::DownloadCancelled
/// [`NetworkError`]: DeployKfError::NetworkError
/// [`SourcePathNotFound`]: DeployKfError::SourcePathNotFound
/// [`UnsupportedSourcePath`]: DeployKfError::UnsupportedSourcePath
/// [`InvalidGeneratorSource`]: DeployKfError::InvalidGeneratorSource
/// [`UnsafeToClean`]: DeployKfError::UnsafeToClean
/// [`RendererNotFound`]: DeployKfError::RendererNotFound
/// [`RenderFailed`]: DeployKfError::RenderFailed
#[derive(Error, Debug)]
pub enum DeployKfError {
    /// An archive entry resolves to a location outside the extraction target
    ///
    /// This is the zip-slip guard. It is raised for the first offending entry and
    /// aborts the whole extraction.
    #[error("invalid file path in archive: {entry}")]
    InvalidPath {
        /// The raw entry name as stored in the archive
        entry: String,
    },

    /// No archive entry lives under the requested subtree
    #[error("the provided extract path '{subtree}' does not exist within the zip '{archive}'")]
    SubtreeNotFound {
        /// The subtree prefix that was requested
        subtree: String,
        /// Path to the archive that was searched
        archive: String,
    },

    /// No release exists for the requested tag
    #[error("no github release found with tag '{tag}' in '{owner}/{repo}'")]
    ReleaseNotFound {
        /// Repository owner
        owner: String,
        /// Repository name
        repo: String,
        /// The release tag that was looked up (e.g. `v0.1.0`)
        tag: String,
    },

    /// The release exists but does not publish the generator artifact
    #[error("generator artifact '{asset}' not found in release '{tag}'")]
    AssetNotFound {
        /// Expected asset file name
        asset: String,
        /// Release tag that was searched
        tag: String,
    },

    /// The output directory is non-empty and carries no marker file
    #[error("output directory '{path}' is not safe to clean: no '{marker}' marker found")]
    UnsafeToClean {
        /// The output directory
        path: String,
        /// Name of the marker file that was expected
        marker: String,
    },

    /// Downloaded content does not match its published checksum
    #[error("checksum mismatch for '{name}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Name of the verified artifact
        name: String,
        /// The published checksum
        expected: String,
        /// The computed checksum
        actual: String,
    },

    /// The generator source tree is missing required content
    #[error("invalid generator source: {reason}")]
    InvalidGeneratorSource {
        /// What is wrong with the source
        reason: String,
    },

    /// Download interrupted by the user or by the configured timeout
    #[error("download of '{asset}' was cancelled: {reason}")]
    DownloadCancelled {
        /// Asset being downloaded
        asset: String,
        /// Why it stopped (timeout, interrupt)
        reason: String,
    },

    /// Network error
    #[error("Network error: {operation}")]
    NetworkError {
        /// The network operation that failed
        operation: String,
        /// Reason for the network failure
        reason: String,
    },

    /// `--source-path` does not exist
    #[error("the provided --source-path '{path}' does not exist")]
    SourcePathNotFound {
        /// The path as given by the user
        path: String,
    },

    /// `--source-path` is neither a directory nor a `.zip` file
    #[error("the provided --source-path '{path}' must be a folder or a .zip file")]
    UnsupportedSourcePath {
        /// The path as given by the user
        path: String,
    },

    /// The template engine executable could not be located
    #[error("renderer '{program}' is not installed or not found in PATH")]
    RendererNotFound {
        /// Executable name
        program: String,
    },

    /// The template engine exited unsuccessfully
    #[error("rendering failed during {phase}")]
    RenderFailed {
        /// Which generation phase failed
        phase: String,
        /// Captured stderr of the renderer
        stderr: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Zip container error
    #[error("zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl Clone for DeployKfError {
    fn clone(&self) -> Self {
        match self {
            Self::InvalidPath {
                entry,
            } => Self::InvalidPath {
                entry: entry.clone(),
            },
            Self::SubtreeNotFound {
                subtree,
                archive,
            } => Self::SubtreeNotFound {
                subtree: subtree.clone(),
                archive: archive.clone(),
            },
            Self::ReleaseNotFound {
                owner,
                repo,
                tag,
            } => Self::ReleaseNotFound {
                owner: owner.clone(),
                repo: repo.clone(),
                tag: tag.clone(),
            },
            Self::AssetNotFound {
                asset,
                tag,
            } => Self::AssetNotFound {
                asset: asset.clone(),
                tag: tag.clone(),
            },
            Self::UnsafeToClean {
                path,
                marker,
            } => Self::UnsafeToClean {
                path: path.clone(),
                marker: marker.clone(),
            },
            Self::ChecksumMismatch {
                name,
                expected,
                actual,
            } => Self::ChecksumMismatch {
                name: name.clone(),
                expected: expected.clone(),
                actual: actual.clone(),
            },
            Self::InvalidGeneratorSource {
                reason,
            } => Self::InvalidGeneratorSource {
                reason: reason.clone(),
            },
            Self::DownloadCancelled {
                asset,
                reason,
            } => Self::DownloadCancelled {
                asset: asset.clone(),
                reason: reason.clone(),
            },
            Self::NetworkError {
                operation,
                reason,
            } => Self::NetworkError {
                operation: operation.clone(),
                reason: reason.clone(),
            },
            Self::SourcePathNotFound {
                path,
            } => Self::SourcePathNotFound {
                path: path.clone(),
            },
            Self::UnsupportedSourcePath {
                path,
            } => Self::UnsupportedSourcePath {
                path: path.clone(),
            },
            Self::RendererNotFound {
                program,
            } => Self::RendererNotFound {
                program: program.clone(),
            },
            Self::RenderFailed {
                phase,
                stderr,
            } => Self::RenderFailed {
                phase: phase.clone(),
                stderr: stderr.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::ZipError(e) => Self::Other {
                message: format!("zip error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context in yellow (optional)
/// 3. **Suggestion**: Actionable steps in green (optional)
///
/// # Examples
///
/// ```rust,no_run
/// use deploykf_cli::core::{DeployKfError, ErrorContext};
///
/// let context = ErrorContext::new(DeployKfError::RendererNotFound {
///     program: "gomplate".to_string(),
/// })
/// .with_suggestion("Install gomplate from https://docs.gomplate.ca/installing/");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying deployKF error
    pub error: DeployKfError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: DeployKfError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`DeployKfError`] anywhere in the error chain, [`std::io::Error`]
/// kinds, and falls back to a generic message carrying the full cause chain.
/// Context added above a recognized error with `anyhow::Context` is kept, since
/// that is where the offending path or version is named.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let messages: Vec<String> = error.chain().map(ToString::to_string).collect();

    for (depth, cause) in error.chain().enumerate() {
        if let Some(dkf_error) = cause.downcast_ref::<DeployKfError>() {
            let mut ctx = create_error_context(dkf_error.clone());
            if matches!(dkf_error, DeployKfError::ZipError(_)) {
                ctx = ctx.with_suggestion(
                    "If this is a cached release artifact, delete it so the next run downloads it again",
                );
            }
            return with_outer_context(ctx, &messages[..depth]);
        }
    }

    if let Some(io_error) = error.chain().find_map(|c| c.downcast_ref::<std::io::Error>()) {
        let described = messages.join(": ");
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(DeployKfError::Other {
                    message: format!("permission denied: {described}"),
                })
                .with_suggestion("Check the ownership and permissions of the output and cache directories");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(DeployKfError::Other {
                    message: format!("file not found: {described}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();

    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DeployKfError::Other {
        message,
    })
}

/// Puts the context messages found above the typed error in front of its details.
fn with_outer_context(mut ctx: ErrorContext, outer: &[String]) -> ErrorContext {
    if outer.is_empty() {
        return ctx;
    }
    let context = outer.join(": ");
    ctx.details = Some(match ctx.details.take() {
        Some(details) => format!("{context}\n{details}"),
        None => context,
    });
    ctx
}

/// Map each [`DeployKfError`] variant to an [`ErrorContext`] with suggestions
fn create_error_context(error: DeployKfError) -> ErrorContext {
    let (details, suggestion): (Option<String>, Option<String>) = match &error {
        DeployKfError::InvalidPath { .. } => (
            Some("The archive contains an entry that would be written outside the extraction directory".to_string()),
            Some("Only use generator archives from trusted sources".to_string()),
        ),

        DeployKfError::SubtreeNotFound { .. } => (
            Some("A generator zip must contain a top-level 'generator' directory".to_string()),
            Some("Check that --source-path points at a deployKF generator zip".to_string()),
        ),

        DeployKfError::ReleaseNotFound { tag, .. } => (
            None,
            Some(format!(
                "Check that '{tag}' is a published deployKF release (versions are given without the 'v' prefix)"
            )),
        ),

        DeployKfError::AssetNotFound { .. } => (
            Some("The release exists, but it does not publish a generator source artifact".to_string()),
            Some("Use a newer --source-version, or download the source and use --source-path".to_string()),
        ),

        DeployKfError::UnsafeToClean { marker, .. } => (
            Some("deployKF only deletes output directories that it previously generated".to_string()),
            Some(format!(
                "Choose an empty --output-dir, or remove its contents manually (a '{marker}' file marks directories deployKF can clean)"
            )),
        ),

        DeployKfError::ChecksumMismatch { .. } => (
            Some("The downloaded artifact was discarded and nothing was cached".to_string()),
            Some("Retry the command; if it keeps failing the release asset may be corrupt".to_string()),
        ),

        DeployKfError::DownloadCancelled { .. } => (
            Some("The partial download was discarded".to_string()),
            Some("Retry, or raise 'timeout_secs' in the [download] section of the config file".to_string()),
        ),

        DeployKfError::NetworkError { reason, .. } => (
            Some(reason.clone()),
            Some("Check your internet connection and access to api.github.com".to_string()),
        ),

        DeployKfError::RendererNotFound { .. } => (
            None,
            Some("Install gomplate from https://docs.gomplate.ca/installing/ and make sure it is on PATH".to_string()),
        ),

        DeployKfError::RenderFailed { stderr, .. } => (Some(stderr.trim().to_string()), None),

        DeployKfError::InvalidGeneratorSource { .. } => (
            None,
            Some("Check that the source contains templates/, helpers/, default_values.yaml and a .deploykf_generator marker".to_string()),
        ),

        _ => (None, None),
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(details) = details.filter(|d| !d.is_empty()) {
        ctx = ctx.with_details(details);
    }
    if let Some(suggestion) = suggestion {
        ctx = ctx.with_suggestion(suggestion);
    }
    ctx
}
