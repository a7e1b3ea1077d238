//! Core types for deployKF
//!
//! This module holds the error system shared by every other module:
//! - [`DeployKfError`] - Enumerated error types covering all generator failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to the user-friendly format
//!
//! # Error Handling Pattern
//!
//! ```rust
//! use deploykf_cli::core::{DeployKfError, user_friendly_error};
//! use anyhow::Result;
//!
//! fn example_operation() -> Result<()> {
//!     Err(DeployKfError::SourcePathNotFound { path: "./missing".to_string() }.into())
//! }
//!
//! if let Err(e) = example_operation() {
//!     let friendly = user_friendly_error(e);
//!     assert!(friendly.to_string().contains("./missing"));
//! }
//! ```

pub mod error;

pub use error::{DeployKfError, ErrorContext, user_friendly_error};
