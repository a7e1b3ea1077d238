//! deployKF CLI
//!
//! Renders the manifests of a deployKF platform from a versioned *generator
//! source* and user values files.
//!
//! # Architecture
//!
//! - [`source`]: acquire a generator source from a release (through the
//!   artifact cache), a local zip or a local directory
//! - [`checksum`]: deterministic content hashes of files and directory trees
//! - [`render`]: value precedence, runtime templates and the rendering engine
//! - [`output`]: the output directory marker protocol
//! - [`generate`]: the end-to-end `generate` workflow
//! - [`cli`]: argument parsing and command dispatch
//!
//! # Example
//!
//! ```rust,no_run
//! use deploykf_cli::checksum::hash_path;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let hash = hash_path(Path::new("./my-generator"), &[".gomplateignore"])?;
//! println!("{hash}");
//! # Ok(())
//! # }
//! ```

pub mod checksum;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod generate;
pub mod output;
pub mod render;
pub mod source;
pub mod utils;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
