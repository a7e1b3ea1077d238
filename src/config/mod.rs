//! Configuration for the deployKF CLI
//!
//! deployKF has a single, optional, user-wide configuration file. Everything in
//! it has a default, so the CLI works without one.
//!
//! # Location
//!
//! - `~/.deploykf/config.toml` by default
//! - `DEPLOYKF_CONFIG_PATH` overrides the location
//!
//! # Format
//!
//! ```toml
//! [source]
//! github_owner = "deployKF"
//! github_repo = "deployKF"
//! artifact_prefix = "deploykf-"
//! artifact_suffix = "-generator.zip"
//! cache_dir = "~/.deploykf/assets"
//!
//! [download]
//! timeout_secs = 300
//! verify_checksum = true
//! ```
//!
//! `DEPLOYKF_CACHE_DIR` overrides the resolved cache directory regardless of the
//! file's contents.

pub mod global;

pub use global::{DownloadConfig, GlobalConfig, SourceConfig};
