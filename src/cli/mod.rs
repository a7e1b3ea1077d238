//! Command-line interface for the deployKF CLI.
//!
//! Two commands are available:
//!
//! - `generate`: render deployKF manifests from a generator source and values files
//! - `version`: print build information
//!
//! # Global Options
//!
//! - `--verbose` / `-v`: debug logging
//! - `--quiet` / `-q`: errors only
//! - `--config`: path to the global config file (sets `DEPLOYKF_CONFIG_PATH`)
//! - `--no-progress`: disable progress indicators (sets `DEPLOYKF_NO_PROGRESS`)
//!
//! `RUST_LOG` overrides the level chosen by `--verbose` / `--quiet`.
//!
//! # Examples
//!
//! ```bash
//! deploykf generate --source-version 0.1.5 --values ./custom-values.yaml --output-dir ./GENERATOR_OUTPUT
//! deploykf generate --source-path ./my-generator --output-dir ./GENERATOR_OUTPUT
//! deploykf version --short
//! ```

mod generate;
mod version;

use crate::config::global::CONFIG_PATH_ENV;
use crate::utils::progress::NO_PROGRESS_ENV;
use crate::version::BuildInfo;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use generate::GenerateCommand;
pub use version::VersionCommand;

/// Process-wide settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,
    pub no_progress: bool,
    pub config_path: Option<String>,
}

impl CliConfig {
    /// Exports the settings that other modules read from the environment.
    ///
    /// # Safety
    ///
    /// Mutates the process environment, so it must run before any other thread
    /// is started.
    pub unsafe fn apply_to_env(&self) {
        if self.no_progress {
            unsafe { std::env::set_var(NO_PROGRESS_ENV, "1") };
        }
        if let Some(ref path) = self.config_path {
            unsafe { std::env::set_var(CONFIG_PATH_ENV, path) };
        }
    }

    /// Installs the `tracing` subscriber, logging to stderr.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(&self.log_level)
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

#[derive(Parser)]
#[command(
    name = "deploykf",
    about = "deployKF CLI - Generate deployKF manifests",
    version,
    long_about = "The deployKF CLI renders the manifests of a deployKF platform from a versioned \
                  generator source and your values files."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<String>,

    /// Disable progress bars and spinners
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate manifests from a generator source
    Generate(GenerateCommand),
    /// Print CLI version information
    Version(VersionCommand),
}

impl Cli {
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress,
            config_path: self.config.clone(),
        }
    }

    pub async fn execute(self, build_info: &BuildInfo) -> Result<()> {
        match self.command {
            Commands::Generate(cmd) => cmd.execute(build_info).await,
            Commands::Version(cmd) => cmd.execute(build_info),
        }
    }
}
