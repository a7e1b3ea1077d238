//! `deploykf version`

use crate::version::BuildInfo;
use anyhow::{Context, Result};
use clap::Args;

/// Print the version of this CLI.
///
/// The default output looks like:
///
/// `version.BuildInfo{Version:"v0.1.0", GitCommit:"47a35c6b...", GitTreeState:"clean", RustcVersion:"rustc 1.85.0"}`
///
/// With `--template` these variables are available (Tera syntax):
/// `version`, `git_commit`, `git_tree_state`, `rustc_version`.
/// For example `--template 'Version: {{ version }}'` prints `Version: v0.1.0`.
#[derive(Args, Debug)]
pub struct VersionCommand {
    /// Print only the version number
    #[arg(long)]
    short: bool,

    /// Template for the version string
    #[arg(long, value_name = "TEMPLATE")]
    template: Option<String>,
}

impl VersionCommand {
    pub fn execute(self, build_info: &BuildInfo) -> Result<()> {
        match self.template {
            Some(template) => print!("{}", render_template(&template, build_info)?),
            None => println!("{}", format_version(build_info, self.short)),
        }
        Ok(())
    }
}

fn format_version(build_info: &BuildInfo, short: bool) -> String {
    if short {
        build_info.short()
    } else {
        format!("{build_info:?}")
    }
}

fn render_template(template: &str, build_info: &BuildInfo) -> Result<String> {
    let context = tera::Context::from_serialize(build_info)
        .context("Failed to build template context")?;
    tera::Tera::one_off(template, &context, false).context("Invalid --template")
}
