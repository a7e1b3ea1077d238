//! `deploykf generate`

use crate::config::GlobalConfig;
use crate::generate::{GenerateOptions, generate};
use crate::render::GomplateRenderer;
use crate::source::{GitHubResolver, SourceCache, SourceSelection};
use crate::version::BuildInfo;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Generate deployKF manifests.
///
/// The generator source is either a published release (`--source-version`),
/// downloaded once into the artifact cache, or a local `.zip` / directory
/// (`--source-path`). Values files are applied in order, later files
/// overriding earlier ones and the generator's defaults.
///
/// WARNING: the contents of `--output-dir` are replaced. A directory that was
/// not created by a previous `generate` run is never touched.
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Release version of the generator source (e.g. 0.1.5)
    #[arg(short = 'V', long, value_name = "VERSION", conflicts_with = "source_path")]
    source_version: Option<String>,

    /// Local generator source: a `.zip` artifact or a directory
    #[arg(long, value_name = "PATH")]
    source_path: Option<PathBuf>,

    /// Values file; repeat or comma-separate for several
    #[arg(short = 'f', long = "values", value_name = "FILE", value_delimiter = ',')]
    values: Vec<PathBuf>,

    /// Directory receiving the generated manifests
    #[arg(short = 'O', long, value_name = "DIR")]
    output_dir: PathBuf,
}

impl GenerateCommand {
    pub async fn execute(self, build_info: &BuildInfo) -> Result<()> {
        let options = self.into_options()?;

        let config = GlobalConfig::load().await?;
        let renderer = GomplateRenderer::new()?;
        let cache = SourceCache::from_config(Arc::new(GitHubResolver::new()?), &config)?;
        debug!("Using artifact cache {}", cache.cache_root().display());

        generate(&options, &cache, &renderer, build_info).await?;
        Ok(())
    }

    fn into_options(self) -> Result<GenerateOptions> {
        Ok(GenerateOptions {
            source: SourceSelection::from_args(self.source_version, self.source_path)?,
            values: self.values,
            output_dir: self.output_dir,
        })
    }
}
