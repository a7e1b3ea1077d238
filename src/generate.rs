//! The `generate` workflow.
//!
//! Ties the pieces together in the order the output directory protocol
//! requires:
//!
//! 1. place the generator source into a scratch directory and check its layout
//! 2. validate the values files and write the runtime templates
//! 3. render the `.gomplateignore` files
//! 4. clean the output directory, refusing unmarked directories
//! 5. hash the source and write the output marker
//! 6. render the manifests
//!
//! The scratch directory is removed when the run ends, successful or not. The
//! output directory is only touched once step 4 has proven it safe.

use crate::checksum::hash_path;
use crate::constants::{
    DEFAULT_VALUES_FILE, HELPERS_DIR, RENDER_IGNORE_FILE, RUNTIME_TEMPLATES_DIR,
    SCRATCH_DIR_PREFIX, TEMPLATES_DIR,
};
use crate::output::{RunMarker, prepare_for_clean, record_run};
use crate::render::{RenderInputs, RenderRequest, Renderer, ValueSources, write_runtime_templates};
use crate::source::{
    AcquiredSource, SourceCache, SourceSelection, acquire_source, verify_generator_source,
};
use crate::utils::fs::TempDir;
use crate::utils::progress::ProgressBar;
use crate::version::BuildInfo;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

/// What the user asked `generate` to do.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub source: SourceSelection,
    /// User values files, lowest precedence first
    pub values: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct GenerateReport {
    pub source: AcquiredSource,
    pub marker: RunMarker,
}

/// Runs one generation.
///
/// # Errors
///
/// Any acquisition, verification, values, rendering or output directory
/// error. When the output directory holds files without a marker the run
/// fails with [`crate::core::DeployKfError::UnsafeToClean`] before anything
/// is written there.
pub async fn generate(
    options: &GenerateOptions,
    cache: &SourceCache,
    renderer: &dyn Renderer,
    build_info: &BuildInfo,
) -> Result<GenerateReport> {
    let scratch = TempDir::new(SCRATCH_DIR_PREFIX)?;
    let source_dir = scratch.path().join("source");
    let runtime_dir = scratch.path().join(RUNTIME_TEMPLATES_DIR);
    debug!("Using scratch directory {}", scratch.path().display());

    let source = acquire_source(&options.source, cache, &source_dir).await?;
    verify_generator_source(&source_dir)?;

    let templates_dir = source_dir.join(TEMPLATES_DIR);
    let values = ValueSources::new(&source_dir.join(DEFAULT_VALUES_FILE), &options.values);
    // Unreadable or malformed values files fail here, before anything is rendered
    values.merge()?;

    write_runtime_templates(
        &runtime_dir,
        &templates_dir.display().to_string(),
        &options.output_dir.display().to_string(),
    )?;

    let inputs = RenderInputs {
        values,
        helpers_dir: source_dir.join(HELPERS_DIR),
        runtime_dir,
    };

    let spinner = ProgressBar::new_spinner("Rendering ignore files");
    renderer.render(&RenderRequest::ignore_files(&templates_dir, &inputs)).await?;
    spinner.finish_and_clear();

    prepare_for_clean(&options.output_dir)?;

    let source_hash = hash_path(&source.origin, &[RENDER_IGNORE_FILE])?;
    info!("Generator source {} has hash {source_hash}", source.origin.display());

    let marker = record_run(
        &options.output_dir,
        source.version.as_deref(),
        Some(&source.origin.display().to_string()),
        Some(&source_hash),
        build_info,
    )?;

    let spinner = ProgressBar::new_spinner("Rendering manifests");
    renderer
        .render(&RenderRequest::manifests(&templates_dir, &options.output_dir, &inputs))
        .await?;
    spinner.finish_and_clear();

    println!("Generated manifests at: {}", options.output_dir.display());

    Ok(GenerateReport {
        source,
        marker,
    })
}
