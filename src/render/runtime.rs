//! Runtime templates.
//!
//! Generator templates sometimes need to know the directories the CLI was run
//! with. They are exposed as two tiny templates, `input_dir` and `output_dir`,
//! each holding the path as given on the command line. The directory holding
//! them is passed to the renderer under the `runtime` template name.

use crate::constants::{INPUT_DIR_TEMPLATE_FILE, OUTPUT_DIR_TEMPLATE_FILE};
use crate::utils::fs::{ensure_dir, safe_write};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Writes the `input_dir` and `output_dir` runtime templates into `dir`.
///
/// `dir` is created when missing; existing templates are replaced.
pub fn write_runtime_templates(dir: &Path, input_dir: &str, output_dir: &str) -> Result<()> {
    ensure_dir(dir)
        .with_context(|| format!("Failed to create runtime templates directory: {}", dir.display()))?;

    let templates = [(INPUT_DIR_TEMPLATE_FILE, input_dir), (OUTPUT_DIR_TEMPLATE_FILE, output_dir)];
    for (name, content) in templates {
        let path = dir.join(name);
        safe_write(&path, content)
            .with_context(|| format!("Failed to write runtime template: {}", path.display()))?;
    }

    debug!("Wrote runtime templates into {}", dir.display());
    Ok(())
}
