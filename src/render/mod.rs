//! Template rendering through an external engine.
//!
//! Manifests are produced by [gomplate](https://docs.gomplate.ca) from the
//! generator source's `templates/` tree. A generation run renders twice:
//!
//! 1. [`RenderPhase::IgnoreFiles`] renders only the `*.gomplateignore_template`
//!    files, in place, turning each into a `.gomplateignore` next to it. Those
//!    files decide, from the values, which templates phase two skips.
//! 2. [`RenderPhase::Manifests`] renders the whole tree into the output directory.
//!
//! Both phases see the same data: the [`ValueSources`] merged into `Values`, the
//! generator's `helpers/` templates and the [`runtime`] templates.
//!
//! Rendering sits behind the [`Renderer`] trait so generation can be exercised
//! without the engine installed.

pub mod runtime;
pub mod values;

use crate::constants::{RENDER_IGNORE_FILE, RENDER_IGNORE_TEMPLATE_FILE};
use crate::core::DeployKfError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

pub use runtime::write_runtime_templates;
pub use values::{ValueSources, merge_values};

/// Name of the rendering engine executable.
pub const RENDERER_PROGRAM: &str = "gomplate";

/// Opening template delimiter used by generator sources.
pub const LEFT_DELIM: &str = "{{<";

/// Closing template delimiter used by generator sources.
pub const RIGHT_DELIM: &str = ">}}";

/// Template name of the generator's helper templates.
pub const HELPERS_TEMPLATE: &str = "helpers";

/// Template name of the runtime templates.
pub const RUNTIME_TEMPLATE: &str = "runtime";

/// The two renders of a generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    /// `.gomplateignore_template` files rendered in place
    IgnoreFiles,
    /// The full template tree rendered into the output directory
    Manifests,
}

impl fmt::Display for RenderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IgnoreFiles => write!(f, "ignore file rendering"),
            Self::Manifests => write!(f, "manifest rendering"),
        }
    }
}

/// Where rendered files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    /// Mirror the input tree under a directory
    OutputDir(PathBuf),
    /// Compute each output path from a template over the input path (`.in`)
    OutputMap(String),
}

/// Data shared by both phases of a run.
#[derive(Debug, Clone)]
pub struct RenderInputs {
    /// The values files
    pub values: ValueSources,
    /// The generator's `helpers/` directory
    pub helpers_dir: PathBuf,
    /// Directory holding the runtime templates
    pub runtime_dir: PathBuf,
}

/// One invocation of the rendering engine.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub phase: RenderPhase,
    pub input_dir: PathBuf,
    pub target: RenderTarget,
    /// Glob patterns excluded from the input tree; a leading `!` re-includes
    pub exclude: Vec<String>,
    /// `name=path` data source definitions
    pub data_sources: Vec<String>,
    /// `name=expression` context definitions
    pub contexts: Vec<String>,
    /// `name=path` nested template definitions
    pub templates: Vec<String>,
}

impl RenderRequest {
    /// Phase one: render the ignore templates of `templates_dir` in place.
    pub fn ignore_files(templates_dir: &Path, inputs: &RenderInputs) -> Self {
        let output_map = format!(
            r#"{}/{LEFT_DELIM} .in | strings.ReplaceAll "{RENDER_IGNORE_TEMPLATE_FILE}" "{RENDER_IGNORE_FILE}" {RIGHT_DELIM}"#,
            templates_dir.display()
        );
        let target = RenderTarget::OutputMap(output_map);
        let exclude = vec!["*".to_string(), format!("!*{RENDER_IGNORE_TEMPLATE_FILE}")];
        Self::new(RenderPhase::IgnoreFiles, templates_dir, target, inputs).with_exclude(exclude)
    }

    /// Phase two: render all of `templates_dir` into `output_dir`.
    pub fn manifests(templates_dir: &Path, output_dir: &Path, inputs: &RenderInputs) -> Self {
        Self::new(
            RenderPhase::Manifests,
            templates_dir,
            RenderTarget::OutputDir(output_dir.to_path_buf()),
            inputs,
        )
    }

    fn new(
        phase: RenderPhase,
        input_dir: &Path,
        target: RenderTarget,
        inputs: &RenderInputs,
    ) -> Self {
        Self {
            phase,
            input_dir: input_dir.to_path_buf(),
            target,
            exclude: Vec::new(),
            data_sources: inputs.values.data_sources(),
            contexts: vec![inputs.values.merge_expression()],
            templates: vec![
                format!("{HELPERS_TEMPLATE}={}", inputs.helpers_dir.display()),
                format!("{RUNTIME_TEMPLATE}={}", inputs.runtime_dir.display()),
            ],
        }
    }

    fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }
}

/// Renders template trees.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Performs one render, failing with [`DeployKfError::RenderFailed`] when
    /// the templates could not be rendered.
    async fn render(&self, request: &RenderRequest) -> Result<()>;
}

/// [`Renderer`] that runs the `gomplate` executable.
#[derive(Debug, Clone)]
pub struct GomplateRenderer {
    program: PathBuf,
}

impl GomplateRenderer {
    /// Locates `gomplate` on `PATH`.
    ///
    /// # Errors
    ///
    /// [`DeployKfError::RendererNotFound`] when it is not installed.
    pub fn new() -> Result<Self> {
        let program = which::which(RENDERER_PROGRAM).map_err(|e| {
            debug!("Failed to locate {RENDERER_PROGRAM}: {e}");
            DeployKfError::RendererNotFound {
                program: RENDERER_PROGRAM.to_string(),
            }
        })?;
        Ok(Self::with_program(program))
    }

    /// Uses the executable at `program`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Command line arguments for `request`.
    #[must_use]
    pub fn args(request: &RenderRequest) -> Vec<String> {
        let mut args = vec![
            "--input-dir".to_string(),
            request.input_dir.display().to_string(),
            "--left-delim".to_string(),
            LEFT_DELIM.to_string(),
            "--right-delim".to_string(),
            RIGHT_DELIM.to_string(),
        ];

        match &request.target {
            RenderTarget::OutputDir(dir) => {
                args.extend(["--output-dir".to_string(), dir.display().to_string()]);
            }
            RenderTarget::OutputMap(map) => {
                args.extend(["--output-map".to_string(), map.clone()]);
            }
        }

        for pattern in &request.exclude {
            args.extend(["--exclude".to_string(), pattern.clone()]);
        }
        for source in &request.data_sources {
            args.extend(["--datasource".to_string(), source.clone()]);
        }
        for context in &request.contexts {
            args.extend(["--context".to_string(), context.clone()]);
        }
        for template in &request.templates {
            args.extend(["--template".to_string(), template.clone()]);
        }

        args
    }
}

#[async_trait]
impl Renderer for GomplateRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<()> {
        let args = Self::args(request);
        debug!(target: "render", "({}) Executing command: {} {}", request.phase, self.program.display(), args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .env("GOMPLATE_SUPPRESS_EMPTY", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", self.program.display()))?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            debug!(target: "render", "{} exited with {}", RENDERER_PROGRAM, output.status);
            return Err(DeployKfError::RenderFailed {
                phase: request.phase.to_string(),
                stderr,
            }
            .into());
        }

        if !stderr.is_empty() {
            debug!(target: "render", "{RENDERER_PROGRAM} stderr: {stderr}");
        }
        Ok(())
    }
}
