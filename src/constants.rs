//! Global constants used throughout the deployKF codebase.
//!
//! File names, artifact naming conventions and timeouts live here so the
//! generator layout and cache layout are defined in exactly one place.

use std::time::Duration;

/// Name of the marker file written into generated output directories.
///
/// The presence of this file is the only signal that an output directory was
/// produced by deployKF and is therefore safe to clean.
pub const OUTPUT_MARKER_FILE: &str = ".deploykf_output";

/// Name of the marker file at the root of a generator source.
pub const GENERATOR_MARKER_FILE: &str = ".deploykf_generator";

/// The only generator schema version this CLI understands.
pub const SUPPORTED_GENERATOR_SCHEMA: &str = "v1";

/// Directory inside a generator zip that holds the generator source.
pub const GENERATOR_ZIP_SUBTREE: &str = "generator";

/// Templates directory inside a generator source.
pub const TEMPLATES_DIR: &str = "templates";

/// Helper templates directory inside a generator source.
pub const HELPERS_DIR: &str = "helpers";

/// Default values file inside a generator source.
pub const DEFAULT_VALUES_FILE: &str = "default_values.yaml";

/// File name produced by the first render phase.
///
/// These files are generated into the scratch tree and must never influence
/// the source hash.
pub const RENDER_IGNORE_FILE: &str = ".gomplateignore";

/// Suffix of the templates rendered during the first phase.
pub const RENDER_IGNORE_TEMPLATE_FILE: &str = ".gomplateignore_template";

/// Default GitHub owner of the generator source repository.
pub const DEFAULT_GITHUB_OWNER: &str = "deployKF";

/// Default GitHub repository of the generator source.
pub const DEFAULT_GITHUB_REPO: &str = "deployKF";

/// Prefix of generator artifact names (`deploykf-{version}-generator.zip`).
pub const DEFAULT_ARTIFACT_PREFIX: &str = "deploykf-";

/// Suffix of generator artifact names.
pub const DEFAULT_ARTIFACT_SUFFIX: &str = "-generator.zip";

/// Sub-path under the user's home directory where artifacts are cached.
pub const DEFAULT_ASSETS_CACHE_DIR: &str = ".deploykf/assets";

/// Release tags use a `v` prefix on the raw version string.
pub const RELEASE_TAG_PREFIX: &str = "v";

/// Suffix of the optional checksum asset published next to an artifact.
pub const CHECKSUM_ASSET_SUFFIX: &str = ".sha256";

/// Suffix of in-flight downloads inside the cache directory.
pub const PARTIAL_DOWNLOAD_SUFFIX: &str = ".part";

/// Default timeout for downloading a generator artifact (5 minutes).
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Timeout for GitHub API metadata requests (30 seconds).
pub const GITHUB_API_TIMEOUT: Duration = Duration::from_secs(30);

/// Prefix for the scratch directory that holds the generator source.
pub const SCRATCH_DIR_PREFIX: &str = "generator-source";

/// Base URL of the GitHub REST API.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Directory inside the scratch tree that receives the runtime templates.
pub const RUNTIME_TEMPLATES_DIR: &str = "runtime";

/// Runtime template holding the `--input-dir` the renderer was given.
pub const INPUT_DIR_TEMPLATE_FILE: &str = "input_dir";

/// Runtime template holding the `--output-dir` the renderer was given.
pub const OUTPUT_DIR_TEMPLATE_FILE: &str = "output_dir";
