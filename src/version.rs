//! Build information for the deployKF CLI.
//!
//! [`BuildInfo`] is assembled once in `main` and passed to whatever needs the
//! CLI version (the output marker, the `version` command). The git fields are
//! taken from environment variables present when the binary was compiled:
//!
//! - `DEPLOYKF_GIT_COMMIT`: full commit SHA
//! - `DEPLOYKF_GIT_TREE_STATE`: `clean` or `dirty`
//! - `DEPLOYKF_RUSTC_VERSION`: output of `rustc --version`
//!
//! Missing variables leave the field empty.

use serde::Serialize;
use std::fmt;

/// Compile-time description of this binary.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    /// Release version with a `v` prefix (e.g. `v0.1.0`)
    pub version: String,
    /// Git commit the binary was built from
    pub git_commit: String,
    /// `clean` if the tree had no local changes at build time, `dirty` otherwise
    pub git_tree_state: String,
    /// Rust compiler used for the build
    pub rustc_version: String,
}

impl BuildInfo {
    /// Build information of the running binary.
    #[must_use]
    pub fn current() -> Self {
        Self {
            version: format!("v{}", env!("CARGO_PKG_VERSION")),
            git_commit: option_env!("DEPLOYKF_GIT_COMMIT").unwrap_or_default().to_string(),
            git_tree_state: option_env!("DEPLOYKF_GIT_TREE_STATE").unwrap_or_default().to_string(),
            rustc_version: option_env!("DEPLOYKF_RUSTC_VERSION").unwrap_or_default().to_string(),
        }
    }

    /// `{version}+g{commit7}` when the commit is known, otherwise just the version.
    #[must_use]
    pub fn short(&self) -> String {
        match self.git_commit.get(..7) {
            Some(commit) => format!("{}+g{commit}", self.version),
            None => self.version.clone(),
        }
    }
}

impl fmt::Debug for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "version.BuildInfo{{Version:{:?}, GitCommit:{:?}, GitTreeState:{:?}, RustcVersion:{:?}}}",
            self.version, self.git_commit, self.git_tree_state, self.rustc_version
        )
    }
}
