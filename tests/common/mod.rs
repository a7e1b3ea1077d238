//! Shared helpers for the integration suite.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Output of a CLI invocation
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

/// An isolated working area for running `deploykf`.
///
/// Home, cache and config locations all point into the project's temp
/// directory so tests never see the user's real `~/.deploykf`.
pub struct TestProject {
    _temp: TempDir,
    root: PathBuf,
    cache_dir: PathBuf,
    bin_dir: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new()?;
        let root = temp.path().to_path_buf();
        let cache_dir = root.join("home/.deploykf/assets");
        let bin_dir = root.join("bin");
        fs::create_dir_all(&cache_dir)?;
        fs::create_dir_all(&bin_dir)?;

        Ok(Self {
            _temp: temp,
            root,
            cache_dir,
            bin_dir,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Writes a file relative to the project root, creating parents.
    pub fn write_file(&self, path: &str, content: &str) -> Result<PathBuf> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, content)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        Ok(target)
    }

    /// Installs a stand-in `gomplate` on the `PATH` used by [`Self::run_deploykf`].
    ///
    /// It records its arguments to `gomplate.log` and, for a full render,
    /// writes `rendered.yaml` into the `--output-dir`.
    #[cfg(unix)]
    pub fn install_fake_gomplate(&self) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let log = self.root.join("gomplate.log");
        let script = format!(
            r#"#!/bin/sh
echo "$@" >> "{log}"
out=""
while [ $# -gt 0 ]; do
  if [ "$1" = "--output-dir" ]; then out="$2"; fi
  shift
done
if [ -n "$out" ]; then
  mkdir -p "$out" && echo "kind: Namespace" > "$out/rendered.yaml"
fi
"#,
            log = log.display()
        );
        let path = self.bin_dir.join("gomplate");
        fs::write(&path, script)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(log)
    }

    /// Runs the `deploykf` binary in the project root.
    pub fn run_deploykf(&self, args: &[&str]) -> Result<CommandOutput> {
        let path = match std::env::var_os("PATH") {
            Some(existing) => {
                let mut paths = vec![self.bin_dir.clone()];
                paths.extend(std::env::split_paths(&existing));
                std::env::join_paths(paths)?
            }
            None => self.bin_dir.clone().into_os_string(),
        };

        let output = Command::new(env!("CARGO_BIN_EXE_deploykf"))
            .args(args)
            .current_dir(&self.root)
            .env("HOME", self.root.join("home"))
            .env("PATH", path)
            .env("DEPLOYKF_CACHE_DIR", &self.cache_dir)
            .env("DEPLOYKF_CONFIG_PATH", self.root.join("home/.deploykf/config.toml"))
            .env("DEPLOYKF_NO_PROGRESS", "1")
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .output()
            .context("Failed to run deploykf command")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }
}
