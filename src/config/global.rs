//! Global (user-wide) configuration.
//!
//! See the [module-level documentation](super) for the file format. Unknown keys
//! are rejected so typos surface instead of silently falling back to defaults.

use crate::constants::{
    DEFAULT_ARTIFACT_PREFIX, DEFAULT_ARTIFACT_SUFFIX, DEFAULT_ASSETS_CACHE_DIR,
    DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_GITHUB_OWNER, DEFAULT_GITHUB_REPO,
};
use crate::core::DeployKfError;
use crate::utils::platform::{get_home_dir, resolve_path};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "DEPLOYKF_CONFIG_PATH";

/// Environment variable overriding the artifact cache directory.
pub const CACHE_DIR_ENV: &str = "DEPLOYKF_CACHE_DIR";

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Where generator sources come from and where they are cached
    pub source: SourceConfig,
    /// Artifact download behavior
    pub download: DownloadConfig,
}

/// The `[source]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Owner of the GitHub repository publishing generator releases
    pub github_owner: String,
    /// Name of the GitHub repository publishing generator releases
    pub github_repo: String,
    /// Artifact file name prefix, before the version
    pub artifact_prefix: String,
    /// Artifact file name suffix, after the version
    pub artifact_suffix: String,
    /// Cache directory; relative paths are taken from the home directory
    pub cache_dir: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            github_owner: DEFAULT_GITHUB_OWNER.to_string(),
            github_repo: DEFAULT_GITHUB_REPO.to_string(),
            artifact_prefix: DEFAULT_ARTIFACT_PREFIX.to_string(),
            artifact_suffix: DEFAULT_ARTIFACT_SUFFIX.to_string(),
            cache_dir: DEFAULT_ASSETS_CACHE_DIR.to_string(),
        }
    }
}

/// The `[download]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DownloadConfig {
    /// Upper bound for one artifact download, in seconds
    pub timeout_secs: u64,
    /// Verify downloads against a published `.sha256` asset when there is one
    pub verify_checksum: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT.as_secs(),
            verify_checksum: true,
        }
    }
}

impl DownloadConfig {
    /// The download timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GlobalConfig {
    /// Loads the configuration from [`Self::default_path`].
    ///
    /// A missing file yields the defaults.
    pub async fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path).await
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Loads the configuration from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        let config: Self = toml::from_str(&content).map_err(|e| DeployKfError::ConfigError {
            message: format!("failed to parse {}: {e}", path.display()),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Location of the configuration file.
    ///
    /// `DEPLOYKF_CONFIG_PATH` when set, otherwise `~/.deploykf/config.toml`.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }
        Ok(get_home_dir()?.join(".deploykf").join("config.toml"))
    }

    /// Directory holding cached generator artifacts.
    ///
    /// `DEPLOYKF_CACHE_DIR` wins. Otherwise `source.cache_dir` is expanded (`~`,
    /// `$VAR`) and, when still relative, placed under the home directory.
    pub fn cache_root(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CACHE_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let resolved = resolve_path(&self.source.cache_dir)?;
        if resolved.is_absolute() {
            Ok(resolved)
        } else {
            Ok(get_home_dir()?.join(resolved))
        }
    }

    fn validate(&self) -> Result<()> {
        let invalid = |message: &str| -> anyhow::Error {
            DeployKfError::ConfigError {
                message: message.to_string(),
            }
            .into()
        };

        if self.source.github_owner.is_empty() || self.source.github_repo.is_empty() {
            return Err(invalid("source.github_owner and source.github_repo must not be empty"));
        }
        if self.source.cache_dir.is_empty() {
            return Err(invalid("source.cache_dir must not be empty"));
        }
        if self.download.timeout_secs == 0 {
            return Err(invalid("download.timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = GlobalConfig::default();
        assert_eq!(config.source.github_owner, "deployKF");
        assert_eq!(config.source.github_repo, "deployKF");
        assert_eq!(config.source.artifact_prefix, "deploykf-");
        assert_eq!(config.source.artifact_suffix, "-generator.zip");
        assert_eq!(config.download.timeout(), Duration::from_secs(300));
        assert!(config.download.verify_checksum);
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[download]\ntimeout_secs = 30\n").unwrap();

        let config = GlobalConfig::load_from(&path).await.unwrap();
        assert_eq!(config.download.timeout_secs, 30);
        assert!(config.download.verify_checksum);
        assert_eq!(config.source, SourceConfig::default());
    }

    #[tokio::test]
    async fn test_load_full_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[source]
github_owner = "my-org"
github_repo = "my-deploykf"
artifact_prefix = "custom-"
artifact_suffix = ".zip"
cache_dir = "/var/cache/deploykf"

[download]
timeout_secs = 60
verify_checksum = false
"#,
        )
        .unwrap();

        let config = GlobalConfig::load_from(&path).await.unwrap();
        assert_eq!(config.source.github_owner, "my-org");
        assert_eq!(config.source.artifact_suffix, ".zip");
        assert!(!config.download.verify_checksum);
    }

    #[tokio::test]
    async fn test_unknown_key_rejected() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[download]\ntimeout = 30\n").unwrap();

        let err = GlobalConfig::load_from(&path).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeployKfError>(),
            Some(DeployKfError::ConfigError { .. })
        ));
    }

    #[tokio::test]
    async fn test_zero_timeout_rejected() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[download]\ntimeout_secs = 0\n").unwrap();

        assert!(GlobalConfig::load_from(&path).await.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_config_path_env_override() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("custom.toml");
        std::fs::write(&path, "[source]\ngithub_owner = \"env-org\"\n").unwrap();

        unsafe { std::env::set_var(CONFIG_PATH_ENV, &path) };
        let loaded = GlobalConfig::load().await;
        unsafe { std::env::remove_var(CONFIG_PATH_ENV) };

        assert_eq!(loaded.unwrap().source.github_owner, "env-org");
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_config_file_gives_defaults() {
        let temp = tempdir().unwrap();
        unsafe { std::env::set_var(CONFIG_PATH_ENV, temp.path().join("missing.toml")) };
        let loaded = GlobalConfig::load().await;
        unsafe { std::env::remove_var(CONFIG_PATH_ENV) };

        assert_eq!(loaded.unwrap(), GlobalConfig::default());
    }

    #[test]
    #[serial]
    fn test_cache_root() {
        unsafe { std::env::remove_var(CACHE_DIR_ENV) };
        let home = get_home_dir().unwrap();

        let config = GlobalConfig::default();
        assert_eq!(config.cache_root().unwrap(), home.join(".deploykf/assets"));

        let mut tilde = GlobalConfig::default();
        tilde.source.cache_dir = "~/cache/dkf".to_string();
        assert_eq!(tilde.cache_root().unwrap(), home.join("cache/dkf"));

        let temp = tempdir().unwrap();
        unsafe { std::env::set_var(CACHE_DIR_ENV, temp.path()) };
        let overridden = config.cache_root();
        unsafe { std::env::remove_var(CACHE_DIR_ENV) };
        assert_eq!(overridden.unwrap(), temp.path());
    }
}
