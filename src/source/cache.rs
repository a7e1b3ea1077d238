//! Per-user cache of downloaded generator artifacts.
//!
//! Artifacts live flat under the cache root as `{prefix}{version}{suffix}`
//! (`~/.deploykf/assets/deploykf-0.1.5-generator.zip` by default). An artifact
//! that exists is a hit and is used without any network access. There is no
//! expiry and no re-validation of existing entries.
//!
//! # Download Safety
//!
//! A miss streams the release asset into `{artifact}.part` and renames it into
//! place only once the download completed and, when the release publishes
//! `{artifact}.sha256`, the bytes matched it. Timeouts, Ctrl-C, network errors
//! and checksum mismatches remove the partial file, so a present artifact is
//! always a complete one.

use crate::config::GlobalConfig;
use crate::constants::{CHECKSUM_ASSET_SUFFIX, GENERATOR_ZIP_SUBTREE, PARTIAL_DOWNLOAD_SUFFIX};
use crate::core::DeployKfError;
use crate::source::archive::extract_subtree;
use crate::source::github::{ReleaseAsset, ReleaseResolver};
use crate::source::verify::ChecksumVerifier;
use crate::utils::fs::{PathKind, ensure_dir, path_kind};
use crate::utils::progress::ProgressBar;
use anyhow::{Context, Result};
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Resolves generator versions to locally cached artifacts.
pub struct SourceCache {
    resolver: Arc<dyn ReleaseResolver>,
    cache_root: PathBuf,
    github_owner: String,
    github_repo: String,
    artifact_prefix: String,
    artifact_suffix: String,
    download_timeout: Duration,
    verify_checksum: bool,
}

impl SourceCache {
    /// Creates a cache rooted at `cache_root` with the default artifact naming.
    pub fn new(resolver: Arc<dyn ReleaseResolver>, cache_root: PathBuf) -> Self {
        let defaults = GlobalConfig::default();
        Self {
            resolver,
            cache_root,
            github_owner: defaults.source.github_owner,
            github_repo: defaults.source.github_repo,
            artifact_prefix: defaults.source.artifact_prefix,
            artifact_suffix: defaults.source.artifact_suffix,
            download_timeout: defaults.download.timeout(),
            verify_checksum: defaults.download.verify_checksum,
        }
    }

    /// Creates a cache configured from the global configuration.
    pub fn from_config(resolver: Arc<dyn ReleaseResolver>, config: &GlobalConfig) -> Result<Self> {
        Ok(Self {
            resolver,
            cache_root: config.cache_root()?,
            github_owner: config.source.github_owner.clone(),
            github_repo: config.source.github_repo.clone(),
            artifact_prefix: config.source.artifact_prefix.clone(),
            artifact_suffix: config.source.artifact_suffix.clone(),
            download_timeout: config.download.timeout(),
            verify_checksum: config.download.verify_checksum,
        })
    }

    /// Overrides the download timeout.
    #[must_use]
    pub fn with_download_timeout(mut self, timeout: Duration) -> Self {
        self.download_timeout = timeout;
        self
    }

    /// Enables or disables published-checksum verification.
    #[must_use]
    pub fn with_checksum_verification(mut self, enabled: bool) -> Self {
        self.verify_checksum = enabled;
        self
    }

    /// Directory holding the cached artifacts.
    #[must_use]
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// `owner/repo` releases are resolved against.
    #[must_use]
    pub fn repository(&self) -> String {
        format!("{}/{}", self.github_owner, self.github_repo)
    }

    /// File name of the artifact for `version`.
    #[must_use]
    pub fn artifact_name(&self, version: &str) -> String {
        format!("{}{version}{}", self.artifact_prefix, self.artifact_suffix)
    }

    /// Location of the artifact for `version` inside the cache.
    #[must_use]
    pub fn artifact_path(&self, version: &str) -> PathBuf {
        self.cache_root.join(self.artifact_name(version))
    }

    /// Whether the artifact for `version` is already cached.
    pub fn is_cached(&self, version: &str) -> Result<bool> {
        Ok(path_kind(&self.artifact_path(version))? == PathKind::File)
    }

    /// Makes the artifact for `version` available and extracts its generator
    /// source into `target_dir`.
    ///
    /// Downloads only on a cache miss. Returns the path of the cached artifact.
    ///
    /// # Errors
    ///
    /// - [`DeployKfError::ReleaseNotFound`] / [`DeployKfError::AssetNotFound`] on a miss
    ///   for a version that is not published
    /// - [`DeployKfError::DownloadCancelled`] on timeout or Ctrl-C
    /// - [`DeployKfError::ChecksumMismatch`] when the published checksum disagrees
    /// - Any extraction error from [`extract_subtree`]
    pub async fn acquire(&self, version: &str, target_dir: &Path) -> Result<PathBuf> {
        ensure_dir(&self.cache_root).with_context(|| {
            format!("Failed to create assets cache directory: {}", self.cache_root.display())
        })?;

        let artifact_path = self.artifact_path(version);
        if self.is_cached(version)? {
            debug!("Cache hit for {}", artifact_path.display());
        } else {
            info!("Cache miss for {}, downloading from {}", artifact_path.display(), self.repository());
            self.download(version, &artifact_path).await?;
        }

        let archive = artifact_path.clone();
        let target = target_dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            extract_subtree(&archive, &target, GENERATOR_ZIP_SUBTREE)
        })
        .await
        .context("Extraction task panicked")??;

        Ok(artifact_path)
    }

    async fn download(&self, version: &str, artifact_path: &Path) -> Result<()> {
        let artifact_name = self.artifact_name(version);
        let release =
            self.resolver.get_release(&self.github_owner, &self.github_repo, version).await?;

        let asset = release.find_asset(&artifact_name).ok_or_else(|| {
            DeployKfError::AssetNotFound {
                asset: artifact_name.clone(),
                tag: release.tag_name.clone(),
            }
        })?;
        let checksum_asset = if self.verify_checksum {
            release.find_asset(&format!("{artifact_name}{CHECKSUM_ASSET_SUFFIX}"))
        } else {
            None
        };

        let partial_path = partial_path(artifact_path);
        let result = self.download_verified(asset, checksum_asset, &partial_path).await;

        if let Err(e) = result {
            if let Err(cleanup) = tokio::fs::remove_file(&partial_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove partial download {}: {cleanup}", partial_path.display());
                }
            }
            return Err(e);
        }

        tokio::fs::rename(&partial_path, artifact_path).await.with_context(|| {
            format!("Failed to move download into cache: {}", artifact_path.display())
        })?;
        info!("Cached {}", artifact_path.display());
        Ok(())
    }

    async fn download_verified(
        &self,
        asset: &ReleaseAsset,
        checksum_asset: Option<&ReleaseAsset>,
        partial_path: &Path,
    ) -> Result<()> {
        let actual = self.cancellable(asset, self.stream_to_file(asset, partial_path)).await?;

        let Some(checksum_asset) = checksum_asset else {
            debug!("No published checksum for {}, skipping verification", asset.name);
            return Ok(());
        };

        let content = self.cancellable(checksum_asset, self.fetch_text(checksum_asset)).await?;
        match ChecksumVerifier::parse_checksum_file(&content, &asset.name) {
            Some(expected) => ChecksumVerifier::verify(&asset.name, &expected, &actual),
            None => {
                warn!("Checksum file {} has no entry for {}", checksum_asset.name, asset.name);
                Ok(())
            }
        }
    }

    /// Runs `operation` under the download timeout, aborting on Ctrl-C.
    async fn cancellable<T>(
        &self,
        asset: &ReleaseAsset,
        operation: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        let cancelled = |reason: String| -> anyhow::Error {
            DeployKfError::DownloadCancelled {
                asset: asset.name.clone(),
                reason,
            }
            .into()
        };

        tokio::select! {
            result = tokio::time::timeout(self.download_timeout, operation) => match result {
                Ok(inner) => inner,
                Err(_) => Err(cancelled(format!(
                    "timed out after {}s",
                    self.download_timeout.as_secs()
                ))),
            },
            _ = tokio::signal::ctrl_c() => Err(cancelled("interrupted".to_string())),
        }
    }

    /// Streams an asset into `path`, returning the hex SHA-256 of the bytes written.
    async fn stream_to_file(&self, asset: &ReleaseAsset, path: &Path) -> Result<String> {
        let mut download = self.resolver.open_asset(asset).await?;
        let progress = ProgressBar::new_download(download.content_length, &asset.name);

        let mut file = tokio::fs::File::create(path)
            .await
            .with_context(|| format!("Failed to create file: {}", path.display()))?;
        let mut hasher = Sha256::new();

        while let Some(chunk) = download.chunks.next().await {
            let chunk = chunk?;
            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write to {}", path.display()))?;
            progress.inc(chunk.len() as u64);
        }

        file.flush().await?;
        file.sync_all().await.with_context(|| "Failed to sync download to disk")?;
        progress.finish_and_clear();

        debug!("Downloaded {} bytes of {}", progress.position(), asset.name);
        Ok(hex::encode(hasher.finalize()))
    }

    async fn fetch_text(&self, asset: &ReleaseAsset) -> Result<String> {
        let mut download = self.resolver.open_asset(asset).await?;
        let mut bytes = Vec::new();
        while let Some(chunk) = download.chunks.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        String::from_utf8(bytes).with_context(|| format!("{} is not valid UTF-8", asset.name))
    }
}

fn partial_path(artifact_path: &Path) -> PathBuf {
    let mut name = artifact_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(PARTIAL_DOWNLOAD_SUFFIX);
    artifact_path.with_file_name(name)
}
