//! GitHub release lookup and asset download.
//!
//! The source cache talks to releases through the [`ReleaseResolver`] trait so
//! tests can substitute a fake. [`GitHubResolver`] is the production
//! implementation on top of `reqwest` and the public GitHub REST API.

use crate::constants::{GITHUB_API_BASE, GITHUB_API_TIMEOUT, RELEASE_TAG_PREFIX};
use crate::core::DeployKfError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::BoxStream;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

/// A published release and its downloadable assets.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Tag the release was published under (e.g. `v0.1.5`)
    pub tag_name: String,
    /// Files attached to the release
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Finds the asset whose name matches exactly.
    #[must_use]
    pub fn find_asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// One downloadable file of a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    /// File name of the asset
    pub name: String,
    /// Direct download URL
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
    /// Size in bytes as reported by the release API
    #[serde(default)]
    pub size: Option<u64>,
}

/// The body of an asset download.
pub struct AssetDownload {
    /// Total size when the server announced it
    pub content_length: Option<u64>,
    /// The asset bytes, in arrival order
    pub chunks: BoxStream<'static, Result<Vec<u8>>>,
}

/// Resolves versions to releases and opens their assets.
#[async_trait]
pub trait ReleaseResolver: Send + Sync {
    /// Looks up the release for `version` (without the `v` tag prefix).
    ///
    /// Fails with [`DeployKfError::ReleaseNotFound`] when no such release exists.
    async fn get_release(&self, owner: &str, repo: &str, version: &str) -> Result<Release>;

    /// Starts downloading an asset.
    async fn open_asset(&self, asset: &ReleaseAsset) -> Result<AssetDownload>;
}

/// Release tag for a raw version string.
#[must_use]
pub fn release_tag(version: &str) -> String {
    format!("{RELEASE_TAG_PREFIX}{version}")
}

/// [`ReleaseResolver`] backed by the GitHub REST API.
pub struct GitHubResolver {
    client: reqwest::Client,
    api_base: String,
}

impl GitHubResolver {
    /// Creates a resolver for `https://api.github.com`.
    pub fn new() -> Result<Self> {
        Self::with_api_base(GITHUB_API_BASE)
    }

    /// Creates a resolver for a GitHub-compatible API at `api_base`.
    pub fn with_api_base(api_base: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("deploykf-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn release_url(&self, owner: &str, repo: &str, tag: &str) -> String {
        format!("{}/repos/{owner}/{repo}/releases/tags/{tag}", self.api_base)
    }
}

fn network_error(operation: impl Into<String>, reason: impl ToString) -> DeployKfError {
    DeployKfError::NetworkError {
        operation: operation.into(),
        reason: reason.to_string(),
    }
}

#[async_trait]
impl ReleaseResolver for GitHubResolver {
    async fn get_release(&self, owner: &str, repo: &str, version: &str) -> Result<Release> {
        let tag = release_tag(version);
        let url = self.release_url(owner, repo, &tag);
        debug!("Fetching release metadata from {url}");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .timeout(GITHUB_API_TIMEOUT)
            .send()
            .await
            .map_err(|e| network_error(format!("fetch release '{tag}'"), e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(DeployKfError::ReleaseNotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
                tag,
            }
            .into());
        }
        if !response.status().is_success() {
            return Err(network_error(
                format!("fetch release '{tag}'"),
                format!("HTTP {}", response.status()),
            )
            .into());
        }

        let release: Release = response
            .json()
            .await
            .map_err(|e| network_error(format!("parse release '{tag}'"), e))?;
        debug!("Release {} has {} assets", release.tag_name, release.assets.len());
        Ok(release)
    }

    async fn open_asset(&self, asset: &ReleaseAsset) -> Result<AssetDownload> {
        debug!("Downloading asset {} from {}", asset.name, asset.download_url);

        let response = self
            .client
            .get(&asset.download_url)
            .send()
            .await
            .map_err(|e| network_error(format!("download '{}'", asset.name), e))?;

        if !response.status().is_success() {
            return Err(network_error(
                format!("download '{}'", asset.name),
                format!("HTTP {}", response.status()),
            )
            .into());
        }

        let name = asset.name.clone();
        let content_length = response.content_length().or(asset.size);
        let chunks = response
            .bytes_stream()
            .map(move |chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .map_err(|e| anyhow::Error::from(network_error(format!("download '{name}'"), e)))
            })
            .boxed();

        Ok(AssetDownload {
            content_length,
            chunks,
        })
    }
}
