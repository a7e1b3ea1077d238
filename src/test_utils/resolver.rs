//! In-memory release resolver for tests

use crate::core::DeployKfError;
use crate::source::github::{AssetDownload, Release, ReleaseAsset, ReleaseResolver, release_tag};
use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How asset downloads behave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum DownloadMode {
    #[default]
    Complete,
    /// First chunk arrives, then a network error
    FailAfterFirstChunk,
    /// First chunk arrives, then nothing ever again
    Stall,
}

/// [`ReleaseResolver`] serving releases registered with [`FakeResolver::with_release`].
///
/// Every asset is served in two chunks. Calls are counted so tests can assert
/// on network traffic.
#[derive(Debug, Default)]
pub struct FakeResolver {
    releases: HashMap<String, Vec<ReleaseAsset>>,
    contents: HashMap<String, Vec<u8>>,
    mode: DownloadMode,
    release_lookups: AtomicUsize,
    asset_downloads: AtomicUsize,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a release for `version` with the given assets.
    #[must_use]
    pub fn with_release(mut self, version: &str, assets: &[(&str, Vec<u8>)]) -> Self {
        let mut published = Vec::new();
        for (name, bytes) in assets {
            let url = format!("fake://releases/{version}/{name}");
            published.push(ReleaseAsset {
                name: (*name).to_string(),
                download_url: url.clone(),
                size: Some(bytes.len() as u64),
            });
            self.contents.insert(url, bytes.clone());
        }
        self.releases.insert(version.to_string(), published);
        self
    }

    /// Downloads fail with a network error after their first chunk.
    #[must_use]
    pub fn failing_after_first_chunk(mut self) -> Self {
        self.mode = DownloadMode::FailAfterFirstChunk;
        self
    }

    /// Downloads hang after their first chunk.
    #[must_use]
    pub fn stalling(mut self) -> Self {
        self.mode = DownloadMode::Stall;
        self
    }

    /// Number of [`ReleaseResolver::get_release`] calls so far.
    pub fn release_lookups(&self) -> usize {
        self.release_lookups.load(Ordering::SeqCst)
    }

    /// Number of [`ReleaseResolver::open_asset`] calls so far.
    pub fn asset_downloads(&self) -> usize {
        self.asset_downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseResolver for FakeResolver {
    async fn get_release(&self, owner: &str, repo: &str, version: &str) -> Result<Release> {
        self.release_lookups.fetch_add(1, Ordering::SeqCst);

        let assets = self.releases.get(version).ok_or_else(|| DeployKfError::ReleaseNotFound {
            owner: owner.to_string(),
            repo: repo.to_string(),
            tag: release_tag(version),
        })?;

        Ok(Release {
            tag_name: release_tag(version),
            assets: assets.clone(),
        })
    }

    async fn open_asset(&self, asset: &ReleaseAsset) -> Result<AssetDownload> {
        self.asset_downloads.fetch_add(1, Ordering::SeqCst);

        let bytes = self.contents.get(&asset.download_url).cloned().ok_or_else(|| {
            DeployKfError::NetworkError {
                operation: format!("download '{}'", asset.name),
                reason: "HTTP 404 Not Found".to_string(),
            }
        })?;

        let split = bytes.len() / 2;
        let first = bytes[..split].to_vec();
        let rest = bytes[split..].to_vec();
        let head = stream::once(async move { Ok::<_, anyhow::Error>(first) });

        let chunks = match self.mode {
            DownloadMode::Complete => head.chain(stream::once(async move { Ok(rest) })).boxed(),
            DownloadMode::FailAfterFirstChunk => {
                let name = asset.name.clone();
                head.chain(stream::once(async move {
                    Err(anyhow::Error::from(DeployKfError::NetworkError {
                        operation: format!("download '{name}'"),
                        reason: "connection reset".to_string(),
                    }))
                }))
                .boxed()
            }
            DownloadMode::Stall => head.chain(stream::pending()).boxed(),
        };

        Ok(AssetDownload {
            content_length: Some(bytes.len() as u64),
            chunks,
        })
    }
}
