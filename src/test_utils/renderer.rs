//! Renderer double for tests

use crate::render::{RenderPhase, RenderRequest, RenderTarget, Renderer};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Mutex;

/// [`Renderer`] that records requests instead of running the engine.
///
/// A manifests render writes `manifest.yaml` into the output directory so
/// tests can observe that rendering happened after the marker was written.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    requests: Mutex<Vec<RenderRequest>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<RenderRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Renderer for RecordingRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<()> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        if let (RenderPhase::Manifests, RenderTarget::OutputDir(dir)) =
            (request.phase, &request.target)
        {
            std::fs::create_dir_all(dir)?;
            std::fs::write(dir.join("manifest.yaml"), "kind: Application\n")?;
        }
        Ok(())
    }
}
