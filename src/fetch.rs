//! Topology download with an on-disk cache.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::info;

use crate::topo::Topology;

/// Default source for the county topology.
pub const COUNTIES_URL: &str = "https://cdn.jsdelivr.net/npm/us-atlas@3/counties-10m.json";

/// Fetches the county topology, caching the raw document on disk
pub struct TopologyFetcher {
    client: Client,
}

impl TopologyFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .user_agent("mortar/0.1 (county assignment)")
                .timeout(Duration::from_secs(60))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Load the topology, preferring the cache file when it exists.
    pub async fn load(&self, url: &str, cache: &Path) -> Result<Topology> {
        if cache.exists() {
            info!("Loading cached topology from {}", cache.display());
            let body = tokio::fs::read_to_string(cache)
                .await
                .with_context(|| format!("Failed to read cached topology {}", cache.display()))?;
            return serde_json::from_str(&body).context("Failed to parse cached topology");
        }

        info!("Downloading topology from {}", url);
        let body = self
            .client
            .get(url)
            .send()
            .await
            .context("Topology download failed")?
            .error_for_status()
            .context("Topology download returned an error status")?
            .text()
            .await
            .context("Failed to read topology response body")?;

        let topology =
            serde_json::from_str(&body).context("Failed to parse topology document")?;

        if let Some(parent) = cache.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        tokio::fs::write(cache, &body)
            .await
            .with_context(|| format!("Failed to write topology cache {}", cache.display()))?;
        info!("Cached topology to {}", cache.display());

        Ok(topology)
    }
}
