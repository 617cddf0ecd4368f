//! HTTP media fetcher.
//!
//! Downloads remote video files chunk by chunk to a local destination so
//! multi-gigabyte sources never sit fully in memory.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::traits::MediaFetcher;

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let mut resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !resp.status().is_success() {
            bail!("Download of {} failed (HTTP {})", url, resp.status());
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;

        while let Some(chunk) = resp
            .chunk()
            .await
            .with_context(|| format!("Download of {} was interrupted", url))?
        {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", dest.display()))?;
        }

        file.flush().await?;
        Ok(())
    }
}
