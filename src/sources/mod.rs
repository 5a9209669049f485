//! Page sources: where the listing content comes from
//!
//! The orchestrator only sees the [`PageFetcher`] and [`PageRenderer`] traits,
//! so tests can substitute canned content for the network and the browser.

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::errors::{SourceError, SourceResult};

pub mod render;

pub use render::{HeadlessBrowserRenderer, PageRenderer};

/// Fetches the raw listing page. One attempt, no retries.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> SourceResult<String>;
}

/// HTTP(S) fetcher with a fixed timeout
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(config: &SourceConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| SourceError::request(&config.url, format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> SourceResult<String> {
        info!("Fetching channel listing from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unexpected status")
                    .to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::from_reqwest(url, e))?;

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

/// Reads a saved copy of the listing instead of hitting the network
pub struct FilePageFetcher {
    path: PathBuf,
}

impl FilePageFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PageFetcher for FilePageFetcher {
    async fn fetch(&self, _url: &str) -> SourceResult<String> {
        info!("Reading channel listing from {}", self.path.display());
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })
    }
}
