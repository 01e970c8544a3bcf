//! Source fetcher module
//!
//! This module provides the HTTP side of the pipeline: bounded GET requests
//! against news sites and registry endpoints, and the extraction of plain
//! text from the fetched pages.
//!
//! Fetch failures never leave this module as errors from [`Fetcher::fetch`];
//! they are logged and turned into "no content".

mod config;
mod content_extraction;
mod error;

pub use config::{ExtractorConfig, FetchConfig};
pub use content_extraction::{Extractor, strip_html, truncate_chars};
pub use error::FetchError;

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future;
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Plain text captured from one source page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Where the text came from (host name)
    pub source: String,

    /// Extracted, bounded page text
    pub content: String,

    /// When the page was captured
    pub captured_at: DateTime<Utc>,
}

/// Identifier used for a source URL in prompts and logs
pub fn source_name(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

/// HTTP fetcher shared by the topic sources and the version registry
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Create a fetcher with the given request limits
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .redirect(Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    /// Fetch a page body
    ///
    /// Returns `None` on any transport error, timeout or non-2xx status.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Option<String> {
        info!("Fetching {}", url);
        match self.try_fetch(url).await {
            Ok(body) => {
                debug!("Fetched {} bytes from {}", body.len(), url);
                Some(body)
            }
            Err(e) => {
                warn!("Error fetching {}: {}", url, e);
                None
            }
        }
    }

    /// Fetch several pages concurrently, keeping input order
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<Option<String>> {
        future::join_all(urls.iter().map(|url| self.fetch(url))).await
    }

    /// GET a JSON document with a request-specific timeout
    ///
    /// Unlike [`Fetcher::fetch`] this reports failures to the caller.
    #[instrument(skip(self))]
    pub async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
