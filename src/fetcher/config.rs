//! # Fetcher Configuration Module
//!
//! Configuration for the source fetcher and the content extractor that runs
//! over each fetched page. Both follow the builder pattern used across the
//! crate.
//!
//! ## Key Components
//!
//! - `FetchConfig`: timeout, redirect cap and user agent for outbound GETs
//! - `ExtractorConfig`: character budget and relevance heuristic for page text
//!
//! The keyword list is plain data. It is German-leaning because the target
//! sources are German news sites, and it can be replaced wholesale from a
//! sources file.

use std::time::Duration;

/// Configuration for outbound HTTP requests
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow
    pub max_redirects: usize,

    /// User agent to send with every request
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            max_redirects: 5,
            user_agent: format!(
                "Mozilla/5.0 (compatible; context-updater/{})",
                env!("CARGO_PKG_VERSION")
            ),
        }
    }
}

impl FetchConfig {
    /// Create a new builder
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder::new()
    }

    /// Get the timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Builder for FetchConfig
#[derive(Debug, Default)]
pub struct FetchConfigBuilder {
    config: FetchConfig,
}

impl FetchConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: FetchConfig::default(),
        }
    }

    /// Set the per-request timeout in milliseconds
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    /// Set the redirect cap
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.config.max_redirects = max_redirects;
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> FetchConfig {
        self.config
    }
}

/// Configuration for turning fetched HTML into prompt-ready text
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Maximum number of characters kept per page
    pub max_chars: usize,

    /// Pages with less text than this are discarded
    pub min_length: usize,

    /// A page must contain at least one of these (case-insensitive).
    /// An empty list disables the keyword check.
    pub keywords: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_chars: 5000,
            min_length: 200,
            keywords: default_keywords(),
        }
    }
}

fn default_keywords() -> Vec<String> {
    [
        "nachrichten",
        "politik",
        "wirtschaft",
        "regierung",
        "unternehmen",
        "technologie",
        "digital",
        "software",
        "sicherheit",
        "künstliche intelligenz",
        "update",
        "release",
        "news",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl ExtractorConfig {
    /// Create a new builder
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder::new()
    }
}

/// Builder for ExtractorConfig
#[derive(Debug, Default)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ExtractorConfig::default(),
        }
    }

    /// Set the character budget per page
    pub fn max_chars(mut self, max_chars: usize) -> Self {
        self.config.max_chars = max_chars;
        self
    }

    /// Set the minimum text length for a relevant page
    pub fn min_length(mut self, min_length: usize) -> Self {
        self.config.min_length = min_length;
        self
    }

    /// Set the relevance keywords
    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.config.keywords = keywords;
        self
    }

    /// Build the configuration
    pub fn build(self) -> ExtractorConfig {
        self.config
    }
}
