//! # Pipeline Configuration Module
//!
//! All inputs of a run in one explicit value: source URL lists, the keyword
//! list, the version registry table, HTTP limits, the model name and the
//! output path. Defaults carry the built-in tables; a JSON sources file can
//! replace any of the data tables.
//!
//! The API key is not part of this struct. It is read from the environment
//! once at startup with [`api_key_from_env`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::error::Error as CrateError;
use crate::fetcher::{ExtractorConfig, FetchConfig};
use crate::registry::{RegistryEntry, default_registry};

/// Environment variable holding the Gemini API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("cannot read sources file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid sources file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<ConfigError> for CrateError {
    fn from(err: ConfigError) -> Self {
        CrateError::Config(err.to_string())
    }
}

/// Read the API key, treating blank values as missing
pub fn api_key_from_env() -> Result<String, ConfigError> {
    api_key_from(std::env::var(API_KEY_ENV).ok())
}

fn api_key_from(value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or(ConfigError::MissingApiKey)
}

fn default_news_sources() -> Vec<String> {
    [
        "https://www.tagesschau.de/",
        "https://www.spiegel.de/",
        "https://www.zeit.de/",
        "https://www.faz.net/",
        "https://www.sueddeutsche.de/",
        "https://www.welt.de/",
        "https://www.handelsblatt.com/",
        "https://www.wiwo.de/",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_tech_sources() -> Vec<String> {
    [
        "https://www.heise.de/news/",
        "https://www.golem.de/",
        "https://techcrunch.com/",
        "https://www.theverge.com/",
        "https://www.engadget.com/",
        "https://www.zdnet.com/",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Data tables that may be overridden from a JSON file
///
/// Every field is optional; absent fields keep their current value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SourcesFile {
    pub news_sources: Option<Vec<String>>,
    pub tech_sources: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
    pub registry: Option<Vec<RegistryEntry>>,
}

impl SourcesFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Configuration for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Pages fed into the events prompt
    pub news_sources: Vec<String>,

    /// Pages fed into the technology prompt
    pub tech_sources: Vec<String>,

    /// Version registry table
    pub registry: Vec<RegistryEntry>,

    /// Timeout for a single registry lookup in milliseconds
    pub registry_timeout_ms: u64,

    pub fetch: FetchConfig,

    pub extractor: ExtractorConfig,

    /// Gemini model name
    pub model: String,

    /// Snapshot file path
    pub output_path: PathBuf,

    /// Scheduling interval, reported as `nextUpdate`
    pub update_interval_hours: i64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            news_sources: default_news_sources(),
            tech_sources: default_tech_sources(),
            registry: default_registry(),
            registry_timeout_ms: 10_000,
            fetch: FetchConfig::default(),
            extractor: ExtractorConfig::default(),
            model: "gemini-2.5-flash".to_string(),
            output_path: PathBuf::from("context.json"),
            update_interval_hours: 6,
        }
    }
}

impl PipelineConfig {
    /// Create a new builder
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    pub fn registry_timeout(&self) -> Duration {
        Duration::from_millis(self.registry_timeout_ms)
    }

    pub fn update_interval(&self) -> chrono::Duration {
        chrono::Duration::hours(self.update_interval_hours)
    }

    /// Replace data tables with those present in `sources`
    pub fn apply_sources(&mut self, sources: SourcesFile) {
        if let Some(news) = sources.news_sources {
            self.news_sources = news;
        }
        if let Some(tech) = sources.tech_sources {
            self.tech_sources = tech;
        }
        if let Some(keywords) = sources.keywords {
            self.extractor.keywords = keywords;
        }
        if let Some(registry) = sources.registry {
            self.registry = registry;
        }
    }
}

/// Builder for PipelineConfig
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    pub fn news_sources(mut self, news_sources: Vec<String>) -> Self {
        self.config.news_sources = news_sources;
        self
    }

    pub fn tech_sources(mut self, tech_sources: Vec<String>) -> Self {
        self.config.tech_sources = tech_sources;
        self
    }

    pub fn registry(mut self, registry: Vec<RegistryEntry>) -> Self {
        self.config.registry = registry;
        self
    }

    pub fn registry_timeout_ms(mut self, registry_timeout_ms: u64) -> Self {
        self.config.registry_timeout_ms = registry_timeout_ms;
        self
    }

    pub fn fetch(mut self, fetch: FetchConfig) -> Self {
        self.config.fetch = fetch;
        self
    }

    pub fn extractor(mut self, extractor: ExtractorConfig) -> Self {
        self.config.extractor = extractor;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.config.output_path = output_path.into();
        self
    }

    pub fn update_interval_hours(mut self, hours: i64) -> Self {
        self.config.update_interval_hours = hours;
        self
    }

    /// Build the configuration
    pub fn build(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_api_key_validation() {
        assert!(matches!(api_key_from(None), Err(ConfigError::MissingApiKey)));
        assert!(matches!(
            api_key_from(Some("   ".to_string())),
            Err(ConfigError::MissingApiKey)
        ));
        assert_eq!(api_key_from(Some(" abc \n".to_string())).unwrap(), "abc");
    }

    #[test]
    fn test_missing_api_key_message_names_variable() {
        let err = anyhow::Error::from(ConfigError::MissingApiKey);
        assert_eq!(err.to_string(), format!("{API_KEY_ENV} environment variable is not set"));
        assert_eq!(err.chain().count(), 1);
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.news_sources.len(), 8);
        assert_eq!(config.tech_sources.len(), 6);
        assert_eq!(config.output_path, PathBuf::from("context.json"));
        assert_eq!(config.update_interval(), chrono::Duration::hours(6));
    }

    #[test]
    fn test_sources_file_overrides_only_present_tables() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sources.json");
        std::fs::write(
            &path,
            r#"{
                "newsSources": ["https://example.org/"],
                "keywords": ["rust"],
                "registry": [{"name": "Tokio", "url": "https://crates.io/api/v1/crates/tokio", "pointer": "/crate/max_stable_version"}]
            }"#,
        )
        .unwrap();

        let mut config = PipelineConfig::default();
        config.apply_sources(SourcesFile::load(&path).unwrap());

        assert_eq!(config.news_sources, vec!["https://example.org/"]);
        assert_eq!(config.tech_sources.len(), 6);
        assert_eq!(config.extractor.keywords, vec!["rust"]);
        assert_eq!(config.registry.len(), 1);
        assert_eq!(config.registry[0].pointer, "/crate/max_stable_version");
    }

    #[test]
    fn test_sources_file_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(SourcesFile::load(&missing), Err(ConfigError::Read { .. })));

        let invalid = dir.path().join("invalid.json");
        std::fs::write(&invalid, r#"{"newsSource": []}"#).unwrap();
        assert!(matches!(SourcesFile::load(&invalid), Err(ConfigError::Parse { .. })));
    }
}
