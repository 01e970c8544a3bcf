//! Narrative generator module
//!
//! This module turns fetched source pages into the three generated lists of
//! a snapshot: events, technology updates and facts.
//!
//! ## Key Components
//!
//! - `TextGenerator`: the model capability, `generate(request) -> text`
//! - `GeminiGenerator`: production implementation over the Gemini REST API
//! - `MockGenerator`: canned replies for tests
//! - `NarrativeGenerator`: per-topic fetch, prompt, generate and parse
//!
//! Generation never fails towards its caller. A transport error, an empty
//! reply or unparseable JSON all end in the topic's static fallback list.

mod json;
pub mod mock;
mod prompts;
mod topic;

pub use json::{extract_json, parse_json_or, strip_code_fences};
pub use mock::MockGenerator;
pub use prompts::{events_prompt, facts_prompt, technology_prompt};
pub use topic::{Sampling, Topic, fallback_events, fallback_facts, fallback_technology};

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::{info, instrument, warn};

use crate::error::{Error, Result};
use crate::fetcher::{Extractor, Fetcher, SourceDocument, source_name};
use crate::gemini::Client;
use crate::gemini::prelude::{Content, GenerationConfig, HttpOptions};
use crate::snapshot::{EventRecord, TechUpdateRecord};

/// A single prompt sent to the model
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub topic: Topic,
    pub prompt: String,
    pub sampling: Sampling,
}

impl GenerationRequest {
    pub fn new(topic: Topic, prompt: String) -> Self {
        Self {
            topic,
            prompt,
            sampling: topic.sampling(),
        }
    }
}

/// Text generation capability
pub trait TextGenerator: Send + Sync {
    /// Produce the model's raw reply for a request
    fn generate(&self, request: &GenerationRequest) -> impl Future<Output = Result<String>> + Send;
}

/// `TextGenerator` backed by Gemini `generateContent`
#[derive(Debug, Clone)]
pub struct GeminiGenerator {
    client: Client,
    model: String,
}

impl GeminiGenerator {
    /// Create a generator for `model` with the default API endpoint
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, model, HttpOptions::default())
    }

    pub fn with_options(
        api_key: impl Into<String>,
        model: impl Into<String>,
        options: HttpOptions,
    ) -> Result<Self> {
        Ok(Self {
            client: Client::with_options(api_key, options)?,
            model: model.into(),
        })
    }
}

impl TextGenerator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let config = GenerationConfig {
            temperature: Some(request.sampling.temperature),
            top_k: request.sampling.top_k,
            top_p: request.sampling.top_p,
            max_output_tokens: Some(request.sampling.max_output_tokens),
        };
        let content = Content::new()
            .with_role("user")
            .with_text(request.prompt.clone());

        let response = self
            .client
            .models()
            .generate_content_with_config(self.model.as_str(), vec![content], Some(config))
            .await?;

        let text = response.text();
        if text.trim().is_empty() {
            let reason = response
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
                .unwrap_or_else(|| "no text in candidates".to_string());
            return Err(Error::UnexpectedResponse(format!(
                "empty model reply: {}",
                reason
            )));
        }
        Ok(text)
    }
}

/// Builds and runs the per-topic generation
pub struct NarrativeGenerator<'a, G> {
    generator: &'a G,
    fetcher: &'a Fetcher,
    extractor: &'a Extractor,
    news_sources: &'a [String],
    tech_sources: &'a [String],
}

impl<'a, G: TextGenerator> NarrativeGenerator<'a, G> {
    pub fn new(
        generator: &'a G,
        fetcher: &'a Fetcher,
        extractor: &'a Extractor,
        news_sources: &'a [String],
        tech_sources: &'a [String],
    ) -> Self {
        Self {
            generator,
            fetcher,
            extractor,
            news_sources,
            tech_sources,
        }
    }

    /// Fetch all sources concurrently and keep the first `limit` usable documents
    async fn gather(&self, urls: &[String], limit: usize) -> Vec<SourceDocument> {
        if limit == 0 || urls.is_empty() {
            return Vec::new();
        }

        let pages = self.fetcher.fetch_all(urls).await;
        let documents: Vec<SourceDocument> = urls
            .iter()
            .zip(pages)
            .filter_map(|(url, page)| self.extractor.extract(page.as_deref(), &source_name(url)))
            .take(limit)
            .collect();

        info!(
            "{} of {} sources usable",
            documents.len(),
            urls.len()
        );
        documents
    }

    async fn run_topic<T: DeserializeOwned>(
        &self,
        topic: Topic,
        prompt: String,
        fallback: Vec<T>,
    ) -> Vec<T> {
        let request = GenerationRequest::new(topic, prompt);
        let mut records = match self.generator.generate(&request).await {
            Ok(text) => parse_json_or(&text, fallback),
            Err(e) => {
                warn!("Generating {} failed: {}", topic, e);
                fallback
            }
        };
        records.truncate(topic.cap());
        info!("{} {} entries generated", records.len(), topic);
        records
    }

    /// Notable events of the last week
    #[instrument(skip(self))]
    pub async fn events(&self, now: DateTime<Utc>) -> Vec<EventRecord> {
        let topic = Topic::Events;
        let documents = self.gather(self.news_sources, topic.source_limit()).await;
        let prompt = events_prompt(&now, &documents, topic.excerpt_chars());
        self.run_topic(topic, prompt, fallback_events(&now)).await
    }

    /// Software and technology updates of the last week
    #[instrument(skip(self))]
    pub async fn technology(&self, now: DateTime<Utc>) -> Vec<TechUpdateRecord> {
        let topic = Topic::Technology;
        let documents = self.gather(self.tech_sources, topic.source_limit()).await;
        let prompt = technology_prompt(&now, &documents, topic.excerpt_chars());
        self.run_topic(topic, prompt, fallback_technology(&now)).await
    }

    /// Orientation facts about the present
    #[instrument(skip(self))]
    pub async fn facts(&self, now: DateTime<Utc>) -> Vec<String> {
        self.run_topic(Topic::Facts, facts_prompt(&now), fallback_facts(&now))
            .await
    }
}
