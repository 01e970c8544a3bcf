//! # Context Updater - Temporal Context Snapshots for Language Models
//!
//! This crate produces a JSON snapshot of "what is going on right now" for
//! consumers that lack a reliable sense of the present date. Each run fetches
//! news and technology pages, asks a Gemini model to condense them into
//! structured lists, looks up current release versions from package
//! registries and writes the result durably to `context.json`.
//!
//! ## Features
//!
//! - Concurrent source fetching with per-request timeouts and redirect limits
//! - HTML boilerplate stripping and keyword relevance filtering
//! - Per-topic prompts with tuned sampling parameters
//! - Tolerant JSON recovery from free-form model replies
//! - Static fallbacks so every run produces a complete snapshot
//! - Backup/validate/restore persistence of the output file
//!
//! ## Example
//!
//! ```rust,no_run
//! use context_updater::config::{PipelineConfig, api_key_from_env};
//! use context_updater::generator::GeminiGenerator;
//! use context_updater::pipeline;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_key = api_key_from_env()?;
//!     let config = PipelineConfig::builder().output_path("context.json").build();
//!     let generator = GeminiGenerator::new(api_key, config.model.clone())?;
//!
//!     let report = pipeline::run(&config, &generator).await?;
//!     println!("{} events written", report.snapshot.events.len());
//!     Ok(())
//! }
//! ```

mod error;

pub mod config;
pub mod fetcher;
pub mod gemini;
pub mod generator;
pub mod pipeline;
pub mod registry;
pub mod snapshot;
pub mod writer;

pub use error::{Error, Result};

/// Re-export of commonly used types
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::generator::{GeminiGenerator, TextGenerator};
    pub use crate::snapshot::ContextSnapshot;
}
