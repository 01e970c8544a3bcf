//! # Context Update Pipeline
//!
//! One run: fetch and generate the three topics while looking up registry
//! versions, assemble the snapshot, persist it durably.
//!
//! Only configuration and persistence errors reach the caller. Everything
//! upstream of the assembler degrades to fallback content instead.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, instrument};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::fetcher::{Extractor, Fetcher};
use crate::generator::{NarrativeGenerator, TextGenerator};
use crate::registry::lookup_versions;
use crate::snapshot::{
    ContextSnapshot, GeneratedContent, MAX_TECHNOLOGY, SourceCounts, assemble, merge_technology,
};
use crate::writer::DurableWriter;

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub snapshot: ContextSnapshot,
    pub output_path: PathBuf,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

/// Run the pipeline once
///
/// # Arguments
///
/// * `config` - Sources, limits and output path
/// * `generator` - Model capability used for all three topics
///
/// # Returns
///
/// The persisted snapshot and write statistics
#[instrument(skip(config, generator), fields(output = %config.output_path.display()))]
pub async fn run<G: TextGenerator>(config: &PipelineConfig, generator: &G) -> Result<RunReport> {
    info!("Context update started");
    let started = Instant::now();
    let now = Utc::now();

    let fetcher = Fetcher::new(config.fetch.clone())?;
    let extractor = Extractor::new(config.extractor.clone());
    let narrative = NarrativeGenerator::new(
        generator,
        &fetcher,
        &extractor,
        &config.news_sources,
        &config.tech_sources,
    );

    let (events, generated_technology, facts, registry_versions) = tokio::join!(
        narrative.events(now),
        narrative.technology(now),
        narrative.facts(now),
        lookup_versions(&fetcher, &config.registry, config.registry_timeout(), now),
    );

    let registry_versions_found = registry_versions.len();
    let content = GeneratedContent {
        events,
        technology: merge_technology(registry_versions, generated_technology, MAX_TECHNOLOGY),
        facts,
        registry_versions_found,
    };
    let counts = SourceCounts {
        news: config.news_sources.len(),
        tech: config.tech_sources.len(),
        registry: config.registry.len(),
    };
    let snapshot = assemble(
        content,
        now,
        counts,
        started.elapsed(),
        config.update_interval(),
    );

    let mut writer = DurableWriter::new(&config.output_path);
    let bytes_written = writer.persist(&snapshot).await?;
    let elapsed = started.elapsed();

    info!(
        date = %snapshot.current_date.iso,
        weekday = %snapshot.current_date.day_of_week,
        events = snapshot.statistics.events_count,
        technology = snapshot.statistics.technology_count,
        facts = snapshot.statistics.facts_count,
        registry_versions = registry_versions_found,
        bytes = bytes_written,
        elapsed_ms = elapsed.as_millis() as u64,
        "Context update finished"
    );

    Ok(RunReport {
        snapshot,
        output_path: config.output_path.clone(),
        bytes_written,
        elapsed,
    })
}
