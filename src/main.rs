//! # Context Updater CLI
//!
//! Runs the pipeline once and exits. Intended to be started by an external
//! scheduler every few hours.
//!
//! Exit status is non-zero when the API key is missing, the sources file
//! cannot be loaded or the snapshot cannot be persisted. Source, registry
//! and model failures only degrade the snapshot content.

mod telemetry;

use std::path::PathBuf;

use clap::Parser;
use context_updater::config::{PipelineConfig, SourcesFile, api_key_from_env};
use context_updater::generator::GeminiGenerator;
use context_updater::pipeline;
use telemetry::OtelGuard;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Build a current-events context snapshot for LLM systems", long_about = None)]
struct Cli {
    /// Snapshot output path
    #[arg(short, long, default_value = "context.json")]
    output: PathBuf,

    /// JSON file overriding source lists, keywords or the registry table
    #[arg(short, long)]
    sources: Option<PathBuf>,

    /// Gemini model to use
    #[arg(short, long, default_value = "gemini-2.5-flash")]
    model: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _otel: OtelGuard = telemetry::init_tracing_subscriber();

    let api_key = api_key_from_env()?;

    let mut config = PipelineConfig::builder()
        .output_path(cli.output)
        .model(cli.model)
        .build();
    if let Some(path) = cli.sources {
        let sources = SourcesFile::load(&path)?;
        info!("Loaded source tables from {}", path.display());
        config.apply_sources(sources);
    }

    let generator = GeminiGenerator::new(api_key, config.model.clone())?;
    let report = pipeline::run(&config, &generator).await?;

    info!(
        "Wrote {} bytes to {} in {:.2?}",
        report.bytes_written,
        report.output_path.display(),
        report.elapsed
    );
    Ok(())
}
