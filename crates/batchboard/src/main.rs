mod bootstrap;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use board_core::error::BoardError;
use board_core::models::{Records, ReportFormat};
use board_core::settings::{default_output_path, require_api_key, Command, Pipeline, Settings};
use board_core::time_utils::SystemClock;
use board_data::document_store::DocumentStore;
use board_data::markup::HeadlineFilter;
use board_data::table_store::TableStore;
use board_data::RetentionStore;
use board_report::structured::batch_to_json;
use board_report::Artifact;
use board_runtime::{HeadlineFetcher, IngestOutcome, IngestRequest, Orchestrator};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();
    bootstrap::ensure_directories(&settings)?;
    bootstrap::setup_logging(settings.effective_log_level(), settings.log_file.as_ref())?;

    tracing::info!("batchboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!("Data directory: {}", settings.resolve_data_dir().display());

    match &settings.command {
        Command::Upload { path } => run_upload(&settings, path),
        Command::Scrape {
            limit,
            keyword,
            url,
            timeout,
            api_key,
        } => {
            require_api_key(api_key.as_deref())?;
            let filter = HeadlineFilter::new(keyword.as_str(), *limit);
            let fetcher = HeadlineFetcher::new(url.as_str(), Duration::from_secs(*timeout))?;
            run_scrape(&settings, &fetcher, filter).await
        }
        Command::Report {
            format,
            pipeline,
            output,
        } => run_report(&settings, *format, *pipeline, output.as_deref()),
    }
}

fn open_store(settings: &Settings, pipeline: Pipeline) -> Result<Arc<dyn RetentionStore>> {
    let store: Arc<dyn RetentionStore> = match pipeline {
        Pipeline::Equipment => Arc::new(TableStore::open(
            settings.equipment_table_path(),
            settings.capacity as usize,
        )?),
        Pipeline::Headlines => Arc::new(DocumentStore::open(settings.headlines_dir())?),
    };
    Ok(store)
}

fn orchestrator(settings: &Settings, pipeline: Pipeline) -> Result<Orchestrator> {
    Ok(Orchestrator::new(
        open_store(settings, pipeline)?,
        Arc::new(SystemClock),
    ))
}

// ── Commands ───────────────────────────────────────────────────────────────────

fn run_upload(settings: &Settings, path: &Path) -> Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let batch = orchestrator(settings, Pipeline::Equipment)?
        .ingest(IngestRequest::tabular(source_name, bytes))?;

    println!("{}", serde_json::to_string_pretty(&batch_to_json(&batch)?)?);
    Ok(())
}

async fn run_scrape(
    settings: &Settings,
    fetcher: &HeadlineFetcher,
    filter: HeadlineFilter,
) -> Result<()> {
    let orchestrator = orchestrator(settings, Pipeline::Headlines)?;
    let outcome = orchestrator.ingest_remote(fetcher, filter).await?;

    println!("\n--- NEW SCRAPE RESULTS ---");
    match outcome {
        IngestOutcome::Stored(batch) => {
            if let Records::Headlines(items) = batch.records() {
                for (i, title) in items.iter().enumerate() {
                    println!("{}. {}", i + 1, title);
                }
            }
        }
        IngestOutcome::NoNewData => println!("No new headlines."),
    }
    Ok(())
}

fn run_report(
    settings: &Settings,
    format: ReportFormat,
    pipeline: Pipeline,
    output: Option<&Path>,
) -> Result<()> {
    let artifact = match orchestrator(settings, pipeline)?.report(format) {
        Ok(artifact) => artifact,
        Err(BoardError::NoData) => {
            eprintln!("No data available to report on.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let target: Option<PathBuf> = output
        .map(Path::to_path_buf)
        .or_else(|| default_output_path(format));

    match (&artifact, target) {
        (_, Some(path)) => {
            artifact.write_to(&path)?;
            println!("Report written to {}", path.display());
        }
        (Artifact::Text(text), None) => println!("{}", text),
        (Artifact::Json(value), None) => println!("{}", serde_json::to_string_pretty(value)?),
        (other, None) => anyhow::bail!("{} report needs an --output path", other.media_type()),
    }
    Ok(())
}
