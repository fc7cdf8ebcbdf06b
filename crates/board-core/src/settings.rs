use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::error::{BoardError, Result};
use crate::models::ReportFormat;

/// Default headline source.
pub const DEFAULT_SCRAPE_URL: &str = "https://news.ycombinator.com/";

/// File name of the bounded equipment table inside the data directory.
pub const EQUIPMENT_TABLE_FILE: &str = "equipment_table.json";

/// Directory holding one document per headline batch.
pub const HEADLINES_DIR: &str = "headlines";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Ingest equipment readings and headline batches, keep a history and render reports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "batchboard",
    about = "Ingest equipment readings and headline batches, keep a history and render reports",
    version
)]
pub struct Settings {
    /// Data directory (defaults to ~/.batchboard)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Number of equipment uploads kept in history (1-100)
    #[arg(long, global = true, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub capacity: u32,

    /// Logging level
    #[arg(long, global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, env = "DEBUG_MODE")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Which pipeline's store a report reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pipeline {
    /// Bounded history of equipment CSV uploads.
    Equipment,
    /// Unbounded history of scraped headline batches.
    Headlines,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Ingest an equipment CSV file
    Upload {
        /// Path to the CSV file
        path: PathBuf,
    },

    /// Fetch headlines, filter them and store the batch
    Scrape {
        /// Number of headlines to keep
        #[arg(long, default_value_t = 5)]
        limit: usize,

        /// Keep only headlines containing this keyword (case-insensitive)
        #[arg(long, default_value = "")]
        keyword: String,

        /// Page to scrape
        #[arg(long, default_value = DEFAULT_SCRAPE_URL)]
        url: String,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,

        /// API key required to run a scrape
        #[arg(long, env = "API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Render a report from stored batches
    Report {
        /// Report format
        #[arg(value_enum)]
        format: ReportFormat,

        /// Store to read
        #[arg(long, value_enum, default_value = "equipment")]
        pipeline: Pipeline,

        /// Where to write HTML / PDF artifacts
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Log level after applying `--debug` / `DEBUG_MODE`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }

    /// The configured data directory, or `~/.batchboard`.
    pub fn resolve_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir(),
        }
    }

    pub fn equipment_table_path(&self) -> PathBuf {
        self.resolve_data_dir().join(EQUIPMENT_TABLE_FILE)
    }

    pub fn headlines_dir(&self) -> PathBuf {
        self.resolve_data_dir().join(HEADLINES_DIR)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.resolve_data_dir().join("logs")
    }
}

/// Return `~/.batchboard`, falling back to `./.batchboard` without a home.
pub fn default_data_dir() -> PathBuf {
    default_data_dir_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
}

/// The data directory rooted at `base_dir` (used for testing).
pub fn default_data_dir_in(base_dir: &Path) -> PathBuf {
    base_dir.join(".batchboard")
}

/// Reject a scrape without an API key.
pub fn require_api_key(api_key: Option<&str>) -> Result<&str> {
    match api_key.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(BoardError::Config("API_KEY is missing".to_string())),
    }
}

/// Default output path for a rendered report file.
pub fn default_output_path(format: ReportFormat) -> Option<PathBuf> {
    match format {
        ReportFormat::DetailPdf => Some(PathBuf::from("report.pdf")),
        ReportFormat::RecentPage => Some(PathBuf::from("index.html")),
        ReportFormat::DetailText | ReportFormat::CrossBatchSummary | ReportFormat::History => None,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
