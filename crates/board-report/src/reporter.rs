//! Format dispatch over a retention store.

use std::path::Path;

use board_core::error::{BoardError, Result};
use board_core::models::ReportFormat;
use board_data::store::RECENT_WINDOW;
use board_data::{Batch, RetentionPolicy, RetentionStore};
use serde_json::Value;
use tracing::{debug, info};

use crate::detail::DetailSheet;
use crate::html::render_recent_page;
use crate::pdf::render_pdf;
use crate::structured::history_to_json;
use crate::summary::render_cross_batch_summary;

// ── Artifact ──────────────────────────────────────────────────────────────────

/// A rendered report.
#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Text(String),
    Html(String),
    Pdf(Vec<u8>),
    Json(Value),
}

impl Artifact {
    pub fn media_type(&self) -> &'static str {
        match self {
            Artifact::Text(_) => "text/plain",
            Artifact::Html(_) => "text/html",
            Artifact::Pdf(_) => "application/pdf",
            Artifact::Json(_) => "application/json",
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(match self {
            Artifact::Text(s) | Artifact::Html(s) => s.clone().into_bytes(),
            Artifact::Pdf(bytes) => bytes.clone(),
            Artifact::Json(value) => serde_json::to_vec_pretty(value)?,
        })
    }

    /// Write the artifact to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| BoardError::storage(parent, e))?;
        }
        std::fs::write(path, self.to_bytes()?).map_err(|e| BoardError::storage(path, e))?;
        info!("Wrote {} report to {}", self.media_type(), path.display());
        Ok(())
    }
}

// ── Reporter ──────────────────────────────────────────────────────────────────

/// Stateless renderer of stored batches.
pub struct Reporter;

impl Reporter {
    pub fn render(format: ReportFormat, store: &dyn RetentionStore) -> Result<Artifact> {
        debug!("Rendering {:?} report", format);
        match format {
            ReportFormat::DetailText => {
                let batch = Self::latest(store)?;
                Ok(Artifact::Text(DetailSheet::for_batch(&batch).to_text()))
            }
            ReportFormat::DetailPdf => {
                let batch = Self::latest(store)?;
                Ok(Artifact::Pdf(render_pdf(&DetailSheet::for_batch(&batch))?))
            }
            ReportFormat::RecentPage => {
                let batches = Self::recent_for_page(store)?;
                Ok(Artifact::Html(render_recent_page(&batches)))
            }
            ReportFormat::CrossBatchSummary => {
                let batches = store.list_all()?;
                Ok(Artifact::Text(render_cross_batch_summary(&batches)))
            }
            ReportFormat::History => {
                let batches = store.list_recent(RECENT_WINDOW)?;
                Ok(Artifact::Json(history_to_json(&batches)?))
            }
        }
    }

    fn latest(store: &dyn RetentionStore) -> Result<Batch> {
        store.latest()?.ok_or(BoardError::NoData)
    }

    /// Bounded stores show their recent window; unbounded stores show
    /// everything, newest first.
    fn recent_for_page(store: &dyn RetentionStore) -> Result<Vec<Batch>> {
        match store.policy() {
            RetentionPolicy::Bounded { .. } => store.list_recent(RECENT_WINDOW),
            RetentionPolicy::Unbounded => {
                let mut all = store.list_all()?;
                all.reverse();
                Ok(all)
            }
        }
    }
}
