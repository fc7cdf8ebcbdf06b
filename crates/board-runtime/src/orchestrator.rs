//! Ingest and report entry points.
//!
//! The [`Orchestrator`] owns one retention store and one clock. An ingest
//! parses the raw bytes, assembles a [`Batch`] stamped by the clock and
//! hands it to the store; nothing is written unless every step succeeds.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use board_core::error::Result;
use board_core::models::{InputKind, Records, ReportFormat};
use board_core::time_utils::Clock;
use board_data::markup::{parse_markup, HeadlineFilter};
use board_data::tabular::parse_tabular;
use board_data::{Batch, RetentionStore};
use board_report::{Artifact, Reporter};
use chrono::{DateTime, SubsecRound, Utc};

use crate::fetcher::HeadlineFetcher;

/// Attempts made to store a batch whose key collides with an existing one.
const MAX_PUT_ATTEMPTS: u32 = 3;

/// Pause before restamping a colliding batch.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

// ── Requests / outcomes ───────────────────────────────────────────────────────

/// Raw input for a single ingest.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub source_name: String,
    pub kind: InputKind,
    pub bytes: Vec<u8>,
    /// Only consulted for markup input.
    pub filter: HeadlineFilter,
}

impl IngestRequest {
    pub fn tabular(source_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            source_name: source_name.into(),
            kind: InputKind::Tabular,
            bytes,
            filter: HeadlineFilter::default(),
        }
    }

    pub fn markup(source_name: impl Into<String>, bytes: Vec<u8>, filter: HeadlineFilter) -> Self {
        Self {
            source_name: source_name.into(),
            kind: InputKind::Markup,
            bytes,
            filter,
        }
    }
}

/// Result of a remote ingest.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Stored(Batch),
    /// The page could not be fetched; the store was not touched.
    NoNewData,
}

// ── Orchestrator ──────────────────────────────────────────────────────────────

pub struct Orchestrator {
    store: Arc<dyn RetentionStore>,
    clock: Arc<dyn Clock>,
    retry_delay: Duration,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn RetentionStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Parse, summarize and store one input.
    ///
    /// Blocks for `retry_delay` between storage attempts; async callers use
    /// [`Orchestrator::ingest_async`].
    pub fn ingest(&self, request: IngestRequest) -> Result<Batch> {
        let mut batch = self.prepare(request)?;
        let mut attempt = 1;
        while !self.try_put(&batch, attempt)? {
            thread::sleep(self.retry_delay);
            batch = batch.restamped(self.stamp(batch.kind()));
            attempt += 1;
        }
        Self::log_stored(&batch);
        Ok(batch)
    }

    /// [`Orchestrator::ingest`] for callers on the async runtime: the pause
    /// between storage attempts yields instead of blocking the worker.
    pub async fn ingest_async(&self, request: IngestRequest) -> Result<Batch> {
        let mut batch = self.prepare(request)?;
        let mut attempt = 1;
        while !self.try_put(&batch, attempt)? {
            tokio::time::sleep(self.retry_delay).await;
            batch = batch.restamped(self.stamp(batch.kind()));
            attempt += 1;
        }
        Self::log_stored(&batch);
        Ok(batch)
    }

    /// Fetch the headline page and ingest it. Fetch failures are logged and
    /// reported as [`IngestOutcome::NoNewData`].
    pub async fn ingest_remote(
        &self,
        fetcher: &HeadlineFetcher,
        filter: HeadlineFilter,
    ) -> Result<IngestOutcome> {
        let bytes = match fetcher.fetch().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(url = %fetcher.url(), error = %e, "fetch failed; nothing stored");
                return Ok(IngestOutcome::NoNewData);
            }
        };
        if let Some(keyword) = filter.keyword() {
            tracing::info!("Filtering for keyword: '{}'", keyword);
        }
        let batch = self
            .ingest_async(IngestRequest::markup(fetcher.url(), bytes, filter))
            .await?;
        Ok(IngestOutcome::Stored(batch))
    }

    pub fn report(&self, format: ReportFormat) -> Result<Artifact> {
        let artifact = Reporter::render(format, self.store.as_ref())?;
        tracing::info!(format = ?format, "report rendered");
        Ok(artifact)
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// Parse the input and assemble a stamped batch. Nothing is stored.
    fn prepare(&self, request: IngestRequest) -> Result<Batch> {
        let IngestRequest {
            source_name,
            kind,
            bytes,
            filter,
        } = request;

        let (records, context) = match kind {
            InputKind::Tabular => (Records::Tabular(parse_tabular(&bytes)?), None),
            InputKind::Markup => (
                Records::Headlines(parse_markup(&bytes, &filter)?),
                filter.keyword().map(str::to_string),
            ),
        };
        tracing::debug!(kind = %kind, records = records.len(), "input parsed");

        Ok(Batch::assemble(source_name, context, records, self.stamp(kind)))
    }

    /// Ingestion time for a batch of `kind`. Headline documents are keyed to
    /// the second, so their stamps carry no sub-second part.
    fn stamp(&self, kind: InputKind) -> DateTime<Utc> {
        let now = self.clock.now();
        match kind {
            InputKind::Markup => now.trunc_subsecs(0),
            InputKind::Tabular => now,
        }
    }

    /// One storage attempt. `Ok(false)` means the key was taken and another
    /// attempt is allowed; after [`MAX_PUT_ATTEMPTS`] the collision is
    /// returned. Other errors are returned at once.
    fn try_put(&self, batch: &Batch, attempt: u32) -> Result<bool> {
        match self.store.put(batch.clone()) {
            Ok(()) => Ok(true),
            Err(e) if e.is_retryable() && attempt < MAX_PUT_ATTEMPTS => {
                tracing::warn!(attempt, error = %e, "storage key taken; retrying");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn log_stored(batch: &Batch) {
        tracing::info!(
            key = %batch.storage_key(),
            items = batch.item_count(),
            "Successfully stored {} batch from {}",
            batch.kind(),
            batch.source_name()
        );
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("policy", &self.store.policy())
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}
