//! Ingestion layer for batchboard.
//!
//! Parses raw CSV and HTML inputs into records, computes batch summaries and
//! persists batches under a bounded or unbounded retention policy.

pub mod aggregator;
pub mod batch;
pub mod document_store;
pub mod markup;
pub mod store;
pub mod table_store;
pub mod tabular;

pub use batch::Batch;
pub use board_core as core;
pub use store::{RetentionPolicy, RetentionStore};
