//! Runtime layer for batchboard.
//!
//! Wires parsers, retention stores and reporters together behind the
//! [`Orchestrator`], and fetches headline pages over HTTP.

pub mod fetcher;
pub mod orchestrator;

pub use board_core as core;
pub use board_data as data;
pub use fetcher::HeadlineFetcher;
pub use orchestrator::{IngestOutcome, IngestRequest, Orchestrator};
