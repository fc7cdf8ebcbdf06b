//! Report rendering for batchboard.
//!
//! Turns the contents of a retention store into a detail sheet (text or
//! PDF), an HTML page of recent batches, a cross-batch text summary or a
//! JSON history.

pub mod detail;
pub mod html;
pub mod pdf;
pub mod reporter;
pub mod structured;
pub mod summary;

pub use board_core as core;
pub use reporter::{Artifact, Reporter};
