//! Shared types for batchboard: errors, record and summary models, clock and
//! timestamp helpers, number formatting and command-line settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{BoardError, Result};
