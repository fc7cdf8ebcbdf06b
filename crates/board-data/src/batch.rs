//! The immutable unit of ingestion output.

use board_core::models::{InputKind, Records, Summary};
use board_core::time_utils;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregator::Aggregator;

/// Records plus their derived summary, stamped with the ingestion time.
///
/// The summary is always computed from the records by [`Batch::assemble`];
/// there is no way to attach a summary that disagrees with them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Batch {
    source_name: String,
    context: Option<String>,
    records: Records,
    summary: Summary,
    created_at: DateTime<Utc>,
}

impl Batch {
    /// Build a batch, computing its summary with [`Aggregator::aggregate`].
    ///
    /// `context` is the filter that produced the records (the keyword for
    /// headline batches); blank values are dropped.
    pub fn assemble(
        source_name: impl Into<String>,
        context: Option<String>,
        records: Records,
        created_at: DateTime<Utc>,
    ) -> Self {
        let summary = Aggregator::aggregate(&records);
        Self {
            source_name: source_name.into(),
            context: context.filter(|c| !c.trim().is_empty()),
            records,
            summary,
            created_at,
        }
    }

    /// A copy of this batch with a different ingestion time.
    pub fn restamped(&self, created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            ..self.clone()
        }
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn kind(&self) -> InputKind {
        self.records.kind()
    }

    pub fn item_count(&self) -> usize {
        self.summary.item_count()
    }

    /// Second-granularity key, e.g. `"2024-01-15_10-30-00"`.
    pub fn storage_key(&self) -> String {
        time_utils::storage_key(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::models::{FieldValue, TabularField, TabularRecord};
    use chrono::TimeZone;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, secs).unwrap()
    }

    #[test]
    fn test_assemble_computes_summary() {
        let rows = vec![TabularRecord::new().with(TabularField::Flowrate, FieldValue::Number(3.0))];
        let batch = Batch::assemble("plant.csv", None, Records::Tabular(rows), at(0));

        assert_eq!(batch.item_count(), 1);
        assert_eq!(batch.kind(), InputKind::Tabular);
        assert_eq!(batch.summary(), &Aggregator::aggregate(batch.records()));
    }

    #[test]
    fn test_blank_context_dropped() {
        let batch = Batch::assemble("hn", Some("  ".into()), Records::Headlines(vec![]), at(0));
        assert!(batch.context().is_none());

        let batch = Batch::assemble("hn", Some("rust".into()), Records::Headlines(vec![]), at(0));
        assert_eq!(batch.context(), Some("rust"));
    }

    #[test]
    fn test_restamped_keeps_contents() {
        let batch = Batch::assemble("hn", None, Records::Headlines(vec!["a".into()]), at(0));
        let later = batch.restamped(at(1));

        assert_eq!(later.created_at(), at(1));
        assert_eq!(later.records(), batch.records());
        assert_eq!(later.summary(), batch.summary());
        assert_eq!(batch.created_at(), at(0));
    }

    #[test]
    fn test_storage_key() {
        let batch = Batch::assemble("hn", None, Records::Headlines(vec![]), at(7));
        assert_eq!(batch.storage_key(), "2024-01-15_10-00-07");
    }
}
