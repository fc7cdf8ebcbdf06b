//! Summary statistics over record batches.

use std::collections::BTreeMap;

use board_core::models::{
    HeadlineSummary, Records, Summary, TabularField, TabularRecord, TabularSummary,
};

use crate::batch::Batch;

// ── BatchTotals ───────────────────────────────────────────────────────────────

/// Cross-batch totals used by the summary report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchTotals {
    pub total_batches: usize,
    pub total_items: usize,
}

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Stateless helper computing summaries. Every function here is pure and
/// total: an empty batch yields zero-valued statistics.
pub struct Aggregator;

impl Aggregator {
    /// Compute the summary matching the record kind.
    pub fn aggregate(records: &Records) -> Summary {
        match records {
            Records::Tabular(rows) => Summary::Tabular(Self::summarize_tabular(rows)),
            Records::Headlines(items) => Summary::Headlines(Self::summarize_headlines(items)),
        }
    }

    /// Row count, per-reading means and the distribution of `Type` values.
    pub fn summarize_tabular(rows: &[TabularRecord]) -> TabularSummary {
        TabularSummary {
            total_count: rows.len(),
            avg_flowrate: Self::mean(rows, TabularField::Flowrate),
            avg_pressure: Self::mean(rows, TabularField::Pressure),
            avg_temp: Self::mean(rows, TabularField::Temperature),
            type_distribution: Self::distribution(rows, TabularField::Type),
        }
    }

    pub fn summarize_headlines(items: &[String]) -> HeadlineSummary {
        HeadlineSummary { count: items.len() }
    }

    /// Sum item counts across `batches`.
    pub fn calculate_totals(batches: &[Batch]) -> BatchTotals {
        BatchTotals {
            total_batches: batches.len(),
            total_items: batches.iter().map(Batch::item_count).sum(),
        }
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Mean of the numeric values present for `field`, `0.0` when none are.
    fn mean(rows: &[TabularRecord], field: TabularField) -> f64 {
        let (sum, count) = rows
            .iter()
            .filter_map(|row| row.number(field))
            .fold((0.0_f64, 0usize), |(sum, count), v| (sum + v, count + 1));

        if count == 0 {
            0.0
        } else {
            sum / count as f64
        }
    }

    /// Occurrence count of each distinct value of `field`.
    fn distribution(rows: &[TabularRecord], field: TabularField) -> BTreeMap<String, u64> {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for value in rows.iter().filter_map(|row| row.get(field)) {
            *counts.entry(value.to_string()).or_default() += 1;
        }
        counts
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
