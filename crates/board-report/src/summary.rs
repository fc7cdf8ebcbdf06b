//! Cross-batch textual summary.

use board_core::formatting::{format_count, pluralize};
use board_core::models::InputKind;
use board_data::aggregator::Aggregator;
use board_data::Batch;

pub const NO_DATA_MESSAGE: &str = "No data files found to report on.";

/// One line per batch (expects oldest first), followed by the totals.
/// An empty slice yields [`NO_DATA_MESSAGE`].
pub fn render_cross_batch_summary(batches: &[Batch]) -> String {
    if batches.is_empty() {
        return NO_DATA_MESSAGE.to_string();
    }

    let totals = Aggregator::calculate_totals(batches);
    let mut lines: Vec<String> = vec!["--- BATCH REPORT ---".to_string()];
    lines.extend(batches.iter().map(batch_line));
    lines.push("----------------------".to_string());
    lines.push(format!("Total Batches Scanned: {}", format_count(totals.total_batches)));
    lines.push(format!("Total Items Collected: {}", format_count(totals.total_items)));
    lines.join("\n")
}

fn batch_line(batch: &Batch) -> String {
    match batch.kind() {
        InputKind::Markup => format!(
            "{}: Found {}.",
            batch.storage_key(),
            pluralize(batch.item_count(), "headline")
        ),
        InputKind::Tabular => format!(
            "{}: Found {} in {}.",
            batch.storage_key(),
            pluralize(batch.item_count(), "row"),
            batch.source_name()
        ),
    }
}
