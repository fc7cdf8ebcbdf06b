//! CSV parsing for equipment readings.
//!
//! Turns an uploaded CSV blob into [`TabularRecord`]s. Only the expected
//! columns (see [`TabularField`]) are kept; any of them may be missing.

use board_core::error::{BoardError, Result};
use board_core::models::{FieldValue, TabularField, TabularRecord};
use tracing::debug;

/// Parse CSV bytes into equipment records.
///
/// Header cells are trimmed before matching. Empty cells are treated as
/// absent. Fails with [`BoardError::MalformedInput`] when the input has no
/// header row, is not UTF-8, or has a row wider than the header. Rows
/// shorter than the header leave their trailing fields absent.
pub fn parse_tabular(raw: &[u8]) -> Result<Vec<TabularRecord>> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| BoardError::MalformedInput(format!("input is not UTF-8 text: {}", e)))?;

    if text.trim().is_empty() {
        return Err(BoardError::MalformedInput(
            "no columns to parse from input".to_string(),
        ));
    }

    // Short rows are allowed (missing trailing cells are absent); long rows
    // are rejected below.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| BoardError::MalformedInput(format!("unreadable header row: {}", e)))?
        .clone();

    let columns = map_columns(&headers);
    debug!(
        "CSV header has {} columns, {} recognised",
        headers.len(),
        columns.len()
    );

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        // Line 1 is the header.
        let record = result.map_err(|e| {
            BoardError::MalformedInput(format!("row {}: {}", index + 2, e))
        })?;
        if record.len() > headers.len() {
            return Err(BoardError::MalformedInput(format!(
                "row {}: expected at most {} fields, found {}",
                index + 2,
                headers.len(),
                record.len()
            )));
        }

        let mut row = TabularRecord::new();
        for &(position, field) in &columns {
            let Some(cell) = record.get(position) else {
                continue;
            };
            let cell = cell.trim();
            if !cell.is_empty() {
                row.set(field, FieldValue::from_cell(field, cell));
            }
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Pair each recognised header with its column position. The first
/// occurrence of a repeated header wins.
fn map_columns(headers: &csv::StringRecord) -> Vec<(usize, TabularField)> {
    let mut columns: Vec<(usize, TabularField)> = Vec::new();
    for (position, header) in headers.iter().enumerate() {
        let header = header.trim_start_matches('\u{feff}');
        if let Some(field) = TabularField::from_header(header) {
            if columns.iter().all(|(_, seen)| *seen != field) {
                columns.push((position, field));
            }
        }
    }
    columns
}
