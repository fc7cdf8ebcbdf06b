//! JSON views of stored batches.

use board_core::error::Result;
use board_core::models::{Records, Summary};
use board_data::document_store::HeadlineDocument;
use board_data::Batch;
use serde_json::{json, Value};

/// Structured representation of one batch.
///
/// Equipment batches use the table layout; headline batches use the same
/// layout as their stored document.
pub fn batch_to_json(batch: &Batch) -> Result<Value> {
    match (batch.summary(), batch.records()) {
        (Summary::Tabular(summary), Records::Tabular(rows)) => Ok(json!({
            "file_name": batch.source_name(),
            "total_count": summary.total_count,
            "avg_temp": summary.avg_temp,
            "avg_flowrate": summary.avg_flowrate,
            "avg_pressure": summary.avg_pressure,
            "type_distribution": summary.type_distribution,
            "records": rows,
            "uploaded_at": batch.created_at().to_rfc3339(),
        })),
        _ => Ok(serde_json::to_value(HeadlineDocument::from_batch(batch)?)?),
    }
}

/// JSON array of `batches`, in the order given.
pub fn history_to_json(batches: &[Batch]) -> Result<Value> {
    let items = batches
        .iter()
        .map(batch_to_json)
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::Array(items))
}
