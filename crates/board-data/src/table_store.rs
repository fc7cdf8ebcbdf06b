//! Bounded equipment history persisted as a single JSON table file.
//!
//! Each upload is one row. `put` rewrites the whole table through a temp
//! file and a rename, so a reader sees either the old table or the new one
//! with eviction already applied.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use board_core::error::{BoardError, Result};
use board_core::models::{Records, Summary, TabularRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::batch::Batch;
use crate::store::{RetentionPolicy, RetentionStore};

// ── Persisted layout ──────────────────────────────────────────────────────────

/// One stored upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    pub id: u64,
    pub file_name: String,
    pub records: Vec<TabularRecord>,
    pub type_distribution: BTreeMap<String, u64>,
    pub total_count: usize,
    pub avg_temp: f64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TableFile {
    next_id: u64,
    rows: Vec<TableRow>,
}

// ── TableStore ────────────────────────────────────────────────────────────────

/// File-backed store with a bounded retention policy.
pub struct TableStore {
    path: PathBuf,
    capacity: usize,
    write_lock: Mutex<()>,
}

impl TableStore {
    /// Open (or lazily create) the table at `path`.
    pub fn open(path: impl Into<PathBuf>, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(BoardError::Config(
                "table capacity must be at least 1".to_string(),
            ));
        }
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BoardError::storage(parent, e))?;
        }
        Ok(Self {
            path,
            capacity,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw rows, oldest first.
    pub fn rows(&self) -> Result<Vec<TableRow>> {
        let mut rows = self.load()?.rows;
        sort_rows(&mut rows);
        Ok(rows)
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn load(&self) -> Result<TableFile> {
        if !self.path.exists() {
            return Ok(TableFile::default());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| BoardError::storage(&self.path, e))?;
        if content.trim().is_empty() {
            return Ok(TableFile::default());
        }
        serde_json::from_str(&content).map_err(|e| BoardError::CorruptStore {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write to a temp file then rename for atomicity.
    fn save(&self, table: &TableFile) -> Result<()> {
        let json = serde_json::to_string_pretty(table)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| BoardError::storage(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| BoardError::storage(&self.path, e))?;
        Ok(())
    }
}

impl RetentionStore for TableStore {
    fn policy(&self) -> RetentionPolicy {
        RetentionPolicy::Bounded {
            capacity: self.capacity,
        }
    }

    fn put(&self, batch: Batch) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut table = self.load()?;
        let id = table.next_id.max(table.rows.iter().map(|r| r.id + 1).max().unwrap_or(0));
        let row = batch_to_row(id, &batch)?;
        table.next_id = id + 1;
        table.rows.push(row);
        sort_rows(&mut table.rows);

        let excess = table.rows.len().saturating_sub(self.capacity);
        if excess > 0 {
            let evicted: Vec<String> = table
                .rows
                .drain(..excess)
                .map(|r| r.file_name)
                .collect();
            debug!("Evicting oldest upload(s): {:?}", evicted);
        }

        self.save(&table)?;
        debug!(
            "Stored {} as row {} ({} rows retained)",
            batch.source_name(),
            id,
            table.rows.len()
        );
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Batch>> {
        Ok(self.rows()?.into_iter().map(row_to_batch).collect())
    }
}

// ── Conversion ────────────────────────────────────────────────────────────────

fn sort_rows(rows: &mut [TableRow]) {
    rows.sort_by(|a, b| (a.uploaded_at, a.id).cmp(&(b.uploaded_at, b.id)));
}

fn batch_to_row(id: u64, batch: &Batch) -> Result<TableRow> {
    let (Records::Tabular(records), Summary::Tabular(summary)) = (batch.records(), batch.summary())
    else {
        return Err(BoardError::MalformedInput(format!(
            "equipment table only stores tabular batches, got {}",
            batch.kind()
        )));
    };

    Ok(TableRow {
        id,
        file_name: batch.source_name().to_string(),
        records: records.clone(),
        type_distribution: summary.type_distribution.clone(),
        total_count: summary.total_count,
        avg_temp: summary.avg_temp,
        avg_flowrate: summary.avg_flowrate,
        avg_pressure: summary.avg_pressure,
        uploaded_at: batch.created_at(),
    })
}

/// Rebuild a batch from its row. The summary is recomputed from the stored
/// records; a disagreement with the stored columns is logged.
fn row_to_batch(row: TableRow) -> Batch {
    let batch = Batch::assemble(
        row.file_name,
        None,
        Records::Tabular(row.records),
        row.uploaded_at,
    );
    if let Summary::Tabular(summary) = batch.summary() {
        let matches = summary.total_count == row.total_count
            && summary.avg_temp == row.avg_temp
            && summary.avg_flowrate == row.avg_flowrate
            && summary.avg_pressure == row.avg_pressure
            && summary.type_distribution == row.type_distribution;
        if !matches {
            warn!(
                "Row {} ({}) summary columns disagree with its records",
                row.id,
                batch.source_name()
            );
        }
    }
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::models::{FieldValue, TabularField};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, secs).unwrap()
    }

    fn reading(kind: &str, flowrate: f64, pressure: f64, temp: f64) -> TabularRecord {
        TabularRecord::new()
            .with(TabularField::Type, FieldValue::Text(kind.to_string()))
            .with(TabularField::Flowrate, FieldValue::Number(flowrate))
            .with(TabularField::Pressure, FieldValue::Number(pressure))
            .with(TabularField::Temperature, FieldValue::Number(temp))
    }

    fn upload(name: &str, secs: u32) -> Batch {
        Batch::assemble(
            name,
            None,
            Records::Tabular(vec![
                reading("Pump", 10.0, 2.0, 100.0),
                reading("Valve", 13.3, 2.7, 98.1),
            ]),
            at(secs),
        )
    }

    fn open(tmp: &TempDir, capacity: usize) -> TableStore {
        TableStore::open(tmp.path().join("equipment_table.json"), capacity).unwrap()
    }

    #[test]
    fn test_empty_table() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp, 5);
        assert!(store.list_all().unwrap().is_empty());
        assert!(store.latest().unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_capacity_invariant_over_many_inserts() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp, 5);

        for i in 0..9u32 {
            store.put(upload(&format!("u{}.csv", i), i)).unwrap();
            assert!(store.count().unwrap() <= 5);
        }

        let names: Vec<String> = store
            .list_all()
            .unwrap()
            .iter()
            .map(|b| b.source_name().to_string())
            .collect();
        assert_eq!(names, vec!["u4.csv", "u5.csv", "u6.csv", "u7.csv", "u8.csv"]);
    }

    #[test]
    fn test_persisted_averages_match_recomputation() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp, 5);
        store.put(upload("plant.csv", 1)).unwrap();

        let rows = store.rows().unwrap();
        let row = &rows[0];
        let recomputed = crate::aggregator::Aggregator::summarize_tabular(&row.records);

        assert_eq!(row.total_count, recomputed.total_count);
        assert_eq!(row.avg_flowrate, recomputed.avg_flowrate);
        assert_eq!(row.avg_pressure, recomputed.avg_pressure);
        assert_eq!(row.avg_temp, recomputed.avg_temp);
        assert_eq!(row.type_distribution, recomputed.type_distribution);
    }

    #[test]
    fn test_decimal_uploads_survive_reload_exactly() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp, 500);

        // Deterministic spread of one- and two-decimal readings.
        let mut seed: u64 = 0x2545_f491;
        let mut next = |modulo: u64| {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            (seed >> 33) % modulo
        };
        for upload in 0..300u32 {
            let mut csv = String::from("Equipment Name,Type,Flowrate,Pressure,Temperature\n");
            for i in 0..7 {
                csv.push_str(&format!(
                    "E{},{},{}.{},{}.{},{}.{:02}\n",
                    i,
                    ["Pump", "Valve", "Reactor"][next(3) as usize],
                    next(200),
                    next(10),
                    next(20),
                    next(10),
                    next(250),
                    next(100)
                ));
            }
            let records = crate::tabular::parse_tabular(csv.as_bytes()).unwrap();
            let batch = Batch::assemble(
                format!("u{}.csv", upload),
                None,
                Records::Tabular(records),
                at(0) + chrono::Duration::seconds(i64::from(upload)),
            );
            store.put(batch).unwrap();
        }

        let reopened = open(&tmp, 500);
        let rows = reopened.rows().unwrap();
        assert_eq!(rows.len(), 300);
        for row in &rows {
            let recomputed = crate::aggregator::Aggregator::summarize_tabular(&row.records);
            assert_eq!(row.avg_flowrate, recomputed.avg_flowrate, "{}", row.file_name);
            assert_eq!(row.avg_pressure, recomputed.avg_pressure, "{}", row.file_name);
            assert_eq!(row.avg_temp, recomputed.avg_temp, "{}", row.file_name);
        }
    }

    #[test]
    fn test_round_trip_through_disk() {
        let tmp = TempDir::new().unwrap();
        let original = upload("plant.csv", 3);
        {
            let store = open(&tmp, 5);
            store.put(original.clone()).unwrap();
        }
        let reopened = open(&tmp, 5);
        let latest = reopened.latest().unwrap().unwrap();
        assert_eq!(latest, original);
    }

    #[test]
    fn test_row_layout_on_disk() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp, 5);
        store.put(upload("plant.csv", 1)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        let row = &raw["rows"][0];
        for key in [
            "file_name",
            "records",
            "type_distribution",
            "total_count",
            "avg_temp",
            "avg_flowrate",
            "avg_pressure",
            "uploaded_at",
        ] {
            assert!(row.get(key).is_some(), "missing column {}", key);
        }
        assert_eq!(row["records"][0]["Type"], "Pump");
    }

    #[test]
    fn test_ids_keep_increasing_after_eviction() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp, 1);
        store.put(upload("a.csv", 1)).unwrap();
        store.put(upload("b.csv", 2)).unwrap();
        let rows = store.rows().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
    }

    #[test]
    fn test_same_second_orders_by_id() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp, 5);
        store.put(upload("first.csv", 4)).unwrap();
        store.put(upload("second.csv", 4)).unwrap();
        assert_eq!(store.latest().unwrap().unwrap().source_name(), "second.csv");
    }

    #[test]
    fn test_rejects_headline_batch() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp, 5);
        let batch = Batch::assemble("hn", None, Records::Headlines(vec!["x".into()]), at(0));
        assert!(store.put(batch).is_err());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_corrupt_table_is_reported() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp, 5);
        std::fs::write(store.path(), "{not json").unwrap();
        let err = store.list_all().unwrap_err();
        assert!(matches!(err, BoardError::CorruptStore { .. }));
        assert!(err.is_storage_error());
    }

    #[test]
    fn test_failed_put_leaves_table_untouched() {
        let tmp = TempDir::new().unwrap();
        let store = open(&tmp, 5);
        store.put(upload("ok.csv", 1)).unwrap();
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(store.put(upload("next.csv", 2)).is_err());
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{not json");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let tmp = TempDir::new().unwrap();
        assert!(TableStore::open(tmp.path().join("t.json"), 0).is_err());
    }
}
