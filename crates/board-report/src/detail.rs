//! Fixed-layout detail sheet for the newest batch.

use board_core::formatting::format_fixed;
use board_core::models::{Records, Summary};
use board_core::time_utils::display_time;
use board_data::Batch;

pub const EQUIPMENT_TITLE: &str = "Chemical Equipment Parameter Report";
pub const HEADLINE_TITLE: &str = "Headline Batch Report";

/// Title plus labelled lines, shared by the text and PDF renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailSheet {
    pub title: String,
    pub lines: Vec<String>,
}

impl DetailSheet {
    pub fn for_batch(batch: &Batch) -> Self {
        match (batch.summary(), batch.records()) {
            (Summary::Tabular(summary), _) => {
                let mut lines = vec![
                    format!("File Name: {}", batch.source_name()),
                    format!("Total Count: {}", summary.total_count),
                    format!("Average Temperature: {} C", format_fixed(summary.avg_temp, 2)),
                    format!("Average Flowrate: {} m3/h", format_fixed(summary.avg_flowrate, 2)),
                    format!("Average Pressure: {} bar", format_fixed(summary.avg_pressure, 2)),
                    format!("Uploaded At: {}", display_time(batch.created_at())),
                ];
                if !summary.type_distribution.is_empty() {
                    lines.push("Type Distribution:".to_string());
                    lines.extend(
                        summary
                            .type_distribution
                            .iter()
                            .map(|(kind, count)| format!("  {}: {}", kind, count)),
                    );
                }
                Self {
                    title: EQUIPMENT_TITLE.to_string(),
                    lines,
                }
            }
            (Summary::Headlines(summary), records) => {
                let mut lines = vec![
                    format!("Source: {}", batch.source_name()),
                    format!("Timestamp: {}", batch.storage_key()),
                    format!("Keyword: {}", batch.context().unwrap_or("None")),
                    format!("Count: {}", summary.count),
                ];
                if let Records::Headlines(items) = records {
                    lines.extend(
                        items
                            .iter()
                            .enumerate()
                            .map(|(i, h)| format!("{}. {}", i + 1, h)),
                    );
                }
                Self {
                    title: HEADLINE_TITLE.to_string(),
                    lines,
                }
            }
        }
    }

    /// Plain-text rendering: title, underline, then one line per field.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&"=".repeat(self.title.chars().count()));
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::models::{FieldValue, TabularField, TabularRecord};
    use chrono::{TimeZone, Utc};

    fn equipment_batch() -> Batch {
        let rows = vec![
            TabularRecord::new()
                .with(TabularField::Type, FieldValue::Text("Pump".into()))
                .with(TabularField::Flowrate, FieldValue::Number(10.0))
                .with(TabularField::Temperature, FieldValue::Number(100.456)),
            TabularRecord::new()
                .with(TabularField::Type, FieldValue::Text("Valve".into()))
                .with(TabularField::Flowrate, FieldValue::Number(20.0)),
        ];
        Batch::assemble(
            "plant.csv",
            None,
            Records::Tabular(rows),
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_equipment_sheet_labels_and_rounding() {
        let sheet = DetailSheet::for_batch(&equipment_batch());
        assert_eq!(sheet.title, EQUIPMENT_TITLE);
        assert_eq!(sheet.lines[0], "File Name: plant.csv");
        assert_eq!(sheet.lines[1], "Total Count: 2");
        assert_eq!(sheet.lines[2], "Average Temperature: 100.46 C");
        assert_eq!(sheet.lines[3], "Average Flowrate: 15.00 m3/h");
        assert_eq!(sheet.lines[4], "Average Pressure: 0.00 bar");
        assert_eq!(sheet.lines[5], "Uploaded At: 2024-01-15 10:30:00");
        assert!(sheet.lines.contains(&"  Pump: 1".to_string()));
    }

    #[test]
    fn test_headline_sheet() {
        let batch = Batch::assemble(
            "https://news.ycombinator.com/",
            None,
            Records::Headlines(vec!["First".into(), "Second".into()]),
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
        );
        let sheet = DetailSheet::for_batch(&batch);
        assert_eq!(sheet.title, HEADLINE_TITLE);
        assert!(sheet.lines.contains(&"Keyword: None".to_string()));
        assert!(sheet.lines.contains(&"Count: 2".to_string()));
        assert!(sheet.lines.contains(&"Timestamp: 2024-01-15_09-00-00".to_string()));
        assert_eq!(sheet.lines.last().unwrap(), "2. Second");
    }

    #[test]
    fn test_to_text_layout() {
        let sheet = DetailSheet {
            title: "Title".to_string(),
            lines: vec!["A: 1".to_string(), "B: 2".to_string()],
        };
        assert_eq!(sheet.to_text(), "Title\n=====\nA: 1\nB: 2\n");
    }
}
