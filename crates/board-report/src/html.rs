//! HTML dashboard page listing recent batches as cards.

use board_core::formatting::format_fixed;
use board_core::models::{Records, Summary, TabularField, TabularRecord};
use board_core::time_utils::display_time;
use board_data::Batch;

pub const NO_DATA_PLACEHOLDER: &str = "No data found to build dashboard.";

const PICO_CSS: &str = "https://cdn.jsdelivr.net/npm/@picocss/pico@1/css/pico.min.css";

/// Render one `<article>` per batch, in the order given (newest first).
/// An empty slice renders the placeholder page.
pub fn render_recent_page(batches: &[Batch]) -> String {
    let content = if batches.is_empty() {
        format!("<p>{}</p>", NO_DATA_PLACEHOLDER)
    } else {
        batches.iter().map(card).collect::<Vec<_>>().join("\n")
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="stylesheet" href="{css}">
    <title>Batchboard</title>
</head>
<body>
    <main class="container">
        <hgroup>
            <h1>Batchboard</h1>
            <h2>Recent batches</h2>
        </hgroup>
{content}
    </main>
</body>
</html>
"#,
        css = PICO_CSS,
        content = content
    )
}

fn card(batch: &Batch) -> String {
    let (timestamp, context, summary_line, items) = match (batch.summary(), batch.records()) {
        (Summary::Tabular(s), Records::Tabular(rows)) => (
            display_time(batch.created_at()),
            format!("File: {}", batch.source_name()),
            Some(format!(
                "{} rows · avg flowrate {} · avg pressure {} · avg temperature {}",
                s.total_count,
                format_fixed(s.avg_flowrate, 2),
                format_fixed(s.avg_pressure, 2),
                format_fixed(s.avg_temp, 2)
            )),
            rows.iter().map(describe_row).collect::<Vec<_>>(),
        ),
        (_, Records::Headlines(items)) => (
            batch.storage_key(),
            format!("Keyword: {}", batch.context().unwrap_or("None")),
            None,
            items.clone(),
        ),
        (_, Records::Tabular(rows)) => (
            display_time(batch.created_at()),
            format!("File: {}", batch.source_name()),
            None,
            rows.iter().map(describe_row).collect::<Vec<_>>(),
        ),
    };

    let list: String = items
        .iter()
        .map(|item| format!("<li>{}</li>", escape_html(item)))
        .collect();
    let summary_html = summary_line
        .map(|line| format!("\n            <p><small>{}</small></p>", escape_html(&line)))
        .unwrap_or_default();

    format!(
        r#"        <article>
            <header>
                <strong>{}</strong>
                <mark style="float: right;">{}</mark>
            </header>{}
            <ul>{}</ul>
        </article>"#,
        escape_html(&timestamp),
        escape_html(&context),
        summary_html,
        list
    )
}

/// One-line description of an equipment row: name and type first, then
/// the readings that are present.
fn describe_row(row: &TabularRecord) -> String {
    let mut parts: Vec<String> = Vec::new();
    for field in [TabularField::EquipmentName, TabularField::Type] {
        if let Some(value) = row.get(field) {
            parts.push(value.to_string());
        }
    }
    for field in [
        TabularField::Flowrate,
        TabularField::Pressure,
        TabularField::Temperature,
    ] {
        if let Some(value) = row.get(field) {
            parts.push(format!("{} {}", field, value));
        }
    }
    if parts.is_empty() {
        "(empty row)".to_string()
    } else {
        parts.join(" · ")
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::models::FieldValue;
    use chrono::{TimeZone, Utc};

    fn headlines(keyword: Option<&str>, items: &[&str], secs: u32) -> Batch {
        Batch::assemble(
            "hn",
            keyword.map(str::to_string),
            Records::Headlines(items.iter().map(|s| s.to_string()).collect()),
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, secs).unwrap(),
        )
    }

    #[test]
    fn test_empty_renders_placeholder() {
        let html = render_recent_page(&[]);
        assert!(html.contains(NO_DATA_PLACEHOLDER));
        assert!(!html.contains("<article>"));
    }

    #[test]
    fn test_one_card_per_batch_in_given_order() {
        let html = render_recent_page(&[
            headlines(Some("rust"), &["Rust news"], 2),
            headlines(None, &["Go release"], 1),
        ]);
        assert_eq!(html.matches("<article>").count(), 2);
        let newer = html.find("2024-01-15_10-00-02").unwrap();
        let older = html.find("2024-01-15_10-00-01").unwrap();
        assert!(newer < older);
        assert!(html.contains("Keyword: rust"));
        assert!(html.contains("Keyword: None"));
        assert!(html.contains("<li>Rust news</li>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_recent_page(&[headlines(None, &["<script>alert(1)</script> & co"], 0)]);
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; co"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_equipment_card() {
        let rows = vec![TabularRecord::new()
            .with(TabularField::EquipmentName, FieldValue::Text("Pump-1".into()))
            .with(TabularField::Type, FieldValue::Text("Pump".into()))
            .with(TabularField::Flowrate, FieldValue::Number(12.5))];
        let batch = Batch::assemble(
            "plant.csv",
            None,
            Records::Tabular(rows),
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
        );
        let html = render_recent_page(&[batch]);
        assert!(html.contains("File: plant.csv"));
        assert!(html.contains("<li>Pump-1 · Pump · Flowrate 12.5</li>"));
        assert!(html.contains("avg flowrate 12.50"));
    }

    #[test]
    fn test_describe_empty_row() {
        assert_eq!(describe_row(&TabularRecord::new()), "(empty row)");
    }
}
