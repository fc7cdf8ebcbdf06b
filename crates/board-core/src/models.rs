use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The declared shape of a raw input blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    /// CSV text with equipment readings.
    Tabular,
    /// An HTML document containing headline links.
    Markup,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputKind::Tabular => write!(f, "tabular"),
            InputKind::Markup => write!(f, "markup"),
        }
    }
}

/// Which report artifact to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportFormat {
    /// Latest batch as a fixed-layout text sheet.
    DetailText,
    /// Latest batch as a one-page PDF.
    DetailPdf,
    /// Recent batches as an HTML page of cards.
    RecentPage,
    /// One line per stored batch plus totals.
    CrossBatchSummary,
    /// Recent batches as structured JSON.
    History,
}

/// One of the expected columns of an equipment CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TabularField {
    #[serde(rename = "Equipment Name")]
    EquipmentName,
    #[serde(rename = "Type")]
    Type,
    #[serde(rename = "Flowrate")]
    Flowrate,
    #[serde(rename = "Pressure")]
    Pressure,
    #[serde(rename = "Temperature")]
    Temperature,
}

impl TabularField {
    /// Every expected column, in header order.
    pub const ALL: [TabularField; 5] = [
        TabularField::EquipmentName,
        TabularField::Type,
        TabularField::Flowrate,
        TabularField::Pressure,
        TabularField::Temperature,
    ];

    /// Literal header text for this column.
    pub fn header(self) -> &'static str {
        match self {
            TabularField::EquipmentName => "Equipment Name",
            TabularField::Type => "Type",
            TabularField::Flowrate => "Flowrate",
            TabularField::Pressure => "Pressure",
            TabularField::Temperature => "Temperature",
        }
    }

    /// Match a raw header cell (surrounding whitespace ignored) to a column.
    pub fn from_header(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL.into_iter().find(|f| f.header() == trimmed)
    }

    /// Whether the column carries a numeric reading.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            TabularField::Flowrate | TabularField::Pressure | TabularField::Temperature
        )
    }
}

impl fmt::Display for TabularField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// A single present cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Build a value from a raw cell. Numeric columns keep parseable cells
    /// as numbers; everything else stays text.
    pub fn from_cell(field: TabularField, cell: &str) -> Self {
        if field.is_numeric() {
            if let Ok(n) = cell.parse::<f64>() {
                if n.is_finite() {
                    return FieldValue::Number(n);
                }
            }
        }
        FieldValue::Text(cell.to_string())
    }

    /// The numeric reading, if this value is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// One row of equipment readings. A column missing from the map is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabularRecord {
    values: BTreeMap<TabularField, FieldValue>,
}

impl TabularRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: TabularField, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: TabularField, value: FieldValue) {
        self.values.insert(field, value);
    }

    pub fn get(&self, field: TabularField) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    /// Numeric reading for `field`, `None` when absent or unparseable.
    pub fn number(&self, field: TabularField) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_number)
    }

    /// Present columns in header order.
    pub fn fields(&self) -> impl Iterator<Item = (TabularField, &FieldValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The ordered records of one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum Records {
    Tabular(Vec<TabularRecord>),
    Headlines(Vec<String>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Records::Tabular(rows) => rows.len(),
            Records::Headlines(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Records::Tabular(_) => InputKind::Tabular,
            Records::Headlines(_) => InputKind::Markup,
        }
    }
}

/// Summary statistics for a batch of equipment readings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularSummary {
    pub total_count: usize,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temp: f64,
    pub type_distribution: BTreeMap<String, u64>,
}

/// Summary statistics for a batch of headlines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadlineSummary {
    pub count: usize,
}

/// Derived statistics, always computed from a batch's records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Summary {
    Tabular(TabularSummary),
    Headlines(HeadlineSummary),
}

impl Summary {
    /// Number of records the summary was computed over.
    pub fn item_count(&self) -> usize {
        match self {
            Summary::Tabular(s) => s.total_count,
            Summary::Headlines(s) => s.count,
        }
    }
}
