//! Result data models.
//!
//! This module defines the in-memory shapes produced by the executors:
//! single tables, multi-table result sets, scalar values and batch outcomes.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Name given to the first table of a result set; later ones get an index suffix.
pub const DEFAULT_TABLE_NAME: &str = "Table";

/// Logical category for database column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    Integer,
    Float,
    Decimal,
    Boolean,
    Text,
    Binary,
    Json,
    Uuid,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMetadata {
    pub name: String,
    /// Database-specific type (e.g., "int8", "VARCHAR", "TEXT")
    pub type_name: String,
    pub category: TypeCategory,
}

impl ColumnMetadata {
    /// Create new column metadata.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, category: TypeCategory) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            category,
        }
    }
}

/// A single value as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    /// Unsigned values that do not fit in `i64` (MySQL `BIGINT UNSIGNED`)
    UInt(u64),
    Float(f64),
    /// Exact textual form of DECIMAL/NUMERIC
    Decimal(String),
    Text(String),
    #[serde(serialize_with = "serialize_bytes")]
    Bytes(Vec<u8>),
    Json(JsonValue),
    Uuid(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
}

fn serialize_bytes<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    serializer.serialize_str(&STANDARD.encode(bytes))
}

impl ScalarValue {
    /// Check if this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer view of the value, if it is an integer that fits in `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// String view for text-like values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Decimal(s) | Self::Uuid(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl std::fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Decimal(v) | Self::Text(v) | Self::Uuid(v) => f.write_str(v),
            Self::Bytes(v) => {
                use base64::{Engine as _, engine::general_purpose::STANDARD};
                f.write_str(&STANDARD.encode(v))
            }
            Self::Json(v) => write!(f, "{}", v),
            Self::Date(v) => write!(f, "{}", v),
            Self::Time(v) => write!(f, "{}", v),
            Self::Timestamp(v) => write!(f, "{}", v),
            Self::TimestampTz(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

/// One materialized result table: ordered columns and positional rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabularResult {
    pub name: String,
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<Vec<ScalarValue>>,
}

impl TabularResult {
    /// Create an empty table with the given schema.
    pub fn new(columns: Vec<ColumnMetadata>) -> Self {
        Self {
            name: DEFAULT_TABLE_NAME.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<ScalarValue>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Get the number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Position of the first column with the given name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Value at `row`, looked up by column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&ScalarValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Value at row 0, column 0.
    pub fn first_value(&self) -> Option<&ScalarValue> {
        self.rows.first()?.first()
    }
}

/// Every result table produced by one query execution, in delivery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TabularResultSet {
    pub tables: Vec<TabularResult>,
}

impl TabularResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a table, naming it `Table`, `Table1`, `Table2`, ... by position.
    pub fn push(&mut self, mut table: TabularResult) {
        table.name = match self.tables.len() {
            0 => DEFAULT_TABLE_NAME.to_string(),
            n => format!("{}{}", DEFAULT_TABLE_NAME, n),
        };
        self.tables.push(table);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Get a table by position.
    pub fn get(&self, index: usize) -> Option<&TabularResult> {
        self.tables.get(index)
    }

    /// Get a table by name.
    pub fn table(&self, name: &str) -> Option<&TabularResult> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TabularResult> {
        self.tables.iter()
    }

    /// Consume the set, keeping only its first table.
    pub fn into_first(self) -> Option<TabularResult> {
        self.tables.into_iter().next()
    }
}

impl IntoIterator for TabularResultSet {
    type Item = TabularResult;
    type IntoIter = std::vec::IntoIter<TabularResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.into_iter()
    }
}

/// Outcome of a non-atomic batch.
///
/// A failing statement does not produce an `Err`: iteration stops, statements
/// that already ran keep their effects, and the failure text is reported here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// Sum of rows affected by the statements that completed.
    pub rows_affected: u64,
    /// Native error text of the first failing statement, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchOutcome {
    pub fn completed(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            error: None,
        }
    }

    pub fn failed(rows_affected: u64, error: impl Into<String>) -> Self {
        Self {
            rows_affected,
            error: Some(error.into()),
        }
    }

    /// True when every statement in the batch ran.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}
