//! Database-agnostic type mappings.
//!
//! This module maps the engines' native column types and values onto
//! [`TypeCategory`] and [`ScalarValue`].
//!
//! # Architecture
//!
//! Type conversion uses a two-phase approach:
//! 1. `categorize_type` classifies column types into logical categories
//! 2. Database-specific decoders handle the actual value extraction
//!
//! SQLite is the exception: its values carry their own storage class, so
//! SQLite rows are decoded by the runtime type of each value rather than the
//! declared column type.

use crate::models::{BackendKind, ColumnMetadata, ScalarValue, TypeCategory};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlRow, MySqlTypeInfo, MySqlValueRef};
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueRef};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, ColumnIndex, Decode, Row, Type, TypeInfo, ValueRef};
use tracing::warn;

// =============================================================================
// Type Classification
// =============================================================================

/// Classify a database type name into a logical category.
pub fn categorize_type(type_name: &str, backend: BackendKind) -> TypeCategory {
    let lower = type_name.to_lowercase();

    // Decimal/Numeric - check first as it overlaps with "numeric" in float checks
    if lower.contains("decimal") || lower.contains("numeric") {
        // SQLite's NUMERIC is actually a float
        if backend == BackendKind::Sqlite && lower == "numeric" {
            return TypeCategory::Float;
        }
        return TypeCategory::Decimal;
    }

    if lower.contains("char") || lower.contains("text") || lower == "name" || lower == "clob" {
        return TypeCategory::Text;
    }

    // Date/time before integers: "interval" and "timestamp" would otherwise match below
    if lower == "timestamptz" || (lower == "timestamp" && backend == BackendKind::MySql) {
        return TypeCategory::TimestampTz;
    }
    if lower.contains("timestamp") || lower == "datetime" {
        return TypeCategory::Timestamp;
    }
    if lower == "date" {
        return TypeCategory::Date;
    }
    if lower == "time" || lower == "timetz" {
        return TypeCategory::Time;
    }
    if lower == "interval" || lower.contains("point") {
        return TypeCategory::Unknown;
    }

    // Boolean
    if lower == "bool" || lower == "boolean" {
        return TypeCategory::Boolean;
    }

    // Integer types
    if lower.contains("int") || lower.contains("serial") {
        return TypeCategory::Integer;
    }

    // Float types
    if lower.contains("float")
        || lower.contains("double")
        || lower == "real"
        || lower == "float4"
        || lower == "float8"
    {
        return TypeCategory::Float;
    }

    // JSON types
    if lower == "json" || lower == "jsonb" {
        return TypeCategory::Json;
    }

    // UUID (PostgreSQL)
    if lower == "uuid" {
        return TypeCategory::Uuid;
    }

    // Binary types
    if lower.contains("blob") || lower.contains("binary") || lower == "bytea" {
        return TypeCategory::Binary;
    }

    TypeCategory::Unknown
}

/// Build column metadata from driver column descriptions.
pub fn columns_metadata<C: Column>(columns: &[C], backend: BackendKind) -> Vec<ColumnMetadata> {
    columns
        .iter()
        .map(|col| {
            let type_name = col.type_info().name();
            ColumnMetadata::new(col.name(), type_name, categorize_type(type_name, backend))
        })
        .collect()
}

// =============================================================================
// Decimal Type Support
// =============================================================================

/// Wrapper type for raw DECIMAL/NUMERIC values as strings.
/// This preserves the exact database representation.
#[derive(Debug)]
pub struct RawDecimal(pub String);

impl Type<sqlx::MySql> for RawDecimal {
    fn type_info() -> MySqlTypeInfo {
        <String as Type<sqlx::MySql>>::type_info()
    }

    fn compatible(ty: &MySqlTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("decimal") || name.contains("numeric")
    }
}

impl<'r> Decode<'r, sqlx::MySql> for RawDecimal {
    fn decode(value: MySqlValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::MySql>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

impl Type<sqlx::Postgres> for RawDecimal {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        let name = ty.name().to_lowercase();
        name.contains("numeric") || name.contains("decimal")
    }
}

// Statements run as raw SQL, so Postgres delivers NUMERIC in text format
impl<'r> Decode<'r, sqlx::Postgres> for RawDecimal {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as Decode<sqlx::Postgres>>::decode(value)?;
        Ok(RawDecimal(s.to_string()))
    }
}

// =============================================================================
// Row Conversion
// =============================================================================

/// Trait for converting driver rows into positional scalar values.
pub trait RowToValues: Row {
    const BACKEND: BackendKind;

    /// Decode the value at `idx`.
    fn value_at(&self, idx: usize) -> ScalarValue;

    fn to_values(&self) -> Vec<ScalarValue> {
        (0..self.len()).map(|idx| self.value_at(idx)).collect()
    }

    fn column_metadata(&self) -> Vec<ColumnMetadata> {
        columns_metadata(self.columns(), Self::BACKEND)
    }

    /// Value of the first column, or `None` for a row without columns.
    fn first_value(&self) -> Option<ScalarValue> {
        (!self.is_empty()).then(|| self.value_at(0))
    }
}

impl RowToValues for MySqlRow {
    const BACKEND: BackendKind = BackendKind::MySql;

    fn value_at(&self, idx: usize) -> ScalarValue {
        if is_null(self, idx) {
            return ScalarValue::Null;
        }
        let type_name = self.columns()[idx].type_info().name();
        let category = categorize_type(type_name, Self::BACKEND);
        mysql::decode_column(self, idx, category).unwrap_or_else(|| decode_fallback(self, idx))
    }
}

impl RowToValues for PgRow {
    const BACKEND: BackendKind = BackendKind::Postgres;

    fn value_at(&self, idx: usize) -> ScalarValue {
        if is_null(self, idx) {
            return ScalarValue::Null;
        }
        let type_name = self.columns()[idx].type_info().name();
        let category = categorize_type(type_name, Self::BACKEND);
        postgres::decode_column(self, idx, category).unwrap_or_else(|| decode_fallback(self, idx))
    }
}

impl RowToValues for SqliteRow {
    const BACKEND: BackendKind = BackendKind::Sqlite;

    fn value_at(&self, idx: usize) -> ScalarValue {
        sqlite::decode_column(self, idx).unwrap_or_else(|| decode_fallback(self, idx))
    }
}

// =============================================================================
// Common Helper Functions
// =============================================================================

fn is_null<R>(row: &R, idx: usize) -> bool
where
    R: Row,
    usize: ColumnIndex<R>,
{
    row.try_get_raw(idx).map(|v| v.is_null()).unwrap_or(true)
}

fn get<'r, R, T>(row: &'r R, idx: usize) -> Option<T>
where
    R: Row,
    T: Decode<'r, R::Database> + Type<R::Database>,
    usize: ColumnIndex<R>,
{
    row.try_get::<T, _>(idx).ok()
}

/// Textual form of a value the category decoder could not read, then raw bytes.
fn decode_fallback<'r, R>(row: &'r R, idx: usize) -> ScalarValue
where
    R: Row,
    String: Decode<'r, R::Database>,
    Vec<u8>: Decode<'r, R::Database>,
    usize: ColumnIndex<R>,
{
    if let Ok(text) = row.try_get_unchecked::<String, _>(idx) {
        return ScalarValue::Text(text);
    }
    match row.try_get_unchecked::<Vec<u8>, _>(idx) {
        Ok(bytes) => ScalarValue::Bytes(bytes),
        Err(e) => {
            warn!(column = idx, error = %e, "Failed to decode column value");
            ScalarValue::Null
        }
    }
}

// =============================================================================
// Database-Specific Decoders
// =============================================================================

mod mysql {
    use super::*;

    pub fn decode_column(row: &MySqlRow, idx: usize, category: TypeCategory) -> Option<ScalarValue> {
        match category {
            TypeCategory::Decimal => get::<_, RawDecimal>(row, idx).map(|v| ScalarValue::Decimal(v.0)),
            TypeCategory::Integer => decode_integer(row, idx),
            TypeCategory::Boolean => get::<_, bool>(row, idx).map(ScalarValue::Bool),
            TypeCategory::Float => get::<_, f64>(row, idx)
                .or_else(|| get::<_, f32>(row, idx).map(f64::from))
                .map(ScalarValue::Float),
            TypeCategory::Text => get::<_, String>(row, idx).map(ScalarValue::Text),
            TypeCategory::Binary => get::<_, Vec<u8>>(row, idx).map(ScalarValue::Bytes),
            TypeCategory::Json => get::<_, JsonValue>(row, idx).map(ScalarValue::Json),
            TypeCategory::Date => get::<_, NaiveDate>(row, idx).map(ScalarValue::Date),
            TypeCategory::Time => get::<_, NaiveTime>(row, idx).map(ScalarValue::Time),
            TypeCategory::Timestamp => get::<_, NaiveDateTime>(row, idx).map(ScalarValue::Timestamp),
            TypeCategory::TimestampTz => {
                get::<_, DateTime<Utc>>(row, idx).map(ScalarValue::TimestampTz)
            }
            TypeCategory::Uuid | TypeCategory::Unknown => None,
        }
    }

    fn decode_integer(row: &MySqlRow, idx: usize) -> Option<ScalarValue> {
        if let Some(v) = get::<_, i64>(row, idx) {
            return Some(ScalarValue::Int(v));
        }
        // Unsigned columns are not i64-compatible
        get::<_, u64>(row, idx).map(|v| match i64::try_from(v) {
            Ok(v) => ScalarValue::Int(v),
            Err(_) => ScalarValue::UInt(v),
        })
    }
}

mod postgres {
    use super::*;

    pub fn decode_column(row: &PgRow, idx: usize, category: TypeCategory) -> Option<ScalarValue> {
        match category {
            TypeCategory::Decimal => get::<_, RawDecimal>(row, idx).map(|v| ScalarValue::Decimal(v.0)),
            TypeCategory::Integer => get::<_, i64>(row, idx)
                .or_else(|| get::<_, i32>(row, idx).map(i64::from))
                .or_else(|| get::<_, i16>(row, idx).map(i64::from))
                .map(ScalarValue::Int),
            TypeCategory::Boolean => get::<_, bool>(row, idx).map(ScalarValue::Bool),
            TypeCategory::Float => get::<_, f64>(row, idx)
                .or_else(|| get::<_, f32>(row, idx).map(f64::from))
                .map(ScalarValue::Float),
            TypeCategory::Text => get::<_, String>(row, idx).map(ScalarValue::Text),
            TypeCategory::Binary => get::<_, Vec<u8>>(row, idx).map(ScalarValue::Bytes),
            TypeCategory::Json => get::<_, JsonValue>(row, idx).map(ScalarValue::Json),
            TypeCategory::Uuid => {
                get::<_, sqlx::types::Uuid>(row, idx).map(|v| ScalarValue::Uuid(v.to_string()))
            }
            TypeCategory::Date => get::<_, NaiveDate>(row, idx).map(ScalarValue::Date),
            TypeCategory::Time => get::<_, NaiveTime>(row, idx).map(ScalarValue::Time),
            TypeCategory::Timestamp => get::<_, NaiveDateTime>(row, idx).map(ScalarValue::Timestamp),
            TypeCategory::TimestampTz => {
                get::<_, DateTime<Utc>>(row, idx).map(ScalarValue::TimestampTz)
            }
            TypeCategory::Unknown => None,
        }
    }
}

mod sqlite {
    use super::*;

    /// Decode by storage class: INTEGER, REAL, TEXT, BLOB or NULL.
    pub fn decode_column(row: &SqliteRow, idx: usize) -> Option<ScalarValue> {
        let storage_class = match row.try_get_raw(idx) {
            Ok(raw) if raw.is_null() => return Some(ScalarValue::Null),
            Ok(raw) => raw.type_info().name().to_string(),
            Err(e) => {
                warn!(column = idx, error = %e, "Failed to read SQLite value");
                return Some(ScalarValue::Null);
            }
        };

        match storage_class.as_str() {
            "INTEGER" => get::<_, i64>(row, idx).map(ScalarValue::Int),
            "REAL" => get::<_, f64>(row, idx).map(ScalarValue::Float),
            "BLOB" => get::<_, Vec<u8>>(row, idx).map(ScalarValue::Bytes),
            "TEXT" => get::<_, String>(row, idx).map(ScalarValue::Text),
            _ => None,
        }
    }
}
