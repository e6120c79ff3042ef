//! Row-to-entity parsing helpers and SQL fragments.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic, handle the dual datetime
//! format issue (`SQLite`'s `datetime('now')` vs Rust's `to_rfc3339()`), and
//! narrow `INTEGER` columns to `u32` identifiers.

use chrono::{DateTime, Utc};

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s default
/// format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read a required INTEGER column as a `u32` identifier.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` if the value does not fit in `u32`.
pub fn get_id(row: &libsql::Row, idx: i32) -> Result<u32, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    u32::try_from(raw)
        .map_err(|_| DatabaseError::InvalidState(format!("identifier {raw} out of range")))
}

/// Read a nullable INTEGER column as an optional `u32` identifier.
///
/// # Errors
///
/// Returns `DatabaseError::InvalidState` if a present value does not fit in `u32`.
pub fn get_opt_id(row: &libsql::Row, idx: i32) -> Result<Option<u32>, DatabaseError> {
    row.get::<Option<i64>>(idx)?
        .map(|raw| {
            u32::try_from(raw)
                .map_err(|_| DatabaseError::InvalidState(format!("identifier {raw} out of range")))
        })
        .transpose()
}

/// Read the trailing `created_at, updated_at` pair starting at `idx`.
///
/// # Errors
///
/// Returns `DatabaseError` if either column is missing or unparseable.
pub fn get_timestamps(
    row: &libsql::Row,
    idx: i32,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>), DatabaseError> {
    let created = parse_datetime(&row.get::<String>(idx)?)?;
    let updated = parse_datetime(&row.get::<String>(idx + 1)?)?;
    Ok((Some(created), Some(updated)))
}

/// `?start, ?start+1, ...` for `count` positional parameters.
#[must_use]
pub fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Bindable values for a list of identifiers.
#[must_use]
pub fn id_values(ids: &[u32]) -> Vec<libsql::Value> {
    ids.iter()
        .map(|id| libsql::Value::Integer(i64::from(*id)))
        .collect()
}

/// Bindable value for an identifier.
#[must_use]
pub fn id_value(id: u32) -> libsql::Value {
    libsql::Value::Integer(i64::from(id))
}

/// Bindable value for an optional identifier (`NULL` when absent).
#[must_use]
pub fn opt_id_value(id: Option<u32>) -> libsql::Value {
    id.map_or(libsql::Value::Null, id_value)
}

/// Bindable value for optional text (`NULL` when absent).
#[must_use]
pub fn opt_text_value(text: Option<&str>) -> libsql::Value {
    text.map_or(libsql::Value::Null, |t| libsql::Value::Text(t.to_string()))
}
