//! Column codecs shared by the repository modules.
//!
//! Timestamps are stored as RFC 3339 text, list-valued fields as JSON text.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::DatabaseError;

pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(crate) fn timestamp(row: &Row<'_>, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    parse_timestamp(row, column, &raw)
}

pub(crate) fn timestamp_opt(
    row: &Row<'_>,
    column: &str,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|raw| parse_timestamp(row, column, &raw)).transpose()
}

fn parse_timestamp(row: &Row<'_>, column: &str, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_error(row, column, Box::new(e)))
}

pub(crate) fn json<T: DeserializeOwned>(row: &Row<'_>, column: &str) -> rusqlite::Result<T> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(row, column, Box::new(e)))
}

pub(crate) fn to_json<T: Serialize + ?Sized>(
    value: &T,
    column: &'static str,
) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|source| DatabaseError::Encode { column, source })
}

fn conversion_error(
    row: &Row<'_>,
    column: &str,
    source: Box<dyn std::error::Error + Send + Sync + 'static>,
) -> rusqlite::Error {
    let index = row.as_ref().column_index(column).unwrap_or_default();
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, source)
}
