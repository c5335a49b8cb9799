//! Conversions from stored TEXT columns into typed values.
//!
//! Rows are written by this crate only, so a failed conversion means a
//! corrupted row and is surfaced as a rusqlite conversion error.

use chrono::{DateTime, Utc};
use hooklab_types::{ContentType, VoteType};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

#[derive(Debug, thiserror::Error)]
#[error("unknown value '{0}'")]
struct UnknownValue(String);

pub fn uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub fn optional_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    raw.parse::<DateTime<Utc>>().map_err(|e| conversion_error(idx, e))
}

pub fn content_type(row: &Row<'_>, idx: usize) -> rusqlite::Result<ContentType> {
    let raw: String = row.get(idx)?;
    ContentType::parse(&raw).ok_or_else(|| conversion_error(idx, UnknownValue(raw)))
}

pub fn vote_type(row: &Row<'_>, idx: usize) -> rusqlite::Result<VoteType> {
    let raw: String = row.get(idx)?;
    VoteType::parse(&raw).ok_or_else(|| conversion_error(idx, UnknownValue(raw)))
}

pub fn flag(row: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    Ok(row.get::<_, i32>(idx)? == 1)
}
