// SPDX-FileCopyrightText: 2026 Postloom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row-to-domain conversion helpers shared by the query modules.
//!
//! The canonical entity types are defined in `postloom-core::types`; this
//! module handles the TEXT-column encodings (ISO 8601 timestamps, JSON topic
//! lists, strum enum labels) used by the SQLite schema.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;

pub use postloom_core::types::{Brand, Post, User};

/// Encode a timestamp as stored in TEXT columns.
pub(crate) fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decode a required timestamp column, mapping parse failures to a
/// rusqlite conversion error carrying the column index.
pub(crate) fn decode_ts(idx: usize, raw: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Decode an optional timestamp column.
pub(crate) fn decode_opt_ts(
    idx: usize,
    raw: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.map(|s| decode_ts(idx, s)).transpose()
}

/// Decode a strum-labelled enum column (plan tier, platform, status).
pub(crate) fn decode_enum<T: FromStr>(idx: usize, raw: String) -> rusqlite::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[derive(Debug, thiserror::Error)]
#[error("status '{status}' does not match its timestamp columns")]
struct StateColumnError {
    status: postloom_core::types::PostStatus,
}

/// Reassemble a lifecycle state from its three columns.
///
/// The schema CHECK constraints keep the columns consistent on write; a
/// mismatch here means the database was edited out of band.
pub(crate) fn decode_state(
    idx: usize,
    status: postloom_core::types::PostStatus,
    scheduled_for: Option<DateTime<Utc>>,
    published_at: Option<DateTime<Utc>>,
) -> rusqlite::Result<postloom_core::types::PostState> {
    postloom_core::types::PostState::from_parts(status, scheduled_for, published_at).ok_or_else(
        || {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                Type::Text,
                Box::new(StateColumnError { status }),
            )
        },
    )
}

/// Encode a topic list as a JSON array column.
pub(crate) fn encode_topics(topics: &[String]) -> String {
    serde_json::to_string(topics).unwrap_or_else(|_| "[]".to_string())
}

/// Decode a JSON array column into a topic list.
pub(crate) fn decode_topics(idx: usize, raw: String) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
