//! SQLite row types. Timestamps and statuses come back as text and are
//! mapped into `keepsake-types` entities here, keeping the entities free of storage detail.

use chrono::{DateTime, NaiveDateTime, Utc};
use keepsake_types::{Message, MessageStatus, ScoreEntry};
use rusqlite::Row;

use crate::error::StorageError;

pub const SCORE_COLUMNS: &str = "id, name, time, created_at";
pub const MESSAGE_COLUMNS: &str = "id, name, message, status, created_at";

pub struct ScoreRow {
    pub id: i64,
    pub name: String,
    pub time: i64,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub status: String,
    pub created_at: String,
}

impl ScoreRow {
    /// Expects the column order of [`SCORE_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            time: row.get(2)?,
            created_at: row.get(3)?,
        })
    }

    pub fn into_entry(self) -> Result<ScoreEntry, StorageError> {
        Ok(ScoreEntry {
            created_at: parse_timestamp(&self.created_at)
                .map_err(|e| StorageError::Corrupt(format!("score {}: {}", self.id, e)))?,
            id: self.id,
            name: self.name,
            time: self.time,
        })
    }
}

impl MessageRow {
    /// Expects the column order of [`MESSAGE_COLUMNS`].
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            message: row.get(2)?,
            status: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    pub fn into_message(self) -> Result<Message, StorageError> {
        let status: MessageStatus = self
            .status
            .parse()
            .map_err(|e| StorageError::Corrupt(format!("message {}: {}", self.id, e)))?;
        let created_at = parse_timestamp(&self.created_at)
            .map_err(|e| StorageError::Corrupt(format!("message {}: {}", self.id, e)))?;

        Ok(Message {
            id: self.id,
            name: self.name,
            message: self.message,
            status,
            created_at,
        })
    }
}

/// Accepts RFC 3339 (what the schema default writes) and the bare
/// `YYYY-MM-DD HH:MM:SS[.fff]` form produced by `CURRENT_TIMESTAMP`, read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| format!("unparseable created_at '{}': {}", raw, e))
}
