//! Schema for both backends. Statements are idempotent (`IF NOT EXISTS`).
//!
//! The two dialects differ only in id generation and timestamp defaults; column names,
//! the status check and the index set are the same so both stores map rows identically.

use rusqlite::Connection;
use tracing::info;

use crate::error::StorageError;

/// `AUTOINCREMENT` keeps SQLite from handing out the id of a deleted row again.
/// Timestamps are written as RFC 3339 with millisecond precision.
pub const SQLITE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS scores (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        time        INTEGER NOT NULL CHECK (time >= 0),
        created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );

    CREATE TABLE IF NOT EXISTS messages (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        name        TEXT NOT NULL,
        message     TEXT NOT NULL,
        status      TEXT NOT NULL DEFAULT 'Pending'
                    CHECK (status IN ('Pending', 'Approved', 'Denied')),
        created_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
    );

    CREATE INDEX IF NOT EXISTS idx_scores_time ON scores(time ASC);
    CREATE INDEX IF NOT EXISTS idx_messages_status ON messages(status);
    CREATE INDEX IF NOT EXISTS idx_messages_created ON messages(created_at DESC);
";

pub const POSTGRES_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS scores (
        id          BIGSERIAL PRIMARY KEY,
        name        TEXT NOT NULL,
        time        BIGINT NOT NULL CHECK (time >= 0),
        created_at  TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        id          BIGSERIAL PRIMARY KEY,
        name        TEXT NOT NULL,
        message     TEXT NOT NULL,
        status      TEXT NOT NULL DEFAULT 'Pending'
                    CHECK (status IN ('Pending', 'Approved', 'Denied')),
        created_at  TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
    )",
    "CREATE INDEX IF NOT EXISTS idx_scores_time ON scores(time ASC)",
    "CREATE INDEX IF NOT EXISTS idx_messages_status ON messages(status)",
    "CREATE INDEX IF NOT EXISTS idx_messages_created ON messages(created_at DESC)",
];

pub fn run_sqlite(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(SQLITE_SCHEMA)?;
    info!("SQLite schema ready");
    Ok(())
}
