use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use keepsake_types::{Message, MessageStatus, ScoreEntry};
use rusqlite::{Connection, OptionalExtension, Transaction};
use tracing::{debug, error, info};

use crate::error::StorageError;
use crate::migrations;
use crate::models::{MESSAGE_COLUMNS, MessageRow, SCORE_COLUMNS, ScoreRow};
use crate::store::{Backend, Store};

/// Embedded, file-backed store.
///
/// One connection behind a mutex; every operation runs on the blocking pool so the async
/// runtime never waits on SQLite I/O.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        info!("SQLite store opened at {}", path.display());
        Ok(Self::from_connection(conn))
    }

    /// Private database that disappears with the store. Used by tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run `f` inside one transaction on the blocking pool.
    ///
    /// Commits once if `f` succeeds; if `f` fails the transaction is dropped, which rolls it
    /// back. The connection lock is released on every exit path.
    async fn with_tx<F, T>(&self, op: &'static str, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let result = tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StorageError::Task(format!("connection lock poisoned: {}", e)))?;
            let tx = conn.transaction()?;
            let out = f(&tx)?;
            tx.commit()?;
            Ok(out)
        })
        .await
        .map_err(|e| {
            error!("spawn_blocking join error in {}: {}", op, e);
            StorageError::Task(e.to_string())
        })?;

        debug!(op, ok = result.is_ok(), "sqlite transaction finished");
        result
    }
}

#[async_trait]
impl Store for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn initialize(&self) -> Result<(), StorageError> {
        self.with_tx("initialize", |tx| migrations::run_sqlite(tx))
            .await
    }

    async fn insert_score(&self, name: &str, time: i64) -> Result<ScoreEntry, StorageError> {
        let name = name.to_string();
        self.with_tx("insert_score", move |tx| {
            let sql = format!(
                "INSERT INTO scores (name, time) VALUES (?1, ?2) RETURNING {}",
                SCORE_COLUMNS
            );
            tx.query_row(&sql, rusqlite::params![name, time], ScoreRow::from_row)?
                .into_entry()
        })
        .await
    }

    async fn best_score(&self) -> Result<Option<ScoreEntry>, StorageError> {
        self.with_tx("best_score", |tx| {
            let sql = format!(
                "SELECT {} FROM scores ORDER BY time ASC, created_at ASC, id ASC LIMIT 1",
                SCORE_COLUMNS
            );
            tx.query_row(&sql, [], ScoreRow::from_row)
                .optional()?
                .map(ScoreRow::into_entry)
                .transpose()
        })
        .await
    }

    async fn scores_ranked(&self) -> Result<Vec<ScoreEntry>, StorageError> {
        self.with_tx("scores_ranked", |tx| {
            let sql = format!(
                "SELECT {} FROM scores ORDER BY time ASC, created_at ASC, id ASC",
                SCORE_COLUMNS
            );
            let mut stmt = tx.prepare(&sql)?;
            let rows = stmt
                .query_map([], ScoreRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(ScoreRow::into_entry).collect()
        })
        .await
    }

    async fn insert_message(&self, name: &str, message: &str) -> Result<Message, StorageError> {
        let name = name.to_string();
        let message = message.to_string();
        self.with_tx("insert_message", move |tx| {
            let sql = format!(
                "INSERT INTO messages (name, message, status) VALUES (?1, ?2, ?3) RETURNING {}",
                MESSAGE_COLUMNS
            );
            tx.query_row(
                &sql,
                rusqlite::params![name, message, MessageStatus::Pending.as_str()],
                MessageRow::from_row,
            )?
            .into_message()
        })
        .await
    }

    async fn messages_by_status(
        &self,
        status: MessageStatus,
    ) -> Result<Vec<Message>, StorageError> {
        self.with_tx("messages_by_status", move |tx| {
            let sql = format!(
                "SELECT {} FROM messages WHERE status = ?1 ORDER BY created_at DESC, id DESC",
                MESSAGE_COLUMNS
            );
            query_messages(tx, &sql, rusqlite::params![status.as_str()])
        })
        .await
    }

    async fn all_messages(&self) -> Result<Vec<Message>, StorageError> {
        self.with_tx("all_messages", |tx| {
            let sql = format!(
                "SELECT {} FROM messages ORDER BY created_at DESC, id DESC",
                MESSAGE_COLUMNS
            );
            query_messages(tx, &sql, [])
        })
        .await
    }

    async fn update_message_status(
        &self,
        id: i64,
        status: MessageStatus,
    ) -> Result<Option<Message>, StorageError> {
        self.with_tx("update_message_status", move |tx| {
            let sql = format!(
                "UPDATE messages SET status = ?1 WHERE id = ?2 RETURNING {}",
                MESSAGE_COLUMNS
            );
            tx.query_row(
                &sql,
                rusqlite::params![status.as_str(), id],
                MessageRow::from_row,
            )
            .optional()?
            .map(MessageRow::into_message)
            .transpose()
        })
        .await
    }

    async fn delete_message(&self, id: i64) -> Result<bool, StorageError> {
        self.with_tx("delete_message", move |tx| {
            let affected = tx.execute("DELETE FROM messages WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
        .await
    }
}

fn query_messages<P: rusqlite::Params>(
    tx: &Transaction<'_>,
    sql: &str,
    params: P,
) -> Result<Vec<Message>, StorageError> {
    let mut stmt = tx.prepare(sql)?;
    let rows = stmt
        .query_map(params, MessageRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(MessageRow::into_message).collect()
}
