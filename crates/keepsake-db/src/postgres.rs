//! Relational-server store backed by a PostgreSQL connection pool.

use async_trait::async_trait;
use keepsake_types::{Message, MessageStatus, ScoreEntry};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{debug, info};

use crate::error::StorageError;
use crate::migrations::POSTGRES_SCHEMA;
use crate::store::{Backend, Store};

const MAX_CONNECTIONS: u32 = 5;

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(options: PgConnectOptions) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;
        info!("Postgres pool connected (max {} connections)", MAX_CONNECTIONS);
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PostgresStore {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn initialize(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;
        for statement in POSTGRES_SCHEMA {
            sqlx::query(*statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        info!("Postgres schema ready");
        Ok(())
    }

    async fn insert_score(&self, name: &str, time: i64) -> Result<ScoreEntry, StorageError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            "INSERT INTO scores (name, time) VALUES ($1, $2)
             RETURNING id, name, time, created_at",
        )
        .bind(name)
        .bind(time)
        .fetch_one(&mut *tx)
        .await?;
        let entry = score_from_row(&row)?;
        tx.commit().await?;

        debug!(id = entry.id, "score inserted");
        Ok(entry)
    }

    async fn best_score(&self) -> Result<Option<ScoreEntry>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            "SELECT id, name, time, created_at FROM scores
             ORDER BY time ASC, created_at ASC, id ASC
             LIMIT 1",
        )
        .fetch_optional(&mut *tx)
        .await?;
        let entry = row.as_ref().map(score_from_row).transpose()?;
        tx.commit().await?;
        Ok(entry)
    }

    async fn scores_ranked(&self) -> Result<Vec<ScoreEntry>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(
            "SELECT id, name, time, created_at FROM scores
             ORDER BY time ASC, created_at ASC, id ASC",
        )
        .fetch_all(&mut *tx)
        .await?;
        let entries = rows.iter().map(score_from_row).collect::<Result<Vec<_>, _>>()?;
        tx.commit().await?;
        Ok(entries)
    }

    async fn insert_message(&self, name: &str, message: &str) -> Result<Message, StorageError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            "INSERT INTO messages (name, message, status) VALUES ($1, $2, $3)
             RETURNING id, name, message, status, created_at",
        )
        .bind(name)
        .bind(message)
        .bind(MessageStatus::Pending.as_str())
        .fetch_one(&mut *tx)
        .await?;
        let message = message_from_row(&row)?;
        tx.commit().await?;

        debug!(id = message.id, "message inserted");
        Ok(message)
    }

    async fn messages_by_status(
        &self,
        status: MessageStatus,
    ) -> Result<Vec<Message>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(
            "SELECT id, name, message, status, created_at FROM messages
             WHERE status = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(status.as_str())
        .fetch_all(&mut *tx)
        .await?;
        let messages = rows.iter().map(message_from_row).collect::<Result<Vec<_>, _>>()?;
        tx.commit().await?;
        Ok(messages)
    }

    async fn all_messages(&self) -> Result<Vec<Message>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let rows = sqlx::query(
            "SELECT id, name, message, status, created_at FROM messages
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&mut *tx)
        .await?;
        let messages = rows.iter().map(message_from_row).collect::<Result<Vec<_>, _>>()?;
        tx.commit().await?;
        Ok(messages)
    }

    async fn update_message_status(
        &self,
        id: i64,
        status: MessageStatus,
    ) -> Result<Option<Message>, StorageError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            "UPDATE messages SET status = $1 WHERE id = $2
             RETURNING id, name, message, status, created_at",
        )
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let message = row.as_ref().map(message_from_row).transpose()?;
        tx.commit().await?;
        Ok(message)
    }

    async fn delete_message(&self, id: i64) -> Result<bool, StorageError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

fn score_from_row(row: &PgRow) -> Result<ScoreEntry, StorageError> {
    Ok(ScoreEntry {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        time: row.try_get("time")?,
        created_at: row.try_get("created_at")?,
    })
}

fn message_from_row(row: &PgRow) -> Result<Message, StorageError> {
    let id: i64 = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<MessageStatus>()
        .map_err(|e| StorageError::Corrupt(format!("message {}: {}", id, e)))?;

    Ok(Message {
        id,
        name: row.try_get("name")?,
        message: row.try_get("message")?,
        status,
        created_at: row.try_get("created_at")?,
    })
}
