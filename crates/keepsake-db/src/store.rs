use std::fmt;

use async_trait::async_trait;
use keepsake_types::{Message, MessageStatus, ScoreEntry};

use crate::error::StorageError;

/// Which engine a [`Store`] talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Sqlite => f.write_str("sqlite"),
            Backend::Postgres => f.write_str("postgres"),
        }
    }
}

/// Persistence for scores and guestbook messages.
///
/// Each method runs in exactly one transaction: it commits once on success and rolls back
/// entirely on any error. Both backends return identically shaped records and orderings.
/// Inputs are assumed validated by the caller.
#[async_trait]
pub trait Store: Send + Sync {
    fn backend(&self) -> Backend;

    /// Create tables and indexes if missing. Safe to run on every start.
    async fn initialize(&self) -> Result<(), StorageError>;

    // -- Scores --

    async fn insert_score(&self, name: &str, time: i64) -> Result<ScoreEntry, StorageError>;

    /// Lowest time; ties go to the earliest submission.
    async fn best_score(&self) -> Result<Option<ScoreEntry>, StorageError>;

    /// All scores by `time` ascending, then `created_at` ascending.
    async fn scores_ranked(&self) -> Result<Vec<ScoreEntry>, StorageError>;

    // -- Messages --

    /// Inserts with status `Pending`.
    async fn insert_message(&self, name: &str, message: &str) -> Result<Message, StorageError>;

    /// Newest first.
    async fn messages_by_status(&self, status: MessageStatus)
    -> Result<Vec<Message>, StorageError>;

    /// Newest first, every status.
    async fn all_messages(&self) -> Result<Vec<Message>, StorageError>;

    /// Returns `None` when no message has this id.
    async fn update_message_status(
        &self,
        id: i64,
        status: MessageStatus,
    ) -> Result<Option<Message>, StorageError>;

    /// Returns `false` when no message has this id.
    async fn delete_message(&self, id: i64) -> Result<bool, StorageError>;
}
