/// Failure inside the storage layer. Every variant surfaces to callers as a 500;
/// the message is for logs only.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("postgres: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A stored row could not be mapped back to an entity.
    #[error("corrupt row: {0}")]
    Corrupt(String),

    /// The blocking task running a SQLite operation panicked or the connection lock was poisoned.
    #[error("storage task failed: {0}")]
    Task(String),

    #[error("invalid storage configuration: {0}")]
    Config(String),
}

impl StorageError {
    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::Sqlite(_) => "sqlite",
            StorageError::Postgres(_) => "postgres",
            StorageError::Corrupt(_) => "corrupt_row",
            StorageError::Task(_) => "task",
            StorageError::Config(_) => "config",
        }
    }
}
