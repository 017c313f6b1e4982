//! Backend selection. The backend is chosen once at startup from the environment,
//! never per call.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::postgres::PgConnectOptions;
use tracing::info;

use crate::error::StorageError;
use crate::postgres::PostgresStore;
use crate::sqlite::SqliteStore;
use crate::store::Store;

const DEFAULT_SQLITE_PATH: &str = "keepsake.db";
const DEFAULT_PG_PORT: u16 = 5432;
const DEFAULT_PG_DATABASE: &str = "postgres";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Sqlite { path: PathBuf },
    Postgres(PostgresConfig),
}

#[derive(Clone, PartialEq, Eq)]
pub enum PostgresConfig {
    Url(String),
    Parts {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
    },
}

// Credentials never reach the logs.
impl fmt::Debug for PostgresConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostgresConfig::Url(_) => f.write_str("Url(<redacted>)"),
            PostgresConfig::Parts {
                host,
                port,
                user,
                database,
                ..
            } => f
                .debug_struct("Parts")
                .field("host", host)
                .field("port", port)
                .field("user", user)
                .field("database", database)
                .finish_non_exhaustive(),
        }
    }
}

impl StoreConfig {
    /// Read the configuration from process environment variables.
    ///
    /// - `KEEPSAKE_STORE`: `sqlite` (default) or `postgres`
    /// - `KEEPSAKE_DB_PATH`: SQLite file, default `keepsake.db`
    /// - `DATABASE_URL`, or `KEEPSAKE_PG_HOST` / `KEEPSAKE_PG_PORT` / `KEEPSAKE_PG_USER` /
    ///   `KEEPSAKE_PG_PASSWORD` / `KEEPSAKE_PG_DATABASE`
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`StoreConfig::from_env`] with an injectable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, StorageError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = get("KEEPSAKE_STORE").unwrap_or_else(|| "sqlite".into());
        match backend.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreConfig::Sqlite {
                path: get("KEEPSAKE_DB_PATH")
                    .unwrap_or_else(|| DEFAULT_SQLITE_PATH.into())
                    .into(),
            }),
            "postgres" | "postgresql" => {
                if let Some(url) = get("DATABASE_URL") {
                    return Ok(StoreConfig::Postgres(PostgresConfig::Url(url)));
                }

                let required = ["KEEPSAKE_PG_HOST", "KEEPSAKE_PG_USER", "KEEPSAKE_PG_PASSWORD"];
                let missing: Vec<&str> = required
                    .into_iter()
                    .filter(|key| get(*key).is_none())
                    .collect();
                if !missing.is_empty() {
                    return Err(StorageError::Config(format!(
                        "postgres backend needs DATABASE_URL or {}",
                        missing.join(", ")
                    )));
                }

                let port = match get("KEEPSAKE_PG_PORT") {
                    Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                        StorageError::Config(format!("KEEPSAKE_PG_PORT is not a port: '{}'", raw))
                    })?,
                    None => DEFAULT_PG_PORT,
                };

                Ok(StoreConfig::Postgres(PostgresConfig::Parts {
                    host: get("KEEPSAKE_PG_HOST").unwrap_or_default(),
                    port,
                    user: get("KEEPSAKE_PG_USER").unwrap_or_default(),
                    password: get("KEEPSAKE_PG_PASSWORD").unwrap_or_default(),
                    database: get("KEEPSAKE_PG_DATABASE")
                        .unwrap_or_else(|| DEFAULT_PG_DATABASE.into()),
                }))
            }
            other => Err(StorageError::Config(format!(
                "unknown KEEPSAKE_STORE '{}', expected sqlite or postgres",
                other
            ))),
        }
    }
}

impl PostgresConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, StorageError> {
        match self {
            PostgresConfig::Url(url) => Ok(PgConnectOptions::from_str(url)?),
            PostgresConfig::Parts {
                host,
                port,
                user,
                password,
                database,
            } => Ok(PgConnectOptions::new()
                .host(host)
                .port(*port)
                .username(user)
                .password(password)
                .database(database)),
        }
    }
}

/// Connect the configured backend and make sure the schema exists.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn Store>, StorageError> {
    let store: Arc<dyn Store> = match config {
        StoreConfig::Sqlite { path } => Arc::new(SqliteStore::open(path)?),
        StoreConfig::Postgres(pg) => Arc::new(PostgresStore::connect(pg.connect_options()?).await?),
    };

    store.initialize().await?;
    info!(backend = %store.backend(), "Store ready");
    Ok(store)
}
