pub mod config;
pub mod error;
pub mod migrations;
pub mod models;
pub mod postgres;
pub mod sqlite;
mod store;

pub use config::{PostgresConfig, StoreConfig, open_store};
pub use error::StorageError;
pub use postgres::PostgresStore;
pub use sqlite::SqliteStore;
pub use store::{Backend, Store};
