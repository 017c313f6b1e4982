pub mod api;
pub mod models;

pub use models::{Message, MessageStatus, ScoreEntry, UnknownStatus};
