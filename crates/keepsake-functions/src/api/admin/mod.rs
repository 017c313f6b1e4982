pub mod messages;
pub mod scores;
