use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single timed result on the leaderboard. Lower `time` is better.
/// Rows are append-only: never updated, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: i64,
    pub name: String,
    pub time: i64,
    pub created_at: DateTime<Utc>,
}

/// A guestbook entry. Only `status` ever changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

/// Moderation state of a guestbook message.
///
/// Serialized as the literal variant name (`"Pending"`, `"Approved"`, `"Denied"`), which is
/// also the exact text stored in the `status` column. Any transition between the three
/// states is allowed; removal is a separate delete, not a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MessageStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

impl MessageStatus {
    pub const ALL: [MessageStatus; 3] = [
        MessageStatus::Pending,
        MessageStatus::Approved,
        MessageStatus::Denied,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "Pending",
            MessageStatus::Approved => "Approved",
            MessageStatus::Denied => "Denied",
        }
    }

    /// Only approved messages are shown on the public guestbook.
    pub fn is_public(&self) -> bool {
        matches!(self, MessageStatus::Approved)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Status must be one of [Pending, Approved, Denied], got '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for MessageStatus {
    type Err = UnknownStatus;

    /// Case-sensitive: `"approved"` is not a valid status.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
