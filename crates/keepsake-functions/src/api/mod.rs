//! One module per endpoint path. Each exposes its `ENDPOINT` and an async `handler` that
//! dispatches through the façade.

pub mod admin;
pub mod health;
pub mod messages;
pub mod scores;

use keepsake_api::{Endpoint, Reply};

use crate::{FunctionRequest, Invocation};

/// A deployed function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    ScoresBest,
    ScoresIndex,
    AdminScores,
    MessagesIndex,
    AdminMessagesIndex,
    AdminMessagesPending,
    AdminMessagesById,
    AdminMessagesStatus,
    Health,
}

impl Function {
    pub const ALL: [Function; 9] = [
        Function::ScoresBest,
        Function::ScoresIndex,
        Function::AdminScores,
        Function::MessagesIndex,
        Function::AdminMessagesIndex,
        Function::AdminMessagesPending,
        Function::AdminMessagesById,
        Function::AdminMessagesStatus,
        Function::Health,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Function::ScoresBest => "api/scores/best",
            Function::ScoresIndex => "api/scores/index",
            Function::AdminScores => "api/admin/scores",
            Function::MessagesIndex => "api/messages",
            Function::AdminMessagesIndex => "api/admin/messages/index",
            Function::AdminMessagesPending => "api/admin/messages/pending",
            Function::AdminMessagesById => "api/admin/messages/[id]",
            Function::AdminMessagesStatus => "api/admin/messages/[id]/status",
            Function::Health => "api/health",
        }
    }

    pub fn endpoint(self) -> Endpoint {
        match self {
            Function::ScoresBest => scores::best::ENDPOINT,
            Function::ScoresIndex => scores::index::ENDPOINT,
            Function::AdminScores => admin::scores::ENDPOINT,
            Function::MessagesIndex => messages::ENDPOINT,
            Function::AdminMessagesIndex => admin::messages::index::ENDPOINT,
            Function::AdminMessagesPending => admin::messages::pending::ENDPOINT,
            Function::AdminMessagesById => admin::messages::by_id::ENDPOINT,
            Function::AdminMessagesStatus => admin::messages::status::ENDPOINT,
            Function::Health => health::ENDPOINT,
        }
    }

    pub async fn invoke(self, invocation: &Invocation, request: FunctionRequest) -> Reply {
        match self {
            Function::ScoresBest => scores::best::handler(invocation, request).await,
            Function::ScoresIndex => scores::index::handler(invocation, request).await,
            Function::AdminScores => admin::scores::handler(invocation, request).await,
            Function::MessagesIndex => messages::handler(invocation, request).await,
            Function::AdminMessagesIndex => {
                admin::messages::index::handler(invocation, request).await
            }
            Function::AdminMessagesPending => {
                admin::messages::pending::handler(invocation, request).await
            }
            Function::AdminMessagesById => {
                admin::messages::by_id::handler(invocation, request).await
            }
            Function::AdminMessagesStatus => {
                admin::messages::status::handler(invocation, request).await
            }
            Function::Health => health::handler(invocation, request).await,
        }
    }
}

/// Map a request path to its function and, for per-message paths, the raw id segment.
///
/// Matching is exact: no trailing slash, no empty segments.
pub fn resolve(path: &str) -> Option<(Function, Option<String>)> {
    let segments: Vec<&str> = path.strip_prefix('/')?.split('/').collect();

    let resolved = match segments.as_slice() {
        ["api", "scores", "best"] => (Function::ScoresBest, None),
        ["api", "scores"] => (Function::ScoresIndex, None),
        ["api", "admin", "scores"] => (Function::AdminScores, None),
        ["api", "messages"] => (Function::MessagesIndex, None),
        ["api", "admin", "messages"] => (Function::AdminMessagesIndex, None),
        ["api", "admin", "messages", "pending"] => (Function::AdminMessagesPending, None),
        ["api", "admin", "messages", id, "status"] if !id.is_empty() => {
            (Function::AdminMessagesStatus, Some(id.to_string()))
        }
        ["api", "admin", "messages", id] if !id.is_empty() => {
            (Function::AdminMessagesById, Some(id.to_string()))
        }
        ["api", "health"] => (Function::Health, None),
        _ => return None,
    };

    Some(resolved)
}
