use axum::http::StatusCode;
use keepsake_db::StorageError;
use keepsake_types::api::{ErrorEnvelope, ErrorKind};
use tracing::{error, warn};

/// Failure of a ledger or moderation operation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller input failed a precondition. Never retried.
    #[error("{0}")]
    Validation(String),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation(_) => ErrorKind::ValidationError,
            ApiError::NotFound { .. } => ErrorKind::NotFoundError,
            ApiError::Storage(_) => ErrorKind::StorageError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wire form of the error. Storage detail is logged here and replaced by a generic message.
    pub fn envelope(&self) -> ErrorEnvelope {
        let message = match self {
            ApiError::Validation(msg) => {
                warn!(error = %msg, "Rejected request");
                msg.clone()
            }
            ApiError::NotFound { .. } => self.to_string(),
            ApiError::Storage(err) => {
                error!(error = %err, kind = err.kind(), "Storage operation failed");
                "Internal storage error".to_string()
            }
        };

        ErrorEnvelope {
            error: message,
            kind: self.kind(),
        }
    }
}
