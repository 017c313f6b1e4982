use serde::{Deserialize, Serialize};
use serde_json::Value;

// -- Scores --

/// Body of `POST /api/scores`.
///
/// Fields stay untyped so that a wrong-typed value becomes a validation error with a
/// precise message instead of a generic deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitScoreRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub time: Option<Value>,
}

/// Body of `GET /api/scores/best`. Serializes to `{"bestTime": null}` on an empty ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScoreResponse {
    #[serde(rename = "bestTime")]
    pub best_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl BestScoreResponse {
    pub fn empty() -> Self {
        Self {
            best_time: None,
            name: None,
        }
    }
}

// -- Messages --

/// Body of `POST /api/messages`. Any `status` key sent by the caller is dropped here:
/// new messages always start out pending.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitMessageRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

/// Body of `PUT /api/admin/messages/{id}/status`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

// -- Health --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

// -- Errors --

/// Stable error category carried on every failure response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    ValidationError,
    NotFoundError,
    StorageError,
    MethodNotAllowed,
}

/// The single error envelope returned on every failure path.
/// Diagnostic detail (driver messages, error chains) stays in server logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub kind: ErrorKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_best_score_has_only_null_best_time() {
        let json = serde_json::to_value(BestScoreResponse::empty()).unwrap();
        assert_eq!(json, json!({ "bestTime": null }));
    }

    #[test]
    fn best_score_uses_camel_case_key() {
        let body = BestScoreResponse {
            best_time: Some(90),
            name: Some("B".into()),
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            json!({ "bestTime": 90, "name": "B" })
        );
    }

    #[test]
    fn message_request_ignores_caller_status() {
        let req: SubmitMessageRequest = serde_json::from_value(json!({
            "name": "Sam",
            "message": "hi",
            "status": "Approved"
        }))
        .unwrap();
        assert_eq!(req.name, Some(json!("Sam")));
        assert_eq!(req.message, Some(json!("hi")));
    }

    #[test]
    fn error_envelope_shape() {
        let envelope = ErrorEnvelope {
            error: "Status is required".into(),
            kind: ErrorKind::ValidationError,
        };
        assert_eq!(
            serde_json::to_value(envelope).unwrap(),
            json!({ "error": "Status is required", "kind": "ValidationError" })
        );
    }
}
