//! Transport-neutral request handling.
//!
//! Every HTTP endpoint maps to one method here. Methods take the raw body bytes and raw path
//! segments and return a [`Reply`]; the monolith and the functions host only translate their
//! transport into these calls, so both surfaces answer byte-for-byte the same.

use std::sync::Arc;

use axum::Json;
use axum::http::header::{self, HeaderName, HeaderValue};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use keepsake_db::Store;
use keepsake_types::api::{BestScoreResponse, DeleteResponse, ErrorKind, HealthResponse};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::{ApiError, ApiResult};
use crate::messages::MessageQueue;
use crate::scores::ScoreLedger;
use crate::validate;

/// A routable endpoint of the public surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/api/scores/best`
    BestScore,
    /// `/api/scores`
    Scores,
    /// `/api/admin/scores`
    AdminScores,
    /// `/api/messages`
    Messages,
    /// `/api/admin/messages`
    AdminMessages,
    /// `/api/admin/messages/pending`
    PendingMessages,
    /// `/api/admin/messages/{id}/status`
    MessageStatus,
    /// `/api/admin/messages/{id}`
    Message,
    /// `/api/health`
    Health,
}

const GET: &[Method] = &[Method::GET];
const POST: &[Method] = &[Method::POST];
const GET_POST: &[Method] = &[Method::GET, Method::POST];
const PUT: &[Method] = &[Method::PUT];
const DELETE: &[Method] = &[Method::DELETE];

impl Endpoint {
    /// Verbs served, not counting the implicit `OPTIONS`.
    pub fn allowed(self) -> &'static [Method] {
        match self {
            Endpoint::BestScore
            | Endpoint::AdminScores
            | Endpoint::AdminMessages
            | Endpoint::PendingMessages
            | Endpoint::Health => GET,
            Endpoint::Scores => POST,
            Endpoint::Messages => GET_POST,
            Endpoint::MessageStatus => PUT,
            Endpoint::Message => DELETE,
        }
    }

    /// Header form of [`Endpoint::allowed`] plus `OPTIONS`.
    pub fn allow_header(self) -> &'static str {
        match self {
            Endpoint::Scores => "POST, OPTIONS",
            Endpoint::Messages => "GET, POST, OPTIONS",
            Endpoint::MessageStatus => "PUT, OPTIONS",
            Endpoint::Message => "DELETE, OPTIONS",
            _ => "GET, OPTIONS",
        }
    }
}

/// Status, optional JSON body and, for pre-flight and 405 replies, the verbs to advertise.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Option<Value>,
    pub allow: Option<Endpoint>,
}

impl Reply {
    fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Reply {
                status,
                body: Some(body),
                allow: None,
            },
            Err(err) => {
                error!(error = %err, "Failed to encode response body");
                Reply::envelope(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal storage error",
                    ErrorKind::StorageError,
                )
            }
        }
    }

    fn envelope(status: StatusCode, message: &str, kind: ErrorKind) -> Self {
        Reply {
            status,
            body: Some(serde_json::json!({ "error": message, "kind": kind })),
            allow: None,
        }
    }

    fn from_result<T: Serialize>(status: StatusCode, result: ApiResult<T>) -> Self {
        match result {
            Ok(value) => Reply::json(status, &value),
            Err(err) => Reply::from(err),
        }
    }

    /// Headers every transport must attach alongside the body.
    pub fn headers(&self) -> Vec<(HeaderName, HeaderValue)> {
        let mut headers = vec![(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        )];

        if let Some(endpoint) = self.allow {
            let verbs = HeaderValue::from_static(endpoint.allow_header());
            headers.push((header::ALLOW, verbs.clone()));
            headers.push((header::ACCESS_CONTROL_ALLOW_METHODS, verbs));
            headers.push((
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("Content-Type"),
            ));
        }

        headers
    }
}

impl From<ApiError> for Reply {
    fn from(err: ApiError) -> Self {
        let envelope = err.envelope();
        Reply::envelope(err.status(), &envelope.error, envelope.kind)
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let headers = self.headers();
        let mut response = match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        };
        response.headers_mut().extend(headers);
        response
    }
}

/// Entry point shared by both deployment surfaces.
#[derive(Clone)]
pub struct Facade {
    scores: ScoreLedger,
    messages: MessageQueue,
}

impl Facade {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            scores: ScoreLedger::new(store.clone()),
            messages: MessageQueue::new(store),
        }
    }

    // -- Scores --

    pub async fn best_score(&self) -> Reply {
        let best = self.scores.best_score().await.map(|best| match best {
            Some(entry) => BestScoreResponse {
                best_time: Some(entry.time),
                name: Some(entry.name),
            },
            None => BestScoreResponse::empty(),
        });
        Reply::from_result(StatusCode::OK, best)
    }

    pub async fn submit_score(&self, body: &[u8]) -> Reply {
        let result = async {
            let (name, time) = validate::score_submission(body)?;
            self.scores.record_score(&name, time).await
        }
        .await;
        Reply::from_result(StatusCode::CREATED, result)
    }

    pub async fn ranked_scores(&self) -> Reply {
        Reply::from_result(StatusCode::OK, self.scores.all_scores_ranked().await)
    }

    // -- Messages --

    pub async fn public_messages(&self) -> Reply {
        Reply::from_result(StatusCode::OK, self.messages.list_public().await)
    }

    pub async fn submit_message(&self, body: &[u8]) -> Reply {
        let result = async {
            let (name, message) = validate::message_submission(body)?;
            self.messages.submit(&name, &message).await
        }
        .await;
        Reply::from_result(StatusCode::CREATED, result)
    }

    pub async fn pending_messages(&self) -> Reply {
        Reply::from_result(StatusCode::OK, self.messages.list_by_status("Pending").await)
    }

    pub async fn all_messages(&self) -> Reply {
        Reply::from_result(StatusCode::OK, self.messages.list_all().await)
    }

    /// `id` is the raw path segment.
    pub async fn set_message_status(&self, id: &str, body: &[u8]) -> Reply {
        let result = async {
            let id = validate::message_id(id)?;
            let status = validate::status_update(body)?;
            self.messages.set_status(id, &status).await
        }
        .await;
        Reply::from_result(StatusCode::OK, result)
    }

    pub async fn delete_message(&self, id: &str) -> Reply {
        let result = async {
            let id = validate::message_id(id)?;
            self.messages.delete(id).await?;
            Ok::<_, ApiError>(DeleteResponse {
                message: "Message deleted successfully".to_string(),
            })
        }
        .await;
        Reply::from_result(StatusCode::OK, result)
    }

    // -- Plumbing --

    pub fn health() -> Reply {
        Reply::json(
            StatusCode::OK,
            &HealthResponse {
                status: "ok".to_string(),
                message: "Backend is running".to_string(),
            },
        )
    }

    /// Empty 200 answering a cross-origin pre-flight.
    pub fn preflight(endpoint: Endpoint) -> Reply {
        Reply {
            status: StatusCode::OK,
            body: None,
            allow: Some(endpoint),
        }
    }

    pub fn method_not_allowed(endpoint: Endpoint) -> Reply {
        let mut reply = Reply::envelope(
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed",
            ErrorKind::MethodNotAllowed,
        );
        reply.allow = Some(endpoint);
        reply
    }

    /// Envelope for a body the transport could not read, e.g. one over the size limit.
    pub fn unreadable_body(status: StatusCode) -> Reply {
        let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
            "Request body too large"
        } else {
            "Request body could not be read"
        };
        warn!(%status, "{}", message);
        Reply::envelope(status, message, ErrorKind::ValidationError)
    }

    pub fn not_found_route(path: &str) -> Reply {
        debug!(path, "No route");
        Reply::envelope(
            StatusCode::NOT_FOUND,
            &format!("Route {} not found", path),
            ErrorKind::NotFoundError,
        )
    }

    /// Route a request that has already been matched to an endpoint.
    ///
    /// `id` is the raw id segment for the two per-message endpoints and ignored elsewhere.
    /// `body` carries the status the transport failed with when it could not read the body;
    /// that only matters to endpoints that consume one.
    pub async fn dispatch(
        &self,
        endpoint: Endpoint,
        method: &Method,
        id: Option<&str>,
        body: Result<&[u8], StatusCode>,
    ) -> Reply {
        if *method == Method::OPTIONS {
            return Facade::preflight(endpoint);
        }
        // HEAD is answered like GET; transports drop the body.
        let method = if *method == Method::HEAD { &Method::GET } else { method };
        if !endpoint.allowed().contains(method) {
            return Facade::method_not_allowed(endpoint);
        }

        let reads_body = matches!(
            (endpoint, method.as_str()),
            (Endpoint::Scores, _) | (Endpoint::Messages, "POST") | (Endpoint::MessageStatus, _)
        );
        let body = match body {
            Ok(body) => body,
            Err(status) if reads_body => return Facade::unreadable_body(status),
            Err(_) => &[],
        };

        let id = id.unwrap_or_default();
        match (endpoint, method.as_str()) {
            (Endpoint::BestScore, _) => self.best_score().await,
            (Endpoint::Scores, _) => self.submit_score(body).await,
            (Endpoint::AdminScores, _) => self.ranked_scores().await,
            (Endpoint::Messages, "POST") => self.submit_message(body).await,
            (Endpoint::Messages, _) => self.public_messages().await,
            (Endpoint::AdminMessages, _) => self.all_messages().await,
            (Endpoint::PendingMessages, _) => self.pending_messages().await,
            (Endpoint::MessageStatus, _) => self.set_message_status(id, body).await,
            (Endpoint::Message, _) => self.delete_message(id).await,
            (Endpoint::Health, _) => Facade::health(),
        }
    }
}

#[cfg(test)]
mod tests {
    use keepsake_db::SqliteStore;
    use serde_json::json;

    use super::*;

    async fn facade() -> Facade {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().await.unwrap();
        Facade::new(Arc::new(store))
    }

    fn body(reply: &Reply) -> &Value {
        reply.body.as_ref().expect("reply has a body")
    }

    #[test]
    fn allow_header_matches_allowed_verbs() {
        for endpoint in [
            Endpoint::BestScore,
            Endpoint::Scores,
            Endpoint::AdminScores,
            Endpoint::Messages,
            Endpoint::AdminMessages,
            Endpoint::PendingMessages,
            Endpoint::MessageStatus,
            Endpoint::Message,
            Endpoint::Health,
        ] {
            let mut expected: Vec<&str> = endpoint.allowed().iter().map(Method::as_str).collect();
            expected.push("OPTIONS");
            assert_eq!(endpoint.allow_header(), expected.join(", "));
        }
    }

    #[test]
    fn preflight_is_empty_with_cors_headers() {
        let reply = Facade::preflight(Endpoint::Messages);
        assert_eq!(reply.status, StatusCode::OK);
        assert!(reply.body.is_none());

        let headers = reply.headers();
        let find = |name: &HeaderName| {
            headers
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.to_str().unwrap().to_string())
        };
        assert_eq!(find(&header::ACCESS_CONTROL_ALLOW_ORIGIN).as_deref(), Some("*"));
        assert_eq!(
            find(&header::ACCESS_CONTROL_ALLOW_METHODS).as_deref(),
            Some("GET, POST, OPTIONS")
        );
        assert_eq!(
            find(&header::ACCESS_CONTROL_ALLOW_HEADERS).as_deref(),
            Some("Content-Type")
        );
    }

    #[test]
    fn plain_replies_still_allow_any_origin() {
        let headers = Facade::health().headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].0, header::ACCESS_CONTROL_ALLOW_ORIGIN);
    }

    #[tokio::test]
    async fn best_score_on_empty_ledger() {
        let facade = facade().await;
        let reply = facade.best_score().await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(body(&reply), &json!({ "bestTime": null }));
    }

    #[tokio::test]
    async fn score_submission_round() {
        let facade = facade().await;

        let reply = facade.submit_score(br#"{"name":"Ana","time":95}"#).await;
        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(body(&reply)["name"], "Ana");
        assert_eq!(body(&reply)["time"], 95);
        assert!(body(&reply)["created_at"].is_string());

        let reply = facade.best_score().await;
        assert_eq!(body(&reply), &json!({ "bestTime": 95, "name": "Ana" }));
    }

    #[tokio::test]
    async fn negative_time_is_a_validation_error() {
        let facade = facade().await;
        let reply = facade.submit_score(br#"{"name":"A","time":-5}"#).await;

        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body(&reply),
            &json!({ "error": "Time must be a positive number", "kind": "ValidationError" })
        );
        assert_eq!(body(&facade.ranked_scores().await), &json!([]));
    }

    #[tokio::test]
    async fn moderation_through_the_facade() {
        let facade = facade().await;

        let reply = facade
            .submit_message(br#"{"name":"Sam","message":"hi","status":"Approved"}"#)
            .await;
        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(body(&reply)["status"], "Pending");
        let id = body(&reply)["id"].as_i64().unwrap().to_string();

        assert_eq!(body(&facade.public_messages().await), &json!([]));

        let reply = facade.set_message_status(&id, br#"{"status":"Archived"}"#).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);

        let reply = facade.set_message_status(&id, br#"{"status":"Approved"}"#).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(body(&reply)["status"], "Approved");
        assert_eq!(body(&facade.public_messages().await).as_array().unwrap().len(), 1);

        let reply = facade.delete_message(&id).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(body(&reply), &json!({ "message": "Message deleted successfully" }));

        let reply = facade.delete_message(&id).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(body(&reply)["kind"], "NotFoundError");
    }

    #[tokio::test]
    async fn unparseable_id_is_rejected_before_lookup() {
        let facade = facade().await;
        let reply = facade.delete_message("abc").await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert_eq!(body(&reply)["error"], "Message ID is required");
    }

    #[tokio::test]
    async fn dispatch_enforces_allowed_verbs() {
        let facade = facade().await;
        let empty: Result<&[u8], StatusCode> = Ok(b"");

        let reply = facade.dispatch(Endpoint::Scores, &Method::GET, None, empty).await;
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body(&reply)["kind"], "MethodNotAllowed");
        assert_eq!(reply.allow, Some(Endpoint::Scores));

        let reply = facade.dispatch(Endpoint::Scores, &Method::OPTIONS, None, empty).await;
        assert_eq!(reply, Facade::preflight(Endpoint::Scores));

        let reply = facade.dispatch(Endpoint::Health, &Method::HEAD, None, empty).await;
        assert_eq!(reply, Facade::health());
    }

    #[tokio::test]
    async fn dispatch_routes_by_verb_and_id() {
        let facade = facade().await;

        let payload: &[u8] = br#"{"name":"Sam","message":"hi"}"#;
        let reply = facade.dispatch(Endpoint::Messages, &Method::POST, None, Ok(payload)).await;
        assert_eq!(reply.status, StatusCode::CREATED);
        let id = body(&reply)["id"].as_i64().unwrap().to_string();

        let reply = facade.dispatch(Endpoint::Messages, &Method::GET, None, Ok(b"")).await;
        assert_eq!(body(&reply), &json!([]));

        let reply = facade
            .dispatch(Endpoint::Message, &Method::DELETE, Some(&id), Ok(b""))
            .await;
        assert_eq!(reply.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unreadable_body_only_fails_endpoints_that_read_one() {
        let facade = facade().await;
        let too_large = Err(StatusCode::PAYLOAD_TOO_LARGE);

        let reply = facade.dispatch(Endpoint::Messages, &Method::POST, None, too_large).await;
        assert_eq!(reply.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body(&reply),
            &json!({ "error": "Request body too large", "kind": "ValidationError" })
        );
        assert_eq!(reply.headers()[0].0, header::ACCESS_CONTROL_ALLOW_ORIGIN);

        let reply = facade.dispatch(Endpoint::Messages, &Method::GET, None, too_large).await;
        assert_eq!(reply.status, StatusCode::OK);

        let reply = facade.dispatch(Endpoint::Messages, &Method::OPTIONS, None, too_large).await;
        assert_eq!(reply, Facade::preflight(Endpoint::Messages));

        assert_eq!(
            body(&Facade::unreadable_body(StatusCode::BAD_REQUEST))["error"],
            "Request body could not be read"
        );
    }
}
