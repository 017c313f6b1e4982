//! Long-running HTTP server exposing the whole API from one process.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::Uri,
    routing::{MethodRouter, delete, get, post, put},
};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use keepsake_api::{Endpoint, Facade, Reply};

type AppState = Arc<Facade>;

/// Position of `{id}` in `/api/admin/messages/{id}[/status]` once split on `/`.
const ID_SEGMENT: usize = 4;

pub fn router(facade: Arc<Facade>) -> Router {
    Router::new()
        .route("/api/scores/best", endpoint(get(best_score), Endpoint::BestScore))
        .route("/api/scores", endpoint(post(submit_score), Endpoint::Scores))
        .route("/api/admin/scores", endpoint(get(ranked_scores), Endpoint::AdminScores))
        .route(
            "/api/messages",
            endpoint(get(public_messages).post(submit_message), Endpoint::Messages),
        )
        .route("/api/admin/messages", endpoint(get(all_messages), Endpoint::AdminMessages))
        .route(
            "/api/admin/messages/pending",
            endpoint(get(pending_messages), Endpoint::PendingMessages),
        )
        .route(
            "/api/admin/messages/{id}/status",
            endpoint(put(set_message_status), Endpoint::MessageStatus),
        )
        .route("/api/admin/messages/{id}", endpoint(delete(delete_message), Endpoint::Message))
        .route("/api/health", endpoint(get(health), Endpoint::Health))
        .fallback(|uri: Uri| async move { Facade::not_found_route(uri.path()) })
        .layer(TraceLayer::new_for_http())
        .with_state(facade)
}

/// Adds the pre-flight answer and the 405 fallback to a route.
fn endpoint(methods: MethodRouter<AppState>, endpoint: Endpoint) -> MethodRouter<AppState> {
    methods
        .options(move || async move { Facade::preflight(endpoint) })
        .fallback(move || async move { Facade::method_not_allowed(endpoint) })
}

/// The id segment exactly as sent, still percent-encoded. The façade decides whether it is valid.
fn raw_id(uri: &Uri) -> &str {
    uri.path().split('/').nth(ID_SEGMENT).unwrap_or_default()
}

fn readable(body: Result<Bytes, BytesRejection>) -> Result<Bytes, Reply> {
    body.map_err(|rejection| Facade::unreadable_body(rejection.status()))
}

async fn best_score(State(facade): State<AppState>) -> Reply {
    facade.best_score().await
}

async fn submit_score(
    State(facade): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Reply {
    match readable(body) {
        Ok(body) => facade.submit_score(&body).await,
        Err(reply) => reply,
    }
}

async fn ranked_scores(State(facade): State<AppState>) -> Reply {
    facade.ranked_scores().await
}

async fn public_messages(State(facade): State<AppState>) -> Reply {
    facade.public_messages().await
}

async fn submit_message(
    State(facade): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Reply {
    match readable(body) {
        Ok(body) => facade.submit_message(&body).await,
        Err(reply) => reply,
    }
}

async fn all_messages(State(facade): State<AppState>) -> Reply {
    facade.all_messages().await
}

async fn pending_messages(State(facade): State<AppState>) -> Reply {
    facade.pending_messages().await
}

async fn set_message_status(
    State(facade): State<AppState>,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Reply {
    match readable(body) {
        Ok(body) => facade.set_message_status(raw_id(&uri), &body).await,
        Err(reply) => reply,
    }
}

async fn delete_message(State(facade): State<AppState>, uri: Uri) -> Reply {
    facade.delete_message(raw_id(&uri)).await
}

async fn health() -> Reply {
    Facade::health()
}

/// Resolves on Ctrl+C, or on SIGTERM where the platform has it.
pub async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
                return;
            }
            Err(e) => warn!("SIGTERM handler unavailable: {}", e),
        }
    }
    ctrl_c.await.ok();
    info!("Received Ctrl+C, shutting down...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_id_keeps_percent_encoding() {
        let uri: Uri = "/api/admin/messages/%31/status".parse().unwrap();
        assert_eq!(raw_id(&uri), "%31");

        let uri: Uri = "/api/admin/messages/17".parse().unwrap();
        assert_eq!(raw_id(&uri), "17");

        let uri: Uri = "/api/admin/messages/17?x=1".parse().unwrap();
        assert_eq!(raw_id(&uri), "17");
    }
}
