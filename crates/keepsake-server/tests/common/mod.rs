use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header::CONTENT_TYPE};
use http_body_util::BodyExt;
use keepsake_api::Facade;
use keepsake_db::{SqliteStore, Store};
use serde_json::Value;
use tower::ServiceExt;

/// Full router over a fresh in-memory store.
pub async fn test_app() -> Router {
    let store = SqliteStore::open_in_memory().unwrap();
    store.initialize().await.unwrap();
    keepsake_server::router(Arc::new(Facade::new(Arc::new(store))))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

pub async fn send(app: &Router, method: Method, uri: &str, body: &str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).unwrap())
    };

    TestResponse { status, headers, body }
}

pub async fn get(app: &Router, uri: &str) -> TestResponse {
    send(app, Method::GET, uri, "").await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> TestResponse {
    send(app, Method::POST, uri, &body.to_string()).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> TestResponse {
    send(app, Method::PUT, uri, &body.to_string()).await
}
