//! Local stand-in for the function platform.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{Method, Uri},
};
use keepsake_api::{Facade, Reply};
use keepsake_db::Store;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::api;
use crate::{FunctionRequest, Invocation};

/// Every request lands on one fallback that resolves the path to a function and invokes it.
pub fn app(store: Arc<dyn Store>) -> Router {
    Router::new()
        .fallback(invoke)
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

async fn invoke(
    State(store): State<Arc<dyn Store>>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Reply {
    let Some((function, id)) = api::resolve(uri.path()) else {
        return Facade::not_found_route(uri.path());
    };

    debug!(
        function = function.name(),
        endpoint = ?function.endpoint(),
        %method,
        "Invoking function"
    );
    let invocation = Invocation::new(store);
    let body = body.map_err(|rejection| rejection.status());
    function
        .invoke(&invocation, FunctionRequest { method, id, body })
        .await
}
