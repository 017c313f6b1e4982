use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{Method, StatusCode};
use keepsake_api::Facade;
use keepsake_db::Store;

/// Per-request context handed to a function. Holds only the shared store handle; no state
/// survives between invocations.
pub struct Invocation {
    store: Arc<dyn Store>,
}

impl Invocation {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn facade(&self) -> Facade {
        Facade::new(self.store.clone())
    }
}

/// What a function sees of the incoming request.
#[derive(Debug, Clone)]
pub struct FunctionRequest {
    pub method: Method,
    /// Id segment captured from the path, for the per-message functions.
    pub id: Option<String>,
    /// The body, or the status the platform gave up reading it with.
    pub body: Result<Bytes, StatusCode>,
}

impl FunctionRequest {
    pub fn body(&self) -> Result<&[u8], StatusCode> {
        self.body.as_deref().map_err(|status| *status)
    }
}
