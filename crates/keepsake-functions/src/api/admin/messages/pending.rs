//! `/api/admin/messages/pending`: the moderation queue.

use keepsake_api::{Endpoint, Reply};

use crate::{FunctionRequest, Invocation};

pub const ENDPOINT: Endpoint = Endpoint::PendingMessages;

pub async fn handler(invocation: &Invocation, request: FunctionRequest) -> Reply {
    invocation
        .facade()
        .dispatch(ENDPOINT, &request.method, request.id.as_deref(), request.body())
        .await
}
