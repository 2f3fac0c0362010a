//! Submit endpoint: `POST /messages`.
//!
//! The body must be a JSON object with a non-empty `conversation` string. The
//! whole body is forwarded, along with the caller's query string and headers.
//! The connection stays open until the callback arrives or the request times
//! out.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::correlation::{ConversationId, ForwardContext};
use crate::http::request::request_id;
use crate::http::response::error_response;
use crate::http::server::AppState;

/// Body field carrying the conversation id.
pub const CONVERSATION_FIELD: &str = "conversation";

pub async fn submit_message(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return error_response(StatusCode::BAD_REQUEST, "conversation is required");
    };
    let Some(id) = conversation_id(&body) else {
        return error_response(StatusCode::BAD_REQUEST, "conversation is required");
    };

    tracing::info!(
        request_id = %request_id(&headers),
        conversation_id = %id,
        "Message submitted"
    );

    // Axum drops this future when the client disconnects. The coordinator runs
    // in its own task and learns about the disconnect when `connection` drops.
    let (connection, closed) = oneshot::channel::<()>();
    let context = ForwardContext { query, headers };
    let coordinator = state.coordinator.clone();
    let task = tokio::spawn(async move {
        coordinator
            .handle(id, body, context, async move {
                let _ = closed.await;
            })
            .await
    });

    let outcome = task.await;
    drop(connection);

    match outcome {
        Ok(outcome) => outcome.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Request task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Request failed")
        }
    }
}

fn conversation_id(body: &Value) -> Option<ConversationId> {
    body.get(CONVERSATION_FIELD)
        .and_then(Value::as_str)
        .and_then(|s| ConversationId::new(s).ok())
}
