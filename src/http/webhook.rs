//! Callback endpoint: `POST /webhook`.
//!
//! Always answers 200. Whether the callback matched a waiting request is
//! logged and counted but never reported to the sender.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::correlation::{CallbackPayload, ConversationId};
use crate::http::server::AppState;
use crate::observability::metrics;

/// Callback field carrying the conversation id.
pub const CONVERSATION_ID_FIELD: &str = "conversation_id";

pub async fn receive_callback(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> StatusCode {
    let data = match body {
        Ok(Json(data)) => data,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable callback");
            return StatusCode::OK;
        }
    };

    tracing::info!(payload = %data, "Callback received");
    if let Some(content) = data.get("content") {
        tracing::info!(content = %content, "Callback message");
    }

    let id = data
        .get(CONVERSATION_ID_FIELD)
        .and_then(Value::as_str)
        .map(ConversationId::new);
    let id = match id {
        Some(Ok(id)) => id,
        _ => {
            tracing::warn!("Callback without a conversation_id");
            return StatusCode::OK;
        }
    };

    let matched = state.registry.resolve(&id, CallbackPayload(data));
    metrics::record_callback(matched);
    if matched {
        tracing::debug!(conversation_id = %id, "Callback delivered");
    } else {
        tracing::info!(conversation_id = %id, "No pending request for callback, dropping");
    }

    StatusCode::OK
}
