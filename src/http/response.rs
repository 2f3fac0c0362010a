//! Mapping of terminal outcomes to HTTP responses.
//!
//! | Outcome           | Status | Body                         |
//! |-------------------|--------|------------------------------|
//! | Delivered         | 200    | callback payload, verbatim   |
//! | DuplicateInFlight | 409    | `{"error": ...}`             |
//! | TimedOut          | 504    | `{"error": "Request timeout"}` |
//! | ForwardFailed     | 502    | `{"error": "Request failed"}`  |
//! | Cancelled         | 503    | only reachable if the caller is still connected |

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::correlation::Outcome;

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: message.into() })).into_response()
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        match self {
            Outcome::Delivered(payload) => (StatusCode::OK, Json(payload.into_inner())).into_response(),
            Outcome::DuplicateInFlight => error_response(
                StatusCode::CONFLICT,
                "A request for this conversation is already in progress",
            ),
            Outcome::TimedOut => error_response(StatusCode::GATEWAY_TIMEOUT, "Request timeout"),
            Outcome::ForwardFailed(_) => error_response(StatusCode::BAD_GATEWAY, "Request failed"),
            Outcome::Cancelled => error_response(StatusCode::SERVICE_UNAVAILABLE, "Request cancelled"),
        }
    }
}
