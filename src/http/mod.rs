//! HTTP boundary.
//!
//! # Data Flow
//! ```text
//! POST /messages
//!     → request.rs  (request id)
//!     → messages.rs (validate, spawn coordinator, watch connection)
//!     → response.rs (outcome → status + body)
//!
//! POST /webhook
//!     → webhook.rs  (log, resolve, always 200)
//! ```

pub mod messages;
pub mod request;
pub mod response;
pub mod server;
pub mod webhook;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
