//! Callback correlation gateway.
//!
//! Holds a caller's request open while the downstream service answers out of
//! band through a webhook, then hands the callback payload back to the caller.

pub mod admin;
pub mod config;
pub mod correlation;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::GatewayConfig;
pub use correlation::{Coordinator, Outcome, Registry};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
