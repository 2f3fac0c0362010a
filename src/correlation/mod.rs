//! Correlation engine.
//!
//! # Data Flow
//! ```text
//! POST /messages
//!     → coordinator.rs (register, forward, wait)
//!     → registry.rs    (id → waiter, atomic register/resolve/remove)
//!     → forwarder.rs   (POST to downstream)
//!
//! POST /webhook
//!     → registry.rs resolve(id, payload)
//!     → waiter.rs oneshot slot
//!     → coordinator wakes with Delivered
//! ```
//!
//! # Design Decisions
//! - The registry map is the only shared mutable state
//! - Removal from the map decides which completion path wins
//! - Delivery is a oneshot channel, written at most once
//! - Late callbacks are a normal `false`, never an error

pub mod coordinator;
pub mod forwarder;
pub mod registry;
pub mod types;
pub mod waiter;

pub use coordinator::{Coordinator, Outcome};
pub use forwarder::{ForwardContext, ForwardRequest, Forwarder, HttpForwarder};
pub use registry::Registry;
pub use types::{AlreadyInFlight, CallbackPayload, ConversationId, ForwardError, InvalidConversationId};
pub use waiter::{Waiter, WaiterHandle, WaiterState};
