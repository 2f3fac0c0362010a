//! Correlation key, callback payload, and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Correlation key linking a submitted request to its eventual callback.
///
/// Never empty: the only constructors reject blank input, so anything holding
/// a `ConversationId` can assume it is usable as a registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConversationId(String);

impl ConversationId {
    /// Create an id, rejecting empty or whitespace-only strings.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidConversationId> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(InvalidConversationId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ConversationId {
    type Error = InvalidConversationId;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<ConversationId> for String {
    fn from(id: ConversationId) -> Self {
        id.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque callback body. The registry routes it by id and never looks inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallbackPayload(pub serde_json::Value);

impl CallbackPayload {
    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for CallbackPayload {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// A conversation id was empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("conversation id must not be empty")]
pub struct InvalidConversationId;

/// A request for this conversation is already waiting on its callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("a request for conversation '{0}' is already in progress")]
pub struct AlreadyInFlight(pub ConversationId);

/// Errors raised while forwarding a request downstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("transport error: {0}")]
    Transport(String),

    /// Downstream answered with a non-success status.
    #[error("downstream returned status {0}")]
    Status(u16),

    /// The downstream URL could not be built.
    #[error("invalid downstream URL: {0}")]
    InvalidUrl(String),
}
