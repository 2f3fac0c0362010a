//! In-flight request records.
//!
//! A registration produces two halves joined by a oneshot channel:
//! - [`Waiter`] lives in the registry and owns the sending half.
//! - [`WaiterHandle`] is held by the coordinator and owns the receiving half.
//!
//! Whoever removes the `Waiter` from the registry decides its terminal state.
//! The sender is consumed on delivery, so the slot can be written at most once.

use std::time::{Instant, SystemTime};
use tokio::sync::oneshot;

use crate::correlation::types::{CallbackPayload, ConversationId};

/// Lifecycle state of a waiter. Every state but `Pending` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterState {
    Pending,
    Resolved,
    Expired,
    Cancelled,
    Failed,
}

impl WaiterState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WaiterState::Pending)
    }
}

/// Registry-side record of one in-flight request.
#[derive(Debug)]
pub struct Waiter {
    id: ConversationId,
    ticket: u64,
    created_at: Instant,
    registered_at: SystemTime,
    state: WaiterState,
    slot: Option<oneshot::Sender<CallbackPayload>>,
}

/// Coordinator-side half of a registration.
#[derive(Debug)]
pub struct WaiterHandle {
    pub(crate) id: ConversationId,
    pub(crate) ticket: u64,
    pub(crate) created_at: Instant,
    pub(crate) delivery: oneshot::Receiver<CallbackPayload>,
}

impl Waiter {
    pub(crate) fn pair(id: ConversationId, ticket: u64) -> (Waiter, WaiterHandle) {
        let (tx, rx) = oneshot::channel();
        let created_at = Instant::now();
        let waiter = Waiter {
            id: id.clone(),
            ticket,
            created_at,
            registered_at: SystemTime::now(),
            state: WaiterState::Pending,
            slot: Some(tx),
        };
        let handle = WaiterHandle {
            id,
            ticket,
            created_at,
            delivery: rx,
        };
        (waiter, handle)
    }

    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Wall-clock registration time, for diagnostics.
    pub fn registered_at(&self) -> SystemTime {
        self.registered_at
    }

    pub fn state(&self) -> WaiterState {
        self.state
    }

    /// Write the payload into the delivery slot.
    ///
    /// Returns false if the waiter was already terminal or the owning
    /// coordinator has gone away.
    pub(crate) fn resolve(&mut self, payload: CallbackPayload) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = WaiterState::Resolved;
        match self.slot.take() {
            Some(tx) => tx.send(payload).is_ok(),
            None => false,
        }
    }

    /// Move a pending waiter to a locally decided terminal state.
    ///
    /// Dropping the slot closes the channel without a value. Returns the state
    /// the waiter held before the call.
    pub(crate) fn finish(&mut self, state: WaiterState) -> WaiterState {
        let previous = self.state;
        if !previous.is_terminal() {
            self.state = state;
            self.slot = None;
        }
        previous
    }

    /// Close the delivery slot without changing the state.
    ///
    /// The owning coordinator observes a closed channel right away, so holding
    /// a detached waiter never stalls it.
    pub(crate) fn detach(&mut self) {
        self.slot = None;
    }
}

impl WaiterHandle {
    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}
