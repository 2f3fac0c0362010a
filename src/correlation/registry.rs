//! Registry of in-flight requests keyed by conversation id.
//!
//! All mutation goes through three atomic operations:
//! - `try_register`: insert if absent, under the shard lock.
//! - `resolve`: remove the waiter and write the payload into its slot.
//! - `remove` / `reclaim`: take the waiter out without a payload.
//!
//! Removal from the map is the single linearization point. Whichever caller
//! removes the entry owns the terminal transition; every other caller finds the
//! key absent and does nothing.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::correlation::types::{AlreadyInFlight, CallbackPayload, ConversationId};
use crate::correlation::waiter::{Waiter, WaiterHandle};
use crate::observability::metrics;

/// Concurrency-safe map of conversation id to pending waiter.
#[derive(Debug, Default)]
pub struct Registry {
    inner: DashMap<ConversationId, Waiter>,
    next_ticket: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh pending waiter for `id`.
    ///
    /// Fails without touching the map if `id` already has a waiter.
    pub fn try_register(&self, id: ConversationId) -> Result<WaiterHandle, AlreadyInFlight> {
        let handle = match self.inner.entry(id) {
            Entry::Occupied(entry) => return Err(AlreadyInFlight(entry.key().clone())),
            Entry::Vacant(entry) => {
                let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
                let (waiter, handle) = Waiter::pair(entry.key().clone(), ticket);
                entry.insert(waiter);
                handle
            }
        };
        metrics::pending_inc();
        tracing::debug!(conversation_id = %handle.id, ticket = handle.ticket, "Waiter registered");
        Ok(handle)
    }

    /// Deliver `payload` to the waiter for `id`.
    ///
    /// Returns false when no waiter is registered (never was, or already
    /// reclaimed by timeout/disconnect) or its coordinator is gone. A false
    /// result is expected for late and duplicate callbacks.
    pub fn resolve(&self, id: &ConversationId, payload: CallbackPayload) -> bool {
        let Some((_, mut waiter)) = self.inner.remove(id) else {
            return false;
        };
        metrics::pending_dec();
        waiter.resolve(payload)
    }

    /// Unconditionally remove and return the waiter for `id`.
    ///
    /// The returned waiter is detached: its coordinator sees the slot close
    /// immediately, whether or not the caller keeps the waiter.
    pub fn remove(&self, id: &ConversationId) -> Option<Waiter> {
        let (_, mut waiter) = self.inner.remove(id)?;
        metrics::pending_dec();
        waiter.detach();
        Some(waiter)
    }

    /// Remove the waiter created for `handle`, if it is still registered.
    ///
    /// Unlike [`Registry::remove`], this never evicts a newer waiter that
    /// reused the same id after the handle's own waiter was resolved.
    pub fn reclaim(&self, handle: &WaiterHandle) -> Option<Waiter> {
        let removed = self
            .inner
            .remove_if(&handle.id, |_, waiter| waiter.ticket() == handle.ticket)
            .map(|(_, waiter)| waiter);
        if removed.is_some() {
            metrics::pending_dec();
        }
        removed
    }

    /// Whether a waiter is currently registered for `id`.
    pub fn contains(&self, id: &ConversationId) -> bool {
        self.inner.contains_key(id)
    }

    /// Number of in-flight requests.
    pub fn in_flight(&self) -> usize {
        self.inner.len()
    }
}
