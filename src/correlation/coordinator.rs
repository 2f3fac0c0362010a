//! Request lifecycle coordination.
//!
//! # Lifecycle
//! ```text
//! try_register ──Err──▶ DuplicateInFlight
//!      │ Ok
//!      ▼
//!   forward ──Err──▶ reclaim ──▶ ForwardFailed
//!      │ Ok
//!      ▼
//!   select! {
//!      payload   ──────────────────▶ Delivered
//!      timer     ──▶ reclaim ──────▶ TimedOut
//!      disconnect ─▶ reclaim ──────▶ Cancelled
//!   }
//! ```
//!
//! A local path (timer, disconnect, forward failure) only wins if its reclaim
//! takes the waiter out of the registry. If `resolve` got there first the
//! payload is already in the slot, so the outcome becomes `Delivered`.
//! Losing branches are dropped with the `select!`, which releases the timer.

use arc_swap::ArcSwap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::correlation::forwarder::{ForwardContext, ForwardRequest, Forwarder};
use crate::correlation::registry::Registry;
use crate::correlation::types::{CallbackPayload, ConversationId, ForwardError};
use crate::correlation::waiter::{WaiterHandle, WaiterState};
use crate::observability::metrics;

/// Terminal result of one `handle` call. Exactly one is produced per call.
#[derive(Debug)]
pub enum Outcome {
    Delivered(CallbackPayload),
    DuplicateInFlight,
    TimedOut,
    Cancelled,
    ForwardFailed(ForwardError),
}

impl Outcome {
    /// Label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Delivered(_) => "delivered",
            Outcome::DuplicateInFlight => "duplicate",
            Outcome::TimedOut => "timed_out",
            Outcome::Cancelled => "cancelled",
            Outcome::ForwardFailed(_) => "forward_failed",
        }
    }
}

/// Drives requests from registration to a single terminal outcome.
pub struct Coordinator {
    registry: Arc<Registry>,
    forwarder: Arc<dyn Forwarder>,
    timeout: ArcSwap<Duration>,
}

impl Coordinator {
    pub fn new(registry: Arc<Registry>, forwarder: Arc<dyn Forwarder>, timeout: Duration) -> Self {
        Self {
            registry,
            forwarder,
            timeout: ArcSwap::from_pointee(timeout),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Current callback timeout.
    pub fn timeout(&self) -> Duration {
        **self.timeout.load()
    }

    /// Change the timeout for requests registered from now on.
    pub fn set_timeout(&self, timeout: Duration) {
        self.timeout.store(Arc::new(timeout));
    }

    /// Run one request to completion.
    ///
    /// `disconnected` completes when the caller goes away. It is only observed
    /// while waiting for the callback; an issued forward always runs to
    /// completion.
    pub async fn handle<D>(
        &self,
        id: ConversationId,
        body: serde_json::Value,
        context: ForwardContext,
        disconnected: D,
    ) -> Outcome
    where
        D: Future<Output = ()> + Send,
    {
        let mut handle = match self.registry.try_register(id.clone()) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(conversation_id = %id, "{}", e);
                metrics::record_outcome("duplicate");
                return Outcome::DuplicateInFlight;
            }
        };
        let timeout = self.timeout();

        let request = ForwardRequest {
            conversation_id: id,
            body,
            context,
        };
        let outcome = match self.forwarder.forward(&request).await {
            Ok(()) => self.await_resolution(handle, timeout, disconnected).await,
            Err(e) => {
                tracing::error!(conversation_id = %request.conversation_id, error = %e, "Error forwarding request");
                metrics::record_forward_failure(&e);
                match self.settle(&mut handle, WaiterState::Failed).await {
                    Some(payload) => Outcome::Delivered(payload),
                    None => Outcome::ForwardFailed(e),
                }
            }
        };

        metrics::record_outcome(outcome.label());
        outcome
    }

    async fn await_resolution<D>(&self, mut handle: WaiterHandle, timeout: Duration, disconnected: D) -> Outcome
    where
        D: Future<Output = ()> + Send,
    {
        let timer = tokio::time::sleep(timeout);
        tokio::pin!(timer);
        tokio::pin!(disconnected);

        let outcome = tokio::select! {
            biased;

            delivered = &mut handle.delivery => match delivered {
                Ok(payload) => Outcome::Delivered(payload),
                // Sender dropped by an external remove().
                Err(_) => Outcome::Cancelled,
            },
            _ = &mut timer => {
                match self.settle(&mut handle, WaiterState::Expired).await {
                    Some(payload) => Outcome::Delivered(payload),
                    None => {
                        tracing::warn!(conversation_id = %handle.id, timeout = ?timeout, "Request timeout");
                        Outcome::TimedOut
                    }
                }
            },
            _ = &mut disconnected => {
                match self.settle(&mut handle, WaiterState::Cancelled).await {
                    Some(payload) => Outcome::Delivered(payload),
                    None => {
                        tracing::info!(conversation_id = %handle.id, "Caller disconnected before callback");
                        Outcome::Cancelled
                    }
                }
            },
        };

        metrics::record_wait(outcome.label(), handle.created_at.elapsed());
        outcome
    }

    /// Try to end the request locally with `state`.
    ///
    /// Returns the payload instead if a callback already won the race.
    async fn settle(&self, handle: &mut WaiterHandle, state: WaiterState) -> Option<CallbackPayload> {
        match self.registry.reclaim(handle) {
            Some(mut waiter) => {
                waiter.finish(state);
                None
            }
            // resolve() removed the waiter and is writing, or has written, the
            // slot. A waiter taken by remove() is detached, so this cannot stall.
            None => (&mut handle.delivery).await.ok(),
        }
    }
}
