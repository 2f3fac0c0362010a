//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_outcomes_total` (counter): terminal outcomes by `outcome`
//! - `gateway_wait_duration_seconds` (histogram): time from registration to outcome
//! - `gateway_pending_waiters` (gauge): requests currently awaiting a callback
//! - `gateway_callbacks_total` (counter): callbacks by `matched` (true/false)
//! - `gateway_late_callbacks_total` (counter): callbacks with no waiter
//! - `gateway_forward_failures_total` (counter): failed forwards by `kind`
//!
//! Without an installed recorder every call is a no-op.

use ::metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use crate::correlation::ForwardError;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_outcome(outcome: &'static str) {
    counter!("gateway_outcomes_total", "outcome" => outcome).increment(1);
}

pub fn record_wait(outcome: &'static str, elapsed: Duration) {
    histogram!("gateway_wait_duration_seconds", "outcome" => outcome).record(elapsed.as_secs_f64());
}

/// A waiter entered the registry.
pub fn pending_inc() {
    gauge!("gateway_pending_waiters").increment(1.0);
}

/// A waiter left the registry.
pub fn pending_dec() {
    gauge!("gateway_pending_waiters").decrement(1.0);
}

pub fn record_callback(matched: bool) {
    let matched = if matched { "true" } else { "false" };
    counter!("gateway_callbacks_total", "matched" => matched).increment(1);
    if matched == "false" {
        counter!("gateway_late_callbacks_total").increment(1);
    }
}

pub fn record_forward_failure(error: &ForwardError) {
    let kind = match error {
        ForwardError::Transport(_) => "transport",
        ForwardError::Status(_) => "status",
        ForwardError::InvalidUrl(_) => "invalid_url",
    };
    counter!("gateway_forward_failures_total", "kind" => kind).increment(1);
}
