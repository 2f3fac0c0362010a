//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! correlation + http produce:
//!     → logging.rs (structured log events, pretty or JSON)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Every log line for a request carries its conversation id
//! - Metrics are opt-in; recording without an exporter costs nothing

pub mod logging;
pub mod metrics;
