use axum::{extract::State, Json};
use serde::Serialize;

use crate::admin::AdminState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct PendingSummary {
    pub in_flight: usize,
}

#[derive(Serialize)]
pub struct EffectiveConfig {
    pub timeout_secs: u64,
    pub downstream: String,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

pub async fn get_pending(State(state): State<AdminState>) -> Json<PendingSummary> {
    Json(PendingSummary {
        in_flight: state.coordinator.registry().in_flight(),
    })
}

pub async fn get_config(State(state): State<AdminState>) -> Json<EffectiveConfig> {
    Json(EffectiveConfig {
        timeout_secs: state.coordinator.timeout().as_secs(),
        downstream: state.downstream.to_string(),
    })
}
