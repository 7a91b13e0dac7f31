use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::state::GatewayState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime_seconds: i64,
    pub outstanding_requests: usize,
    /// Requests still waiting for a delivery group.
    pub unannounced_requests: usize,
    pub oldest_request_age_seconds: Option<i64>,
}

/// Plain-text liveness probe.
pub async fn alive() -> &'static str {
    "OK"
}

pub async fn health_check(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let now = Utc::now();
    let outstanding = state.coordinator().ledger().outstanding();

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: now.to_rfc3339(),
        uptime_seconds: (now - state.started_at()).num_seconds(),
        outstanding_requests: outstanding.len(),
        unannounced_requests: outstanding.iter().filter(|request| !request.announced).count(),
        oldest_request_age_seconds: outstanding
            .first()
            .map(|request| (now - request.requested_at).num_seconds().max(0)),
    })
}
