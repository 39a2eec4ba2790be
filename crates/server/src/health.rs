use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use balview_core::gateway::StaticGateway;
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    fixtures: Arc<StaticGateway>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FixtureCounts {
    pub variances: usize,
    pub transactions: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub fixtures: FixtureCounts,
    pub checked_at: String,
}

pub fn router(fixtures: Arc<StaticGateway>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { fixtures })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let counts = FixtureCounts {
        variances: state.fixtures.rows().len(),
        transactions: state.fixtures.transaction_count(),
    };
    let ready = counts.variances > 0;

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "balview-server serving fixture review api".to_string(),
        },
        fixtures: counts,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}
