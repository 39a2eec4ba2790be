use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use balview_core::domain::txn::Txn;
use balview_core::domain::variance::{VarianceId, VarianceRow};
use balview_core::gateway::StaticGateway;
use tracing::debug;

#[derive(Clone)]
pub struct ApiState {
    fixtures: Arc<StaticGateway>,
}

pub fn router(fixtures: Arc<StaticGateway>) -> Router {
    Router::new()
        .route("/api/variances", get(variances))
        .route("/api/transactions/{var_id}", get(transactions))
        .with_state(ApiState { fixtures })
}

pub async fn variances(State(state): State<ApiState>) -> Json<Vec<VarianceRow>> {
    let rows = state.fixtures.rows().to_vec();
    debug!(event_name = "api.variances.served", row_count = rows.len(), "served variance rows");
    Json(rows)
}

/// Unknown ids answer `200 []`, matching an empty drill-down.
pub async fn transactions(
    State(state): State<ApiState>,
    Path(var_id): Path<String>,
) -> Json<Vec<Txn>> {
    let var_id = VarianceId(var_id);
    let txns = state.fixtures.transactions_for(&var_id);
    debug!(
        event_name = "api.transactions.served",
        row_id = %var_id,
        txn_count = txns.len(),
        "served row transactions"
    );
    Json(txns)
}
