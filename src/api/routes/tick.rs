//! `POST /api/tick` (§6.5): external-scheduler entry point for the Sweeper.
//!
//! Shares `sweep_once` with the internal periodic task spawned in `sentinel-hub` -- there is
//! exactly one sweep implementation regardless of trigger source.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiResult;
use crate::api::state::ApiState;
use crate::api::types::TickResponse;

/// POST /api/tick
pub async fn post_tick(State(state): State<ApiState>) -> ApiResult<Json<TickResponse>> {
    let summary = state.sweeper.sweep_once().await;
    Ok(Json(TickResponse {
        checked: summary.checked,
        marked_dead: summary.marked_dead,
        alerts_sent: summary.alerts_sent,
        logs_pruned: summary.logs_pruned,
    }))
}
