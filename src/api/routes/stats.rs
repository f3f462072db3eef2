//! Refresh statistics endpoint

use axum::{Json, extract::State};

use crate::api::{state::ApiState, types::StatsResponse};

/// GET /api/v1/stats
///
/// The last completed refresh cycle, or `null` when none has run
pub async fn get_stats(State(state): State<ApiState>) -> Json<StatsResponse> {
    let history = state.cycles.history().await;

    Json(StatsResponse {
        timestamp: chrono::Utc::now().to_rfc3339(),
        cycles: history.cycles,
        last_cycle: history.last,
    })
}
