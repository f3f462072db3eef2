//! Queue views

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::debug;

use crate::api::{
    error::{ApiError, ApiResult},
    state::ApiState,
    types::{AlertsResponse, EndpointQueuesResponse, QueueResponse},
};

/// 503 once the monitor has been shut down
pub(crate) fn ensure_running(state: &ApiState) -> ApiResult<()> {
    if state.monitor.status().shut_down {
        return Err(ApiError::Unavailable("queue monitor is shutting down".to_string()));
    }
    Ok(())
}

/// GET /api/v1/queues
///
/// Warning and critical queues across every endpoint. `source` tells live
/// data apart from the fallback seed set.
pub async fn list_alerts(State(state): State<ApiState>) -> ApiResult<Json<AlertsResponse>> {
    ensure_running(&state)?;

    let view = state.monitor.alerts().await;
    Ok(Json(AlertsResponse::from(view)))
}

/// GET /api/v1/queues/:endpoint
///
/// Every queue of one endpoint, deepest first. An unreachable endpoint
/// yields an empty list, an unconfigured one a 404.
pub async fn get_endpoint_queues(
    State(state): State<ApiState>,
    Path(endpoint): Path<String>,
) -> ApiResult<Json<EndpointQueuesResponse>> {
    ensure_running(&state)?;

    let Some(name) = state
        .monitor
        .registry()
        .find(&endpoint)
        .map(|descriptor| descriptor.name.clone())
    else {
        debug!("queues requested for unknown endpoint '{endpoint}'");
        return Err(ApiError::NotFound(format!("endpoint '{endpoint}' not found")));
    };

    let queues = state.monitor.endpoint_queues(&name).await;

    Ok(Json(EndpointQueuesResponse {
        endpoint: name,
        queues: queues.iter().map(QueueResponse::from).collect(),
    }))
}
