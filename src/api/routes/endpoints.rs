//! Endpoint status and connectivity

use axum::{Json, extract::State};

use super::queues::ensure_running;
use crate::api::{
    error::ApiResult,
    state::ApiState,
    types::{
        EndpointProbeResponse, EndpointStatusResponse, EndpointsResponse, ProbeResponse,
        StatusResponse,
    },
};

/// GET /api/v1/endpoints
///
/// Configured endpoints with their last known status (`UNKNOWN` until first attempted)
pub async fn list_endpoints(State(state): State<ApiState>) -> Json<EndpointsResponse> {
    let endpoints: Vec<_> = state
        .monitor
        .configured_endpoints()
        .into_iter()
        .map(EndpointStatusResponse::from)
        .collect();

    Json(EndpointsResponse {
        total: endpoints.len(),
        endpoints,
    })
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse::new(
        state.monitor.status(),
        state.monitor.reachability(),
    ))
}

/// GET /api/v1/probe
///
/// Fresh collection against every endpoint: status, queue count and top queues
pub async fn probe_endpoints(State(state): State<ApiState>) -> ApiResult<Json<ProbeResponse>> {
    ensure_running(&state)?;

    let endpoints = state
        .monitor
        .probe()
        .await
        .into_iter()
        .map(EndpointProbeResponse::from)
        .collect();

    Ok(Json(ProbeResponse { endpoints }))
}
