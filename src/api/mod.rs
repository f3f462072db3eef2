//! REST API for the queue monitoring hub
//!
//! ## Architecture
//!
//! - **Axum** web framework with Tower middleware
//! - **QueueMonitor** behind an `Arc`, shared by every handler
//! - **CycleStatusStore** fed by the refresh actor's broadcast channel
//!
//! ## Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `GET /api/v1/queues` - Cross-fleet alerts view
//! - `GET /api/v1/queues/:endpoint` - Every queue of one endpoint
//! - `GET /api/v1/endpoints` - Configured endpoints with status
//! - `GET /api/v1/status` - Admin client and reachability
//! - `GET /api/v1/stats` - Last refresh cycle
//! - `GET /api/v1/probe` - Fresh connectivity probe

pub mod error;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use state::{ApiState, CycleHistory, CycleStatusStore};

use std::net::SocketAddr;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ApiSettings;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,

    /// Allow any origin (for browser dashboards)
    pub enable_cors: bool,
}

impl From<&ApiSettings> for ApiConfig {
    fn from(settings: &ApiSettings) -> Self {
        Self {
            bind_addr: settings.bind,
            enable_cors: settings.cors,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from(&ApiSettings::default())
    }
}

/// Build the router with every route and layer
pub fn router(config: &ApiConfig, state: ApiState) -> Router {
    let mut app = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .route("/api/v1/queues", get(routes::queues::list_alerts))
        .route(
            "/api/v1/queues/:endpoint",
            get(routes::queues::get_endpoint_queues),
        )
        .route("/api/v1/endpoints", get(routes::endpoints::list_endpoints))
        .route("/api/v1/status", get(routes::endpoints::get_status))
        .route("/api/v1/stats", get(routes::stats::get_stats))
        .route("/api/v1/probe", get(routes::endpoints::probe_endpoints))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Spawn the API server in a background task and return its local address
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting API server on {}", config.bind_addr);

    let app = router(&config, state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
