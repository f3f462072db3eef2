//! Integration tests for API endpoints
//!
//! These tests verify that:
//! - Every route returns the expected JSON shape
//! - Unknown endpoints map to 404 and a JSON error body
//! - Refresh cycles show up in the stats route
//! - The server binds and serves over real TCP

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use queue_monitoring::actors::refresh::RefreshHandle;
use queue_monitoring::admin::memory::ScriptedBroker;
use queue_monitoring::api::{ApiConfig, ApiState, router, spawn_api_server};
use queue_monitoring::service::QueueMonitor;
use serde_json::Value;
use tokio::sync::broadcast;
use tower::ServiceExt;

use crate::helpers::*;

fn test_state() -> ApiState {
    let (monitor, _client) = create_monitor(
        vec![
            (
                "EMS-A",
                ScriptedBroker::with_queues([
                    ("ORDERS", 100),
                    ("PAYMENTS", 6000),
                    ("BOOKINGS", 15000),
                    ("AUDIT", 50),
                ]),
            ),
            ("EMS-B", ScriptedBroker::refusing()),
        ],
        1000,
    );
    ApiState::new(monitor)
}

async fn get_json(state: ApiState, uri: &str) -> (StatusCode, Value) {
    let app = router(&ApiConfig::default(), state);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get_json(test_state(), "/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_alerts_endpoint() {
    let (status, body) = get_json(test_state(), "/api/v1/queues").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "live");
    assert_eq!(body["endpoints_queried"], 2);
    assert_eq!(body["endpoints_succeeded"], 1);

    let queues = body["queues"].as_array().unwrap();
    assert_eq!(queues.len(), 2);
    assert_eq!(queues[0]["queue"], "BOOKINGS");
    assert_eq!(queues[0]["severity"], "critical");
    assert_eq!(queues[1]["queue"], "PAYMENTS");
    assert_eq!(queues[1]["severity"], "warning");
}

#[tokio::test]
async fn test_endpoint_queues_endpoint() {
    let (status, body) = get_json(test_state(), "/api/v1/queues/ems-a").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoint"], "EMS-A");

    let counts: Vec<u64> = body["queues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["message_count"].as_u64().unwrap())
        .collect();
    assert_eq!(counts, vec![15000, 6000, 100, 50]);
}

#[tokio::test]
async fn test_unreachable_endpoint_has_empty_listing() {
    let (status, body) = get_json(test_state(), "/api/v1/queues/EMS-B").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["queues"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_unknown_endpoint_not_found() {
    let (status, body) = get_json(test_state(), "/api/v1/queues/NOPE").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("NOPE"));
}

#[tokio::test]
async fn test_endpoints_and_status() {
    let state = test_state();

    let (_, before) = get_json(state.clone(), "/api/v1/endpoints").await;
    assert_eq!(before["total"], 2);
    assert_eq!(before["endpoints"][0]["name"], "EMS-A");
    assert_eq!(before["endpoints"][0]["status"], "UNKNOWN");

    get_json(state.clone(), "/api/v1/queues").await;

    let (_, after) = get_json(state.clone(), "/api/v1/endpoints").await;
    assert_eq!(after["endpoints"][0]["status"], "OK");
    assert_eq!(after["endpoints"][1]["status"], "UNREACHABLE");

    let (status, body) = get_json(state, "/api/v1/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["admin_client"], "memory");
    assert_eq!(body["admin_available"], true);
    assert_eq!(body["endpoint_count"], 2);
    assert_eq!(body["reachability"]["EMS-B"], "UNREACHABLE");
}

#[tokio::test]
async fn test_probe_endpoint() {
    let (status, body) = get_json(test_state(), "/api/v1/probe").await;

    assert_eq!(status, StatusCode::OK);
    let endpoints = body["endpoints"].as_array().unwrap();
    assert_eq!(endpoints.len(), 2);

    assert_eq!(endpoints[0]["status"], "OK");
    assert_eq!(endpoints[0]["queue_count"], 4);
    assert_eq!(endpoints[0]["top_queues"].as_array().unwrap().len(), 3);
    assert_eq!(endpoints[0]["top_queues"][0]["queue"], "BOOKINGS");

    assert_eq!(endpoints[1]["status"], "UNREACHABLE");
    assert_eq!(endpoints[1]["queue_count"], 0);
}

#[tokio::test]
async fn test_shut_down_monitor_unavailable() {
    let state = test_state();
    state.monitor.shutdown();

    for uri in ["/api/v1/queues", "/api/v1/queues/EMS-A", "/api/v1/probe"] {
        let (status, body) = get_json(state.clone(), uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body["error"], "queue monitor is shutting down", "{uri}");
    }

    let (status, body) = get_json(state, "/api/v1/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shut_down"], true);
}

#[tokio::test]
async fn test_stats_reflect_refresh_cycles() {
    let state = test_state();

    let (_, empty) = get_json(state.clone(), "/api/v1/stats").await;
    assert_eq!(empty["cycles"], 0);
    assert!(empty["last_cycle"].is_null());

    let (cycle_tx, _) = broadcast::channel(16);
    state.cycles.clone().follow(cycle_tx.subscribe());
    let handle = RefreshHandle::spawn(state.monitor.clone(), 3600, cycle_tx);
    let event = handle.refresh_now().await.unwrap();

    let mut body = Value::Null;
    for _ in 0..50 {
        let (_, stats) = get_json(state.clone(), "/api/v1/stats").await;
        if stats["last_cycle"]["alert_count"] == event.alert_count {
            body = stats;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert_eq!(body["last_cycle"]["source"], "live");
    assert_eq!(body["last_cycle"]["endpoints_queried"], 2);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_server_serves_over_tcp() {
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        enable_cors: true,
    };
    let (monitor, _client): (Arc<QueueMonitor>, _) = create_monitor(vec![], 500);

    let addr = spawn_api_server(config, ApiState::new(monitor)).await.unwrap();

    let response = reqwest::get(format!("http://{addr}/api/v1/endpoints"))
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["total"], 0);
}
