//! Failure tests for the aggregation core
//!
//! These tests verify that the system handles failures gracefully:
//! - Invalid configuration is rejected up front
//! - Slow, refusing and broken endpoints only cost their own snapshots
//! - Connections are released on every path

use std::time::{Duration, Instant};

use assert_matches::assert_matches;
use queue_monitoring::Reachability;
use queue_monitoring::admin::memory::{BrokerBehavior, ScriptedBroker};
use queue_monitoring::config::{EndpointConfig, parse_config};
use queue_monitoring::error::{ConfigError, ProtocolError};
use queue_monitoring::registry::ServerRegistry;
use queue_monitoring::service::QueueMonitor;

use crate::helpers::*;

#[test]
fn test_duplicate_endpoint_names_rejected() {
    let result = ServerRegistry::new(vec![
        create_endpoint_config("X"),
        create_endpoint_config("Y"),
        create_endpoint_config("X"),
    ]);

    assert_matches!(result, Err(ConfigError::DuplicateName(name)) if name == "X");
}

#[test]
fn test_invalid_descriptors_rejected() {
    let mut no_host = create_endpoint_config("A");
    no_host.host = "  ".to_string();
    assert_matches!(ServerRegistry::new(vec![no_host]), Err(ConfigError::EmptyHost { .. }));

    let bad_port = EndpointConfig {
        port: 70000,
        ..create_endpoint_config("A")
    };
    assert_matches!(
        ServerRegistry::new(vec![bad_port]),
        Err(ConfigError::InvalidPort { port: 70000, .. })
    );
}

#[test]
fn test_config_with_duplicates_fails_monitor_construction() {
    let config = parse_config(
        r#"{
            "endpoints": [
                {"name": "X", "host": "broker-1", "port": 7222},
                {"name": "x", "host": "broker-2", "port": 7222}
            ]
        }"#,
    )
    .unwrap();

    assert_matches!(
        QueueMonitor::from_config(&config).err(),
        Some(ConfigError::DuplicateName(_))
    );
}

#[tokio::test]
async fn test_slow_endpoint_times_out_while_other_succeeds() {
    let (monitor, client) = create_monitor(
        vec![
            ("A", ScriptedBroker::with_queues([("ORDERS", 9000)])),
            ("B", ScriptedBroker::hanging()),
        ],
        300,
    );

    let started = Instant::now();
    let alerts = monitor.alerts().await;
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(2), "cycle not bounded: {elapsed:?}");
    assert_eq!(alerts.endpoints_succeeded, 1);
    assert!(alerts.queues.iter().all(|q| q.endpoint == "A"));
    assert_eq!(monitor.reachability().get("B"), Some(&Reachability::Unreachable));

    wait_for_release(&client).await;
    assert_eq!(client.open_connections(), 0);
}

#[tokio::test]
async fn test_broken_listing_isolated() {
    let (monitor, client) = create_monitor(
        vec![
            ("A", ScriptedBroker::with_queues([("ORDERS", 9000)])),
            (
                "B",
                ScriptedBroker::new(BrokerBehavior::FailListing(ProtocolError::Malformed(
                    "truncated".to_string(),
                ))),
            ),
        ],
        2000,
    );

    let alerts = monitor.alerts().await;

    assert_eq!(alerts.queues.len(), 1);
    assert_eq!(monitor.reachability().get("B"), Some(&Reachability::Unreachable));
    assert_eq!(client.connections_opened(), 2);
    assert_eq!(client.open_connections(), 0);
}

#[tokio::test]
async fn test_malformed_entries_skipped_individually() {
    let listing = vec![
        Ok(queue_monitoring::admin::QueueEntry {
            name: "GOOD".to_string(),
            pending_messages: 12000,
        }),
        Err(ProtocolError::InvalidCount {
            queue: "BAD".to_string(),
            count: -5,
        }),
    ];
    let (monitor, _client) = create_monitor(
        vec![("A", ScriptedBroker::new(BrokerBehavior::Serve(listing)))],
        2000,
    );

    let queues = monitor.endpoint_queues("A").await;

    assert_eq!(queues.len(), 1);
    assert_eq!(queues[0].queue, "GOOD");
    assert_eq!(monitor.reachability().get("A"), Some(&Reachability::Reachable));
}

#[tokio::test]
async fn test_shutdown_rejects_new_cycles() {
    let (monitor, client) =
        create_monitor(vec![("A", ScriptedBroker::with_queues([("Q", 9000)]))], 2000);

    monitor.shutdown();
    let alerts = monitor.alerts().await;

    assert_eq!(alerts.endpoints_succeeded, 0);
    assert_eq!(client.connections_opened(), 0);
}
