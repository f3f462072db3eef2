//! Concurrency tests for the fan-out
//!
//! These tests verify that:
//! - Endpoints are queried in parallel, not one after the other
//! - The worker pool never exceeds its configured size
//! - Concurrent consumers share the pool safely

use std::sync::Arc;
use std::time::{Duration, Instant};

use queue_monitoring::admin::memory::{InMemoryAdminClient, ScriptedBroker};
use queue_monitoring::config::MonitorConfig;
use queue_monitoring::service::QueueMonitor;

use crate::helpers::*;

fn slow_brokers(count: usize, latency: Duration) -> (Vec<String>, InMemoryAdminClient) {
    let names: Vec<String> = (0..count).map(|i| format!("EMS{i:02}")).collect();
    let client = names.iter().fold(InMemoryAdminClient::new(), |client, name| {
        client.broker(
            name.clone(),
            ScriptedBroker::with_queues([("ORDERS", 7000)]).latency(latency),
        )
    });
    (names, client)
}

#[tokio::test]
async fn test_endpoints_queried_in_parallel() {
    let (names, client) = slow_brokers(8, Duration::from_millis(200));
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let monitor = QueueMonitor::new(
        create_registry(&names),
        Arc::new(client),
        None,
        &create_monitor_config(2000),
    );

    let started = Instant::now();
    let alerts = monitor.alerts().await;

    assert_eq!(alerts.endpoints_succeeded, 8);
    assert_eq!(alerts.queues.len(), 8);
    // sequential would take 1.6s
    assert!(started.elapsed() < Duration::from_millis(1200));
}

#[tokio::test]
async fn test_pool_size_respected() {
    let (names, client) = slow_brokers(12, Duration::from_millis(50));
    let client = Arc::new(client);
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let config = MonitorConfig {
        concurrency: 3,
        ..create_monitor_config(2000)
    };
    let monitor = QueueMonitor::new(create_registry(&names), client.clone(), None, &config);

    let alerts = monitor.alerts().await;

    assert_eq!(alerts.endpoints_succeeded, 12);
    assert!(client.peak_open_connections() <= 3);
    assert_eq!(client.open_connections(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_consumers() {
    let (monitor, client) = create_monitor(
        vec![
            ("A", ScriptedBroker::with_queues([("Q1", 6000), ("Q2", 11000)])),
            ("B", ScriptedBroker::with_queues([("Q3", 100)])),
        ],
        2000,
    );

    let mut tasks = vec![];
    for i in 0..10 {
        let monitor = monitor.clone();
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                monitor.alerts().await.queues.len()
            } else {
                monitor.endpoint_queues("B").await.len()
            }
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let len = task.await.unwrap();
        assert_eq!(len, if i % 2 == 0 { 2 } else { 1 });
    }

    assert_eq!(client.open_connections(), 0);
    assert_eq!(monitor.reachability().len(), 2);
}
