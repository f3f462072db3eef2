//! Helper functions for integration tests

use std::sync::Arc;
use std::time::Duration;

use queue_monitoring::admin::memory::{InMemoryAdminClient, ScriptedBroker};
use queue_monitoring::config::{EndpointConfig, MonitorConfig};
use queue_monitoring::registry::ServerRegistry;
use queue_monitoring::service::QueueMonitor;

pub fn create_endpoint_config(name: &str) -> EndpointConfig {
    EndpointConfig {
        name: name.to_string(),
        host: format!("{}.brokers.test", name.to_lowercase()),
        port: 7222,
        username: Some("admin".to_string()),
        password: None,
        tls: false,
    }
}

pub fn create_registry(names: &[&str]) -> ServerRegistry {
    ServerRegistry::new(names.iter().map(|name| create_endpoint_config(name)).collect()).unwrap()
}

pub fn create_monitor_config(timeout_ms: u64) -> MonitorConfig {
    MonitorConfig {
        timeout_ms,
        ..Default::default()
    }
}

/// Monitor over scripted brokers, keeping a handle on the client for assertions
pub fn create_monitor(
    brokers: Vec<(&str, ScriptedBroker)>,
    timeout_ms: u64,
) -> (Arc<QueueMonitor>, Arc<InMemoryAdminClient>) {
    let names: Vec<&str> = brokers.iter().map(|(name, _)| *name).collect();
    let registry = create_registry(&names);

    let client = Arc::new(
        brokers
            .into_iter()
            .fold(InMemoryAdminClient::new(), |client, (name, broker)| {
                client.broker(name, broker)
            }),
    );

    let monitor = QueueMonitor::new(
        registry,
        client.clone(),
        None,
        &create_monitor_config(timeout_ms),
    );

    (Arc::new(monitor), client)
}

/// Wait for guards released on drop to finish closing their connections
pub async fn wait_for_release(client: &InMemoryAdminClient) {
    for _ in 0..100 {
        if client.open_connections() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
