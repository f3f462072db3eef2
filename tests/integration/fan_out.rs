//! End-to-end views over scripted brokers
//!
//! These tests verify that:
//! - The alerts view keeps only warning and critical queues, ordered and capped
//! - The per-endpoint view returns every queue, deepest first
//! - Fallback data is served (and tagged) only when nothing live qualifies

use pretty_assertions::assert_eq;
use queue_monitoring::admin::memory::ScriptedBroker;
use queue_monitoring::monitors::fallback::FallbackDataSource;
use queue_monitoring::monitors::pipeline::FilterSortPipeline;
use queue_monitoring::{Provenance, QueueSnapshot, Reachability, Severity};

use crate::helpers::*;

#[tokio::test]
async fn test_single_endpoint_alerts_and_listing() {
    let (monitor, _client) = create_monitor(
        vec![(
            "A",
            ScriptedBroker::with_queues([("ORDERS", 100), ("PAYMENTS", 6000), ("BOOKINGS", 15000)]),
        )],
        2000,
    );

    let alerts = monitor.alerts().await;
    assert_eq!(alerts.provenance, Provenance::Live);
    assert_eq!(
        alerts
            .queues
            .iter()
            .map(|q| (q.message_count, q.severity()))
            .collect::<Vec<_>>(),
        vec![(15000, Severity::Critical), (6000, Severity::Warning)]
    );

    let queues = monitor.endpoint_queues("A").await;
    assert_eq!(
        queues.iter().map(|q| q.message_count).collect::<Vec<_>>(),
        vec![15000, 6000, 100]
    );
}

#[tokio::test]
async fn test_alerts_ordered_across_endpoints() {
    let (monitor, _client) = create_monitor(
        vec![
            ("B", ScriptedBroker::with_queues([("B.LOW", 5001), ("B.HIGH", 30000)])),
            ("A", ScriptedBroker::with_queues([("A.MID", 8000), ("A.OK", 5000)])),
        ],
        2000,
    );

    let alerts = monitor.alerts().await;

    assert_eq!(
        alerts.queues,
        vec![
            QueueSnapshot::new("A", "A.MID", 8000),
            QueueSnapshot::new("B", "B.HIGH", 30000),
            QueueSnapshot::new("B", "B.LOW", 5001),
        ]
    );
    assert_eq!(alerts.endpoints_queried, 2);
    assert_eq!(alerts.endpoints_succeeded, 2);
}

#[tokio::test]
async fn test_blocklisted_queues_never_surface() {
    let (monitor, _client) = create_monitor(
        vec![(
            "A",
            ScriptedBroker::with_queues([
                ("APP.BAM.EVENTS", 40000),
                ("fcweb.cache.sessions", 40000),
                ("ORDERS", 40000),
            ]),
        )],
        2000,
    );

    let alerts = monitor.alerts().await;
    let listing = monitor.endpoint_queues("A").await;

    for queues in [&alerts.queues, &listing] {
        assert_eq!(queues.len(), 1);
        assert_eq!(queues[0].queue, "ORDERS");
    }
}

#[tokio::test]
async fn test_unknown_endpoint_yields_empty_listing() {
    let (monitor, client) =
        create_monitor(vec![("A", ScriptedBroker::with_queues([("Q", 1)]))], 2000);

    assert!(monitor.endpoint_queues("Z").await.is_empty());
    assert_eq!(client.connections_opened(), 0);
}

#[tokio::test]
async fn test_fallback_when_fleet_unreachable() {
    let (monitor, _client) = create_monitor(
        vec![
            ("A", ScriptedBroker::refusing()),
            ("B", ScriptedBroker::refusing()),
        ],
        2000,
    );

    let alerts = monitor.alerts().await;

    assert_eq!(alerts.provenance, Provenance::Fallback);
    assert_eq!(alerts.endpoints_succeeded, 0);
    assert_eq!(
        alerts.queues,
        FilterSortPipeline::default().alerts(&FallbackDataSource::new().fallback())
    );
    assert!(alerts.queues.iter().all(|q| q.severity().is_alert()));
    assert_eq!(
        monitor.reachability().values().collect::<Vec<_>>(),
        vec![&Reachability::Unreachable, &Reachability::Unreachable]
    );
}

#[tokio::test]
async fn test_fallback_when_nothing_qualifies() {
    let (monitor, _client) = create_monitor(
        vec![("A", ScriptedBroker::with_queues([("Q1", 10), ("Q2", 4999)]))],
        2000,
    );

    let alerts = monitor.alerts().await;

    assert_eq!(alerts.provenance, Provenance::Fallback);
    assert_eq!(alerts.endpoints_succeeded, 1);
    // the live listing is still available per endpoint
    assert_eq!(monitor.endpoint_queues("A").await.len(), 2);
}

#[tokio::test]
async fn test_reachability_follows_latest_attempt() {
    let (monitor, _client) = create_monitor(
        vec![
            ("A", ScriptedBroker::with_queues([("Q", 1)])),
            ("B", ScriptedBroker::refusing()),
            ("C", ScriptedBroker::with_queues([("Q", 1)])),
        ],
        2000,
    );

    monitor.endpoint_queues("A").await;
    monitor.endpoint_queues("B").await;

    let statuses: Vec<_> = monitor
        .configured_endpoints()
        .into_iter()
        .map(|status| (status.name, status.reachability))
        .collect();

    assert_eq!(
        statuses,
        vec![
            ("A".to_string(), Reachability::Reachable),
            ("B".to_string(), Reachability::Unreachable),
            ("C".to_string(), Reachability::Unknown),
        ]
    );
}
