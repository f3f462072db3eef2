//! FanOutAggregator - Queries every endpoint in parallel under one time budget
//!
//! ## Architecture
//!
//! ```text
//! aggregate(timeout)
//!     │
//!     ├──spawn──► task(A) ─► permit ─► timeout(collect A) ─┐
//!     ├──spawn──► task(B) ─► permit ─► timeout(collect B) ─┼─► join_all ─► AggregationResult
//!     └──spawn──► task(C) ─► (waits for a permit)         ─┘
//! ```
//!
//! A bounded semaphore caps how many collections run at once. Each task gets
//! the full budget once it holds a permit; a task that overruns it is dropped,
//! which releases its connection through the collector's guard, and the
//! endpoint is marked unreachable. A failing, slow or panicking endpoint only
//! ever costs its own snapshots.
//!
//! `shutdown()` flips a watch channel: queued tasks give up, in-flight
//! collections are cancelled, and later calls are rejected without touching
//! the network.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::{Semaphore, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::error::{EndpointFailure, FailureKind};
use crate::monitors::collector::QueueMetricsCollector;
use crate::registry::{EndpointDescriptor, ServerRegistry};
use crate::{AggregationResult, QueueSnapshot, Reachability};

enum TaskOutcome {
    Collected(Vec<QueueSnapshot>),
    Failed(FailureKind),
}

pub struct FanOutAggregator {
    registry: Arc<ServerRegistry>,
    collector: Arc<QueueMetricsCollector>,
    permits: Arc<Semaphore>,
    concurrency: usize,
    shutdown_tx: watch::Sender<bool>,
    in_flight: Arc<AtomicUsize>,
}

impl FanOutAggregator {
    pub fn new(
        registry: Arc<ServerRegistry>,
        collector: Arc<QueueMetricsCollector>,
        concurrency: usize,
    ) -> Self {
        let concurrency = concurrency.max(1);
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            registry,
            collector,
            permits: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            shutdown_tx,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn registry(&self) -> &Arc<ServerRegistry> {
        &self.registry
    }

    pub fn collector(&self) -> &Arc<QueueMetricsCollector> {
        &self.collector
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Collections currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Collect from every registered endpoint
    pub async fn aggregate(&self, timeout: Duration) -> AggregationResult {
        self.aggregate_endpoints(self.registry.list(), timeout).await
    }

    /// Collect from the given endpoints, each within `timeout` of acquiring a permit
    #[instrument(
        skip_all,
        fields(endpoints = endpoints.len(), timeout_ms = timeout.as_millis() as u64)
    )]
    pub async fn aggregate_endpoints(
        &self,
        endpoints: &[EndpointDescriptor],
        timeout: Duration,
    ) -> AggregationResult {
        let mut result = AggregationResult {
            endpoints_queried: endpoints.len(),
            ..Default::default()
        };

        if self.is_shut_down() {
            warn!(
                "worker pool is shut down, rejecting {} collections",
                endpoints.len()
            );
            result.failures = endpoints
                .iter()
                .map(|endpoint| EndpointFailure {
                    endpoint: endpoint.name.clone(),
                    kind: FailureKind::Rejected,
                })
                .collect();
            return result;
        }

        let started = Instant::now();

        let mut names = Vec::with_capacity(endpoints.len());
        let mut handles = Vec::with_capacity(endpoints.len());

        for endpoint in endpoints {
            names.push(endpoint.name.clone());
            handles.push(tokio::spawn(run_collection(
                self.collector.clone(),
                endpoint.clone(),
                self.permits.clone(),
                self.shutdown_tx.subscribe(),
                self.in_flight.clone(),
                timeout,
            )));
        }

        for (endpoint, outcome) in names.into_iter().zip(join_all(handles).await) {
            match outcome {
                Ok(TaskOutcome::Collected(snapshots)) => {
                    result.endpoints_succeeded += 1;
                    result.snapshots.extend(snapshots);
                }
                Ok(TaskOutcome::Failed(kind)) => {
                    result.failures.push(EndpointFailure { endpoint, kind });
                }
                Err(e) => {
                    error!("{endpoint}: collection task failed: {e}");
                    self.collector
                        .tracker()
                        .set(&endpoint, Reachability::Unreachable);
                    result.failures.push(EndpointFailure {
                        endpoint,
                        kind: FailureKind::Aborted(e.to_string()),
                    });
                }
            }
        }

        info!(
            "aggregated {} snapshots from {}/{} endpoints in {}ms",
            result.snapshots.len(),
            result.endpoints_succeeded,
            result.endpoints_queried,
            started.elapsed().as_millis()
        );

        result
    }

    /// Stop accepting work and cancel in-flight collections. Does not wait.
    pub fn shutdown(&self) {
        if self.shutdown_tx.send_replace(true) {
            return;
        }

        self.permits.close();
        info!(
            "worker pool shut down, cancelling {} in-flight collections",
            self.in_flight()
        );
    }
}

struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn run_collection(
    collector: Arc<QueueMetricsCollector>,
    endpoint: EndpointDescriptor,
    permits: Arc<Semaphore>,
    mut shutdown_rx: watch::Receiver<bool>,
    in_flight: Arc<AtomicUsize>,
    timeout: Duration,
) -> TaskOutcome {
    let _permit = tokio::select! {
        permit = permits.acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => return TaskOutcome::Failed(FailureKind::Rejected),
        },
        _ = shutdown_rx.wait_for(|stopped| *stopped) => {
            return TaskOutcome::Failed(FailureKind::Cancelled);
        }
    };
    let _in_flight = InFlight::enter(in_flight);

    tokio::select! {
        outcome = tokio::time::timeout(timeout, collector.try_collect(&endpoint)) => match outcome {
            Ok(Ok(snapshots)) => TaskOutcome::Collected(snapshots),
            Ok(Err(e)) => TaskOutcome::Failed(FailureKind::from(&e)),
            Err(_) => {
                warn!("{}: collection timed out after {}ms", endpoint.name, timeout.as_millis());
                collector
                    .tracker()
                    .set(&endpoint.name, Reachability::Unreachable);
                TaskOutcome::Failed(FailureKind::Timeout(timeout))
            }
        },
        _ = shutdown_rx.wait_for(|stopped| *stopped) => {
            debug!("{}: collection cancelled by shutdown", endpoint.name);
            TaskOutcome::Failed(FailureKind::Cancelled)
        }
    }
}
