//! QueueMonitor - Consumer-facing facade over the aggregation core
//!
//! Owns the registry, the worker pool and the pipeline, and turns a fan-out
//! cycle into the views consumers ask for. Every view is computed on demand;
//! nothing is cached between calls apart from reachability.

use std::collections::BTreeMap;
use std::slice;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::admin::AdminClient;
use crate::admin::http::HttpAdminClient;
use crate::admin::unavailable::UnavailableAdminClient;
use crate::config::{AdminConfig, Config, MonitorConfig, SecretsConfig};
use crate::error::ConfigError;
use crate::monitors::aggregator::FanOutAggregator;
use crate::monitors::collector::QueueMetricsCollector;
use crate::monitors::fallback::FallbackDataSource;
use crate::monitors::pipeline::{Blocklist, FilterSortPipeline};
use crate::reachability::ReachabilityTracker;
use crate::registry::ServerRegistry;
use crate::secret::{Base64SecretCodec, SecretCodec};
use crate::{AlertsView, Provenance, QueueSnapshot, Reachability};

/// Number of queues reported per endpoint by [`QueueMonitor::probe`]
pub const PROBE_TOP_QUEUES: usize = 3;

/// A configured endpoint and its last known reachability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointStatus {
    pub name: String,
    pub reachability: Reachability,
}

/// Outcome of a fresh collection against one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointProbe {
    pub name: String,
    pub reachability: Reachability,
    pub queue_count: usize,
    pub top_queues: Vec<QueueSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorStatus {
    /// Name of the admin client binding in use
    pub admin_client: &'static str,
    /// Whether that binding can reach real brokers
    pub admin_available: bool,
    pub endpoint_count: usize,
    pub shut_down: bool,
}

pub struct QueueMonitor {
    registry: Arc<ServerRegistry>,
    tracker: Arc<ReachabilityTracker>,
    aggregator: FanOutAggregator,
    pipeline: FilterSortPipeline,
    fallback: Option<FallbackDataSource>,
    timeout: Duration,
    admin_client: &'static str,
    admin_available: bool,
}

impl QueueMonitor {
    /// Wire up a monitor from configuration.
    ///
    /// Fails only when the endpoint list is invalid.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let registry = ServerRegistry::new(config.endpoints.clone())?;
        let client = build_admin_client(&config.admin);
        let codec = config.secrets.as_ref().map(build_secret_codec);

        let mut monitor = Self::new(registry, client, codec, &config.monitor);
        if !config.fallback.enabled {
            monitor = monitor.without_fallback();
        }
        Ok(monitor)
    }

    pub fn new(
        registry: ServerRegistry,
        client: Arc<dyn AdminClient>,
        codec: Option<Arc<dyn SecretCodec>>,
        monitor: &MonitorConfig,
    ) -> Self {
        let registry = Arc::new(registry);
        let tracker = Arc::new(ReachabilityTracker::new());
        let admin_client = client.name();
        let admin_available = client.is_available();

        let collector = QueueMetricsCollector::new(
            client,
            codec,
            tracker.clone(),
            Blocklist::new(&monitor.collector_blocklist),
        );
        let aggregator =
            FanOutAggregator::new(registry.clone(), Arc::new(collector), monitor.concurrency);

        debug!(
            "queue monitor ready: {} endpoints, admin client '{admin_client}', timeout {}ms",
            registry.len(),
            monitor.timeout_ms
        );

        Self {
            registry,
            tracker,
            aggregator,
            pipeline: FilterSortPipeline::from_config(monitor),
            fallback: Some(FallbackDataSource::new()),
            timeout: monitor.timeout(),
            admin_client,
            admin_available,
        }
    }

    /// Never substitute synthetic data for an empty alerts view
    pub fn without_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }

    pub fn registry(&self) -> &ServerRegistry {
        &self.registry
    }

    /// Cross-fleet alerts, or the synthetic seed set when nothing qualifies
    #[instrument(skip(self))]
    pub async fn alerts(&self) -> AlertsView {
        let result = self.aggregator.aggregate(self.timeout).await;
        let queues = self.pipeline.alerts(&result.snapshots);

        let (provenance, queues) = match &self.fallback {
            Some(fallback) if queues.is_empty() => {
                info!(
                    "no live alerts from {}/{} endpoints, serving fallback data",
                    result.endpoints_succeeded, result.endpoints_queried
                );
                (Provenance::Fallback, self.pipeline.alerts(&fallback.fallback()))
            }
            _ => (Provenance::Live, queues),
        };

        AlertsView {
            provenance,
            queues,
            endpoints_queried: result.endpoints_queried,
            endpoints_succeeded: result.endpoints_succeeded,
        }
    }

    /// Every queue of one endpoint, deepest first.
    ///
    /// Unknown and unreachable endpoints both yield an empty list.
    #[instrument(skip(self))]
    pub async fn endpoint_queues(&self, name: &str) -> Vec<QueueSnapshot> {
        let Some(endpoint) = self.registry.find(name) else {
            debug!("no endpoint named '{name}'");
            return vec![];
        };

        let result = self
            .aggregator
            .aggregate_endpoints(slice::from_ref(endpoint), self.timeout)
            .await;

        if let Some(failure) = result.failures.first() {
            warn!("{}: {}", failure.endpoint, failure.kind);
        }

        self.pipeline.endpoint_queues(&result.snapshots, &endpoint.name)
    }

    pub fn reachability(&self) -> BTreeMap<String, Reachability> {
        self.tracker.snapshot()
    }

    /// Configured endpoints in registry order, `Unknown` until first attempted
    pub fn configured_endpoints(&self) -> Vec<EndpointStatus> {
        self.registry
            .list()
            .iter()
            .map(|endpoint| EndpointStatus {
                name: endpoint.name.clone(),
                reachability: self.tracker.get(&endpoint.name),
            })
            .collect()
    }

    /// Collect from every endpoint and report visible queue totals plus the deepest queues
    #[instrument(skip(self))]
    pub async fn probe(&self) -> Vec<EndpointProbe> {
        let result = self.aggregator.aggregate(self.timeout).await;

        self.registry
            .list()
            .iter()
            .map(|endpoint| {
                let queues = self.pipeline.endpoint_queues(&result.snapshots, &endpoint.name);
                EndpointProbe {
                    name: endpoint.name.clone(),
                    reachability: self.tracker.get(&endpoint.name),
                    queue_count: queues.len(),
                    top_queues: queues.into_iter().take(PROBE_TOP_QUEUES).collect(),
                }
            })
            .collect()
    }

    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            admin_client: self.admin_client,
            admin_available: self.admin_available,
            endpoint_count: self.registry.len(),
            shut_down: self.aggregator.is_shut_down(),
        }
    }

    /// Cancel in-flight collections and refuse new ones. Does not wait.
    pub fn shutdown(&self) {
        self.aggregator.shutdown();
    }
}

/// Select the admin binding; a binding that cannot be built degrades to unavailable
pub fn build_admin_client(config: &AdminConfig) -> Arc<dyn AdminClient> {
    match config {
        AdminConfig::Http {
            queues_path,
            probe_path,
            request_timeout_ms,
        } => match HttpAdminClient::new(
            queues_path.clone(),
            probe_path.clone(),
            Duration::from_millis(*request_timeout_ms),
        ) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                warn!("falling back to unavailable admin client: {e}");
                Arc::new(UnavailableAdminClient)
            }
        },
        AdminConfig::Unavailable => Arc::new(UnavailableAdminClient),
    }
}

pub fn build_secret_codec(config: &SecretsConfig) -> Arc<dyn SecretCodec> {
    match config {
        SecretsConfig::Base64 => Arc::new(Base64SecretCodec),
    }
}
