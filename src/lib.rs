pub mod actors;
pub mod admin;
#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod error;
pub mod monitors;
pub mod reachability;
pub mod registry;
pub mod secret;
pub mod service;
pub mod util;

use serde::{Deserialize, Serialize};

use crate::error::EndpointFailure;
use crate::monitors::classifier::classify;

/// Backlog classification of a single queue.
///
/// Ordered `Ok < Warning < Critical` so views can rank and filter by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Ok => "ok",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    /// Whether a queue with this severity belongs in the alerts view
    pub fn is_alert(&self) -> bool {
        *self > Severity::Ok
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the most recent connection attempt to an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Reachability {
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[serde(rename = "OK")]
    Reachable,
    #[serde(rename = "UNREACHABLE")]
    Unreachable,
}

impl Reachability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reachability::Unknown => "UNKNOWN",
            Reachability::Reachable => "OK",
            Reachability::Unreachable => "UNREACHABLE",
        }
    }
}

impl std::fmt::Display for Reachability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Depth of one queue on one endpoint, as observed during a single cycle.
///
/// Severity is never stored; it is derived from `message_count` every time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueueSnapshot {
    pub endpoint: String,
    pub queue: String,
    pub message_count: u64,
}

impl QueueSnapshot {
    pub fn new(endpoint: impl Into<String>, queue: impl Into<String>, message_count: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            queue: queue.into(),
            message_count,
        }
    }

    pub fn severity(&self) -> Severity {
        classify(self.message_count)
    }
}

/// Merged output of one fan-out cycle
#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    /// Snapshots from every endpoint that completed within budget
    pub snapshots: Vec<QueueSnapshot>,

    /// Number of endpoints a collection was attempted for
    pub endpoints_queried: usize,

    /// Number of endpoints that completed successfully within budget
    pub endpoints_succeeded: usize,

    /// Endpoints that contributed nothing this cycle, and why
    pub failures: Vec<EndpointFailure>,
}

impl AggregationResult {
    pub fn endpoints_failed(&self) -> usize {
        self.endpoints_queried - self.endpoints_succeeded
    }

    /// Snapshots contributed by a single endpoint
    pub fn snapshots_for<'a>(
        &'a self,
        endpoint: &'a str,
    ) -> impl Iterator<Item = &'a QueueSnapshot> {
        self.snapshots.iter().filter(move |s| s.endpoint == endpoint)
    }
}

/// Where the queues of an alerts view came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Collected from the configured brokers during this cycle
    Live,
    /// Substituted from the synthetic seed set because the live view was empty
    Fallback,
}

/// Cross-fleet alerts view handed to consumers
#[derive(Debug, Clone)]
pub struct AlertsView {
    pub provenance: Provenance,
    pub queues: Vec<QueueSnapshot>,
    pub endpoints_queried: usize,
    pub endpoints_succeeded: usize,
}
