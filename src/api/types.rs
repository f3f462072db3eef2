//! API response types
//!
//! Severity is derived from the message count when a response is built and
//! travels with each queue, so clients never re-implement the thresholds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actors::messages::CycleEvent;
use crate::service::{EndpointProbe, EndpointStatus, MonitorStatus};
use crate::{AlertsView, Provenance, QueueSnapshot, Reachability, Severity};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// A single queue as rendered to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueResponse {
    pub endpoint: String,
    pub queue: String,
    pub message_count: u64,
    pub severity: Severity,
}

impl From<&QueueSnapshot> for QueueResponse {
    fn from(snapshot: &QueueSnapshot) -> Self {
        Self {
            endpoint: snapshot.endpoint.clone(),
            queue: snapshot.queue.clone(),
            message_count: snapshot.message_count,
            severity: snapshot.severity(),
        }
    }
}

/// GET /api/v1/queues
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertsResponse {
    pub source: Provenance,
    pub queues: Vec<QueueResponse>,
    pub endpoints_queried: usize,
    pub endpoints_succeeded: usize,
}

impl From<AlertsView> for AlertsResponse {
    fn from(view: AlertsView) -> Self {
        Self {
            source: view.provenance,
            queues: view.queues.iter().map(QueueResponse::from).collect(),
            endpoints_queried: view.endpoints_queried,
            endpoints_succeeded: view.endpoints_succeeded,
        }
    }
}

/// GET /api/v1/queues/:endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointQueuesResponse {
    pub endpoint: String,
    pub queues: Vec<QueueResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointStatusResponse {
    pub name: String,
    pub status: Reachability,
}

impl From<EndpointStatus> for EndpointStatusResponse {
    fn from(status: EndpointStatus) -> Self {
        Self {
            name: status.name,
            status: status.reachability,
        }
    }
}

/// GET /api/v1/endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointsResponse {
    pub endpoints: Vec<EndpointStatusResponse>,
    pub total: usize,
}

/// GET /api/v1/status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub admin_client: String,
    pub admin_available: bool,
    pub endpoint_count: usize,
    pub shut_down: bool,
    pub reachability: BTreeMap<String, Reachability>,
}

impl StatusResponse {
    pub fn new(status: MonitorStatus, reachability: BTreeMap<String, Reachability>) -> Self {
        Self {
            admin_client: status.admin_client.to_string(),
            admin_available: status.admin_available,
            endpoint_count: status.endpoint_count,
            shut_down: status.shut_down,
            reachability,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointProbeResponse {
    pub name: String,
    pub status: Reachability,
    pub queue_count: usize,
    pub top_queues: Vec<QueueResponse>,
}

impl From<EndpointProbe> for EndpointProbeResponse {
    fn from(probe: EndpointProbe) -> Self {
        Self {
            name: probe.name,
            status: probe.reachability,
            queue_count: probe.queue_count,
            top_queues: probe.top_queues.iter().map(QueueResponse::from).collect(),
        }
    }
}

/// GET /api/v1/probe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeResponse {
    pub endpoints: Vec<EndpointProbeResponse>,
}

/// GET /api/v1/stats
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatsResponse {
    pub timestamp: String,
    pub cycles: u64,
    pub last_cycle: Option<CycleEvent>,
}
