//! Message types for the refresh actor

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;

use crate::{AlertsView, Provenance, Severity};

/// Summary of one completed refresh cycle.
///
/// Published on a broadcast channel; slow subscribers may miss events, which
/// is fine since each one supersedes the last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleEvent {
    pub timestamp: DateTime<Utc>,

    /// Whether the alerts came from the brokers or the fallback seed set
    pub source: Provenance,

    pub alert_count: usize,
    pub critical_count: usize,
    pub endpoints_queried: usize,
    pub endpoints_succeeded: usize,

    /// Wall-clock time the cycle took
    pub duration_ms: u64,
}

impl CycleEvent {
    pub fn from_view(view: &AlertsView, duration_ms: u64) -> Self {
        Self {
            timestamp: Utc::now(),
            source: view.provenance,
            alert_count: view.queues.len(),
            critical_count: view
                .queues
                .iter()
                .filter(|q| q.severity() == Severity::Critical)
                .count(),
            endpoints_queried: view.endpoints_queried,
            endpoints_succeeded: view.endpoints_succeeded,
            duration_ms,
        }
    }
}

/// Commands that can be sent to a RefreshActor
#[derive(Debug)]
pub enum RefreshCommand {
    /// Run a cycle immediately, bypassing the ticker
    RefreshNow {
        respond_to: oneshot::Sender<CycleEvent>,
    },

    /// Change the refresh interval; the ticker restarts
    UpdateInterval { interval_secs: u64 },

    /// Stop after the current cycle
    Shutdown,
}
