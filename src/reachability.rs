//! Last-known reachability per endpoint
//!
//! Shared by every collection task. Each endpoint's entry is independent, so
//! writes go through a sharded map and only ever touch their own key.
//! Readers get owned copies, never a live view.

use std::collections::BTreeMap;

use dashmap::DashMap;
use tracing::trace;

use crate::Reachability;

#[derive(Debug, Default)]
pub struct ReachabilityTracker {
    states: DashMap<String, Reachability>,
}

impl ReachabilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of the latest connection attempt (last write wins)
    pub fn set(&self, endpoint: &str, reachability: Reachability) {
        trace!("{endpoint}: reachability -> {reachability}");
        self.states.insert(endpoint.to_string(), reachability);
    }

    /// Current state of an endpoint, `Unknown` if it was never attempted
    pub fn get(&self, endpoint: &str) -> Reachability {
        self.states
            .get(endpoint)
            .map(|entry| *entry.value())
            .unwrap_or_default()
    }

    /// Point-in-time copy of every recorded state
    pub fn snapshot(&self) -> BTreeMap<String, Reachability> {
        self.states
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}
