//! QueueMetricsCollector - Queries one endpoint for its queue depths
//!
//! ## Flow
//!
//! ```text
//! resolve password → connect → mark reachable → list queues → map entries → release
//!                       │                            │
//!                       └── failure: mark unreachable, no snapshots
//! ```
//!
//! Malformed entries and blocklisted queues are skipped individually; they
//! never fail the endpoint. The connection is held by a [`ConnectionGuard`]
//! so it is released on every path, including when the caller drops this
//! future mid-flight.

use std::sync::Arc;

use tracing::{debug, instrument, trace, warn};

use crate::admin::{AdminClient, ConnectionGuard};
use crate::error::CollectError;
use crate::monitors::pipeline::Blocklist;
use crate::reachability::ReachabilityTracker;
use crate::registry::EndpointDescriptor;
use crate::secret::{SecretCodec, resolve_secret};
use crate::{QueueSnapshot, Reachability};

pub struct QueueMetricsCollector {
    client: Arc<dyn AdminClient>,
    codec: Option<Arc<dyn SecretCodec>>,
    tracker: Arc<ReachabilityTracker>,
    blocklist: Blocklist,
}

impl QueueMetricsCollector {
    pub fn new(
        client: Arc<dyn AdminClient>,
        codec: Option<Arc<dyn SecretCodec>>,
        tracker: Arc<ReachabilityTracker>,
        blocklist: Blocklist,
    ) -> Self {
        Self {
            client,
            codec,
            tracker,
            blocklist,
        }
    }

    pub fn tracker(&self) -> &Arc<ReachabilityTracker> {
        &self.tracker
    }

    pub fn client(&self) -> &Arc<dyn AdminClient> {
        &self.client
    }

    /// Collect every queue of `endpoint`; failures yield an empty list
    pub async fn collect(&self, endpoint: &EndpointDescriptor) -> Vec<QueueSnapshot> {
        self.try_collect(endpoint).await.unwrap_or_default()
    }

    /// Collect every queue of `endpoint`, reporting why nothing was collected.
    ///
    /// Reachability is updated before this returns, whatever the outcome.
    #[instrument(skip(self, endpoint), fields(endpoint = %endpoint.name))]
    pub async fn try_collect(
        &self,
        endpoint: &EndpointDescriptor,
    ) -> Result<Vec<QueueSnapshot>, CollectError> {
        let password = endpoint
            .credentials
            .password
            .as_deref()
            .map(|raw| resolve_secret(raw, self.codec.as_deref()));

        trace!("connecting to {} via {}", endpoint.address(), self.client.name());

        let connection = match self.client.connect(endpoint, password.as_deref()).await {
            Ok(connection) => connection,
            Err(e) => {
                warn!("failed to connect: {e}");
                self.tracker.set(&endpoint.name, Reachability::Unreachable);
                return Err(e.into());
            }
        };

        let guard = ConnectionGuard::new(endpoint.name.clone(), connection);
        self.tracker.set(&endpoint.name, Reachability::Reachable);

        let listing = guard.list_queues().await;
        guard.release().await;

        let entries = match listing {
            Ok(entries) => entries,
            Err(e) => {
                warn!("failed to list queues: {e}");
                self.tracker.set(&endpoint.name, Reachability::Unreachable);
                return Err(e);
            }
        };

        let total = entries.len();
        let snapshots: Vec<_> = entries
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("skipping malformed queue entry: {e}");
                    None
                }
            })
            .filter(|entry| {
                let blocked = self.blocklist.matches(&entry.name);
                if blocked {
                    trace!("skipping blocklisted queue {}", entry.name);
                }
                !blocked
            })
            .map(|entry| {
                QueueSnapshot::new(endpoint.name.clone(), entry.name, entry.pending_messages)
            })
            .collect();

        debug!("retrieved {} of {total} queues", snapshots.len());

        Ok(snapshots)
    }
}
