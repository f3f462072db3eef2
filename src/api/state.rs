//! API shared state

use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};
use tracing::{debug, warn};

use crate::actors::messages::CycleEvent;
use crate::service::QueueMonitor;

/// Cycle count and the event that produced it, always read and written together
#[derive(Debug, Clone, Default)]
pub struct CycleHistory {
    pub cycles: u64,
    pub last: Option<CycleEvent>,
}

/// Most recent refresh cycle, fed from the refresh actor's event channel
#[derive(Debug, Default)]
pub struct CycleStatusStore {
    history: RwLock<CycleHistory>,
}

impl CycleStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, event: CycleEvent) {
        let mut history = self.history.write().await;
        history.cycles += 1;
        history.last = Some(event);
    }

    pub async fn history(&self) -> CycleHistory {
        self.history.read().await.clone()
    }

    /// Record every event published on `event_rx` until the channel closes
    pub fn follow(self: Arc<Self>, mut event_rx: broadcast::Receiver<CycleEvent>) {
        tokio::spawn(async move {
            loop {
                match event_rx.recv().await {
                    Ok(event) => self.record(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("cycle status store lagged, skipped {skipped} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            debug!("cycle event channel closed");
        });
    }
}

/// Shared state passed to all API handlers
#[derive(Clone)]
pub struct ApiState {
    pub monitor: Arc<QueueMonitor>,

    /// Refresh cycle history (empty when periodic refresh is disabled)
    pub cycles: Arc<CycleStatusStore>,
}

impl ApiState {
    pub fn new(monitor: Arc<QueueMonitor>) -> Self {
        Self {
            monitor,
            cycles: Arc::new(CycleStatusStore::new()),
        }
    }
}
