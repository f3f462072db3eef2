//! RefreshActor - Recomputes the alerts view on a timer
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → QueueMonitor::alerts() → Publish CycleEvent → [status store, ...]
//!     ↑
//!     └─── Commands (RefreshNow, UpdateInterval, Shutdown)
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, instrument, trace, warn};

use crate::service::QueueMonitor;

use super::messages::{CycleEvent, RefreshCommand};

fn interval_from_secs(interval_secs: u64) -> Duration {
    if interval_secs == 0 {
        warn!("refresh interval of 0s is not allowed, using 1s");
    }
    Duration::from_secs(interval_secs.max(1))
}

pub struct RefreshActor {
    monitor: Arc<QueueMonitor>,

    command_rx: mpsc::Receiver<RefreshCommand>,

    event_tx: broadcast::Sender<CycleEvent>,

    interval_duration: Duration,
}

impl RefreshActor {
    pub fn new(
        monitor: Arc<QueueMonitor>,
        interval_secs: u64,
        command_rx: mpsc::Receiver<RefreshCommand>,
        event_tx: broadcast::Sender<CycleEvent>,
    ) -> Self {
        Self {
            monitor,
            command_rx,
            event_tx,
            interval_duration: interval_from_secs(interval_secs),
        }
    }

    /// Run until a Shutdown command arrives or every handle is dropped
    #[instrument(skip(self), fields(interval_secs = self.interval_duration.as_secs()))]
    pub async fn run(mut self) {
        debug!("starting refresh actor");

        let mut ticker = interval(self.interval_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh().await;
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        RefreshCommand::RefreshNow { respond_to } => {
                            debug!("received RefreshNow command");
                            let event = self.refresh().await;
                            let _ = respond_to.send(event);
                        }

                        RefreshCommand::UpdateInterval { interval_secs } => {
                            debug!("updating interval to {interval_secs}s");
                            self.interval_duration = interval_from_secs(interval_secs);
                            ticker = interval(self.interval_duration);
                            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                        }

                        RefreshCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                else => {
                    warn!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("refresh actor stopped");
    }

    async fn refresh(&self) -> CycleEvent {
        let started = Instant::now();
        let view = self.monitor.alerts().await;
        let event = CycleEvent::from_view(&view, started.elapsed().as_millis() as u64);

        info!(
            "refresh cycle: {} alerts ({} critical, {:?}) from {}/{} endpoints in {}ms",
            event.alert_count,
            event.critical_count,
            event.source,
            event.endpoints_succeeded,
            event.endpoints_queried,
            event.duration_ms
        );

        match self.event_tx.send(event.clone()) {
            Ok(receivers) => trace!("published cycle event to {receivers} receivers"),
            Err(_) => trace!("no receivers for cycle event"),
        }

        event
    }
}

/// Handle for controlling a RefreshActor; cheap to clone
#[derive(Clone)]
pub struct RefreshHandle {
    sender: mpsc::Sender<RefreshCommand>,
}

impl RefreshHandle {
    /// Spawn the actor on the current runtime
    pub fn spawn(
        monitor: Arc<QueueMonitor>,
        interval_secs: u64,
        event_tx: broadcast::Sender<CycleEvent>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = RefreshActor::new(monitor, interval_secs, cmd_rx, event_tx);
        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Run a cycle now and wait for its summary
    pub async fn refresh_now(&self) -> Result<CycleEvent> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RefreshCommand::RefreshNow { respond_to: tx })
            .await
            .context("failed to send RefreshNow command")?;

        rx.await.context("failed to receive cycle event")
    }

    pub async fn update_interval(&self, interval_secs: u64) -> Result<()> {
        self.sender
            .send(RefreshCommand::UpdateInterval { interval_secs })
            .await
            .context("failed to send UpdateInterval command")?;
        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(RefreshCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}
