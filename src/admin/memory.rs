//! In-process scripted brokers
//!
//! Each endpoint name maps to a [`ScriptedBroker`] describing how it behaves:
//! which queues it reports, how slow it is, and whether it refuses, rejects
//! credentials, fails its listing or hangs. Open connections are counted so
//! callers can verify every connection was released.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{AdminClient, AdminConnection, QueueEntry, QueueListing};
use crate::error::{CollectError, ConnectionError, ProtocolError};
use crate::registry::EndpointDescriptor;

#[derive(Debug, Clone)]
pub enum BrokerBehavior {
    /// Connects and reports the listing
    Serve(QueueListing),
    /// Refuses connections
    Refuse,
    /// Rejects any password other than the given one
    RequirePassword(String, QueueListing),
    /// Connects, then fails the listing as a whole
    FailListing(ProtocolError),
    /// Connects, then never answers the listing
    Hang,
}

#[derive(Debug, Clone)]
pub struct ScriptedBroker {
    behavior: BrokerBehavior,
    latency: Duration,
}

impl ScriptedBroker {
    pub fn new(behavior: BrokerBehavior) -> Self {
        Self {
            behavior,
            latency: Duration::ZERO,
        }
    }

    /// A broker reporting the given `(queue, pending messages)` pairs
    pub fn with_queues<'a>(queues: impl IntoIterator<Item = (&'a str, u64)>) -> Self {
        Self::new(BrokerBehavior::Serve(
            queues
                .into_iter()
                .map(|(name, pending_messages)| {
                    Ok(QueueEntry {
                        name: name.to_string(),
                        pending_messages,
                    })
                })
                .collect(),
        ))
    }

    pub fn refusing() -> Self {
        Self::new(BrokerBehavior::Refuse)
    }

    pub fn hanging() -> Self {
        Self::new(BrokerBehavior::Hang)
    }

    /// Delay applied while answering the listing, with the connection open
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAdminClient {
    brokers: HashMap<String, ScriptedBroker>,
    open: Arc<AtomicUsize>,
    peak_open: Arc<AtomicUsize>,
    opened_total: AtomicUsize,
    passwords: DashMap<String, Option<String>>,
}

impl InMemoryAdminClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broker(mut self, endpoint: impl Into<String>, broker: ScriptedBroker) -> Self {
        self.brokers.insert(endpoint.into(), broker);
        self
    }

    /// Connections currently open
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Highest number of connections open at the same time
    pub fn peak_open_connections(&self) -> usize {
        self.peak_open.load(Ordering::SeqCst)
    }

    /// Connections opened since creation
    pub fn connections_opened(&self) -> usize {
        self.opened_total.load(Ordering::SeqCst)
    }

    /// Password presented on the most recent connect to an endpoint
    pub fn last_password(&self, endpoint: &str) -> Option<String> {
        self.passwords
            .get(endpoint)
            .and_then(|entry| entry.value().clone())
    }
}

#[async_trait]
impl AdminClient for InMemoryAdminClient {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn connect(
        &self,
        endpoint: &EndpointDescriptor,
        password: Option<&str>,
    ) -> Result<Box<dyn AdminConnection>, ConnectionError> {
        self.passwords
            .insert(endpoint.name.clone(), password.map(str::to_string));

        let Some(broker) = self.brokers.get(&endpoint.name).cloned() else {
            return Err(ConnectionError::Refused {
                endpoint: endpoint.name.clone(),
                reason: "no such broker".to_string(),
            });
        };

        match &broker.behavior {
            BrokerBehavior::Refuse => {
                return Err(ConnectionError::Refused {
                    endpoint: endpoint.name.clone(),
                    reason: "connection refused".to_string(),
                });
            }
            BrokerBehavior::RequirePassword(expected, _) if password != Some(expected.as_str()) => {
                return Err(ConnectionError::AuthFailed {
                    endpoint: endpoint.name.clone(),
                });
            }
            _ => {}
        }

        let now_open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_open.fetch_max(now_open, Ordering::SeqCst);
        self.opened_total.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(InMemoryConnection {
            behavior: broker.behavior,
            latency: broker.latency,
            open: self.open.clone(),
            closed: AtomicBool::new(false),
        }))
    }
}

struct InMemoryConnection {
    behavior: BrokerBehavior,
    latency: Duration,
    open: Arc<AtomicUsize>,
    closed: AtomicBool,
}

#[async_trait]
impl AdminConnection for InMemoryConnection {
    async fn list_queues(&self) -> Result<QueueListing, CollectError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match &self.behavior {
            BrokerBehavior::Serve(listing) | BrokerBehavior::RequirePassword(_, listing) => {
                Ok(listing.clone())
            }
            BrokerBehavior::FailListing(err) => Err(err.clone().into()),
            BrokerBehavior::Hang => std::future::pending().await,
            BrokerBehavior::Refuse => Ok(vec![]),
        }
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
