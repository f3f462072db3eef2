//! Broker admin interface seam
//!
//! The aggregation core never speaks a broker's wire protocol itself. It goes
//! through [`AdminClient`], which opens an [`AdminConnection`] per collection.
//!
//! ## Bindings
//!
//! - **http**: JSON management API over HTTP(S) ([`http::HttpAdminClient`])
//! - **unavailable**: every connect fails uniformly ([`unavailable::UnavailableAdminClient`])
//! - **memory**: scripted in-process brokers, built in code only
//!   ([`memory::InMemoryAdminClient`])
//!
//! ## Connection lifetime
//!
//! Connections are always wrapped in a [`ConnectionGuard`]. The normal path
//! awaits [`ConnectionGuard::release`]; if the owning future is dropped first
//! (timeout, shutdown) the guard schedules the close on the runtime instead.

pub mod http;
pub mod memory;
pub mod unavailable;

use async_trait::async_trait;
use tracing::{trace, warn};

use crate::error::{CollectError, ConnectionError, ProtocolError};
use crate::registry::EndpointDescriptor;

/// A single queue as reported by a broker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub name: String,
    pub pending_messages: u64,
}

impl QueueEntry {
    /// Validate a raw `(name, count)` pair from an admin response
    pub fn from_raw(name: Option<String>, count: Option<i64>) -> Result<Self, ProtocolError> {
        let name = name.ok_or(ProtocolError::MissingField("name"))?;
        let count = count.ok_or(ProtocolError::MissingField("pending_messages"))?;
        let pending_messages =
            u64::try_from(count).map_err(|_| ProtocolError::InvalidCount {
                queue: name.clone(),
                count,
            })?;

        Ok(Self {
            name,
            pending_messages,
        })
    }
}

/// Every queue of one endpoint; entries that failed to parse are kept as errors
pub type QueueListing = Vec<Result<QueueEntry, ProtocolError>>;

#[async_trait]
pub trait AdminClient: Send + Sync {
    /// Short identifier of the binding
    fn name(&self) -> &'static str;

    /// Whether this binding can reach real brokers at all
    fn is_available(&self) -> bool {
        true
    }

    /// Open an admin connection, authenticating with the already resolved password
    async fn connect(
        &self,
        endpoint: &EndpointDescriptor,
        password: Option<&str>,
    ) -> Result<Box<dyn AdminConnection>, ConnectionError>;
}

#[async_trait]
pub trait AdminConnection: Send + Sync {
    async fn list_queues(&self) -> Result<QueueListing, CollectError>;

    /// Release the connection. Called exactly once per connection.
    async fn close(&self);
}

/// Scoped ownership of an open admin connection
pub struct ConnectionGuard {
    endpoint: String,
    connection: Option<Box<dyn AdminConnection>>,
}

impl ConnectionGuard {
    pub fn new(endpoint: impl Into<String>, connection: Box<dyn AdminConnection>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connection: Some(connection),
        }
    }

    pub async fn list_queues(&self) -> Result<QueueListing, CollectError> {
        match &self.connection {
            Some(connection) => connection.list_queues().await,
            None => Err(ConnectionError::Transport {
                endpoint: self.endpoint.clone(),
                reason: "connection already released".to_string(),
            }
            .into()),
        }
    }

    /// Close the connection and wait for it
    pub async fn release(mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close().await;
            trace!("{}: admin connection closed", self.endpoint);
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        let endpoint = std::mem::take(&mut self.endpoint);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                trace!("{endpoint}: collection abandoned, closing connection in background");
                handle.spawn(async move {
                    connection.close().await;
                    trace!("{endpoint}: admin connection closed");
                });
            }
            Err(_) => warn!("{endpoint}: no runtime available to close admin connection"),
        }
    }
}
