//! JSON-over-HTTP admin binding
//!
//! Talks to brokers exposing a management API:
//!
//! - `GET {probe_path}` authenticates the connection (401/403 means bad credentials)
//! - `GET {queues_path}` returns `[{"name": "...", "pending_messages": 123}, ...]`
//!
//! HTTP is connectionless, so a "connection" is the authenticated base URL
//! plus the shared client; closing it is bookkeeping only.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{instrument, trace};

use super::{AdminClient, AdminConnection, QueueEntry, QueueListing};
use crate::error::{CollectError, ConnectionError, ProtocolError};
use crate::registry::EndpointDescriptor;

#[derive(Debug, Clone)]
pub struct HttpAdminClient {
    /// HTTP client (reused across endpoints and cycles)
    client: Client,
    queues_path: String,
    probe_path: String,
}

impl HttpAdminClient {
    pub fn new(
        queues_path: impl Into<String>,
        probe_path: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| {
                ConnectionError::Unavailable(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            queues_path: queues_path.into(),
            probe_path: probe_path.into(),
        })
    }
}

#[async_trait]
impl AdminClient for HttpAdminClient {
    fn name(&self) -> &'static str {
        "http"
    }

    #[instrument(skip(self, endpoint, password), fields(endpoint = %endpoint.name))]
    async fn connect(
        &self,
        endpoint: &EndpointDescriptor,
        password: Option<&str>,
    ) -> Result<Box<dyn AdminConnection>, ConnectionError> {
        let scheme = if endpoint.tls { "https" } else { "http" };
        let connection = HttpAdminConnection {
            client: self.client.clone(),
            endpoint: endpoint.name.clone(),
            base_url: format!("{scheme}://{}", endpoint.address()),
            queues_path: self.queues_path.clone(),
            username: endpoint.credentials.username.clone(),
            password: password.map(str::to_string),
        };

        trace!("probing {}{}", connection.base_url, self.probe_path);
        connection.get(&self.probe_path).await?;

        Ok(Box::new(connection))
    }
}

struct HttpAdminConnection {
    client: Client,
    endpoint: String,
    base_url: String,
    queues_path: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpAdminConnection {
    fn authenticated(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_ref()),
            None => request,
        }
    }

    async fn get(&self, path: &str) -> Result<Response, ConnectionError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .authenticated(self.client.get(&url))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    ConnectionError::Refused {
                        endpoint: self.endpoint.clone(),
                        reason: e.to_string(),
                    }
                } else {
                    ConnectionError::Transport {
                        endpoint: self.endpoint.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ConnectionError::AuthFailed {
                endpoint: self.endpoint.clone(),
            }),
            status if !status.is_success() => Err(ConnectionError::Transport {
                endpoint: self.endpoint.clone(),
                reason: format!("HTTP error: {status}"),
            }),
            _ => Ok(response),
        }
    }
}

fn parse_entry(value: &Value) -> Result<QueueEntry, ProtocolError> {
    let name = value
        .get("name")
        .map(|name| {
            name.as_str().map(str::to_string).ok_or_else(|| {
                ProtocolError::Malformed(format!("queue name is not a string: {name}"))
            })
        })
        .transpose()?;

    let count = value
        .get("pending_messages")
        .map(|count| {
            count.as_i64().ok_or_else(|| {
                ProtocolError::Malformed(format!("message count is not an integer: {count}"))
            })
        })
        .transpose()?;

    QueueEntry::from_raw(name, count)
}

#[async_trait]
impl AdminConnection for HttpAdminConnection {
    async fn list_queues(&self) -> Result<QueueListing, CollectError> {
        let body = self
            .get(&self.queues_path)
            .await?
            .text()
            .await
            .map_err(|e| ConnectionError::Transport {
                endpoint: self.endpoint.clone(),
                reason: format!("failed to read response body: {e}"),
            })?;

        let value: Value = serde_json::from_str(&body)
            .map_err(|e| ProtocolError::Malformed(format!("failed to parse queue listing: {e}")))?;

        let Value::Array(entries) = value else {
            return Err(
                ProtocolError::Malformed("queue listing is not an array".to_string()).into(),
            );
        };

        Ok(entries.iter().map(parse_entry).collect())
    }

    async fn close(&self) {
        trace!("{}: releasing HTTP admin session", self.endpoint);
    }
}
