//! Error types for the aggregation core
//!
//! Only `ConfigError` is ever fatal. Every other error stays inside the
//! boundary of the endpoint it belongs to: collectors log it, the aggregator
//! records it as an [`EndpointFailure`], and consumers always get a view.

use std::time::Duration;

use thiserror::Error;

/// Invalid endpoint configuration, detected at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("endpoint #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("endpoint '{name}' has an empty host")]
    EmptyHost { name: String },

    #[error("endpoint '{name}' has invalid port {port} (expected 1-65535)")]
    InvalidPort { name: String, port: u32 },

    #[error("endpoint name '{0}' is configured more than once")]
    DuplicateName(String),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure to open (or keep using) an admin connection to one endpoint
#[derive(Debug, Clone, Error)]
pub enum ConnectionError {
    #[error("connection refused by {endpoint}: {reason}")]
    Refused { endpoint: String, reason: String },

    #[error("authentication failed for {endpoint}")]
    AuthFailed { endpoint: String },

    #[error("transport error talking to {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("admin client unavailable: {0}")]
    Unavailable(String),
}

/// Malformed data returned by an admin interface
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("queue entry is missing field '{0}'")]
    MissingField(&'static str),

    #[error("queue '{queue}' reported an invalid message count {count}")]
    InvalidCount { queue: String, count: i64 },

    #[error("malformed admin response: {0}")]
    Malformed(String),
}

/// Failure to decode an externally encoded secret
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("secret is not validly encoded: {0}")]
    InvalidEncoding(String),

    #[error("decoded secret is not valid UTF-8")]
    InvalidUtf8,
}

/// Why a single endpoint's collection produced nothing
#[derive(Debug, Clone, Error)]
pub enum CollectError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("failed to list queues: {0}")]
    Listing(#[from] ProtocolError),
}

/// Category of an endpoint failure within one aggregation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Connection(String),
    Protocol(String),
    Timeout(Duration),
    Cancelled,
    Rejected,
    Aborted(String),
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Connection(reason) => write!(f, "connection failed: {reason}"),
            FailureKind::Protocol(reason) => write!(f, "protocol error: {reason}"),
            FailureKind::Timeout(budget) => write!(f, "timed out after {}ms", budget.as_millis()),
            FailureKind::Cancelled => write!(f, "cancelled by shutdown"),
            FailureKind::Rejected => write!(f, "rejected, worker pool is shut down"),
            FailureKind::Aborted(reason) => write!(f, "collection task aborted: {reason}"),
        }
    }
}

impl From<&CollectError> for FailureKind {
    fn from(err: &CollectError) -> Self {
        match err {
            CollectError::Connection(e) => FailureKind::Connection(e.to_string()),
            CollectError::Listing(e) => FailureKind::Protocol(e.to_string()),
        }
    }
}

/// An endpoint that contributed no snapshots to a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFailure {
    pub endpoint: String,
    pub kind: FailureKind,
}
