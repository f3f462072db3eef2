use std::net::SocketAddr;
use std::time::Duration;

use tracing::trace;

use crate::error::ConfigError;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    /// Secret codec used for `#!`-prefixed passwords (optional - raw values are used otherwise)
    pub secrets: Option<SecretsConfig>,

    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Periodic refresh (optional - views are only computed on request otherwise)
    pub refresh: Option<RefreshConfig>,

    #[serde(default)]
    pub api: ApiSettings,
}

/// One broker endpoint as written in the configuration file.
///
/// The port is kept wide here so out-of-range values reach registry
/// validation instead of failing deserialization with a vague message.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EndpointConfig {
    pub name: String,
    pub host: String,
    #[serde(default = "crate::util::get_default_admin_port")]
    pub port: u32,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub tls: bool,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_alert_limit")]
    pub alert_limit: usize,
    /// Queues never collected at all
    #[serde(default = "default_collector_blocklist")]
    pub collector_blocklist: Vec<String>,
    /// Queues never shown in any view
    #[serde(default = "default_alert_blocklist")]
    pub alert_blocklist: Vec<String>,
}

impl MonitorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            concurrency: default_concurrency(),
            alert_limit: default_alert_limit(),
            collector_blocklist: default_collector_blocklist(),
            alert_blocklist: default_alert_blocklist(),
        }
    }
}

/// Admin client binding selection
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AdminConfig {
    /// JSON management API over HTTP(S)
    Http {
        #[serde(default = "default_queues_path")]
        queues_path: String,
        #[serde(default = "default_probe_path")]
        probe_path: String,
        #[serde(default = "default_request_timeout_ms")]
        request_timeout_ms: u64,
    },

    /// No binding available; every endpoint reports as unreachable
    Unavailable,
}

impl Default for AdminConfig {
    fn default() -> Self {
        AdminConfig::Unavailable
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "codec", rename_all = "lowercase")]
pub enum SecretsConfig {
    Base64,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct FallbackConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiSettings {
    #[serde(default = "crate::util::get_bind_addr")]
    pub bind: SocketAddr,
    #[serde(default = "default_true")]
    pub cors: bool,
}

impl ApiSettings {
    /// Let `QUEUE_HUB_BIND` take precedence over the configured address
    pub fn with_env_override(self) -> Self {
        self.with_bind_override(crate::util::get_bind_override())
    }

    fn with_bind_override(mut self, bind: Option<SocketAddr>) -> Self {
        if let Some(bind) = bind {
            trace!("bind address overridden: {} -> {bind}", self.bind);
            self.bind = bind;
        }
        self
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            bind: crate::util::get_bind_addr(),
            cors: true,
        }
    }
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_concurrency() -> usize {
    10
}

fn default_alert_limit() -> usize {
    50
}

fn default_collector_blocklist() -> Vec<String> {
    vec!["FCWEB.CACHE".to_string()]
}

fn default_alert_blocklist() -> Vec<String> {
    vec!["BAM".to_string(), "FCWEB.CACHE".to_string()]
}

fn default_queues_path() -> String {
    "/api/queues".to_string()
}

fn default_probe_path() -> String {
    "/api/overview".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    serde_json::from_str(content)
        .map_err(ConfigError::from)
        .inspect(|config| trace!("loaded config: {config:?}"))
}

pub fn read_config_file(path: &str) -> Result<Config, ConfigError> {
    let file_content = std::fs::read_to_string(path)?;
    parse_config(&file_content)
}
