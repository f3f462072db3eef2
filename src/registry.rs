//! Validated, read-only list of broker endpoints
//!
//! Built once at startup from configuration. Validation is all-or-nothing:
//! either every descriptor is valid and a registry exists, or construction
//! fails with the first [`ConfigError`] found.

use std::collections::HashSet;

use tracing::debug;

use crate::config::EndpointConfig;
use crate::error::ConfigError;

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A single broker admin endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub credentials: Credentials,
    pub tls: bool,
}

impl EndpointDescriptor {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct ServerRegistry {
    endpoints: Vec<EndpointDescriptor>,
}

impl ServerRegistry {
    pub fn new(configs: Vec<EndpointConfig>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut endpoints = Vec::with_capacity(configs.len());

        for (index, config) in configs.into_iter().enumerate() {
            let name = config.name.trim().to_string();
            if name.is_empty() {
                return Err(ConfigError::EmptyName { index });
            }

            if config.host.trim().is_empty() {
                return Err(ConfigError::EmptyHost { name });
            }

            let port = match u16::try_from(config.port) {
                Ok(port) if port > 0 => port,
                _ => {
                    return Err(ConfigError::InvalidPort {
                        name,
                        port: config.port,
                    });
                }
            };

            if !seen.insert(name.to_lowercase()) {
                return Err(ConfigError::DuplicateName(name));
            }

            debug!("registered endpoint {name} ({}:{port})", config.host);

            endpoints.push(EndpointDescriptor {
                name,
                host: config.host.trim().to_string(),
                port,
                credentials: Credentials {
                    username: config.username,
                    password: config.password,
                },
                tls: config.tls,
            });
        }

        Ok(Self { endpoints })
    }

    /// All endpoints, in configuration order
    pub fn list(&self) -> &[EndpointDescriptor] {
        &self.endpoints
    }

    /// Look up an endpoint by name (case-insensitive)
    pub fn find(&self, name: &str) -> Option<&EndpointDescriptor> {
        let name = name.to_lowercase();
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.name.to_lowercase() == name)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
