use async_trait::async_trait;

use super::{AdminClient, AdminConnection};
use crate::error::ConnectionError;
use crate::registry::EndpointDescriptor;

/// Binding used when no real admin client is configured.
///
/// Every endpoint ends up unreachable, which in turn lets the alerts view
/// fall back to synthetic data.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableAdminClient;

#[async_trait]
impl AdminClient for UnavailableAdminClient {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn connect(
        &self,
        endpoint: &EndpointDescriptor,
        _password: Option<&str>,
    ) -> Result<Box<dyn AdminConnection>, ConnectionError> {
        Err(ConnectionError::Unavailable(format!(
            "no admin client binding configured for {}",
            endpoint.name
        )))
    }
}
