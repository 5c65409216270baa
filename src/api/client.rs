// Backend API client.
// Pairs the request gateway with the fallback repository source.

use crate::config::ClientConfig;
use crate::error::Result;
use crate::fallback::{GitHubSource, RepositorySource};
use crate::gateway::RequestGateway;
use crate::transport::{HttpTransport, Transport};

/// Typed access to the repository analysis backend.
#[derive(Debug)]
pub struct ApiClient<T, S> {
    pub(crate) gateway: RequestGateway<T>,
    pub(crate) source: S,
}

impl ApiClient<HttpTransport, GitHubSource> {
    /// Create a client for the configured backend and fallback source.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(
            RequestGateway::from_config(config)?,
            GitHubSource::new(config)?,
        ))
    }

    /// Create a client from `REPOLENS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ClientConfig::from_env()?)
    }
}

impl<T: Transport, S: RepositorySource> ApiClient<T, S> {
    pub fn new(gateway: RequestGateway<T>, source: S) -> Self {
        Self { gateway, source }
    }

    pub fn gateway(&self) -> &RequestGateway<T> {
        &self.gateway
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn gateway_mut(&mut self) -> &mut RequestGateway<T> {
        &mut self.gateway
    }

    /// Drop every cached response.
    pub fn clear_cache(&mut self) {
        self.gateway.clear_cache();
    }
}
