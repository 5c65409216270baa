// HTTP transport backed by reqwest.
// Builds the client with default headers and turns any response into a RawResponse.

use reqwest::{
    Client,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::trace;

use crate::config::ClientConfig;
use crate::error::{RepoLensError, Result};

use super::Transport;
use super::request::{RawResponse, RequestDescriptor};

/// Sends descriptors to a backend rooted at `base_url`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the backend configured in `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| RepoLensError::Config(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RepoLensError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, &config.api_base_url))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        let url = self.url_for(request.endpoint());
        trace!(method = %request.method(), %url, "sending request");

        let mut builder = self.client.request(request.method().into(), &url);
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| RepoLensError::Transport(format!("{} {}: {}", request.method(), url, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RepoLensError::Transport(format!("reading body from {}: {}", url, e)))?;

        Ok(RawResponse { status, body })
    }
}
