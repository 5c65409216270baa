// Request gateway.
// Serves reads from the cache, otherwise sends through the retrying transport and decodes JSON.

use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheStore, fingerprint};
use crate::config::ClientConfig;
use crate::error::{RepoLensError, Result};
use crate::transport::{
    HttpTransport, RawResponse, RequestDescriptor, RetryPolicy, RetryingTransport, Transport,
};

/// Single entry point for backend calls: cache, retry, status handling, decoding.
///
/// The gateway owns its cache, so the cache lives exactly as long as the
/// session that built the gateway.
#[derive(Debug)]
pub struct RequestGateway<T> {
    transport: RetryingTransport<T>,
    cache: CacheStore,
}

impl RequestGateway<HttpTransport> {
    /// Build a gateway talking HTTP to the configured backend.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        Ok(Self::new(
            RetryingTransport::new(transport, RetryPolicy::from_config(config)),
            CacheStore::new(config.cache_ttl),
        ))
    }
}

impl<T: Transport> RequestGateway<T> {
    pub fn new(transport: RetryingTransport<T>, cache: CacheStore) -> Self {
        Self { transport, cache }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn transport(&self) -> &RetryingTransport<T> {
        &self.transport
    }

    /// Drop every cached response.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Execute a request and return its decoded JSON payload.
    ///
    /// Reads with a live cache entry return without touching the network.
    /// Successful reads are cached; writes never are.
    pub async fn execute(&mut self, request: &RequestDescriptor) -> Result<Value> {
        let key = fingerprint(request);

        if request.is_read() {
            if let Some(payload) = self.cache.get(&key) {
                debug!(%key, "cache hit");
                return Ok(payload.clone());
            }
            debug!(%key, "cache miss");
        }

        let response = self.transport.send(request).await?;
        let payload = decode(response)?;

        if request.is_read() {
            self.cache.set(key, payload.clone());
        }

        Ok(payload)
    }
}

/// Turn a raw response into a payload, or a `Request` error for non-2xx statuses.
fn decode(response: RawResponse) -> Result<Value> {
    if !response.is_success() {
        let message = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|body| server_message(&body));
        return Err(RepoLensError::request(response.status, message));
    }

    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&response.body).map_err(|e| RepoLensError::Parse(e.to_string()))
}

/// Extract the server-supplied error text from an error body.
fn server_message(body: &Value) -> Option<String> {
    ["error", "message"]
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .map(str::to_string)
}
