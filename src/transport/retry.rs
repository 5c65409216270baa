// Retrying transport wrapper.
// Repeats a call on connectivity failures only, sleeping 1s, 2s, 4s... between attempts.

use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{ClientConfig, DEFAULT_BACKOFF_BASE, DEFAULT_MAX_RETRIES};
use crate::error::{RepoLensError, Result};

use super::Transport;
use super::request::{RawResponse, RequestDescriptor};

/// Attempt limit and backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_retries: u32,
    /// Delay before attempt 1; attempt `i` waits `backoff_base * 2^(i-1)`.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: config.backoff_base,
        }
    }

    /// Delay to wait before the 0-indexed `attempt`. The first attempt never waits.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        self.backoff_base.saturating_mul(factor)
    }
}

/// Wraps a transport with bounded exponential-backoff retries.
#[derive(Debug, Clone)]
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Send the request, retrying transport failures up to the policy limit.
    ///
    /// Non-2xx responses are returned as-is and never retried. After the last
    /// attempt fails, its transport error is returned.
    pub async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        let attempts = self.policy.max_retries.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            let delay = self.policy.delay_before(attempt);
            if !delay.is_zero() {
                debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off before retry");
                tokio::time::sleep(delay).await;
            }

            match self.inner.send(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transport() => {
                    warn!(
                        attempt = attempt + 1,
                        attempts,
                        endpoint = request.endpoint(),
                        error = %e,
                        "transport failure"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| RepoLensError::Transport("no attempt was made".to_string())))
    }
}
