// Transport module.
// Sends request descriptors over HTTP, with bounded exponential-backoff retries.

pub mod http;
pub mod request;
pub mod retry;

use std::future::Future;

use crate::error::Result;

pub use http::HttpTransport;
pub use request::{Access, Method, RawResponse, RequestDescriptor};
pub use retry::{RetryPolicy, RetryingTransport};

/// Performs one network call for a descriptor.
///
/// Implementations return `Err(RepoLensError::Transport)` only when no response
/// was obtained. Any HTTP status, including errors, comes back as a `RawResponse`.
pub trait Transport {
    fn send(&self, request: &RequestDescriptor) -> impl Future<Output = Result<RawResponse>>;
}
