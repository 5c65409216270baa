// Primary/fallback source coordination.
// Primary -> Done | Fallback -> Done | Failed, with both paths normalized to the same records.

use std::future::Future;

use tracing::debug;

use crate::error::{RepoLensError, Result};
use crate::gateway::RequestGateway;
use crate::transport::{RequestDescriptor, Transport};

use super::record::{NormalizedRepositoryRecord, normalize_backend_listing};

/// Where a fallback fetch currently stands.
#[derive(Debug)]
enum Stage {
    Primary,
    Fallback { cause: RepoLensError },
    Done(Vec<NormalizedRepositoryRecord>),
    Failed(RepoLensError),
}

/// Tries the backend first and substitutes an independent source on any failure.
pub struct SourceFallbackCoordinator<'g, T> {
    gateway: &'g mut RequestGateway<T>,
}

impl<'g, T: Transport> SourceFallbackCoordinator<'g, T> {
    pub fn new(gateway: &'g mut RequestGateway<T>) -> Self {
        Self { gateway }
    }

    /// Fetch a repository listing from the backend, or from `fallback` if the
    /// backend call fails for any reason.
    ///
    /// The fallback is invoked at most once and never retried. Its raw items
    /// pass through `normalizer`; an error there or in the fallback itself is
    /// returned as-is.
    pub async fn fetch_with_fallback<F, Fut, R, N>(
        &mut self,
        primary: &RequestDescriptor,
        fallback: F,
        normalizer: N,
    ) -> Result<Vec<NormalizedRepositoryRecord>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<R>>>,
        N: Fn(R) -> Result<NormalizedRepositoryRecord>,
    {
        let mut fallback = Some(fallback);
        let mut stage = Stage::Primary;

        loop {
            stage = match stage {
                Stage::Primary => match self.primary(primary).await {
                    Ok(records) => Stage::Done(records),
                    Err(cause) => Stage::Fallback { cause },
                },
                Stage::Fallback { cause } => {
                    debug!(
                        endpoint = primary.endpoint(),
                        error = %cause,
                        "primary source failed, trying fallback"
                    );
                    let Some(invoke) = fallback.take() else {
                        return Err(cause);
                    };
                    let normalized: Result<Vec<_>> = match invoke().await {
                        Ok(raw) => raw.into_iter().map(&normalizer).collect(),
                        Err(e) => Err(e),
                    };
                    match normalized {
                        Ok(records) => Stage::Done(records),
                        Err(e) => Stage::Failed(e),
                    }
                }
                Stage::Done(records) => return Ok(records),
                Stage::Failed(e) => return Err(e),
            };
        }
    }

    async fn primary(
        &mut self,
        request: &RequestDescriptor,
    ) -> Result<Vec<NormalizedRepositoryRecord>> {
        let payload = self.gateway.execute(request).await?;
        normalize_backend_listing(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::fallback::github::classify_status;
    use crate::fallback::record::{GitHubRepository, normalize_github};
    use crate::transport::{RawResponse, RetryPolicy, RetryingTransport};
    use reqwest::StatusCode;
    use serde_json::json;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTransport {
        response: RawResponse,
        calls: AtomicUsize,
    }

    impl Transport for FixedTransport {
        async fn send(&self, _request: &RequestDescriptor) -> Result<RawResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    fn gateway(status: u16, body: serde_json::Value) -> RequestGateway<FixedTransport> {
        RequestGateway::new(
            RetryingTransport::new(
                FixedTransport {
                    response: RawResponse::new(status, body.to_string()),
                    calls: AtomicUsize::new(0),
                },
                RetryPolicy::default(),
            ),
            CacheStore::default(),
        )
    }

    fn listing_request() -> RequestDescriptor {
        RequestDescriptor::query("/user-repositories", &json!({"username": "testuser"})).unwrap()
    }

    fn github_repo() -> GitHubRepository {
        serde_json::from_value(json!({
            "id": 123456,
            "name": "Genetic-Algorithm",
            "full_name": "testuser/Genetic-Algorithm",
            "description": "Evolving CNN architectures",
            "html_url": "https://github.com/testuser/Genetic-Algorithm",
            "clone_url": "https://github.com/testuser/Genetic-Algorithm.git",
            "language": "Python",
            "stargazers_count": 42,
            "forks_count": 7,
            "updated_at": "2024-01-15T10:30:00Z",
            "private": false
        }))
        .unwrap()
    }

    fn backend_listing() -> serde_json::Value {
        json!({
            "username": "testuser",
            "count": 1,
            "repositories": [{
                "id": 123456,
                "name": "Genetic-Algorithm",
                "full_name": "testuser/Genetic-Algorithm",
                "description": "Evolving CNN architectures",
                "html_url": "https://github.com/testuser/Genetic-Algorithm",
                "clone_url": "https://github.com/testuser/Genetic-Algorithm.git",
                "language": "Python",
                "stars": 42,
                "forks": 7,
                "updated_at": "2024-01-15T10:30:00Z",
                "private": false
            }]
        })
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let mut gateway = gateway(200, backend_listing());
        let fallback_calls = Cell::new(0);
        let calls = &fallback_calls;

        let records = SourceFallbackCoordinator::new(&mut gateway)
            .fetch_with_fallback(
                &listing_request(),
                move || async move {
                    calls.set(calls.get() + 1);
                    Ok(vec![github_repo()])
                },
                normalize_github,
            )
            .await
            .unwrap();

        assert_eq!(fallback_calls.get(), 0);
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_request_error_uses_fallback_once_with_same_shape() {
        let mut primary_ok = gateway(200, backend_listing());
        let expected = SourceFallbackCoordinator::new(&mut primary_ok)
            .fetch_with_fallback(
                &listing_request(),
                || async { Ok(Vec::new()) },
                normalize_github,
            )
            .await
            .unwrap();

        let mut failing = gateway(
            404,
            json!({"error": "User not found or no repositories available"}),
        );
        let fallback_calls = Cell::new(0);
        let calls = &fallback_calls;
        let records = SourceFallbackCoordinator::new(&mut failing)
            .fetch_with_fallback(
                &listing_request(),
                move || async move {
                    calls.set(calls.get() + 1);
                    Ok(vec![github_repo()])
                },
                normalize_github,
            )
            .await
            .unwrap();

        assert_eq!(fallback_calls.get(), 1);
        assert_eq!(records, expected);
    }

    #[tokio::test]
    async fn test_parse_error_uses_fallback() {
        let mut gateway = gateway(200, json!({"repositories": 12}));

        let records = SourceFallbackCoordinator::new(&mut gateway)
            .fetch_with_fallback(
                &listing_request(),
                || async { Ok(vec![github_repo()]) },
                normalize_github,
            )
            .await
            .unwrap();

        assert_eq!(records[0].star_count, 42);
    }

    #[tokio::test]
    async fn test_fallback_rate_limit_surfaces() {
        let mut gateway = gateway(500, json!({"error": "Internal server error"}));

        let err = SourceFallbackCoordinator::new(&mut gateway)
            .fetch_with_fallback(
                &listing_request(),
                || async {
                    Err::<Vec<GitHubRepository>, _>(classify_status(
                        StatusCode::FORBIDDEN,
                        None,
                        "",
                        "GitHub user 'testuser'",
                    ))
                },
                normalize_github,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RepoLensError::RateLimited { .. }));
    }

    #[tokio::test]
    async fn test_fallback_not_found_surfaces() {
        let mut gateway = gateway(500, json!({}));

        let err = SourceFallbackCoordinator::new(&mut gateway)
            .fetch_with_fallback(
                &listing_request(),
                || async {
                    Err::<Vec<GitHubRepository>, _>(classify_status(
                        StatusCode::NOT_FOUND,
                        None,
                        "",
                        "GitHub user 'ghost'",
                    ))
                },
                normalize_github,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RepoLensError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fallback_normalizer_error_surfaces() {
        let mut gateway = gateway(503, json!({}));
        let mut broken = github_repo();
        broken.html_url.clear();

        let err = SourceFallbackCoordinator::new(&mut gateway)
            .fetch_with_fallback(
                &listing_request(),
                move || async move { Ok(vec![broken]) },
                normalize_github,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RepoLensError::Parse(_)));
    }
}
