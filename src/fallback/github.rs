// Public GitHub repository listing, used when the backend cannot serve a listing.
// Classifies GitHub failures into not-found, rate-limited and generic source errors.

use std::future::Future;

use reqwest::{
    Client, Response, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::config::ClientConfig;
use crate::error::{RepoLensError, Result};

use super::record::GitHubRepository;

const GITHUB_API_VERSION: &str = "2022-11-28";
const PER_PAGE: &str = "100";

/// An independent source of repository listings.
pub trait RepositorySource {
    fn user_repositories(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Vec<GitHubRepository>>>;
}

/// GitHub REST client for public repository listings.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    client: Client,
    base_url: String,
}

impl GitHubSource {
    /// Create a source for the configured fallback base URL.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.github_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| RepoLensError::Config(e.to_string()))?,
            );
        }
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
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

        Ok(Self {
            client,
            base_url: config.fallback_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response, what: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let reset = response
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let body = response.text().await.unwrap_or_default();

        Err(classify_status(status, reset, &body, what))
    }

    /// `{base}/users/{username}/repos`, with the username kept to one path segment.
    fn repos_url(&self, username: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| RepoLensError::Config(format!("Invalid fallback URL: {}", e)))?;
        let invalid = || RepoLensError::Config(format!("Invalid fallback URL: {}", self.base_url));
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["users", username, "repos"]);
        Ok(url)
    }
}

impl RepositorySource for GitHubSource {
    async fn user_repositories(&self, username: &str) -> Result<Vec<GitHubRepository>> {
        let url = self.repos_url(username)?;
        let params = [("sort", "updated"), ("per_page", PER_PAGE)];

        let response = self
            .client
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| RepoLensError::Source(format!("GitHub unreachable: {}", e)))?;

        let response = self
            .check_response(response, &format!("GitHub user '{}'", username))
            .await?;

        response
            .json()
            .await
            .map_err(|e| RepoLensError::Source(format!("unexpected GitHub listing: {}", e)))
    }
}

/// Map a failed GitHub status onto a typed error.
pub fn classify_status(
    status: StatusCode,
    reset: Option<i64>,
    body: &str,
    what: &str,
) -> RepoLensError {
    match status {
        StatusCode::NOT_FOUND => RepoLensError::NotFound(what.to_string()),
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
            let reset_at = reset
                .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.format("%H:%M:%S").to_string())
                .unwrap_or_else(|| "unknown".to_string());
            RepoLensError::RateLimited { reset_at }
        }
        status => {
            let detail = body.trim();
            if detail.is_empty() {
                RepoLensError::Source(format!("HTTP {}", status.as_u16()))
            } else {
                RepoLensError::Source(format!("HTTP {}: {}", status.as_u16(), detail))
            }
        }
    }
}
