// Client configuration.
// Endpoint locations, retry policy and cache TTL, with environment overrides.

use std::time::Duration;

use crate::error::{RepoLensError, Result};

/// Default backend API root.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001/api";

/// Default public repository-listing source.
pub const DEFAULT_FALLBACK_BASE_URL: &str = "https://api.github.com";

/// Default number of attempts per logical call.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay before the first retry; doubles on each further retry.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Default cache TTL: 5 minutes.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("repolens/", env!("CARGO_PKG_VERSION"));

/// Settings shared by the gateway, transport and fallback source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub fallback_base_url: String,
    /// Total attempts for one logical call, including the first.
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Optional token for the fallback source.
    pub github_token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            fallback_base_url: DEFAULT_FALLBACK_BASE_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
            github_token: None,
        }
    }
}

impl ClientConfig {
    /// Build a configuration from defaults overlaid with `REPOLENS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("REPOLENS_API_URL") {
            config.api_base_url = url;
        }
        if let Some(url) = lookup("REPOLENS_FALLBACK_URL") {
            config.fallback_base_url = url;
        }
        if let Some(value) = lookup("REPOLENS_MAX_RETRIES") {
            config.max_retries = parse_number("REPOLENS_MAX_RETRIES", &value)?;
        }
        if let Some(value) = lookup("REPOLENS_CACHE_TTL_SECS") {
            config.cache_ttl =
                Duration::from_secs(parse_number("REPOLENS_CACHE_TTL_SECS", &value)?);
        }
        if let Some(value) = lookup("REPOLENS_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_number("REPOLENS_TIMEOUT_SECS", &value)?);
        }
        config.github_token = lookup("GITHUB_TOKEN").filter(|t| !t.is_empty());

        config.validate()?;
        Ok(config)
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_fallback_base_url(mut self, url: impl Into<String>) -> Self {
        self.fallback_base_url = url.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }

    /// Reject settings that would make every call fail.
    pub fn validate(&self) -> Result<()> {
        if self.max_retries == 0 {
            return Err(RepoLensError::Config(
                "max_retries must be at least 1".to_string(),
            ));
        }
        for (name, url) in [
            ("api_base_url", &self.api_base_url),
            ("fallback_base_url", &self.fallback_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(RepoLensError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RepoLensError::Config(format!("{} is not a number: '{}'", name, value)))
}
