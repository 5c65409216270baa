// Error types for repolens.
// Covers transport failures, HTTP status errors, decoding, fallback-source errors and validation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepoLensError {
    /// The call could not be completed at all (refused, timed out, DNS).
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Parse(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Repository source error: {0}")]
    Source(String),

    #[error("{0}")]
    Validation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl RepoLensError {
    /// Build a `Request` error for a status code, using `HTTP <status>` when the
    /// server did not supply a message.
    pub fn request(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));
        RepoLensError::Request { status, message }
    }

    /// Whether this error describes a connectivity failure worth retrying.
    pub fn is_transport(&self) -> bool {
        matches!(self, RepoLensError::Transport(_))
    }

    /// Short human-readable message for display.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl From<serde_json::Error> for RepoLensError {
    fn from(err: serde_json::Error) -> Self {
        RepoLensError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RepoLensError>;
