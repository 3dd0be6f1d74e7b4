//! GitHub API failures.
//!
//! Failures are classified from the HTTP status, never from message text.
//! Each variant's message still names its cause ("not found", "rate limit",
//! "authentication") so logs read naturally.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("GitHub API rate limit exceeded{}", reset_hint(.reset_at))]
    RateLimited { reset_at: Option<i64> },

    #[error("GitHub authentication failed: {0}")]
    Unauthorized(String),

    #[error("GitHub API error {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Failed to reach GitHub: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected GitHub response: {0}")]
    Decode(String),
}

fn reset_hint(reset_at: &Option<i64>) -> String {
    match reset_at.and_then(|ts| chrono::DateTime::from_timestamp(ts, 0)) {
        Some(at) => format!(" (resets at {})", at.format("%H:%M:%S UTC")),
        None => String::new(),
    }
}

impl GitHubError {
    /// Classify a non-success response.
    ///
    /// `resource` names what was requested and `message` is GitHub's own
    /// error text, when it sent one.
    pub fn from_status(
        status: StatusCode,
        resource: &str,
        message: String,
        rate_limit_reset: Option<i64>,
    ) -> Self {
        match status {
            StatusCode::NOT_FOUND => GitHubError::NotFound(resource.to_string()),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => GitHubError::RateLimited {
                reset_at: rate_limit_reset,
            },
            StatusCode::UNAUTHORIZED => GitHubError::Unauthorized(if message.is_empty() {
                "bad or missing credentials".to_string()
            } else {
                message
            }),
            _ => GitHubError::Status { status, message },
        }
    }
}
