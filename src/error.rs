//! Request-level errors and their HTTP representation.

use crate::github::GitHubError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors that end an analysis request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid GitHub repository URL: {0}")]
    InvalidUrl(String),

    #[error("Repository not found. Check the URL and make sure the repository is public.")]
    RepositoryNotFound,

    #[error("GitHub API rate limit exceeded. Try again later or configure a GitHub token.")]
    RateLimited,

    #[error("GitHub authentication failed. Check the configured GitHub token.")]
    AuthFailed,

    #[error("Failed to fetch repository data: {0}")]
    UpstreamError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    /// Machine-readable tag, identical to the variant name.
    pub fn tag(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "InvalidInput",
            ApiError::InvalidUrl(_) => "InvalidUrl",
            ApiError::RepositoryNotFound => "RepositoryNotFound",
            ApiError::RateLimited => "RateLimited",
            ApiError::AuthFailed => "AuthFailed",
            ApiError::UpstreamError(_) => "UpstreamError",
            ApiError::InternalError(_) => "InternalError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            ApiError::RepositoryNotFound => StatusCode::NOT_FOUND,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::AuthFailed => StatusCode::UNAUTHORIZED,
            ApiError::UpstreamError(_) | ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: self.tag(),
            message: self.to_string(),
        }
    }
}

/// Classification of a failed (mandatory) metadata lookup.
impl From<GitHubError> for ApiError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::NotFound(_) => ApiError::RepositoryNotFound,
            GitHubError::RateLimited { .. } => ApiError::RateLimited,
            GitHubError::Unauthorized(_) => ApiError::AuthFailed,
            other @ (GitHubError::Status { .. } | GitHubError::Transport(_) | GitHubError::Decode(_)) => {
                ApiError::UpstreamError(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
