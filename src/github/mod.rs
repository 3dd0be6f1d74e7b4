//! GitHub data source.
//!
//! This module provides the repository metadata, issue search and file
//! lookups the analysis is built from.

pub mod client;
pub mod error;

pub use client::GitHubClient;
pub use error::GitHubError;

use crate::models::{Issue, Repository};
use crate::repo::RepositoryIdentifier;
use async_trait::async_trait;

/// Labels that mark an issue as approachable for newcomers.
pub const BEGINNER_LABELS: [&str; 5] = ["good first issue", "help wanted", "beginner", "easy", "starter"];

/// Read-only access to a hosted repository.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Fetch repository metadata. Failure here aborts the analysis.
    async fn repository_metadata(&self, repo: &RepositoryIdentifier) -> Result<Repository, GitHubError>;

    /// Most recently created open issues carrying any of [`BEGINNER_LABELS`].
    async fn beginner_friendly_issues(&self, repo: &RepositoryIdentifier) -> Result<Vec<Issue>, GitHubError>;

    /// Decoded text of a file at the repository root, `None` if it does not exist.
    async fn file_content(
        &self,
        repo: &RepositoryIdentifier,
        path: &str,
    ) -> Result<Option<String>, GitHubError>;

    /// Whether requests carry credentials (affects rate limits only).
    fn is_authenticated(&self) -> bool;
}
