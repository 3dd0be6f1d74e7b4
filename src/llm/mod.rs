//! LLM inference service.
//!
//! This module turns an [`AnalysisContext`] into the four newcomer analyses
//! through an OpenAI-compatible chat completions API.

pub mod client;
pub mod prompts;
pub mod rate_limiter;
pub mod sanitize;

pub use client::LlmClient;

use crate::models::{AnalysisContext, AnalysisKind};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM API key is not configured")]
    NotConfigured,

    #[error("LLM rate limit reached, budget frees up in {:.0}s", retry_after.as_secs_f64())]
    RateLimited { retry_after: Duration },

    #[error("LLM API error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to reach LLM API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse LLM response: {0}")]
    Decode(String),

    #[error("LLM returned an empty response")]
    EmptyResponse,
}

/// Produces free-text (HTML fragment) analyses of a repository.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn analyze(&self, kind: AnalysisKind, context: &AnalysisContext) -> Result<String, LlmError>;

    async fn analyze_where_to_start(&self, context: &AnalysisContext) -> Result<String, LlmError> {
        self.analyze(AnalysisKind::WhereToStart, context).await
    }

    async fn analyze_what_needs_improving(&self, context: &AnalysisContext) -> Result<String, LlmError> {
        self.analyze(AnalysisKind::WhatNeedsImproving, context).await
    }

    async fn analyze_contribution_rules(&self, context: &AnalysisContext) -> Result<String, LlmError> {
        self.analyze(AnalysisKind::ContributionRules, context).await
    }

    async fn analyze_project_overview(&self, context: &AnalysisContext) -> Result<String, LlmError> {
        self.analyze(AnalysisKind::ProjectOverview, context).await
    }

    /// Whether an API key is configured.
    fn is_authenticated(&self) -> bool;
}
