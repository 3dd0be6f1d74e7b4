//! Analysis pipeline: fetch repository data, run the four analyses,
//! assemble the response.
//!
//! Only the repository metadata lookup is mandatory. Issues, documents and
//! each analysis degrade to an empty value or fallback text when they fail.

use crate::analysis::settle::{settle, settle_all, Settled};
use crate::error::ApiError;
use crate::github::RepositorySource;
use crate::llm::InsightProvider;
use crate::models::{
    AnalysisContext, AnalysisKind, AnalysisMetadata, AnalysisPayload, AnalysisResult, IssueSummary,
    RepositorySummary,
};
use crate::repo::RepositoryIdentifier;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub const README_PATH: &str = "README.md";
pub const CONTRIBUTING_PATH: &str = "CONTRIBUTING.md";
pub const CODE_OF_CONDUCT_PATH: &str = "CODE_OF_CONDUCT.md";

/// Runs one analysis per call; holds no per-request state.
#[derive(Clone)]
pub struct Orchestrator {
    source: Arc<dyn RepositorySource>,
    insights: Arc<dyn InsightProvider>,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn RepositorySource>, insights: Arc<dyn InsightProvider>) -> Self {
        Self { source, insights }
    }

    pub fn github_authenticated(&self) -> bool {
        self.source.is_authenticated()
    }

    pub fn ai_authenticated(&self) -> bool {
        self.insights.is_authenticated()
    }

    /// Analyze the repository referenced by `raw_url`.
    pub async fn analyze(&self, raw_url: &str) -> Result<AnalysisPayload, ApiError> {
        let repo = RepositoryIdentifier::parse(raw_url)
            .ok_or_else(|| ApiError::InvalidUrl(raw_url.trim().to_string()))?;
        info!("Analyzing repository {}", repo);

        let context = self.gather_context(&repo).await?;
        let analysis = self.run_analyses(&context).await;

        Ok(self.assemble(context, analysis))
    }

    /// Fetch metadata, issues and the three documents concurrently.
    async fn gather_context(&self, repo: &RepositoryIdentifier) -> Result<AnalysisContext, ApiError> {
        let document_fetches: Vec<_> = [README_PATH, CONTRIBUTING_PATH, CODE_OF_CONDUCT_PATH]
            .into_iter()
            .map(|path| {
                (
                    format!("{} lookup for {}", path, repo),
                    self.source.file_content(repo, path),
                    None,
                )
            })
            .collect();

        let (metadata, issues, documents) = tokio::join!(
            self.source.repository_metadata(repo),
            settle(
                format!("Issue search for {}", repo),
                self.source.beginner_friendly_issues(repo),
                Vec::new(),
            ),
            settle_all(document_fetches),
        );

        let repository = metadata.map_err(|e| {
            warn!("Metadata lookup for {} failed: {}", repo, e);
            ApiError::from(e)
        })?;

        let mut documents = documents.into_iter().map(Settled::into_inner);
        let readme = documents.next().flatten();
        let contributing = documents.next().flatten();
        let code_of_conduct = documents.next().flatten();

        Ok(AnalysisContext {
            repository,
            issues: issues.into_inner(),
            readme,
            contributing,
            code_of_conduct,
        })
    }

    /// Run the four analyses concurrently over the same context.
    async fn run_analyses(&self, context: &AnalysisContext) -> AnalysisResult {
        let repo = &context.repository.full_name;
        let label = |kind: AnalysisKind| format!("{} analysis for {}", kind, repo);

        let results = settle_all(vec![
            (
                label(AnalysisKind::WhereToStart),
                self.insights.analyze_where_to_start(context),
                AnalysisKind::WhereToStart.fallback().to_string(),
            ),
            (
                label(AnalysisKind::WhatNeedsImproving),
                self.insights.analyze_what_needs_improving(context),
                AnalysisKind::WhatNeedsImproving.fallback().to_string(),
            ),
            (
                label(AnalysisKind::ContributionRules),
                self.insights.analyze_contribution_rules(context),
                AnalysisKind::ContributionRules.fallback().to_string(),
            ),
            (
                label(AnalysisKind::ProjectOverview),
                self.insights.analyze_project_overview(context),
                AnalysisKind::ProjectOverview.fallback().to_string(),
            ),
        ])
        .await;

        let generated = results.iter().filter(|r| r.succeeded).count();
        info!("{}: {} of {} analyses generated", repo, generated, results.len());

        let mut texts = results.into_iter().map(Settled::into_inner);
        let mut next = |kind: AnalysisKind| texts.next().unwrap_or_else(|| kind.fallback().to_string());
        AnalysisResult {
            where_to_start: next(AnalysisKind::WhereToStart),
            what_needs_improving: next(AnalysisKind::WhatNeedsImproving),
            contribution_rules: next(AnalysisKind::ContributionRules),
            project_overview: next(AnalysisKind::ProjectOverview),
        }
    }

    fn assemble(&self, context: AnalysisContext, analysis: AnalysisResult) -> AnalysisPayload {
        AnalysisPayload {
            repository: RepositorySummary::from(&context.repository),
            analysis,
            metadata: AnalysisMetadata {
                issues_count: context.issues.len(),
                has_readme: context.readme.is_some(),
                has_contributing: context.contributing.is_some(),
                has_code_of_conduct: context.code_of_conduct.is_some(),
                github_authenticated: self.github_authenticated(),
                ai_authenticated: self.ai_authenticated(),
                analyzed_at: Utc::now(),
            },
            issues: context.issues.iter().map(IssueSummary::from).collect(),
        }
    }
}
