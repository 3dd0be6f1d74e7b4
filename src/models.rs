//! Data models for the contributor guide.
//!
//! This module contains the GitHub wire types, the per-request analysis
//! context and the JSON payload returned to the browser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Repository metadata as returned by `GET /repos/{owner}/{repo}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: RepositoryOwner,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub license: Option<License>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryOwner {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    #[serde(default)]
    pub spdx_id: Option<String>,
    pub name: String,
}

/// An open issue from the search API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub html_url: String,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Issue {
    /// Label names, in the order GitHub returned them.
    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// Everything gathered about one repository for a single request.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub repository: Repository,
    pub issues: Vec<Issue>,
    pub readme: Option<String>,
    pub contributing: Option<String>,
    pub code_of_conduct: Option<String>,
}

/// The four analyses produced for a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    WhereToStart,
    WhatNeedsImproving,
    ContributionRules,
    ProjectOverview,
}

impl AnalysisKind {
    #[cfg(test)]
    pub const ALL: [AnalysisKind; 4] = [
        AnalysisKind::WhereToStart,
        AnalysisKind::WhatNeedsImproving,
        AnalysisKind::ContributionRules,
        AnalysisKind::ProjectOverview,
    ];

    /// Text shown when the inference call for this analysis fails.
    pub fn fallback(&self) -> &'static str {
        match self {
            AnalysisKind::WhereToStart => {
                "<p>We couldn't generate starting points right now. Browse the issues labelled \
                 <em>good first issue</em> or <em>help wanted</em> and read the README to get oriented.</p>"
            }
            AnalysisKind::WhatNeedsImproving => {
                "<p>We couldn't identify improvement areas right now. Open issues and recent \
                 discussions are the best place to see what the maintainers need.</p>"
            }
            AnalysisKind::ContributionRules => {
                "<p>We couldn't summarize the contribution rules right now. Check CONTRIBUTING.md \
                 and CODE_OF_CONDUCT.md in the repository before opening a pull request.</p>"
            }
            AnalysisKind::ProjectOverview => {
                "<p>We couldn't generate a project overview right now. The repository description \
                 and README explain what the project does.</p>"
            }
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisKind::WhereToStart => write!(f, "where to start"),
            AnalysisKind::WhatNeedsImproving => write!(f, "what needs improving"),
            AnalysisKind::ContributionRules => write!(f, "contribution rules"),
            AnalysisKind::ProjectOverview => write!(f, "project overview"),
        }
    }
}

/// Analysis text per kind: real output or the kind's fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub where_to_start: String,
    pub what_needs_improving: String,
    pub contribution_rules: String,
    pub project_overview: String,
}

impl AnalysisResult {
    /// All four fields set to their fallbacks.
    #[cfg(test)]
    pub fn fallbacks() -> Self {
        Self {
            where_to_start: AnalysisKind::WhereToStart.fallback().to_string(),
            what_needs_improving: AnalysisKind::WhatNeedsImproving.fallback().to_string(),
            contribution_rules: AnalysisKind::ContributionRules.fallback().to_string(),
            project_overview: AnalysisKind::ProjectOverview.fallback().to_string(),
        }
    }
}

/// Repository fields exposed to the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub name: String,
    pub full_name: String,
    pub owner: String,
    pub description: Option<String>,
    pub url: String,
    pub homepage: Option<String>,
    pub language: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub open_issues: u64,
    pub topics: Vec<String>,
    pub license: Option<String>,
    pub default_branch: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<&Repository> for RepositorySummary {
    fn from(repo: &Repository) -> Self {
        Self {
            name: repo.name.clone(),
            full_name: repo.full_name.clone(),
            owner: repo.owner.login.clone(),
            description: repo.description.clone(),
            url: repo.html_url.clone(),
            homepage: repo.homepage.clone().filter(|h| !h.is_empty()),
            language: repo.language.clone(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            watchers: repo.watchers_count,
            open_issues: repo.open_issues_count,
            topics: repo.topics.clone(),
            license: repo
                .license
                .as_ref()
                .map(|l| l.spdx_id.clone().unwrap_or_else(|| l.name.clone())),
            default_branch: repo.default_branch.clone(),
            created_at: repo.created_at,
            updated_at: repo.updated_at,
        }
    }
}

/// Issue fields exposed to the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueSummary {
    pub number: u64,
    pub title: String,
    pub url: String,
    pub labels: Vec<String>,
    pub comments: u64,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Issue> for IssueSummary {
    fn from(issue: &Issue) -> Self {
        Self {
            number: issue.number,
            title: issue.title.clone(),
            url: issue.html_url.clone(),
            labels: issue.labels.iter().map(|l| l.name.clone()).collect(),
            comments: issue.comments,
            created_at: issue.created_at,
        }
    }
}

/// Flags describing what went into the analysis.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub issues_count: usize,
    pub has_readme: bool,
    pub has_contributing: bool,
    pub has_code_of_conduct: bool,
    pub github_authenticated: bool,
    pub ai_authenticated: bool,
    pub analyzed_at: DateTime<Utc>,
}

/// Successful response body of `POST /api/analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisPayload {
    pub repository: RepositorySummary,
    pub analysis: AnalysisResult,
    pub metadata: AnalysisMetadata,
    pub issues: Vec<IssueSummary>,
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repository_deserializes_github_payload() {
        let payload = json!({
            "id": 10270250,
            "name": "react",
            "full_name": "facebook/react",
            "owner": { "login": "facebook", "id": 69631 },
            "description": "The library for web and native user interfaces.",
            "html_url": "https://github.com/facebook/react",
            "homepage": "https://react.dev",
            "language": "JavaScript",
            "stargazers_count": 230000,
            "forks_count": 47000,
            "watchers_count": 230000,
            "open_issues_count": 900,
            "topics": ["javascript", "react"],
            "license": { "key": "mit", "name": "MIT License", "spdx_id": "MIT" },
            "default_branch": "main",
            "created_at": "2013-05-24T16:15:54Z",
            "updated_at": "2024-01-01T00:00:00Z"
        });

        let repo: Repository = serde_json::from_value(payload).unwrap();
        assert_eq!(repo.full_name, "facebook/react");
        assert_eq!(repo.owner.login, "facebook");
        assert_eq!(repo.stargazers_count, 230000);
        assert_eq!(repo.topics, vec!["javascript", "react"]);
        assert!(repo.created_at.is_some());
    }

    #[test]
    fn test_repository_tolerates_nulls() {
        let payload = json!({
            "name": "r",
            "full_name": "o/r",
            "owner": { "login": "o" },
            "html_url": "https://github.com/o/r",
            "description": null,
            "language": null,
            "license": null,
            "homepage": ""
        });

        let repo: Repository = serde_json::from_value(payload).unwrap();
        let summary = RepositorySummary::from(&repo);
        assert_eq!(summary.description, None);
        assert_eq!(summary.homepage, None);
        assert_eq!(summary.license, None);
        assert_eq!(summary.stars, 0);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let repo = fixtures::repository("o", "r");
        let value = serde_json::to_value(RepositorySummary::from(&repo)).unwrap();
        assert_eq!(value["fullName"], "o/r");
        assert_eq!(value["openIssues"], 3);
        assert_eq!(value["license"], "MIT");
    }

    #[test]
    fn test_fallbacks_are_distinct() {
        let texts: std::collections::HashSet<&str> =
            AnalysisKind::ALL.iter().map(|k| k.fallback()).collect();
        assert_eq!(texts.len(), 4);
    }

    #[test]
    fn test_analysis_result_field_names() {
        let value = serde_json::to_value(AnalysisResult::fallbacks()).unwrap();
        for key in [
            "whereToStart",
            "whatNeedsImproving",
            "contributionRules",
            "projectOverview",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_issue_label_names() {
        let issue = fixtures::issue(1, "Fix typo", &["good first issue", "docs"]);
        assert_eq!(issue.label_names(), vec!["good first issue", "docs"]);
        assert_eq!(IssueSummary::from(&issue).labels.len(), 2);
    }
}
