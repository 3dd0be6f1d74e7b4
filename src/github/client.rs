//! GitHub REST API client.

use crate::config::GitHubConfig;
use crate::github::{GitHubError, RepositorySource, BEGINNER_LABELS};
use crate::models::{Issue, Repository};
use crate::repo::RepositoryIdentifier;
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};

const API_VERSION: &str = "2022-11-28";

/// Most issues a search may return.
const MAX_ISSUES: usize = 20;

/// Search API response for `GET /search/issues`.
#[derive(Debug, Deserialize)]
struct IssueSearchResponse {
    #[serde(default)]
    items: Vec<Issue>,
}

/// Contents API response for a single file.
#[derive(Debug, Deserialize)]
struct FileContentResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// Error body GitHub sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for the subset of the GitHub API the analysis needs.
pub struct GitHubClient {
    http_client: reqwest::Client,
    api_url: String,
    authenticated: bool,
    max_issues: usize,
}

impl GitHubClient {
    /// Create a client. A non-empty token switches to authenticated mode.
    ///
    /// `max_issues` is kept within `1..=MAX_ISSUES`.
    pub fn new(config: &GitHubConfig, max_issues: usize) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid GitHub user agent")?,
        );

        let token = config.token.as_deref().filter(|t| !t.trim().is_empty());
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .context("GitHub token contains invalid characters")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create GitHub HTTP client")?;

        info!(
            "GitHub client ready ({})",
            if token.is_some() {
                "authenticated"
            } else {
                "unauthenticated, 60 requests/hour"
            }
        );

        Ok(Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            authenticated: token.is_some(),
            max_issues: max_issues.clamp(1, MAX_ISSUES),
        })
    }

    /// Build the search query matching open issues with any beginner label.
    fn beginner_issue_query(repo: &RepositoryIdentifier) -> String {
        let labels: Vec<String> = BEGINNER_LABELS
            .iter()
            .map(|label| format!("\"{}\"", label))
            .collect();
        format!("repo:{} is:issue is:open label:{}", repo, labels.join(","))
    }

    /// Pass successful responses through, classify the rest.
    async fn check_status(response: Response, resource: &str) -> Result<Response, GitHubError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let rate_limit_reset = response
            .headers()
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.message)
            .unwrap_or(body);

        Err(GitHubError::from_status(status, resource, message, rate_limit_reset))
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn repository_metadata(&self, repo: &RepositoryIdentifier) -> Result<Repository, GitHubError> {
        let url = format!("{}/repos/{}", self.api_url, repo);
        debug!("Fetching repository metadata: {}", url);

        let response = self.http_client.get(&url).send().await?;
        let response = Self::check_status(response, &repo.to_string()).await?;

        response
            .json::<Repository>()
            .await
            .map_err(|e| GitHubError::Decode(format!("repository metadata: {}", e)))
    }

    async fn beginner_friendly_issues(&self, repo: &RepositoryIdentifier) -> Result<Vec<Issue>, GitHubError> {
        let url = format!("{}/search/issues", self.api_url);
        let query = Self::beginner_issue_query(repo);
        let per_page = self.max_issues.to_string();
        debug!("Searching issues: {}", query);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("sort", "created"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;
        let response = Self::check_status(response, &format!("issues of {}", repo)).await?;

        let search: IssueSearchResponse = response
            .json()
            .await
            .map_err(|e| GitHubError::Decode(format!("issue search: {}", e)))?;

        let mut issues = search.items;
        issues.truncate(self.max_issues);
        Ok(issues)
    }

    async fn file_content(
        &self,
        repo: &RepositoryIdentifier,
        path: &str,
    ) -> Result<Option<String>, GitHubError> {
        let url = format!("{}/repos/{}/contents/{}", self.api_url, repo, path);
        debug!("Fetching file: {}", url);

        let response = self.http_client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!("{} has no {}", repo, path);
            return Ok(None);
        }
        let response = Self::check_status(response, &format!("{} in {}", path, repo)).await?;

        let file: FileContentResponse = response
            .json()
            .await
            .map_err(|e| GitHubError::Decode(format!("{}: {}", path, e)))?;

        decode_content(&file).map(Some)
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Decode a base64 file body. GitHub wraps the encoded text at 60 columns.
fn decode_content(file: &FileContentResponse) -> Result<String, GitHubError> {
    let content = file
        .content
        .as_deref()
        .ok_or_else(|| GitHubError::Decode("file has no content".to_string()))?;

    match file.encoding.as_deref() {
        Some("base64") | None => {
            let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| GitHubError::Decode(format!("invalid base64: {}", e)))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Some(other) => Err(GitHubError::Decode(format!("unsupported encoding: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, token: Option<&str>) -> GitHubClient {
        client_with_limit(server, token, 20)
    }

    fn client_with_limit(server: &MockServer, token: Option<&str>, max_issues: usize) -> GitHubClient {
        let config = GitHubConfig {
            api_url: server.uri(),
            user_agent: "repoguide-test".to_string(),
            token: token.map(String::from),
        };
        GitHubClient::new(&config, max_issues).unwrap()
    }

    fn repo() -> RepositoryIdentifier {
        RepositoryIdentifier::parse("octocat/hello").unwrap()
    }

    fn encode(text: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(text)
    }

    #[tokio::test]
    async fn test_repository_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello"))
            .and(header("user-agent", "repoguide-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "hello",
                "full_name": "octocat/hello",
                "owner": { "login": "octocat" },
                "html_url": "https://github.com/octocat/hello",
                "stargazers_count": 5
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let metadata = client.repository_metadata(&repo()).await.unwrap();
        assert_eq!(metadata.full_name, "octocat/hello");
        assert_eq!(metadata.stargazers_count, 5);
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_token_sent_as_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "hello",
                "full_name": "octocat/hello",
                "owner": { "login": "octocat" },
                "html_url": "https://github.com/octocat/hello"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("secret"));
        assert!(client.is_authenticated());
        tokio_test::assert_ok!(client.repository_metadata(&repo()).await);
    }

    #[tokio::test]
    async fn test_blank_token_is_unauthenticated() {
        let server = MockServer::start().await;
        let client = client_for(&server, Some("   "));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_metadata_errors_are_classified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/limited"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-remaining", "0")
                    .insert_header("x-ratelimit-reset", "1700000000")
                    .set_body_json(json!({ "message": "API rate limit exceeded" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/private"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Bad credentials" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/broken"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let lookup = |name: &str| RepositoryIdentifier::parse(&format!("octocat/{}", name)).unwrap();

        let err = client.repository_metadata(&lookup("missing")).await.unwrap_err();
        assert!(matches!(err, GitHubError::NotFound(_)));

        let err = client.repository_metadata(&lookup("limited")).await.unwrap_err();
        assert!(matches!(err, GitHubError::RateLimited { reset_at: Some(1_700_000_000) }));

        let err = client.repository_metadata(&lookup("private")).await.unwrap_err();
        match err {
            GitHubError::Unauthorized(message) => assert_eq!(message, "Bad credentials"),
            other => panic!("unexpected error: {other}"),
        }

        let err = client.repository_metadata(&lookup("broken")).await.unwrap_err();
        match err {
            GitHubError::Status { status, message } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(message, "bad gateway");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_beginner_issue_search() {
        let server = MockServer::start().await;
        let items: Vec<_> = (1..=25)
            .map(|n| {
                json!({
                    "number": n,
                    "title": format!("Issue {}", n),
                    "html_url": format!("https://github.com/octocat/hello/issues/{}", n),
                    "labels": [{ "name": "good first issue" }],
                    "comments": 1
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param(
                "q",
                "repo:octocat/hello is:issue is:open label:\"good first issue\",\"help wanted\",\"beginner\",\"easy\",\"starter\"",
            ))
            .and(query_param("sort", "created"))
            .and(query_param("order", "desc"))
            .and(query_param("per_page", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 25,
                "items": items
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let issues = client.beginner_friendly_issues(&repo()).await.unwrap();
        assert_eq!(issues.len(), 20);
        assert_eq!(issues[0].number, 1);
        assert_eq!(issues[0].label_names(), vec!["good first issue"]);
    }

    #[tokio::test]
    async fn test_issue_limit_is_clamped() {
        let server = MockServer::start().await;
        let items: Vec<_> = (1..=30)
            .map(|n| {
                json!({
                    "number": n,
                    "title": format!("Issue {}", n),
                    "html_url": format!("https://github.com/octocat/hello/issues/{}", n),
                    "labels": [{ "name": "help wanted" }]
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param("per_page", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items.clone() })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search/issues"))
            .and(query_param("per_page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
            .expect(1)
            .mount(&server)
            .await;

        let generous = client_with_limit(&server, None, 50);
        assert_eq!(generous.beginner_friendly_issues(&repo()).await.unwrap().len(), 20);

        let zero = client_with_limit(&server, None, 0);
        assert_eq!(zero.beginner_friendly_issues(&repo()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_forbidden_without_rate_limit_headers_is_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({ "message": "Forbidden" })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.repository_metadata(&repo()).await.unwrap_err();
        assert!(matches!(err, GitHubError::RateLimited { reset_at: None }));
    }

    #[tokio::test]
    async fn test_file_content_decodes_wrapped_base64() {
        let server = MockServer::start().await;
        let text = "# Hello\n\nA friendly project with a long enough readme to wrap the base64 body.\n";
        let encoded = encode(text);
        let wrapped = encoded
            .as_bytes()
            .chunks(60)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");

        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello/contents/README.md"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "README.md",
                "encoding": "base64",
                "content": wrapped
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let readme = client.file_content(&repo(), "README.md").await.unwrap();
        assert_eq!(readme.as_deref(), Some(text));
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello/contents/CONTRIBUTING.md"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let contributing = client.file_content(&repo(), "CONTRIBUTING.md").await.unwrap();
        assert!(contributing.is_none());
    }

    #[tokio::test]
    async fn test_file_content_rate_limited_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/hello/contents/README.md"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = client_for(&server, None);
        let err = client.file_content(&repo(), "README.md").await.unwrap_err();
        assert!(matches!(err, GitHubError::RateLimited { reset_at: None }));
    }

    #[test]
    fn test_decode_rejects_unknown_encoding() {
        let file = FileContentResponse {
            content: Some(String::new()),
            encoding: Some("none".to_string()),
        };
        assert!(decode_content(&file).is_err());
    }
}
