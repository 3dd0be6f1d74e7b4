//! Route handlers.

use crate::error::ApiError;
use crate::models::AnalysisPayload;
use crate::server::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

/// `POST /api/analyze` with `{ "repoUrl": "..." }`.
pub async fn analyze(State(state): State<AppState>, body: Bytes) -> Result<Json<AnalysisPayload>, ApiError> {
    let result = match repo_url_from_body(&body) {
        Ok(repo_url) => state.orchestrator.analyze(&repo_url).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(payload) => Ok(Json(payload)),
        Err(e) => {
            warn!("Analyze request rejected ({}): {}", e.tag(), e);
            Err(e)
        }
    }
}

/// `GET /api/health`.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "githubAuthenticated": state.orchestrator.github_authenticated(),
        "aiAuthenticated": state.orchestrator.ai_authenticated(),
    }))
}

/// Pull `repoUrl` out of a raw JSON body.
fn repo_url_from_body(body: &[u8]) -> Result<String, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| {
        ApiError::InvalidInput("Request body must be JSON like {\"repoUrl\": \"...\"}".to_string())
    })?;

    match value.get("repoUrl") {
        Some(Value::String(url)) if !url.is_empty() => Ok(url.clone()),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            Err(ApiError::InvalidInput("Repository URL is required".to_string()))
        }
        Some(_) => Err(ApiError::InvalidInput("Repository URL must be a string".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_url_from_body() {
        assert_eq!(
            repo_url_from_body(br#"{"repoUrl": "octocat/hello"}"#).unwrap(),
            "octocat/hello"
        );
    }

    #[test]
    fn test_blank_repo_url_is_passed_to_parser() {
        assert_eq!(repo_url_from_body(br#"{"repoUrl": "   "}"#).unwrap(), "   ");
    }

    #[test]
    fn test_repo_url_rejections() {
        let bodies: [&[u8]; 7] = [
            b"",
            b"not json",
            b"{}",
            br#"{"repoUrl": null}"#,
            br#"{"repoUrl": ""}"#,
            br#"{"repoUrl": 42}"#,
            br#"["octocat/hello"]"#,
        ];
        for body in bodies {
            let err = repo_url_from_body(body).unwrap_err();
            assert!(
                matches!(err, ApiError::InvalidInput(_)),
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }
}
