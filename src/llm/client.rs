//! Chat completions client for the analyses.

use crate::config::LlmConfig;
use crate::llm::prompts::{clean_output, system_prompt, user_prompt};
use crate::llm::rate_limiter::{estimate_tokens, RateLimiter};
use crate::llm::sanitize::sanitize_html;
use crate::llm::{InsightProvider, LlmError};
use crate::models::{AnalysisContext, AnalysisKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Message in the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn system(content: String) -> Self {
        Self {
            role: "system".to_string(),
            content,
        }
    }

    fn user(content: String) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

/// Chat completions API request.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

/// Chat completions API response.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Analysis client shared by all requests.
pub struct LlmClient {
    config: LlmConfig,
    api_key: Option<String>,
    http_client: reqwest::Client,
    limiter: Arc<Mutex<RateLimiter>>,
    max_document_chars: usize,
}

impl LlmClient {
    /// Create a client with a per-minute limiter on the wall clock.
    pub fn new(config: LlmConfig, max_document_chars: usize) -> Result<Self> {
        let limiter = RateLimiter::per_minute(config.requests_per_minute, config.tokens_per_minute);
        Self::with_limiter(config, max_document_chars, limiter)
    }

    pub fn with_limiter(config: LlmConfig, max_document_chars: usize, limiter: RateLimiter) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .build()
            .context("Failed to create LLM HTTP client")?;

        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from);

        info!(
            "LLM client ready: model {} at {} ({})",
            config.model,
            config.api_url,
            if api_key.is_some() {
                "authenticated"
            } else {
                "no API key, analyses will use fallback text"
            }
        );

        Ok(Self {
            config,
            api_key,
            http_client,
            limiter: Arc::new(Mutex::new(limiter)),
            max_document_chars,
        })
    }

    /// Reserve `tokens` estimated tokens in the current window.
    ///
    /// An exhausted budget fails the call instead of queueing it.
    fn reserve_capacity(&self, tokens: u32) -> Result<(), LlmError> {
        let mut limiter = self.limiter.lock().unwrap_or_else(|e| e.into_inner());
        match limiter.try_acquire(tokens) {
            Ok(()) => {
                debug!("LLM usage this window: {:?}", limiter.usage());
                Ok(())
            }
            Err(retry_after) => {
                warn!(
                    "LLM budget exhausted ({:?}), {} tokens refused",
                    limiter.usage(),
                    tokens
                );
                Err(LlmError::RateLimited { retry_after })
            }
        }
    }

    /// Send one system + user prompt pair and return the reply text.
    async fn complete(&self, system: String, user: String) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        let tokens = estimate_tokens(&system)
            .saturating_add(estimate_tokens(&user))
            .saturating_add(self.config.max_tokens);
        self.reserve_capacity(tokens)?;

        let url = format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'));
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| sanitize_html(&clean_output(&c.message.content)))
            .unwrap_or_default();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(content)
    }
}

#[async_trait]
impl InsightProvider for LlmClient {
    async fn analyze(&self, kind: AnalysisKind, context: &AnalysisContext) -> Result<String, LlmError> {
        debug!("Requesting {} analysis for {}", kind, context.repository.full_name);
        let system = system_prompt(kind);
        let user = user_prompt(kind, context, self.max_document_chars);
        self.complete(system, user).await
    }

    fn is_authenticated(&self) -> bool {
        self.api_key.is_some()
    }
}
