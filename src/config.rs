//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.repoguide.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".repoguide.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// GitHub API settings.
    #[serde(default)]
    pub github: GitHubConfig,

    /// LLM API settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the browser UI.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

/// GitHub API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL.
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// User-Agent header (GitHub rejects requests without one).
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Personal access token. Without one, GitHub allows 60 requests/hour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            user_agent: default_user_agent(),
            token: None,
        }
    }
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    format!("repoguide/{}", env!("CARGO_PKG_VERSION"))
}

/// LLM API settings (any OpenAI-compatible chat completions endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API base URL; `/chat/completions` is appended.
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,

    /// API key. Without one, every analysis falls back to its default text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in each response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Requests allowed per rolling minute.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Estimated tokens (prompt + completion) allowed per rolling minute.
    #[serde(default = "default_tokens_per_minute")]
    pub tokens_per_minute: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_llm_api_url(),
            model: default_model(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            requests_per_minute: default_requests_per_minute(),
            tokens_per_minute: default_tokens_per_minute(),
        }
    }
}

fn default_llm_api_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_requests_per_minute() -> u32 {
    30
}

fn default_tokens_per_minute() -> u32 {
    30_000
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum beginner-friendly issues fetched per repository (1 to 20).
    #[serde(default = "default_max_issues")]
    pub max_issues: usize,

    /// Characters of each document (README, CONTRIBUTING, ...) sent to the LLM.
    #[serde(default = "default_max_document_chars")]
    pub max_document_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_issues: default_max_issues(),
            max_document_chars: default_max_document_chars(),
        }
    }
}

fn default_max_issues() -> usize {
    20
}

fn default_max_document_chars() -> usize {
    4000
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.repoguide.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref static_dir) = args.static_dir {
            self.server.static_dir = static_dir.clone();
        }

        if let Some(ref token) = args.github_token {
            self.github.token = Some(token.clone());
        }
        if let Some(ref api_key) = args.llm_api_key {
            self.llm.api_key = Some(api_key.clone());
        }
        if let Some(ref model) = args.model {
            self.llm.model = model.clone();
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
