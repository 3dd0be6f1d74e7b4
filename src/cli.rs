//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// RepoGuide - LLM-powered contributor guide for GitHub repos
///
/// Serves a small web app: paste a GitHub repository URL and get a
/// newcomer's guide (where to start, what needs improving, contribution
/// rules, project overview) generated from its README, docs and issues.
///
/// Examples:
///   repoguide
///   repoguide --port 8080 --github-token ghp_xxx
///   LLM_API_KEY=gsk_xxx repoguide --model llama-3.1-8b-instant
///   repoguide --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .repoguide.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Interface to bind (default: 127.0.0.1)
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to listen on (default: 3000)
    #[arg(short, long, value_name = "PORT", env = "PORT")]
    pub port: Option<u16>,

    /// Directory with the browser UI (default: public)
    #[arg(long, value_name = "DIR")]
    pub static_dir: Option<String>,

    /// GitHub personal access token
    ///
    /// Raises the GitHub rate limit from 60 to 5000 requests per hour.
    #[arg(long, value_name = "TOKEN", env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// API key for the LLM endpoint
    ///
    /// Without a key the analyses fall back to generic guidance.
    #[arg(long, value_name = "KEY", env = "LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// LLM model to use for analysis
    #[arg(short, long, value_name = "MODEL", env = "REPOGUIDE_MODEL")]
    pub model: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .repoguide.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.port == Some(0) {
            return Err("Port must be between 1 and 65535".to_string());
        }

        if let Some(ref host) = self.host {
            if host.trim().is_empty() {
                return Err("Host must not be empty".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref config_path) = self.config {
            if !config_path.is_file() {
                return Err(format!(
                    "Config file does not exist: {}",
                    config_path.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
