//! RepoGuide - AI-powered contributor guide for GitHub repositories
//!
//! A small web service: the browser UI posts a GitHub repository URL, the
//! server gathers metadata, beginner-friendly issues and contributor docs
//! from the GitHub API, and an LLM turns them into four short guides
//! (where to start, what needs improving, contribution rules, overview).
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Startup error (bad arguments, config, bind failure)

mod analysis;
mod cli;
mod config;
mod error;
mod github;
mod llm;
mod models;
mod repo;
mod server;

use analysis::Orchestrator;
use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use github::GitHubClient;
use llm::LlmClient;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("RepoGuide v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: config={:?} host={:?} port={:?}", args.config, args.host, args.port);

    if let Err(e) = run_server(args).await {
        error!("Server failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Handle --init-config: generate a default .repoguide.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE_NAME);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Add your GitHub token and LLM API key, or pass them via GITHUB_TOKEN / LLM_API_KEY.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration, build the collaborators and serve until shutdown.
async fn run_server(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let github = GitHubClient::new(&config.github, config.analysis.max_issues)?;
    let llm = LlmClient::new(config.llm.clone(), config.analysis.max_document_chars)?;

    let orchestrator = Orchestrator::new(Arc::new(github), Arc::new(llm));
    let state = server::AppState { orchestrator };

    server::serve(&config.server, state).await
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
