/*
newsdesk - main.rs
Loads configuration and API keys, builds the news and LLM clients, then serves the HTTP API.
*/

use anyhow::{Context, Result};
use clap::Parser;
use common::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use newsdesk::llm::remote::RemoteLlmProvider;
use newsdesk::news::remote::NewsApiClient;
use newsdesk::server::{launch_rocket, AppState};

#[derive(Parser, Debug)]
#[command(name = "newsdesk", about = "News headlines, summaries and categories over HTTP")]
struct Args {
    /// Path to config.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    // A missing .env is fine; keys may come from the real environment
    if let Err(e) = dotenv::dotenv() {
        info!("no .env file loaded: {}", e);
    }

    let default_path = PathBuf::from("config.default.toml");
    let override_path = match args.config {
        Some(p) => {
            if !p.exists() {
                error!(path = ?p, "specified config file not found");
                return Err(anyhow::anyhow!("Config file not found: {}", p.display()));
            }
            Some(p)
        }
        None => Some(PathBuf::from("config.toml")).filter(|p| p.exists()),
    };

    let config = Config::load_with_defaults(Some(default_path.as_path()), override_path.as_deref())
        .await
        .map_err(|e| {
            error!(%e, "failed to load configuration");
            e
        })?;
    config.validate().context("invalid configuration")?;
    info!(default = ?default_path, override_path = ?override_path, "configuration loaded");

    let state = build_state(config)?;
    let server_cfg = state.config.server.clone();

    launch_rocket(state, &server_cfg).await?;

    info!("Shutdown complete");
    Ok(())
}

/// Resolve API keys and construct the upstream clients shared by all handlers.
fn build_state(config: Config) -> Result<AppState> {
    let news_key = common::resolve_api_key(&config.news.api_key_env)?;
    let llm_key = common::resolve_api_key(&config.llm.api_key_env)?;

    let news = NewsApiClient::new(&config.news.api_url, news_key, config.news.timeout_seconds)?
        .with_language(config.news.language.clone());
    info!("News provider initialized at {}", config.news.api_url);

    let llm = RemoteLlmProvider::new(&config.llm.api_url, llm_key, &config.llm.model)
        .with_timeout(config.llm.timeout_seconds);
    info!("LLM provider initialized: remote ({}) at {}", llm.model(), config.llm.api_url);

    Ok(AppState {
        config: Arc::new(config),
        news: Arc::new(news),
        llm: Arc::new(llm),
    })
}
