/*!
common/src/lib.rs

Shared configuration types for newsdesk.

This file provides:
- Config data structures (deserialized from TOML, every field defaulted)
- An async loader that merges a default file with an optional override file
- Validation and API key resolution helpers used at process startup
*/

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP listener configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// News search provider (NewsAPI compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Base URL; `top-headlines` and `everything` are resolved against it
    pub api_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_seconds: u64,
    pub default_country: String,
    pub default_topic: String,
    /// Language pinned on topic searches
    pub language: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://newsapi.org/v2/".to_string(),
            api_key_env: "NEWS_API_KEY".to_string(),
            timeout_seconds: 10,
            default_country: "us".to_string(),
            default_topic: "technology".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Chat completion provider (OpenAI compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key_env: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub summary_max_tokens: usize,
    pub category_max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 30,
            summary_max_tokens: 100,
            category_max_tokens: 50,
        }
    }
}

/// Summarize / categorize pipeline limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on articles sent through the model per request
    pub max_articles: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { max_articles: 3 }
    }
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub news: NewsConfig,
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence). Missing
    /// files are skipped, so with neither present the built-in defaults are returned.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    /// Reject values that would only fail later, at request time.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.news.api_url)
            .with_context(|| format!("news.api_url is not a valid URL: {}", self.news.api_url))?;
        url::Url::parse(&self.llm.api_url)
            .with_context(|| format!("llm.api_url is not a valid URL: {}", self.llm.api_url))?;

        if self.news.timeout_seconds == 0 {
            bail!("news.timeout_seconds must be greater than zero");
        }
        if self.llm.timeout_seconds == 0 {
            bail!("llm.timeout_seconds must be greater than zero");
        }
        if self.pipeline.max_articles == 0 {
            bail!("pipeline.max_articles must be greater than zero");
        }
        Ok(())
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Read a secret from the named environment variable.
///
/// Empty values are treated as missing.
pub fn resolve_api_key(env_name: &str) -> Result<String> {
    let value = std::env::var(env_name)
        .with_context(|| format!("API key env var '{}' not set", env_name))?;
    if value.trim().is_empty() {
        bail!("API key env var '{}' is empty", env_name);
    }
    Ok(value)
}
