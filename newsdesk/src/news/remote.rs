use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{FetchError, NewsProvider, UpstreamArticle};

/// NewsAPI-compatible HTTP client
pub struct NewsApiClient {
    headlines_url: Url,
    search_url: Url,
    api_key: String,
    language: String,
    timeout: Duration,
    client: Client,
}

impl NewsApiClient {
    pub fn new(api_url: &str, api_key: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let mut base_url = Url::parse(api_url)
            .with_context(|| format!("invalid news API url: {}", api_url))?;
        // `join` replaces the last path segment unless the base ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let headlines_url = base_url
            .join("top-headlines")
            .with_context(|| format!("invalid news API url: {}", api_url))?;
        let search_url = base_url
            .join("everything")
            .with_context(|| format!("invalid news API url: {}", api_url))?;

        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newsdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            headlines_url,
            search_url,
            api_key: api_key.into(),
            language: "en".to_string(),
            timeout,
            client,
        })
    }

    /// Language pinned on `search` requests
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    async fn get_articles(
        &self,
        url: &Url,
        params: &[(&str, &str)],
    ) -> Result<Vec<UpstreamArticle>, FetchError> {
        let endpoint = url.path();
        debug!(endpoint, "requesting news articles");

        let response = self
            .client
            .get(url.clone())
            .query(params)
            .query(&[("apiKey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ProviderError>(&bytes)
                .ok()
                .and_then(|e| e.message);
            warn!(
                endpoint,
                status = status.as_u16(),
                message = message.as_deref().unwrap_or(""),
                "news provider returned an error"
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: NewsApiResponse =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(body.articles)
    }

    fn transport_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(e.without_url())
        }
    }
}

#[async_trait::async_trait]
impl NewsProvider for NewsApiClient {
    async fn top_headlines(&self, country: &str) -> Result<Vec<UpstreamArticle>, FetchError> {
        self.get_articles(&self.headlines_url, &[("country", country)])
            .await
    }

    async fn search(&self, query: &str) -> Result<Vec<UpstreamArticle>, FetchError> {
        self.get_articles(
            &self.search_url,
            &[("q", query), ("language", self.language.as_str())],
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<UpstreamArticle>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: Option<String>,
}
