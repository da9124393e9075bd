use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod remote;

/// Search provider for news articles (NewsAPI shaped)
#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    /// Top headlines for a country code. The code is forwarded unvalidated.
    async fn top_headlines(&self, country: &str) -> Result<Vec<UpstreamArticle>, FetchError>;

    /// Free-text search across all indexed articles
    async fn search(&self, query: &str) -> Result<Vec<UpstreamArticle>, FetchError>;
}

/// Why a news fetch produced no article list.
///
/// The HTTP layer renders every variant as a 200 response carrying
/// `{"error", "status"}`, so [`FetchError::status_code`] is part of the contract.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("news provider returned HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    #[error("news request timed out after {0:?}")]
    Timeout(Duration),

    #[error("news request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("news response could not be decoded: {0}")]
    Decode(String),
}

impl FetchError {
    /// Status reported to clients: the provider's own status when it answered,
    /// otherwise 504 for timeouts and 502 for anything else.
    pub fn status_code(&self) -> u16 {
        match self {
            FetchError::Status { status, .. } => *status,
            FetchError::Timeout(_) => 504,
            FetchError::Transport(_) | FetchError::Decode(_) => 502,
        }
    }
}

/// Raw article record as returned by the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamArticle {
    #[serde(default)]
    pub source: Option<UpstreamSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpstreamSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl UpstreamArticle {
    /// Text handed to the summarizer: content, else description, else empty.
    /// Empty strings count as missing.
    pub fn body(&self) -> &str {
        non_empty(&self.content)
            .or_else(|| non_empty(&self.description))
            .unwrap_or("")
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.name.as_deref())
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Simplified article returned by the listing endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    pub title: String,
    pub source: Option<String>,
    pub url: String,
}

/// Keep the items that have both a title and a url, in provider order.
pub fn clean_articles(items: &[UpstreamArticle]) -> Vec<Article> {
    items
        .iter()
        .filter_map(|a| {
            let title = non_empty(&a.title)?;
            let url = non_empty(&a.url)?;
            Some(Article {
                title: title.to_string(),
                source: a.source_name().map(str::to_string),
                url: url.to_string(),
            })
        })
        .collect()
}
