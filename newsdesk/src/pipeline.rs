//! Request shaping for the news endpoints: fetch, filter, and thread the first
//! few articles through the summarizer and categorizer.

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::info;

use common::Config;

use crate::llm::categorizer::{categorize_article, split_categories};
use crate::llm::summarizer::summarize_article;
use crate::llm::LlmProvider;
use crate::news::{clean_articles, Article, FetchError, NewsProvider, UpstreamArticle};

/// Limits applied to the model-backed endpoints
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub max_articles: usize,
    pub summary_max_tokens: usize,
    pub category_max_tokens: usize,
}

impl From<&Config> for PipelineOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            max_articles: cfg.pipeline.max_articles,
            summary_max_tokens: cfg.llm.summary_max_tokens,
            category_max_tokens: cfg.llm.category_max_tokens,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct HeadlinesPayload {
    pub total: usize,
    pub articles: Vec<Article>,
}

#[derive(Debug, serde::Serialize)]
pub struct TopicPayload {
    pub topic: String,
    pub total: usize,
    pub articles: Vec<Article>,
}

/// Article paired with its model summary. Title and url are passed through
/// from the provider unfiltered, so either may be null.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SummarizedArticle {
    pub title: Option<String>,
    pub summary: String,
    pub url: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct SummaryPayload {
    pub topic: String,
    pub summaries: Vec<SummarizedArticle>,
}

/// Articles grouped by category label, serialized as a JSON object whose
/// keys keep first-insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CategoryGroups(Vec<(String, Vec<SummarizedArticle>)>);

impl CategoryGroups {
    pub fn push(&mut self, label: &str, article: SummarizedArticle) {
        match self.0.iter_mut().find(|(l, _)| l == label) {
            Some((_, articles)) => articles.push(article),
            None => self.0.push((label.to_string(), vec![article])),
        }
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    fn get(&self, label: &str) -> Option<&[SummarizedArticle]> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, articles)| articles.as_slice())
    }

    #[cfg(test)]
    fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(l, _)| l.as_str())
    }
}

impl Serialize for CategoryGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, articles) in &self.0 {
            map.serialize_entry(label, articles)?;
        }
        map.end()
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CategorizedPayload {
    pub topic: String,
    pub categorized_articles: CategoryGroups,
}

/// `/news`: top headlines for a country, filtered to complete articles.
pub async fn headlines(
    news: &dyn NewsProvider,
    country: &str,
) -> Result<HeadlinesPayload, FetchError> {
    let raw = news.top_headlines(country).await?;
    let articles = clean_articles(&raw);
    info!("Fetched {} articles for country: {}", articles.len(), country);

    Ok(HeadlinesPayload {
        total: articles.len(),
        articles,
    })
}

/// `/news/topic`: search results for a query, filtered to complete articles.
pub async fn topic_articles(
    news: &dyn NewsProvider,
    query: &str,
) -> Result<TopicPayload, FetchError> {
    let raw = news.search(query).await?;
    let articles = clean_articles(&raw);
    info!("Fetched {} articles for topic: {}", articles.len(), query);

    Ok(TopicPayload {
        topic: query.to_string(),
        total: articles.len(),
        articles,
    })
}

/// `/news/summary`: summarize the first few search results, in provider order.
pub async fn summarize_topic(
    news: &dyn NewsProvider,
    llm: &dyn LlmProvider,
    query: &str,
    opts: PipelineOptions,
) -> Result<SummaryPayload, FetchError> {
    let raw = news.search(query).await?;

    let mut summaries = Vec::with_capacity(opts.max_articles.min(raw.len()));
    for article in raw.iter().take(opts.max_articles) {
        summaries.push(summarize_one(llm, article, opts).await);
    }
    info!("Summarized {} articles for topic: {}", summaries.len(), query);

    Ok(SummaryPayload {
        topic: query.to_string(),
        summaries,
    })
}

/// `/news/categorized`: summarize then categorize the first few search
/// results, filing each under every label the model returned.
pub async fn categorize_topic(
    news: &dyn NewsProvider,
    llm: &dyn LlmProvider,
    query: &str,
    opts: PipelineOptions,
) -> Result<CategorizedPayload, FetchError> {
    let raw = news.search(query).await?;

    let mut groups = CategoryGroups::default();
    for article in raw.iter().take(opts.max_articles) {
        let summarized = summarize_one(llm, article, opts).await;
        let title = summarized.title.as_deref().unwrap_or("");
        let raw_labels =
            categorize_article(llm, title, &summarized.summary, opts.category_max_tokens).await;

        for label in split_categories(&raw_labels) {
            groups.push(&label, summarized.clone());
        }
    }
    info!("Categorized articles for topic {} into {} groups", query, groups.len());

    Ok(CategorizedPayload {
        topic: query.to_string(),
        categorized_articles: groups,
    })
}

async fn summarize_one(
    llm: &dyn LlmProvider,
    article: &UpstreamArticle,
    opts: PipelineOptions,
) -> SummarizedArticle {
    let title = article.title.as_deref().unwrap_or("");
    let summary = summarize_article(llm, title, article.body(), opts.summary_max_tokens).await;

    SummarizedArticle {
        title: article.title.clone(),
        summary,
        url: article.url.clone(),
    }
}
