// Summarizer module
use tracing::{debug, warn};

use super::{LlmProvider, LlmRequest};

/// Returned without calling the model when the article has no body text
pub const EMPTY_CONTENT_SUMMARY: &str = "No content to summarize.";
/// Returned when the model call fails for any reason
pub const UNAVAILABLE_SUMMARY: &str = "Summary unavailable.";

const SYSTEM_PROMPT: &str =
    "You are a helpful assistant that summarizes news articles clearly and concisely.";

/// Summarize one article in a few sentences. Never fails: model errors
/// degrade to [`UNAVAILABLE_SUMMARY`].
pub async fn summarize_article<P: LlmProvider + ?Sized>(
    provider: &P,
    title: &str,
    body: &str,
    max_tokens: usize,
) -> String {
    if body.is_empty() {
        return EMPTY_CONTENT_SUMMARY.to_string();
    }

    let request = LlmRequest {
        system: Some(SYSTEM_PROMPT.to_string()),
        prompt: summary_prompt(title, body),
        max_tokens: Some(max_tokens),
        ..Default::default()
    };

    match provider.generate(request).await {
        Ok(response) => {
            debug!(
                "LLM summarization successful: {} tokens",
                response.usage.total_tokens
            );
            response.content.trim().to_string()
        }
        Err(e) => {
            warn!("Error summarizing article '{}': {:#}", title, e);
            UNAVAILABLE_SUMMARY.to_string()
        }
    }
}

fn summary_prompt(title: &str, body: &str) -> String {
    format!(
        "Summarize this news article in 2-3 concise sentences:\n\nTitle: {}\n{}",
        title, body
    )
}
