use tracing::warn;

use super::{LlmProvider, LlmRequest};

/// Label used when the model cannot be reached
pub const UNCATEGORIZED: &str = "Uncategorized";

const SYSTEM_PROMPT: &str = "You categorize short news summaries into clear topics.";

/// Ask the model for 1-2 topic labels. The raw (trimmed) reply is returned
/// as-is, typically "Technology, Business". Model errors yield [`UNCATEGORIZED`].
pub async fn categorize_article<P: LlmProvider + ?Sized>(
    provider: &P,
    title: &str,
    summary: &str,
    max_tokens: usize,
) -> String {
    let prompt = format!(
        "Categorize the following news article into 1–2 topics (like Technology, Health, Politics, Business, etc.):\n\nTitle: {}\nSummary: {}",
        title, summary
    );

    let request = LlmRequest {
        system: Some(SYSTEM_PROMPT.to_string()),
        prompt,
        max_tokens: Some(max_tokens),
        ..Default::default()
    };

    match provider.generate(request).await {
        Ok(response) => response.content.trim().to_string(),
        Err(e) => {
            warn!("Error categorizing article '{}': {:#}", title, e);
            UNCATEGORIZED.to_string()
        }
    }
}

/// Split a categorizer reply into grouping keys.
///
/// Every comma-separated piece is trimmed and kept, empty ones included, so
/// `"Health,"` files the article under both `"Health"` and `""`.
pub fn split_categories(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).collect()
}
