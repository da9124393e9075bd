use mockito::Matcher;
use newsdesk::llm::remote::RemoteLlmProvider;
use newsdesk::llm::summarizer::{summarize_article, UNAVAILABLE_SUMMARY};
use newsdesk::llm::{LlmProvider, LlmRequest};

const COMPLETION_BODY: &str = r#"{
    "model": "gpt-4o-mini",
    "choices": [{
        "message": {
            "role": "assistant",
            "content": "This is a test response"
        },
        "finish_reason": "stop"
    }],
    "usage": {
        "prompt_tokens": 10,
        "completion_tokens": 5,
        "total_tokens": 15
    }
}"#;

#[tokio::test]
async fn test_remote_provider_with_mock() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .match_header("authorization", "Bearer fake-api-key")
        .match_body(Matcher::PartialJsonString(
            r#"{
                "model": "gpt-4o-mini",
                "max_tokens": 100,
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "Test prompt"}
                ]
            }"#
            .to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(COMPLETION_BODY)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let request = LlmRequest {
        system: Some("Be brief.".to_string()),
        prompt: "Test prompt".to_string(),
        max_tokens: Some(100),
        temperature: None,
        timeout_seconds: Some(10),
    };

    let result = provider.generate(request).await;

    assert!(result.is_ok());
    let response = result.unwrap();
    assert_eq!(response.content, "This is a test response");
    assert_eq!(response.usage.prompt_tokens, 10);
    assert_eq!(response.usage.completion_tokens, 5);
    assert_eq!(response.usage.total_tokens, 15);
    assert_eq!(response.model, "gpt-4o-mini");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_without_usage_block() {
    let mut server = mockito::Server::new_async().await;

    // Requests without max_tokens fall back to the provider default
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJsonString(r#"{"max_tokens": 100}"#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "ok"}}]}"#)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "local-model")
        .with_timeout(5);

    let response = provider
        .generate(LlmRequest {
            prompt: "Test".to_string(),
            ..Default::default()
        })
        .await
        .expect("generate");

    assert_eq!(response.content, "ok");
    assert_eq!(response.usage.total_tokens, 0);
    assert_eq!(response.model, "local-model");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_error_handling() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("POST", "/")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "Rate limit exceeded"}}"#)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let request = LlmRequest {
        prompt: "Test".to_string(),
        ..Default::default()
    };

    let result = provider.generate(request).await;

    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(err.to_string().contains("429"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_remote_provider_empty_choices() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model": "gpt-4o-mini", "choices": []}"#)
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let result = provider
        .generate(LlmRequest {
            prompt: "Test".to_string(),
            ..Default::default()
        })
        .await;

    assert!(result.unwrap_err().to_string().contains("no choices"));
}

#[tokio::test]
async fn test_remote_provider_timeout() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(std::time::Duration::from_secs(3));
            w.write_all(b"too late")
        })
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let request = LlmRequest {
        prompt: "Test".to_string(),
        timeout_seconds: Some(1),
        ..Default::default()
    };

    let result = provider.generate(request).await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("timed out"));
}

#[tokio::test]
async fn test_remote_provider_timeout_on_stalled_error_body() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(500)
        .with_chunked_body(|w| {
            std::thread::sleep(std::time::Duration::from_secs(4));
            w.write_all(b"late")
        })
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let request = LlmRequest {
        prompt: "Test".to_string(),
        timeout_seconds: Some(1),
        ..Default::default()
    };

    let started = std::time::Instant::now();
    let result = provider.generate(request).await;

    assert!(started.elapsed() < std::time::Duration::from_secs(3));
    assert!(result.unwrap_err().to_string().contains("timed out"));
}

#[tokio::test]
async fn test_summarizer_degrades_on_provider_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("POST", "/")
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let provider = RemoteLlmProvider::new(server.url(), "fake-api-key", "gpt-4o-mini");

    let summary = summarize_article(&provider, "Title", "Body text", 100).await;

    assert_eq!(summary, UNAVAILABLE_SUMMARY);
}
