//! HTTP-level tests for the OpenAI-compatible embedding provider.

use httpmock::prelude::*;
use serde_json::json;

use ragentic::config::LlmConfig;
use ragentic::embeddings::{EmbeddingError, EmbeddingProvider, OpenAiEmbeddingProvider};

fn test_config() -> LlmConfig {
    LlmConfig::builder()
        .model("text-embedding-3-small")
        .api_key("sk-test")
        .build()
        .unwrap()
}

#[tokio::test]
async fn sends_bearer_auth_and_parses_vector() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/embeddings")
                .header("authorization", "Bearer sk-test")
                .json_body_partial(r#"{"model": "text-embedding-3-small"}"#);
            then.status(200).json_body(json!({
                "data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}]
            }));
        })
        .await;

    let provider = OpenAiEmbeddingProvider::new(&test_config()).with_base_url(server.base_url());
    let vector = provider.embed("hello world").await.unwrap();

    mock.assert_async().await;
    assert_eq!(vector, vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn non_success_status_becomes_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(429).body("rate limited");
        })
        .await;

    let provider = OpenAiEmbeddingProvider::new(&test_config()).with_base_url(server.base_url());
    let err = provider.embed("hello").await.unwrap_err();

    match err {
        EmbeddingError::Api { status, body } => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn unexpected_dimension_is_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(200).json_body(json!({
                "data": [{"embedding": [0.5, 0.5], "index": 0}]
            }));
        })
        .await;

    let provider = OpenAiEmbeddingProvider::new(&test_config())
        .with_base_url(server.base_url())
        .with_dimension(1536);
    let err = provider.embed("hello").await.unwrap_err();

    assert!(matches!(
        err,
        EmbeddingError::DimensionMismatch {
            expected: 1536,
            actual: 2
        }
    ));
}

#[tokio::test]
async fn empty_data_array_is_rejected() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(200).json_body(json!({ "data": [] }));
        })
        .await;

    let provider = OpenAiEmbeddingProvider::new(&test_config()).with_base_url(server.base_url());
    let err = provider.embed("hello").await.unwrap_err();

    assert!(matches!(err, EmbeddingError::EmptyResponse));
}
