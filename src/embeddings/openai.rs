//! OpenAI-compatible embedding backend.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbeddingError, EmbeddingProvider};
use crate::config::LlmConfig;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Embedding provider speaking the OpenAI `/v1/embeddings` protocol.
///
/// Works against api.openai.com and any compatible endpoint (Azure gateways,
/// local inference servers) via [`with_base_url`](Self::with_base_url).
pub struct OpenAiEmbeddingProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    dimension: Option<usize>,
}

impl OpenAiEmbeddingProvider {
    /// Build a provider from a validated [`LlmConfig`].
    ///
    /// The config's timeout becomes the HTTP client timeout.
    pub fn new(config: &LlmConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.timeout())
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key: config.api_key().to_string(),
            model: config.model().to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            dimension: None,
        }
    }

    /// Point the provider at a different OpenAI-compatible endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Enforce an expected vector length on every response.
    ///
    /// Responses with a different dimension fail with
    /// [`EmbeddingError::DimensionMismatch`].
    #[must_use]
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedItem>,
}

#[derive(Deserialize)]
struct EmbedItem {
    embedding: Vec<f32>,
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        debug!(model = %self.model, chars = text.chars().count(), "requesting embedding");

        let request = EmbedRequest {
            model: &self.model,
            input: [text],
        };

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api { status, body });
        }

        let mut parsed: EmbedResponse = response.json().await?;
        let Some(item) = parsed.data.pop() else {
            return Err(EmbeddingError::EmptyResponse);
        };

        if let Some(expected) = self.dimension
            && item.embedding.len() != expected
        {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: item.embedding.len(),
            });
        }

        Ok(item.embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
