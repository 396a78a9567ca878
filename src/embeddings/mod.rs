//! Embedding provider capability and implementations.
//!
//! An [`EmbeddingProvider`] converts one chunk of text into a dense vector.
//! The trait is the only seam the embedding pipeline depends on; the actual
//! model lives behind it. Two implementations ship with the crate:
//!
//! * [`OpenAiEmbeddingProvider`] — OpenAI-compatible `/v1/embeddings` HTTP
//!   backend.
//! * [`MockEmbeddingProvider`] — deterministic hash-derived vectors for tests
//!   and offline runs.

mod openai;

pub use openai::OpenAiEmbeddingProvider;

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

/// Errors surfaced by embedding providers.
#[derive(Debug, Error, Diagnostic)]
pub enum EmbeddingError {
    /// The embedding endpoint answered with a non-success status.
    #[error("embedding API error ({status}): {body}")]
    #[diagnostic(
        code(ragentic::embeddings::api),
        help("Check the API key, model name, and account quota.")
    )]
    Api { status: u16, body: String },

    /// The HTTP request itself failed (connection, TLS, decode).
    #[error(transparent)]
    #[diagnostic(code(ragentic::embeddings::http))]
    Http(#[from] reqwest::Error),

    /// The provider returned a vector of an unexpected length.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    #[diagnostic(
        code(ragentic::embeddings::dimension_mismatch),
        help("The configured model produces vectors of a different length than expected.")
    )]
    DimensionMismatch { expected: usize, actual: usize },

    /// The provider answered successfully but returned no vectors.
    #[error("embedding response contained no vectors")]
    #[diagnostic(code(ragentic::embeddings::empty_response))]
    EmptyResponse,
}

/// Capability converting a single text into an embedding vector.
///
/// Implementations must be safe to share across tasks; the pipeline may call
/// [`embed`](EmbeddingProvider::embed) concurrently when configured to.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Produce one embedding vector for `text`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// The model identifier backing this provider (e.g. `text-embedding-3-small`).
    fn model_name(&self) -> &str;
}

/// Deterministic in-process provider for tests and offline pipelines.
///
/// Vectors are derived from a hash of the input text: identical texts map to
/// identical vectors, distinct texts map to distinct vectors with overwhelming
/// probability. The provider also counts how often it was invoked, which tests
/// use to verify exactly one call per chunk.
#[derive(Debug)]
pub struct MockEmbeddingProvider {
    dimension: usize,
    calls: AtomicUsize,
}

impl MockEmbeddingProvider {
    pub const DEFAULT_DIMENSION: usize = 8;

    /// Provider producing vectors of [`DEFAULT_DIMENSION`](Self::DEFAULT_DIMENSION) components.
    pub fn new() -> Self {
        Self::with_dimension(Self::DEFAULT_DIMENSION)
    }

    /// Provider producing vectors with the given number of components.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times [`embed`](EmbeddingProvider::embed) was called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let seed = hasher.finish();

        Ok((0..self.dimension)
            .map(|component| {
                let mut hasher = DefaultHasher::new();
                (seed, component).hash(&mut hasher);
                // Map the component hash into [-1.0, 1.0).
                (hasher.finish() % 2000) as f32 / 1000.0 - 1.0
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "mock-embedding"
    }
}
