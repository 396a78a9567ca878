//! Chunked embedding producer.
//!
//! Turns a document into an ordered list of embedded chunks: partition with
//! [`chunking::chunk`], then ask the [`EmbeddingProvider`] for one vector per
//! chunk. The result set preserves chunk order and is all-or-nothing — a
//! provider failure on any chunk aborts the whole run with that chunk's index.
//!
//! Execution is sequential by default. Raising
//! [`EmbedOptions::concurrency`] embeds chunks through an order-preserving
//! bounded buffer; the output order and failure reporting stay the same.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::chunking::{self, Chunk, ChunkingError};
use crate::embeddings::{EmbeddingError, EmbeddingProvider};

/// A chunk paired with the vector the provider produced for it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// Cooperative cancellation flag shared between the caller and a running embed.
///
/// The pipeline checks the flag between chunk submissions; an already-issued
/// provider call is allowed to finish. Cloning shares the underlying flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Retry behavior for failed provider calls.
///
/// The default is no retry: a failure aborts the run immediately. Retrying is
/// an explicit opt-in and stays bounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Fail on the first provider error.
    #[default]
    None,
    /// Allow up to `attempts` calls per chunk, sleeping `backoff` between them.
    Fixed { attempts: u32, backoff: Duration },
}

/// Execution options for [`embed_all`] and [`embed_document`].
///
/// The defaults reproduce the reference behavior: sequential, no timeout, no
/// retry, never cancelled.
#[derive(Clone, Debug)]
pub struct EmbedOptions {
    /// Number of chunks embedded at once. `1` means strictly sequential.
    pub concurrency: NonZeroUsize,
    /// Per-chunk deadline for the provider call.
    pub timeout: Option<Duration>,
    /// Bounded retry per chunk; off by default.
    pub retry: RetryPolicy,
    /// Caller-supplied cancellation, checked between chunk submissions.
    pub cancellation: CancellationFlag,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            concurrency: NonZeroUsize::MIN,
            timeout: None,
            retry: RetryPolicy::None,
            cancellation: CancellationFlag::new(),
        }
    }
}

impl EmbedOptions {
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: NonZeroUsize) -> Self {
        self.concurrency = concurrency;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }
}

/// Why a single chunk's embedding attempt failed.
#[derive(Debug, Error)]
pub enum ProviderFailure {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors surfaced by the embedding pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Chunking(#[from] ChunkingError),

    /// The provider failed for the chunk at `index`; no partial result set is
    /// returned.
    #[error("embedding provider failed on chunk {index}")]
    #[diagnostic(
        code(ragentic::pipeline::provider),
        help("Inspect the source error; recovery (retry, skip, fallback model) is the caller's call.")
    )]
    Provider {
        index: usize,
        #[source]
        source: ProviderFailure,
    },

    /// The cancellation flag tripped before the chunk at `index` was submitted.
    #[error("embedding run cancelled before chunk {index}")]
    #[diagnostic(code(ragentic::pipeline::cancelled))]
    Cancelled { index: usize },
}

/// Embed every chunk in order, one provider call per chunk.
///
/// Collects one [`EmbeddedChunk`] per input chunk, in input order. Chunks are
/// neither deduplicated, cached, nor batched. On the first failure the run
/// aborts with [`PipelineError::Provider`] carrying the failing chunk's index;
/// in sequential mode no later chunk is submitted. With `concurrency > 1`,
/// later chunks may already be in flight, but the reported index is always the
/// lowest-indexed chunk that failed among the ordered results.
pub async fn embed_all(
    chunks: impl IntoIterator<Item = Chunk>,
    provider: &dyn EmbeddingProvider,
    options: &EmbedOptions,
) -> Result<Vec<EmbeddedChunk>, PipelineError> {
    let concurrency = options.concurrency.get();
    if concurrency == 1 {
        return embed_sequential(chunks, provider, options).await;
    }

    let chunks: Vec<Chunk> = chunks.into_iter().collect();
    debug!(
        chunks = chunks.len(),
        concurrency,
        model = provider.model_name(),
        "embedding chunks concurrently"
    );

    stream::iter(chunks.into_iter().map(|chunk| async move {
        if options.cancellation.is_cancelled() {
            return Err(PipelineError::Cancelled { index: chunk.index });
        }
        let embedding = embed_one(provider, &chunk, options)
            .await
            .map_err(|source| PipelineError::Provider {
                index: chunk.index,
                source,
            })?;
        Ok(EmbeddedChunk { chunk, embedding })
    }))
    .buffered(concurrency)
    .try_collect()
    .await
}

async fn embed_sequential(
    chunks: impl IntoIterator<Item = Chunk>,
    provider: &dyn EmbeddingProvider,
    options: &EmbedOptions,
) -> Result<Vec<EmbeddedChunk>, PipelineError> {
    let chunks = chunks.into_iter();
    let mut embedded = Vec::with_capacity(chunks.size_hint().0);

    for chunk in chunks {
        if options.cancellation.is_cancelled() {
            return Err(PipelineError::Cancelled { index: chunk.index });
        }
        let embedding = embed_one(provider, &chunk, options)
            .await
            .map_err(|source| PipelineError::Provider {
                index: chunk.index,
                source,
            })?;
        embedded.push(EmbeddedChunk { chunk, embedding });
    }

    debug!(
        chunks = embedded.len(),
        model = provider.model_name(),
        "embedded chunks sequentially"
    );
    Ok(embedded)
}

/// One chunk's provider interaction: timeout per attempt, bounded retry across
/// attempts.
async fn embed_one(
    provider: &dyn EmbeddingProvider,
    chunk: &Chunk,
    options: &EmbedOptions,
) -> Result<Vec<f32>, ProviderFailure> {
    let (attempts, backoff) = match options.retry {
        RetryPolicy::None => (1, Duration::ZERO),
        RetryPolicy::Fixed { attempts, backoff } => (attempts.max(1), backoff),
    };

    let mut attempt = 0;
    loop {
        let result = match options.timeout {
            Some(limit) => match tokio::time::timeout(limit, provider.embed(&chunk.text)).await {
                Ok(inner) => inner.map_err(ProviderFailure::from),
                Err(_) => Err(ProviderFailure::Timeout(limit)),
            },
            None => provider
                .embed(&chunk.text)
                .await
                .map_err(ProviderFailure::from),
        };

        match result {
            Ok(embedding) => return Ok(embedding),
            Err(failure) => {
                attempt += 1;
                if attempt >= attempts {
                    return Err(failure);
                }
                warn!(
                    index = chunk.index,
                    attempt,
                    error = %failure,
                    "embedding attempt failed, retrying"
                );
                if !backoff.is_zero() {
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// Chunk `document` into `chunk_size`-character windows and embed each one.
///
/// This is the composite entry point: `embed_all(chunk(document, chunk_size))`.
/// An empty document returns an empty result set without touching the
/// provider.
///
/// # Errors
///
/// [`ChunkingError::InvalidChunkSize`] (wrapped) for a zero window size —
/// raised before any provider call — and [`PipelineError::Provider`] /
/// [`PipelineError::Cancelled`] from the embedding phase.
pub async fn embed_document(
    document: &str,
    chunk_size: usize,
    provider: &dyn EmbeddingProvider,
    options: &EmbedOptions,
) -> Result<Vec<EmbeddedChunk>, PipelineError> {
    let chunks = chunking::chunk(document, chunk_size)?;
    embed_all(chunks, provider, options).await
}
