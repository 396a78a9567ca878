//! Crate-wide error aggregation.

use miette::Diagnostic;
use thiserror::Error;

use crate::chunking::ChunkingError;
use crate::config::ConfigError;
use crate::conversation::ConversationError;
use crate::embeddings::EmbeddingError;
use crate::pipeline::PipelineError;

/// Umbrella error for applications composing several ragentic modules.
///
/// Module APIs return their own error types; this enum exists so binaries can
/// bubble everything up with `?` into a single failure type.
#[derive(Debug, Error, Diagnostic)]
pub enum RagenticError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Chunking(#[from] ChunkingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Conversation(#[from] ConversationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_errors_convert_via_from() {
        let err: RagenticError = ChunkingError::InvalidChunkSize { got: 0 }.into();
        assert!(matches!(err, RagenticError::Chunking(_)));

        let err: RagenticError = ConfigError::EmptyModel.into();
        assert!(matches!(err, RagenticError::Config(_)));
    }
}
