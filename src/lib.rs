//! # Ragentic: chunked embeddings and bounded agent conversations
//!
//! Ragentic provides the two pieces of plumbing every retrieval-augmented
//! chat application ends up writing by hand: a deterministic fixed-window
//! chunker feeding an embedding provider, and an explicit conversation loop
//! with typed state, observers, and termination rules.
//!
//! ```text
//! Document ──► chunking::chunk ──► ChunkIter
//!                                     │
//!                                     ▼
//! EmbeddingProvider ◄── pipeline::embed_all ──► Vec<EmbeddedChunk>
//!        │                                            │
//!        └─ embeddings::openai / MockEmbeddingProvider└─► external vector store
//!
//! Opening message ──► conversation::ConversationDriver ──► ConversationState
//!                          │                                   │
//!                          ├─► ChatAgent capabilities          └─► transcript
//!                          └─► ConversationObserver callbacks
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use ragentic::embeddings::MockEmbeddingProvider;
//! use ragentic::pipeline::{EmbedOptions, embed_document};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let provider = MockEmbeddingProvider::new();
//! let embedded = embed_document("ABCDEFGHIJ", 3, &provider, &EmbedOptions::default())
//!     .await
//!     .unwrap();
//!
//! assert_eq!(embedded.len(), 4);
//! assert_eq!(embedded[0].chunk.text, "ABC");
//! assert_eq!(embedded[3].chunk.text, "J");
//! # });
//! ```

pub mod chunking;
pub mod config;
pub mod conversation;
pub mod embeddings;
pub mod pipeline;
pub mod types;

pub use chunking::{Chunk, chunk, chunk_count};
pub use embeddings::EmbeddingProvider;
pub use pipeline::{EmbedOptions, EmbeddedChunk, embed_all, embed_document};
pub use types::RagenticError;
