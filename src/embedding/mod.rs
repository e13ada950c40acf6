//! Embedding generation for semantic search and retrieval.

mod batch;
mod openai;

pub use batch::{embed_in_batches, embed_query, BatchOptions};
pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
///
/// `embed_batch` must return exactly one vector per input text, in input order.
/// Failures carry a [`ProviderErrorKind`](crate::error::ProviderErrorKind) so
/// callers can tell retryable errors from fatal ones.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}
