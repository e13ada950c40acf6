//! Dense vector scoring over chunk embeddings.

use crate::chunking::Chunk;
use crate::embedding::{embed_in_batches, BatchOptions, Embedder};
use crate::error::{KnowhowError, Result};
use tracing::{info, instrument};

/// Chunk embeddings, positionally aligned with the corpus.
#[derive(Debug, Clone, Default)]
pub struct SemanticIndex {
    vectors: Vec<Vec<f32>>,
    dimensions: usize,
}

impl SemanticIndex {
    /// Embed every chunk text.
    ///
    /// Fails if any batch fails, or if the provider returns the wrong number of
    /// vectors or vectors of the wrong width; a partially embedded corpus is
    /// never indexed.
    #[instrument(skip_all, fields(chunks = chunks.len()))]
    pub async fn build(
        chunks: &[Chunk],
        embedder: &dyn Embedder,
        options: &BatchOptions,
    ) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = embed_in_batches(embedder, &texts, options).await?;
        let dimensions = embedder.dimensions();

        if vectors.len() != chunks.len() {
            return Err(KnowhowError::fatal(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                vectors.len()
            )));
        }
        if let Some(pos) = vectors.iter().position(|v| v.len() != dimensions) {
            return Err(KnowhowError::fatal(format!(
                "embedding for chunk {} has {} dimensions, expected {}",
                pos,
                vectors[pos].len(),
                dimensions
            )));
        }

        info!("Embedded {} chunks ({} dims)", vectors.len(), dimensions);
        Ok(Self { vectors, dimensions })
    }

    /// Width of every indexed vector.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// True when no chunks are indexed.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Cosine similarity of the query against every chunk, in corpus order.
    pub fn score(&self, query_vector: &[f32]) -> Vec<f32> {
        self.vectors
            .iter()
            .map(|v| cosine_similarity(query_vector, v))
            .collect()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Mismatched lengths, empty vectors and zero norms all yield 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot_product / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}
