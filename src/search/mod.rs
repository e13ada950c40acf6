//! Hybrid lexical + semantic search over a chunked corpus.
//!
//! Both indexes are built once per [`Corpus`] and are read-only afterwards.
//! Scores from the two are min-max normalized and fused linearly.

pub mod hybrid;
mod lexical;
mod semantic;

pub use hybrid::{min_max_normalize, rank};
pub use lexical::LexicalIndex;
pub use semantic::{cosine_similarity, SemanticIndex};

use crate::chunking::Chunk;
use crate::corpus::Corpus;
use crate::embedding::{embed_query, BatchOptions, Embedder};
use crate::error::{KnowhowError, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A chunk with a relevance score (higher is better).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredChunk<'a> {
    /// The matched chunk, borrowed from the corpus.
    pub chunk: &'a Chunk,
    /// Fused score in `[0, 1]`.
    pub score: f32,
}

/// Lexical and semantic indexes over one corpus.
pub struct HybridIndex {
    corpus: Corpus,
    lexical: LexicalIndex,
    semantic: SemanticIndex,
    embedder: Arc<dyn Embedder>,
    options: BatchOptions,
}

impl HybridIndex {
    /// Build both indexes. Embedding the corpus is the slow part.
    #[instrument(skip_all, fields(chunks = corpus.len()))]
    pub async fn build(
        corpus: Corpus,
        embedder: Arc<dyn Embedder>,
        options: &BatchOptions,
    ) -> Result<Self> {
        let lexical = LexicalIndex::build(corpus.chunks());
        let semantic = SemanticIndex::build(corpus.chunks(), embedder.as_ref(), options).await?;

        info!("Hybrid index ready ({} chunks)", corpus.len());
        Ok(Self {
            corpus,
            lexical,
            semantic,
            embedder,
            options: *options,
        })
    }

    /// The indexed corpus.
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Rank chunks for a query.
    ///
    /// An empty corpus yields no results without calling the embedder.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, top_k: usize, alpha: f32) -> Result<Vec<ScoredChunk<'_>>> {
        if self.corpus.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = embed_query(self.embedder.as_ref(), query, &self.options).await?;
        let results = self.search_with_vector(query, &query_vector, top_k, alpha)?;
        debug!("Query matched {} chunks", results.len());
        Ok(results)
    }

    /// Rank chunks using a precomputed query embedding.
    ///
    /// The vector must have the same width as the indexed chunk vectors.
    pub fn search_with_vector(
        &self,
        query: &str,
        query_vector: &[f32],
        top_k: usize,
        alpha: f32,
    ) -> Result<Vec<ScoredChunk<'_>>> {
        if query_vector.len() != self.semantic.dimensions() {
            return Err(KnowhowError::fatal(format!(
                "query vector has {} dimensions, index has {}",
                query_vector.len(),
                self.semantic.dimensions()
            )));
        }

        let lexical = self.lexical.score(query);
        let dense = self.semantic.score(query_vector);
        Ok(rank(self.corpus.chunks(), &lexical, &dense, alpha, top_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::ChunkingConfig;
    use crate::embedding::mock::{ScriptedEmbedder, Step, VocabEmbedder};
    use crate::tokenizer::WhitespaceTokenizer;
    use crate::transcript::Transcript;
    use std::sync::atomic::Ordering;

    fn corpus() -> Corpus {
        let transcripts = vec![
            Transcript::from_text(
                "pair-1",
                "the printer bed is uneven\nwe leveled the bed twice\nthen the print stuck",
            ),
            Transcript::from_text(
                "pair-2",
                "the laser needs focus\nfocus the laser on acrylic\ncut slowly",
            ),
        ];
        let config = ChunkingConfig {
            chunk_tokens: 8,
            overlap_tokens: 2,
            min_tokens: 0,
        };
        Corpus::build(transcripts, config, &WhitespaceTokenizer).unwrap()
    }

    #[tokio::test]
    async fn test_search_prefers_matching_transcript() {
        let embedder = Arc::new(VocabEmbedder::new(&["printer", "bed", "laser", "focus"]));
        let index = HybridIndex::build(corpus(), embedder, &BatchOptions::default())
            .await
            .unwrap();

        let results = index.search("laser focus", 3, 0.6).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].chunk.document_id, "pair-2");
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.score)));
    }

    #[tokio::test]
    async fn test_empty_corpus_returns_nothing() {
        let embedder = Arc::new(VocabEmbedder::new(&["x"]));
        let empty = Corpus::build(Vec::new(), ChunkingConfig::default(), &WhitespaceTokenizer).unwrap();
        let index = HybridIndex::build(empty, embedder.clone(), &BatchOptions::default())
            .await
            .unwrap();

        let results = index.search("anything", 5, 0.5).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_of_wrong_width_is_an_error() {
        let embedder = Arc::new(ScriptedEmbedder::new().on("laser", vec![Step::Wide]));
        let index = HybridIndex::build(corpus(), embedder, &BatchOptions::default())
            .await
            .unwrap();

        let err = index.search("laser", 3, 0.6).await.unwrap_err();
        assert!(matches!(err, KnowhowError::EmbeddingQuery { attempts: 1, .. }));

        let err = index.search_with_vector("laser", &[1.0, 0.0, 0.0], 3, 0.6).unwrap_err();
        assert!(err.to_string().contains("3 dimensions, index has 2"));
    }

    #[tokio::test]
    async fn test_query_embedding_retries_transient_failures() {
        let embedder = Arc::new(ScriptedEmbedder::new().on("laser", vec![Step::Transient, Step::Ok]));
        let options = BatchOptions {
            base_backoff: std::time::Duration::from_millis(1),
            ..BatchOptions::default()
        };
        let index = HybridIndex::build(corpus(), embedder.clone(), &options)
            .await
            .unwrap();

        let results = index.search("laser", 2, 0.6).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(embedder.attempts_for("laser"), 2);
    }
}
