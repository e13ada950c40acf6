//! Context building for RAG prompts.

use super::stitch::{stitch, StitchedBlock};
use crate::error::Result;
use crate::search::HybridIndex;
use crate::tokenizer::TokenCounter;
use std::sync::Arc;
use tracing::debug;

/// Builds stitched context blocks for a query.
pub struct ContextBuilder {
    index: Arc<HybridIndex>,
    tokenizer: Arc<dyn TokenCounter>,
    top_k: usize,
    alpha: f32,
    window: usize,
    max_tokens: usize,
}

impl ContextBuilder {
    /// Create a new context builder.
    pub fn new(index: Arc<HybridIndex>, tokenizer: Arc<dyn TokenCounter>) -> Self {
        Self {
            index,
            tokenizer,
            top_k: 30,
            alpha: 0.6,
            window: 1,
            max_tokens: 1000,
        }
    }

    /// Set how many ranked chunks to stitch from.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the dense-score weight (0 = BM25 only, 1 = embeddings only).
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set how many neighbouring chunks on each side to pull in.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the token budget for each stitched block.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build context for a query.
    pub async fn build(&self, query: &str) -> Result<Vec<StitchedBlock>> {
        let hits = self.index.search(query, self.top_k, self.alpha).await?;
        let blocks = stitch(
            &hits,
            self.index.corpus().chunks(),
            self.window,
            self.max_tokens,
            self.tokenizer.as_ref(),
        );

        debug!("{} hits stitched into {} blocks", hits.len(), blocks.len());
        Ok(blocks)
    }
}

/// Format blocks for a downstream prompt.
pub fn format_blocks_for_prompt(blocks: &[StitchedBlock]) -> String {
    blocks
        .iter()
        .map(|block| {
            format!(
                "[{} lines {}-{}]\n{}",
                block.document_id, block.start_line, block.end_line, block.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// Format blocks for display to the user.
pub fn format_blocks_for_display(blocks: &[StitchedBlock]) -> String {
    blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            format!(
                "[{}] {} (chunks {}-{}, lines {}-{})",
                i + 1,
                block.document_id,
                block.start_chunk,
                block.end_chunk,
                block.start_line,
                block.end_line
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::ChunkingConfig;
    use crate::corpus::Corpus;
    use crate::embedding::mock::VocabEmbedder;
    use crate::embedding::BatchOptions;
    use crate::tokenizer::WhitespaceTokenizer;
    use crate::transcript::Transcript;

    fn block(doc: &str, start_line: usize, end_line: usize, text: &str) -> StitchedBlock {
        StitchedBlock {
            document_id: doc.to_string(),
            start_chunk: 0,
            end_chunk: 1,
            start_line,
            end_line,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_format_for_prompt() {
        let blocks = vec![block("2024-10-02", 0, 5, "A: hi"), block("2024-10-03", 7, 9, "B: ok")];
        let formatted = format_blocks_for_prompt(&blocks);
        assert_eq!(
            formatted,
            "[2024-10-02 lines 0-5]\nA: hi\n---\n[2024-10-03 lines 7-9]\nB: ok"
        );
    }

    #[test]
    fn test_format_for_display() {
        let formatted = format_blocks_for_display(&[block("d", 2, 4, "x")]);
        assert_eq!(formatted, "[1] d (chunks 0-1, lines 2-4)");
    }

    #[tokio::test]
    async fn test_build_stitches_neighbours() {
        let text = (0..10)
            .map(|i| {
                if i == 6 {
                    "the chiller alarm went off".to_string()
                } else {
                    format!("line {} about nothing much", i)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        let transcripts = vec![Transcript::from_text("pair-1", &text)];
        let config = ChunkingConfig {
            chunk_tokens: 5,
            overlap_tokens: 1,
            min_tokens: 0,
        };
        let corpus = Corpus::build(transcripts, config, &WhitespaceTokenizer).unwrap();
        let embedder = Arc::new(VocabEmbedder::new(&["chiller", "alarm", "line"]));
        let index = HybridIndex::build(corpus, embedder, &BatchOptions::default())
            .await
            .unwrap();

        let builder = ContextBuilder::new(Arc::new(index), Arc::new(WhitespaceTokenizer))
            .with_top_k(1)
            .with_window(1)
            .with_max_tokens(100);
        let blocks = builder.build("chiller alarm").await.unwrap();

        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].text.contains("chiller alarm"));
        assert_eq!(blocks[0].end_chunk - blocks[0].start_chunk, 2);
    }
}
