//! Content chunking for breaking transcripts into searchable windows.
//!
//! Chunks are token-bounded runs of consecutive lines. Neighbouring chunks of
//! the same transcript overlap by roughly `overlap_tokens` so that context is
//! not lost at a split.

mod token;

pub use token::make_chunks;

use crate::error::{KnowhowError, Result};
use crate::tokenizer::TokenCounter;
use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};

/// A chunk of consecutive transcript lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Transcript this chunk was cut from.
    pub document_id: String,
    /// Dense, zero-based position within the transcript.
    pub chunk_index: usize,
    /// The chunk's lines joined with `\n`.
    pub text: String,
    /// First line (inclusive).
    pub start_line: usize,
    /// Last line (inclusive).
    pub end_line: usize,
}

impl Chunk {
    /// Number of transcript lines covered.
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// Whether `line` falls inside this chunk's line range.
    pub fn contains_line(&self, line: usize) -> bool {
        (self.start_line..=self.end_line).contains(&line)
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Close a chunk once its text reaches this many tokens.
    pub chunk_tokens: usize,
    /// Carry at least this many tokens of trailing lines into the next chunk.
    pub overlap_tokens: usize,
    /// Extend a closing chunk by one line if it is smaller than this.
    pub min_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_tokens: 300,
            overlap_tokens: 80,
            min_tokens: 30,
        }
    }
}

impl ChunkingConfig {
    /// Reject settings that could stall chunking.
    pub fn validate(&self) -> Result<()> {
        if self.overlap_tokens >= self.chunk_tokens {
            return Err(KnowhowError::Config(format!(
                "chunk overlap ({} tokens) must be smaller than chunk size ({} tokens)",
                self.overlap_tokens, self.chunk_tokens
            )));
        }
        Ok(())
    }
}

/// Chunk a whole transcript.
pub fn chunk_transcript(
    transcript: &Transcript,
    config: &ChunkingConfig,
    tokenizer: &dyn TokenCounter,
) -> Result<Vec<Chunk>> {
    make_chunks(&transcript.id, &transcript.lines, config, tokenizer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_overlap_not_below_size() {
        let config = ChunkingConfig {
            chunk_tokens: 50,
            overlap_tokens: 50,
            min_tokens: 10,
        };
        assert!(matches!(config.validate(), Err(KnowhowError::Config(_))));

        let zero = ChunkingConfig {
            chunk_tokens: 0,
            overlap_tokens: 0,
            min_tokens: 0,
        };
        assert!(zero.validate().is_err());

        assert!(ChunkingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_chunk_line_helpers() {
        let chunk = Chunk {
            document_id: "d".to_string(),
            chunk_index: 0,
            text: "a\nb\nc".to_string(),
            start_line: 4,
            end_line: 6,
        };
        assert_eq!(chunk.line_count(), 3);
        assert!(chunk.contains_line(6));
        assert!(!chunk.contains_line(7));
    }
}
