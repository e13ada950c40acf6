//! The chunked corpus every index is built over.
//!
//! A [`Corpus`] is constructed once from a set of transcripts and passed by
//! reference to index builders. Rebuilding means constructing a new value.

use crate::chunking::{chunk_transcript, Chunk, ChunkingConfig};
use crate::error::{KnowhowError, Result};
use crate::tokenizer::TokenCounter;
use crate::transcript::Transcript;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Transcripts plus the chunks cut from them.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    transcripts: Vec<Transcript>,
    chunks: Vec<Chunk>,
}

/// Token statistics for one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkTokenStats {
    pub document_id: String,
    pub chunk_index: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub char_len: usize,
    pub token_len: usize,
}

impl Corpus {
    /// Chunk every transcript with the same configuration and tokenizer.
    pub fn build(
        transcripts: Vec<Transcript>,
        config: ChunkingConfig,
        tokenizer: &dyn TokenCounter,
    ) -> Result<Self> {
        config.validate()?;

        let mut ids: HashSet<&str> = HashSet::with_capacity(transcripts.len());
        for transcript in &transcripts {
            if !ids.insert(transcript.id.as_str()) {
                return Err(KnowhowError::InvalidInput(format!(
                    "Duplicate transcript id '{}': transcript file names must be unique (ignoring extension)",
                    transcript.id
                )));
            }
        }

        let mut chunks = Vec::new();
        for transcript in &transcripts {
            chunks.extend(chunk_transcript(transcript, &config, tokenizer)?);
        }

        info!(
            "Built corpus: {} transcripts, {} chunks",
            transcripts.len(),
            chunks.len()
        );

        Ok(Self {
            transcripts,
            chunks,
        })
    }

    /// All chunks, grouped by transcript in load order, then by chunk index.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// The source transcripts.
    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    /// Number of chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True when there is nothing to search.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Chunks belonging to one transcript.
    pub fn chunks_for(&self, document_id: &str) -> impl Iterator<Item = &Chunk> {
        let document_id = document_id.to_string();
        self.chunks.iter().filter(move |c| c.document_id == document_id)
    }

    /// Chunk counts per transcript, in load order.
    pub fn chunk_counts(&self) -> Vec<(&str, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for chunk in &self.chunks {
            *counts.entry(chunk.document_id.as_str()).or_insert(0) += 1;
        }
        self.transcripts
            .iter()
            .map(|t| (t.id.as_str(), counts.get(t.id.as_str()).copied().unwrap_or(0)))
            .collect()
    }

    /// Per-chunk token statistics, largest first.
    pub fn token_report(&self, tokenizer: &dyn TokenCounter) -> Vec<ChunkTokenStats> {
        let mut report: Vec<ChunkTokenStats> = self
            .chunks
            .iter()
            .map(|c| ChunkTokenStats {
                document_id: c.document_id.clone(),
                chunk_index: c.chunk_index,
                start_line: c.start_line,
                end_line: c.end_line,
                char_len: c.text.chars().count(),
                token_len: tokenizer.count_tokens(&c.text),
            })
            .collect();

        // Stable sort keeps corpus order among equal sizes.
        report.sort_by(|a, b| b.token_len.cmp(&a.token_len));
        report
    }
}
