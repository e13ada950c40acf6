//! Neighbour stitching: grow each hit into a window of adjacent chunks.

use crate::chunking::Chunk;
use crate::search::ScoredChunk;
use crate::tokenizer::TokenCounter;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Separator placed between stitched chunk texts.
const CHUNK_SEPARATOR: &str = "\n";

/// A contiguous run of chunks from one transcript, merged for context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StitchedBlock {
    pub document_id: String,
    pub start_chunk: usize,
    pub end_chunk: usize,
    pub start_line: usize,
    pub end_line: usize,
    /// Joined chunk texts, trimmed to the token budget.
    pub text: String,
}

/// Expand hits into neighbour windows and merge them into blocks.
///
/// Each hit pulls in the chunks of its transcript whose index is within
/// `window` of its own; indices that do not exist are skipped. A hit whose
/// chunk was already pulled into an earlier block is dropped, and chunks
/// already used by an earlier block are left out of later windows, so no chunk
/// appears in two blocks. Blocks come out in hit order.
pub fn stitch(
    hits: &[ScoredChunk<'_>],
    corpus: &[Chunk],
    window: usize,
    max_tokens_per_stitch: usize,
    tokenizer: &dyn TokenCounter,
) -> Vec<StitchedBlock> {
    let mut by_doc: HashMap<&str, BTreeMap<usize, &Chunk>> = HashMap::new();
    for chunk in corpus {
        by_doc
            .entry(chunk.document_id.as_str())
            .or_default()
            .insert(chunk.chunk_index, chunk);
    }

    let mut seen: HashSet<(&str, usize)> = HashSet::new();
    let mut blocks = Vec::new();

    for hit in hits {
        let doc = hit.chunk.document_id.as_str();
        let idx = hit.chunk.chunk_index;
        if seen.contains(&(doc, idx)) {
            continue;
        }

        let Some(doc_chunks) = by_doc.get(doc) else {
            continue;
        };

        // BTreeMap range iterates in chunk_index order.
        let lo = idx.saturating_sub(window);
        let hi = idx.saturating_add(window);
        let parts: Vec<&Chunk> = doc_chunks
            .range(lo..=hi)
            .map(|(_, chunk)| *chunk)
            .filter(|chunk| !seen.contains(&(doc, chunk.chunk_index)))
            .collect();

        let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
            continue;
        };

        let joined = parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(CHUNK_SEPARATOR);
        let text = tokenizer.trim(&joined, max_tokens_per_stitch).to_string();

        blocks.push(StitchedBlock {
            document_id: doc.to_string(),
            start_chunk: first.chunk_index,
            end_chunk: last.chunk_index,
            start_line: first.start_line,
            end_line: last.end_line,
            text,
        });

        for part in &parts {
            seen.insert((doc, part.chunk_index));
        }
    }

    blocks
}
