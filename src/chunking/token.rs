//! Token-bounded chunking with overlap.

use super::{Chunk, ChunkingConfig};
use crate::error::Result;
use crate::tokenizer::TokenCounter;
use tracing::debug;

/// Split an ordered run of lines into overlapping, token-bounded chunks.
///
/// Lines accumulate until the buffer reaches `chunk_tokens`. A closing chunk
/// below `min_tokens` absorbs one more line if there is one. After each close
/// the buffer is re-seeded with the shortest trailing run of lines that reaches
/// `overlap_tokens` (the whole buffer if none does). Whatever is buffered after
/// the last line becomes a final, possibly undersized, chunk.
pub fn make_chunks(
    document_id: &str,
    lines: &[String],
    config: &ChunkingConfig,
    tokenizer: &dyn TokenCounter,
) -> Result<Vec<Chunk>> {
    config.validate()?;

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut buf: Vec<&str> = Vec::new();
    let mut buf_start = 0;
    let mut i = 0;

    while i < lines.len() {
        if buf.is_empty() {
            buf_start = i;
        }
        buf.push(&lines[i]);
        let mut text = buf.join("\n");

        if tokenizer.count_tokens(&text) >= config.chunk_tokens {
            let mut end_line = i;
            if tokenizer.count_tokens(&text) < config.min_tokens && i + 1 < lines.len() {
                i += 1;
                buf.push(&lines[i]);
                text = buf.join("\n");
                end_line = i;
            }

            chunks.push(Chunk {
                document_id: document_id.to_string(),
                chunk_index: chunks.len(),
                text,
                start_line: buf_start,
                end_line,
            });

            let keep = overlap_len(&buf, config.overlap_tokens, tokenizer);
            buf.drain(..buf.len() - keep);
            buf_start = end_line + 1 - buf.len();
        }
        i += 1;
    }

    if !buf.is_empty() {
        chunks.push(Chunk {
            document_id: document_id.to_string(),
            chunk_index: chunks.len(),
            text: buf.join("\n"),
            start_line: buf_start,
            end_line: lines.len() - 1,
        });
    }

    debug!("Chunked '{}': {} lines -> {} chunks", document_id, lines.len(), chunks.len());
    Ok(chunks)
}

/// Number of trailing lines to carry into the next chunk.
fn overlap_len(buf: &[&str], overlap_tokens: usize, tokenizer: &dyn TokenCounter) -> usize {
    for start in (0..buf.len()).rev() {
        if tokenizer.count_tokens(&buf[start..].join("\n")) >= overlap_tokens {
            return buf.len() - start;
        }
    }
    buf.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::WhitespaceTokenizer;
    use proptest::prelude::*;

    fn lines(words_per_line: &[usize]) -> Vec<String> {
        words_per_line
            .iter()
            .enumerate()
            .map(|(n, &count)| {
                (0..count)
                    .map(|w| format!("l{}w{}", n, w))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    fn config(chunk_tokens: usize, overlap_tokens: usize, min_tokens: usize) -> ChunkingConfig {
        ChunkingConfig {
            chunk_tokens,
            overlap_tokens,
            min_tokens,
        }
    }

    #[test]
    fn test_empty_input() {
        let chunks = make_chunks("doc", &[], &config(10, 2, 1), &WhitespaceTokenizer).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_rejects_overlap_not_below_size() {
        let input = lines(&[3, 3, 3]);
        assert!(make_chunks("doc", &input, &config(4, 4, 0), &WhitespaceTokenizer).is_err());
    }

    #[test]
    fn test_overlapping_windows() {
        // Three words per line, close at 6 tokens, carry 3 tokens over.
        let input = lines(&[3, 3, 3, 3, 3]);
        let chunks = make_chunks("doc", &input, &config(6, 3, 0), &WhitespaceTokenizer).unwrap();

        let ranges: Vec<(usize, usize)> = chunks.iter().map(|c| (c.start_line, c.end_line)).collect();
        assert_eq!(ranges, vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 4)]);
        assert_eq!(chunks[0].text, format!("{}\n{}", input[0], input[1]));
        assert!(chunks.iter().all(|c| c.document_id == "doc"));
    }

    #[test]
    fn test_trailing_chunk_is_emitted_under_budget() {
        let input = lines(&[4, 4, 1]);
        let chunks = make_chunks("doc", &input, &config(8, 1, 0), &WhitespaceTokenizer).unwrap();

        let last = chunks.last().unwrap();
        assert_eq!(last.end_line, 2);
        assert!(WhitespaceTokenizer.count_tokens(&last.text) < 8);
    }

    #[test]
    fn test_small_chunk_absorbs_one_more_line() {
        // min_tokens above chunk_tokens forces the extension rule.
        let input = lines(&[2, 2, 2, 2]);
        let chunks = make_chunks("doc", &input, &config(2, 1, 3), &WhitespaceTokenizer).unwrap();

        assert_eq!((chunks[0].start_line, chunks[0].end_line), (0, 1));
        assert_eq!(WhitespaceTokenizer.count_tokens(&chunks[0].text), 4);
    }

    #[test]
    fn test_overlap_keeps_whole_buffer_when_threshold_unreachable() {
        let buf = ["a b", "c"];
        assert_eq!(overlap_len(&buf, 10, &WhitespaceTokenizer), 2);
        assert_eq!(overlap_len(&buf, 1, &WhitespaceTokenizer), 1);
        assert_eq!(overlap_len(&buf, 2, &WhitespaceTokenizer), 2);
    }

    #[test]
    fn test_single_oversized_line() {
        let input = lines(&[50]);
        let chunks = make_chunks("doc", &input, &config(10, 2, 0), &WhitespaceTokenizer).unwrap();

        // The line closes a chunk by itself and is carried over as the overlap.
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.start_line == 0 && c.end_line == 0));
    }

    proptest! {
        #[test]
        fn chunks_cover_lines_with_dense_indices(
            words in proptest::collection::vec(1usize..8, 0..60),
            chunk_tokens in 1usize..40,
            overlap_frac in 0.0f64..1.0,
            min_tokens in 0usize..50,
        ) {
            let overlap_tokens = ((chunk_tokens as f64) * overlap_frac) as usize;
            prop_assume!(overlap_tokens < chunk_tokens);

            let input = lines(&words);
            let chunks = make_chunks(
                "doc",
                &input,
                &config(chunk_tokens, overlap_tokens, min_tokens),
                &WhitespaceTokenizer,
            ).unwrap();

            for (n, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.chunk_index, n);
                prop_assert!(chunk.start_line <= chunk.end_line);
                prop_assert_eq!(&chunk.text, &input[chunk.start_line..=chunk.end_line].join("\n"));
            }
            for pair in chunks.windows(2) {
                prop_assert!(pair[0].start_line <= pair[1].start_line);
            }
            for line in 0..input.len() {
                prop_assert!(chunks.iter().any(|c| c.contains_line(line)));
            }
        }
    }
}
