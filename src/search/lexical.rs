//! BM25 keyword scoring over chunk texts.

use crate::chunking::Chunk;
use std::collections::HashMap;

const K1: f64 = 1.5;
const B: f64 = 0.75;
/// Floor for negative idf values, as a fraction of the mean idf.
const EPSILON: f64 = 0.25;

/// BM25 (Okapi) index.
///
/// Texts are tokenized with a plain whitespace split, so punctuation stays
/// attached to words. Terms occurring in more than half of the chunks would get a
/// negative idf; those are floored to `EPSILON * mean idf`.
#[derive(Debug, Clone, Default)]
pub struct LexicalIndex {
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    avg_doc_len: f64,
    idf: HashMap<String, f64>,
}

impl LexicalIndex {
    /// Build the index over chunk texts, in corpus order.
    pub fn build(chunks: &[Chunk]) -> Self {
        let mut term_freqs = Vec::with_capacity(chunks.len());
        let mut doc_lens = Vec::with_capacity(chunks.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for chunk in chunks {
            let mut freqs: HashMap<String, u32> = HashMap::new();
            let mut len = 0;
            for term in chunk.text.split_whitespace() {
                *freqs.entry(term.to_string()).or_insert(0) += 1;
                len += 1;
            }
            for term in freqs.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(freqs);
            doc_lens.push(len);
        }

        let total_docs = chunks.len() as f64;
        let avg_doc_len = if chunks.is_empty() {
            0.0
        } else {
            doc_lens.iter().sum::<usize>() as f64 / total_docs
        };

        let mut idf: HashMap<String, f64> = HashMap::with_capacity(doc_freq.len());
        let mut idf_sum = 0.0;
        let mut negative = Vec::new();
        for (term, df) in doc_freq {
            let df = df as f64;
            let value = (total_docs - df + 0.5).ln() - (df + 0.5).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term, value);
        }
        if !idf.is_empty() {
            let floor = EPSILON * idf_sum / idf.len() as f64;
            for term in negative {
                idf.insert(term, floor);
            }
        }

        Self {
            term_freqs,
            doc_lens,
            avg_doc_len,
            idf,
        }
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    /// True when no chunks are indexed.
    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }

    /// One score per chunk, in corpus order. Higher is more relevant.
    pub fn score(&self, query: &str) -> Vec<f32> {
        let terms: Vec<&str> = query.split_whitespace().collect();

        self.term_freqs
            .iter()
            .zip(&self.doc_lens)
            .map(|(freqs, &doc_len)| {
                let length_norm = if self.avg_doc_len > 0.0 {
                    1.0 - B + B * doc_len as f64 / self.avg_doc_len
                } else {
                    1.0
                };

                terms
                    .iter()
                    .map(|term| {
                        let tf = freqs.get(*term).copied().unwrap_or(0) as f64;
                        if tf == 0.0 {
                            return 0.0;
                        }
                        let idf = self.idf.get(*term).copied().unwrap_or(0.0);
                        idf * (tf * (K1 + 1.0)) / (tf + K1 * length_norm)
                    })
                    .sum::<f64>() as f32
            })
            .collect()
    }
}
