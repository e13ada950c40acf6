//! Linear fusion of lexical and dense rankings.

use super::ScoredChunk;
use crate::chunking::Chunk;

/// Min-max normalize scores into `[0, 1]`.
///
/// A constant array (zero range) maps to all zeros. Non-finite scores count
/// as 0 before normalizing.
pub fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    let clean: Vec<f32> = scores
        .iter()
        .map(|s| if s.is_finite() { *s } else { 0.0 })
        .collect();

    let min = clean.iter().copied().fold(f32::INFINITY, f32::min);
    let max = clean.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;

    if clean.is_empty() || range <= 0.0 || !range.is_finite() {
        return vec![0.0; clean.len()];
    }

    clean
        .iter()
        .map(|s| ((s - min) / range).clamp(0.0, 1.0))
        .collect()
}

/// Fuse two score arrays and return the `top_k` best chunks.
///
/// `fused = alpha * dense + (1 - alpha) * lexical` over normalized scores, with
/// `alpha` clamped to `[0, 1]`. Equal fused scores keep corpus order. Scores
/// missing from a short array count as 0.
pub fn rank<'a>(
    chunks: &'a [Chunk],
    lexical_scores: &[f32],
    dense_scores: &[f32],
    alpha: f32,
    top_k: usize,
) -> Vec<ScoredChunk<'a>> {
    let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    let lexical = min_max_normalize(lexical_scores);
    let dense = min_max_normalize(dense_scores);

    let mut fused: Vec<ScoredChunk<'a>> = chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let d = dense.get(i).copied().unwrap_or(0.0);
            let l = lexical.get(i).copied().unwrap_or(0.0);
            ScoredChunk {
                chunk,
                score: alpha * d + (1.0 - alpha) * l,
            }
        })
        .collect();

    // Stable sort: ties stay in corpus order.
    fused.sort_by(|a, b| b.score.total_cmp(&a.score));
    fused.truncate(top_k);
    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn chunks(n: usize) -> Vec<Chunk> {
        (0..n)
            .map(|i| Chunk {
                document_id: "doc".to_string(),
                chunk_index: i,
                text: format!("chunk {}", i),
                start_line: i,
                end_line: i,
            })
            .collect()
    }

    #[test]
    fn test_normalize_maps_min_and_max() {
        let normalized = min_max_normalize(&[2.0, 4.0, 3.0]);
        assert_eq!(normalized, vec![0.0, 1.0, 0.5]);
    }

    #[test]
    fn test_normalize_constant_and_empty() {
        assert_eq!(min_max_normalize(&[0.7, 0.7, 0.7]), vec![0.0, 0.0, 0.0]);
        assert!(min_max_normalize(&[]).is_empty());
    }

    #[test]
    fn test_normalize_non_finite() {
        let normalized = min_max_normalize(&[f32::NAN, 2.0, f32::INFINITY]);
        assert_eq!(normalized, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_fusion_example() {
        let corpus = chunks(2);
        let ranked = rank(&corpus, &[0.2, 0.8], &[0.9, 0.1], 0.6, 10);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].chunk.chunk_index, 0);
        assert!((ranked[0].score - 0.6).abs() < 1e-6);
        assert!((ranked[1].score - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_ties_break_by_corpus_order() {
        let corpus = chunks(4);
        let ranked = rank(&corpus, &[1.0, 1.0, 1.0, 1.0], &[0.5, 0.5, 0.5, 0.5], 0.5, 4);
        let order: Vec<usize> = ranked.iter().map(|r| r.chunk.chunk_index).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);

        let again = rank(&corpus, &[1.0, 1.0, 1.0, 1.0], &[0.5, 0.5, 0.5, 0.5], 0.5, 4);
        assert_eq!(ranked, again);
    }

    #[test]
    fn test_top_k_and_empty_corpus() {
        let corpus = chunks(5);
        let scores = [0.1, 0.5, 0.3, 0.9, 0.2];
        assert_eq!(rank(&corpus, &scores, &scores, 0.5, 2).len(), 2);
        assert_eq!(rank(&corpus, &scores, &scores, 0.5, 0).len(), 0);
        assert!(rank(&[], &[], &[], 0.5, 10).is_empty());
    }

    #[test]
    fn test_alpha_extremes() {
        let corpus = chunks(2);
        let lexical_only = rank(&corpus, &[0.0, 1.0], &[1.0, 0.0], 0.0, 2);
        assert_eq!(lexical_only[0].chunk.chunk_index, 1);

        let dense_only = rank(&corpus, &[0.0, 1.0], &[1.0, 0.0], 1.0, 2);
        assert_eq!(dense_only[0].chunk.chunk_index, 0);

        // Out-of-range alpha is clamped rather than extrapolated.
        let clamped = rank(&corpus, &[0.0, 1.0], &[1.0, 0.0], 3.0, 2);
        assert!(clamped.iter().all(|r| (0.0..=1.0).contains(&r.score)));
    }

    proptest! {
        #[test]
        fn normalized_scores_stay_in_unit_range(scores in proptest::collection::vec(-1e6f32..1e6, 0..50)) {
            let normalized = min_max_normalize(&scores);
            prop_assert_eq!(normalized.len(), scores.len());
            prop_assert!(normalized.iter().all(|s| (0.0..=1.0).contains(s)));
        }

        #[test]
        fn rank_is_sorted_and_bounded(
            scores in proptest::collection::vec((0.0f32..100.0, -1.0f32..1.0), 0..40),
            alpha in 0.0f32..=1.0,
            top_k in 0usize..60,
        ) {
            let corpus = chunks(scores.len());
            let lexical: Vec<f32> = scores.iter().map(|s| s.0).collect();
            let dense: Vec<f32> = scores.iter().map(|s| s.1).collect();

            let ranked = rank(&corpus, &lexical, &dense, alpha, top_k);

            prop_assert_eq!(ranked.len(), top_k.min(corpus.len()));
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
