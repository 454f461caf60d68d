//! Reciprocal Rank Fusion: score = Σ 1/(k + rank_i)
//!
//! Combines rankings whose raw scores are not comparable (cosine similarity
//! against keyword hit counts) by rank position alone.

use std::collections::HashMap;

/// Smoothing constant used across the retrieval layer.
pub const DEFAULT_K: u32 = 50;

/// A candidate after fusion.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedCandidate {
    pub id: String,
    /// Fused RRF score (higher = more relevant).
    pub rrf_score: f64,
}

/// Contribution of one appearance at 1-based `rank`.
pub fn rrf_term(rank: usize, k: u32) -> f64 {
    1.0 / (k as f64 + rank as f64)
}

/// Fuse ranked id lists. Each list is best-first; position 0 is rank 1.
///
/// A candidate absent from every list is absent from the output. Equal
/// scores keep the order in which candidates were first seen.
pub fn fuse(ranked_lists: &[Vec<String>], k: u32) -> Vec<FusedCandidate> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut candidates: Vec<FusedCandidate> = Vec::new();

    for list in ranked_lists {
        for (position, id) in list.iter().enumerate() {
            let contribution = rrf_term(position + 1, k);
            match index.get(id.as_str()) {
                Some(&i) => candidates[i].rrf_score += contribution,
                None => {
                    index.insert(id.as_str(), candidates.len());
                    candidates.push(FusedCandidate {
                        id: id.clone(),
                        rrf_score: contribution,
                    });
                }
            }
        }
    }

    // Stable sort keeps first-seen order among ties
    candidates.sort_by(|a, b| {
        b.rrf_score
            .partial_cmp(&a.rrf_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    candidates
}

/// Synthetic scores for a single keyword-only list of `n` results.
///
/// Scores decrease linearly from the best single-list RRF score, `1/(k+1)`,
/// so keyword-only hits stay sortable next to fused ones. This is a position
/// score, not a relevance measure.
pub fn linear_scores(n: usize, k: u32) -> Vec<f64> {
    let top = rrf_term(1, k);
    (0..n)
        .map(|i| top * (n - i) as f64 / n as f64)
        .collect()
}
