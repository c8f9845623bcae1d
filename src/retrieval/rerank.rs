//! Maximal Marginal Relevance re-ranking
//!
//! Relevance comes from the preserved vector-store similarity (with a tiny
//! tie-break from the re-weighted score); redundancy is measured as the
//! maximum token-Jaccard overlap against everything already selected.

use std::collections::HashSet;

use super::ScoredChunk;

/// Lowercase word tokens, split at Unicode non-alphanumeric boundaries.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    let overlap = a.intersection(b).count();
    let denom = (a.len() + b.len() - overlap).max(1);
    overlap as f32 / denom as f32
}

/// Re-rank and truncate `items` to at most `k` entries.
///
/// Greedy MMR: repeatedly pick the remaining candidate maximizing
/// `lambda * relevance - (1 - lambda) * max_overlap_with_selected`. Output
/// length is exactly `min(k, items.len())` with no duplicate entries.
#[must_use]
pub fn mmr_rerank(items: Vec<ScoredChunk>, k: usize, lambda: f32) -> Vec<ScoredChunk> {
    let target = k.min(items.len());
    let mut remaining: Vec<(ScoredChunk, HashSet<String>)> = items
        .into_iter()
        .map(|item| {
            let tokens: HashSet<String> = tokenize(&item.chunk.content).into_iter().collect();
            (item, tokens)
        })
        .collect();
    let mut selected: Vec<(ScoredChunk, HashSet<String>)> = Vec::with_capacity(target);

    while selected.len() < target {
        let mut best_idx = 0;
        let mut best_score = f32::NEG_INFINITY;
        for (idx, (item, tokens)) in remaining.iter().enumerate() {
            let relevance = item.raw_sim + 0.001 * item.similarity;
            let penalty = selected
                .iter()
                .map(|(_, sel_tokens)| jaccard(tokens, sel_tokens))
                .fold(0.0_f32, f32::max);
            let score = lambda * relevance - (1.0 - lambda) * penalty;
            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }
        // Stable removal keeps ties resolving to the earlier-ranked item
        selected.push(remaining.remove(best_idx));
    }

    selected.into_iter().map(|(item, _)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::test_chunk;

    fn scored(id: i64, content: &str, raw_sim: f32) -> ScoredChunk {
        ScoredChunk {
            chunk: test_chunk(id, "Talks", "teaching", content),
            similarity: 1.0,
            raw_sim,
            has_incident: false,
        }
    }

    #[test]
    fn tokenize_splits_on_unicode_boundaries() {
        assert_eq!(tokenize("Who am I? नान्"), vec!["who", "am", "i", "नान"]);
        assert!(tokenize("--- !!!").is_empty());
    }

    #[test]
    fn output_length_is_min_of_k_and_len() {
        let items: Vec<ScoredChunk> = (0..10)
            .map(|i| scored(i, &format!("distinct content {i}"), 0.5))
            .collect();
        assert_eq!(mmr_rerank(items.clone(), 5, 0.7).len(), 5);
        assert_eq!(mmr_rerank(items, 25, 0.7).len(), 10);
        assert!(mmr_rerank(Vec::new(), 25, 0.7).is_empty());
    }

    #[test]
    fn no_id_appears_twice() {
        let items: Vec<ScoredChunk> = (0..20).map(|i| scored(i, "same words here", 0.5)).collect();
        let out = mmr_rerank(items, 20, 0.7);
        let ids: HashSet<i64> = out.iter().map(|c| c.chunk.id).collect();
        assert_eq!(ids.len(), out.len());
    }

    #[test]
    fn most_relevant_comes_first() {
        let items = vec![
            scored(1, "the self is always realized", 0.6),
            scored(2, "abide as the self through inquiry", 0.9),
            scored(3, "breath control steadies the mind", 0.7),
        ];
        let out = mmr_rerank(items, 3, 0.7);
        assert_eq!(out[0].chunk.id, 2);
    }

    #[test]
    fn near_duplicates_are_pushed_down() {
        let items = vec![
            scored(1, "the mind must turn inward and seek its source", 0.90),
            scored(2, "the mind must turn inward and seek its source", 0.89),
            scored(3, "grace flows to those who surrender completely", 0.70),
        ];
        let out = mmr_rerank(items, 3, 0.7);
        // The exact duplicate of the leader scores 0.7*0.89 - 0.3*1.0 ≈ 0.32,
        // below the distinct chunk's 0.7*0.70 = 0.49
        assert_eq!(out[0].chunk.id, 1);
        assert_eq!(out[1].chunk.id, 3);
        assert_eq!(out[2].chunk.id, 2);
    }

    #[test]
    fn reweighted_score_breaks_ties() {
        let mut a = scored(1, "alpha beta gamma", 0.5);
        let mut b = scored(2, "delta epsilon zeta", 0.5);
        a.similarity = 1.0;
        b.similarity = 2.0;
        let out = mmr_rerank(vec![a, b], 2, 0.7);
        assert_eq!(out[0].chunk.id, 2);
    }
}
