//! Category-aware diversity selection
//!
//! Greedy, order-sensitive, single pass. Not globally optimal, but
//! deterministic and bounded in cost, and it guarantees representation of
//! narrative and high-importance passages that pure similarity ordering
//! would crowd out.

use std::collections::HashSet;

use super::ScoredChunk;
use super::MAX_CHUNKS;
use super::SIMILARITY_THRESHOLD;

/// Strategy seam for the working-set selection stage.
pub trait DiversityStrategy {
    /// Assemble a bounded, diverse working set from re-weighted candidates,
    /// preserving candidate order within each admission phase.
    fn select(&self, candidates: &[ScoredChunk]) -> Vec<ScoredChunk>;
}

/// The production selector: incident quota, high-importance quota,
/// novelty-or-high-confidence admission, then rank-order backfill.
pub struct GreedyDiversitySelector {
    max_chunks: usize,
    similarity_threshold: f32,
}

impl GreedyDiversitySelector {
    #[must_use]
    pub const fn new(max_chunks: usize, similarity_threshold: f32) -> Self {
        Self {
            max_chunks,
            similarity_threshold,
        }
    }
}

impl Default for GreedyDiversitySelector {
    fn default() -> Self {
        Self::new(MAX_CHUNKS, SIMILARITY_THRESHOLD)
    }
}

/// Running selection state: chosen chunks plus the novelty-tracking sets.
#[derive(Default)]
struct Selection {
    chunks: Vec<ScoredChunk>,
    ids: HashSet<i64>,
    sources: HashSet<String>,
    categories: HashSet<String>,
    concepts: HashSet<String>,
}

impl Selection {
    fn admit(&mut self, scored: &ScoredChunk) {
        self.ids.insert(scored.chunk.id);
        self.sources.insert(scored.chunk.source.clone());
        self.categories.insert(scored.chunk.category.clone());
        for concept in &scored.chunk.key_concepts {
            self.concepts.insert(concept.clone());
        }
        self.chunks.push(scored.clone());
    }

    fn contains(&self, scored: &ScoredChunk) -> bool {
        self.ids.contains(&scored.chunk.id)
    }

    fn len(&self) -> usize {
        self.chunks.len()
    }
}

impl DiversityStrategy for GreedyDiversitySelector {
    fn select(&self, candidates: &[ScoredChunk]) -> Vec<ScoredChunk> {
        let mut selection = Selection::default();

        let incident: Vec<&ScoredChunk> = candidates.iter().filter(|c| c.has_incident).collect();
        let high_importance: Vec<&ScoredChunk> = candidates
            .iter()
            .filter(|c| c.chunk.importance >= 4)
            .collect();
        let regular: Vec<&ScoredChunk> = candidates.iter().filter(|c| !c.has_incident).collect();

        // Phase 1: incident quota, in existing sort order
        let max_incident = incident
            .len()
            .min((self.max_chunks as f64 * 0.3).ceil() as usize);
        for chunk in incident.iter().take(max_incident) {
            selection.admit(chunk);
        }

        // Phase 2: high-importance quota, capped together with phase 1
        let max_high = high_importance
            .len()
            .min((self.max_chunks as f64 * 0.4).ceil() as usize);
        for chunk in &high_importance {
            if selection.len() >= max_high + max_incident {
                break;
            }
            if !selection.contains(chunk) {
                selection.admit(chunk);
            }
        }

        // Phase 3: novelty-or-high-confidence admission over the regular pool
        for chunk in &regular {
            if selection.len() >= self.max_chunks {
                break;
            }
            if selection.contains(chunk) {
                continue;
            }
            let is_new_source = !selection.sources.contains(&chunk.chunk.source);
            let is_new_category = !selection.categories.contains(&chunk.chunk.category);
            let has_new_concept = chunk
                .chunk
                .key_concepts
                .iter()
                .any(|concept| !selection.concepts.contains(concept));
            let is_high_sim = chunk.similarity >= self.similarity_threshold + 0.1;
            if is_new_source || is_new_category || has_new_concept || is_high_sim {
                selection.admit(chunk);
            }
        }

        // Phase 4: backfill with remaining top-ranked candidates
        for chunk in candidates {
            if selection.len() >= self.max_chunks {
                break;
            }
            if !selection.contains(chunk) {
                selection.admit(chunk);
            }
        }

        selection.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::test_chunk;

    fn scored(
        id: i64,
        source: &str,
        category: &str,
        incident: bool,
        importance: i32,
        similarity: f32,
    ) -> ScoredChunk {
        let content = if incident {
            "a devotee asked"
        } else {
            "pure awareness"
        };
        let mut chunk = test_chunk(id, source, category, content);
        chunk.importance = importance;
        ScoredChunk {
            chunk,
            similarity,
            raw_sim: similarity,
            has_incident: incident,
        }
    }

    fn selector() -> GreedyDiversitySelector {
        GreedyDiversitySelector::default()
    }

    #[test]
    fn output_never_exceeds_budget_and_has_unique_ids() {
        let candidates: Vec<ScoredChunk> = (0..75)
            .map(|i| {
                scored(
                    i,
                    &format!("source-{}", i % 3),
                    "teaching",
                    i % 4 == 0,
                    if i % 5 == 0 { 5 } else { 3 },
                    1.0 - i as f32 * 0.01,
                )
            })
            .collect();
        let selected = selector().select(&candidates);
        assert!(selected.len() <= MAX_CHUNKS);
        let ids: HashSet<i64> = selected.iter().map(|c| c.chunk.id).collect();
        assert_eq!(ids.len(), selected.len());
    }

    #[test]
    fn top_ranked_incidents_always_represented() {
        let mut candidates: Vec<ScoredChunk> = (0..60)
            .map(|i| scored(i, "same", "teaching", false, 3, 1.0))
            .collect();
        candidates.insert(0, scored(100, "same", "teaching", true, 3, 1.3));
        let selected = selector().select(&candidates);
        assert!(selected.iter().any(|c| c.chunk.id == 100));
    }

    #[test]
    fn incident_quota_is_ceil_of_thirty_percent() {
        let candidates: Vec<ScoredChunk> = (0..20)
            .map(|i| scored(i, "s", "teaching", true, 3, 1.3))
            .collect();
        let selected = selector().select(&candidates);
        // 8 via the incident quota; the rest only enter through backfill,
        // never through the regular scan (they are all incidents)
        assert_eq!(selected.len(), 20.min(MAX_CHUNKS));
        assert_eq!(selected[7].chunk.id, 7);
    }

    #[test]
    fn high_importance_phase_stops_at_combined_cap() {
        let mut candidates: Vec<ScoredChunk> = (0..8)
            .map(|i| scored(i, "s", "teaching", true, 3, 1.3))
            .collect();
        candidates.extend((8..30).map(|i| scored(i, "s", "teaching", false, 5, 0.5)));
        let selected = selector().select(&candidates);
        // Phase order: 8 incidents, then exactly 10 high-importance chunks
        // before the quota stops; the rest only arrive through backfill
        assert!(selected[..8].iter().all(|c| c.has_incident));
        assert!(selected[8..18].iter().all(|c| c.chunk.importance >= 4));
        assert_eq!(selected[8].chunk.id, 8);
        assert_eq!(selected[17].chunk.id, 17);
        assert_eq!(selected.len(), MAX_CHUNKS);
    }

    #[test]
    fn novelty_admission_accepts_new_source_or_category() {
        let candidates = vec![
            scored(1, "book-a", "teaching", false, 3, 0.5),
            scored(2, "book-a", "teaching", false, 3, 0.5), // nothing new, low sim
            scored(3, "book-b", "teaching", false, 3, 0.5), // new source
            scored(4, "book-a", "philosophy", false, 3, 0.5), // new category
        ];
        let selected = selector().select(&candidates);
        let ids: Vec<i64> = selected.iter().map(|c| c.chunk.id).collect();
        // Chunk 2 only arrives in the backfill phase, after 3 and 4
        assert_eq!(ids, vec![1, 3, 4, 2]);
    }

    #[test]
    fn high_confidence_admission_overrides_novelty() {
        let candidates = vec![
            scored(1, "book-a", "teaching", false, 3, 0.9),
            scored(2, "book-a", "teaching", false, 3, 0.76), // >= 0.75 admits
            scored(3, "book-a", "teaching", false, 3, 0.5),
        ];
        let selected = selector().select(&candidates);
        let ids: Vec<i64> = selected.iter().map(|c| c.chunk.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(selector().select(&[]).is_empty());
    }
}
