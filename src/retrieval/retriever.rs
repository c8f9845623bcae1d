//! Candidate retrieval with profile filtering and relevance re-weighting

use std::sync::Arc;

use tracing::debug;

use super::detect_incident;
use super::ScoredChunk;
use super::MATCH_THRESHOLD;
use super::MAX_CANDIDATE_CHUNKS;
use crate::database::Database;
use crate::database::MatchedChunk;
use crate::errors::Result;
use crate::models::UserContext;

/// Fetches nearest-neighbor candidates and re-weights them with seeker
/// profile signals and narrative-content heuristics.
pub struct CandidateRetriever {
    database: Arc<Database>,
}

impl CandidateRetriever {
    #[must_use]
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Retrieve up to [`MAX_CANDIDATE_CHUNKS`] re-weighted candidates for a
    /// query embedding.
    ///
    /// # Errors
    /// - `Database` when the vector store is unreachable
    pub async fn retrieve(
        &self,
        embedding: &[f32],
        user_context: Option<&UserContext>,
    ) -> Result<Vec<ScoredChunk>> {
        let matches = self
            .database
            .match_chunks(embedding, MATCH_THRESHOLD, MAX_CANDIDATE_CHUNKS as i64)
            .await?;
        debug!("Vector store returned {} candidates", matches.len());

        let filtered = apply_profile_filters(matches, user_context);
        Ok(score_candidates(filtered, user_context))
    }
}

/// Hard filters from the seeker profile. Deliberately sharp: stated topic
/// preferences restrict the set rather than boosting it.
#[must_use]
pub fn apply_profile_filters(
    matches: Vec<MatchedChunk>,
    user_context: Option<&UserContext>,
) -> Vec<MatchedChunk> {
    let Some(ctx) = user_context else {
        return matches;
    };

    let level = ctx.level();
    let mut filtered = matches;
    if level <= 3 {
        filtered.retain(|m| m.chunk.importance <= 4);
    } else if level >= 7 {
        filtered.retain(|m| m.chunk.importance >= 3);
    }
    if !ctx.preferred_topics.is_empty() {
        filtered.retain(|m| {
            m.chunk
                .tags
                .iter()
                .any(|tag| ctx.preferred_topics.contains(tag))
        });
    }
    filtered
}

/// Re-weight candidates and truncate to the candidate ceiling.
///
/// Each chunk starts at 1.0 and is adjusted multiplicatively; every factor
/// is positive, so the result never goes negative.
#[must_use]
pub fn score_candidates(
    matches: Vec<MatchedChunk>,
    user_context: Option<&UserContext>,
) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = matches
        .into_iter()
        .map(|m| {
            let has_incident = detect_incident(&m.chunk.content);
            let mut adjusted = 1.0_f32;
            if has_incident {
                adjusted *= 1.3;
            }
            if let Some(ctx) = user_context {
                let level = ctx.level();
                let importance = m.chunk.importance;
                if level <= 3 && importance > 4 {
                    adjusted *= 0.8;
                } else if level >= 7 && importance < 3 {
                    adjusted *= 0.9;
                }
                if !ctx.preferred_topics.is_empty()
                    && ctx
                        .preferred_topics
                        .iter()
                        .any(|topic| m.chunk.tags.contains(topic))
                {
                    adjusted *= 1.2;
                }
            }
            ScoredChunk {
                chunk: m.chunk,
                similarity: adjusted,
                raw_sim: m.similarity,
                has_incident,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(MAX_CANDIDATE_CHUNKS);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::test_chunk;

    fn matched(id: i64, content: &str, importance: i32, tags: &[&str], sim: f32) -> MatchedChunk {
        let mut chunk = test_chunk(id, "Talks", "teaching", content);
        chunk.importance = importance;
        chunk.tags = tags.iter().map(ToString::to_string).collect();
        MatchedChunk {
            chunk,
            similarity: sim,
        }
    }

    fn ctx(level: u8, topics: &[&str]) -> UserContext {
        UserContext {
            spiritual_level: Some(level),
            preferred_topics: topics.iter().map(ToString::to_string).collect(),
            ..UserContext::default()
        }
    }

    #[test]
    fn incident_chunks_are_boosted() {
        let scored = score_candidates(
            vec![
                matched(1, "a devotee asked about the Self", 3, &[], 0.8),
                matched(2, "pure awareness alone", 3, &[], 0.9),
            ],
            None,
        );
        let incident = scored.iter().find(|s| s.chunk.id == 1).unwrap();
        let plain = scored.iter().find(|s| s.chunk.id == 2).unwrap();
        assert!(incident.has_incident);
        assert!((incident.similarity - 1.3).abs() < f32::EPSILON);
        assert!((plain.similarity - 1.0).abs() < f32::EPSILON);
        // Incident ranks first despite lower raw similarity
        assert_eq!(scored[0].chunk.id, 1);
        assert!((incident.raw_sim - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn factors_compound_multiplicatively() {
        let context = ctx(8, &["self-inquiry"]);
        let scored = score_candidates(
            vec![matched(
                1,
                "a devotee asked how to abide",
                4,
                &["self-inquiry"],
                0.7,
            )],
            Some(&context),
        );
        // 1.0 * 1.3 (incident) * 1.2 (topic match)
        assert!((scored[0].similarity - 1.56).abs() < 1e-6);
    }

    #[test]
    fn advanced_seeker_penalizes_low_importance() {
        // Importance 3 passes the level>=7 hard filter; the soft penalty
        // only applies below 3, so filter first with importance 3
        let context = ctx(7, &[]);
        let kept = apply_profile_filters(vec![matched(1, "x", 2, &[], 0.5)], Some(&context));
        assert!(kept.is_empty());
        let kept = apply_profile_filters(vec![matched(1, "x", 3, &[], 0.5)], Some(&context));
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn beginner_drops_deep_chunks() {
        let context = ctx(2, &[]);
        let kept = apply_profile_filters(
            vec![
                matched(1, "deep doctrine", 5, &[], 0.9),
                matched(2, "simple teaching", 3, &[], 0.5),
            ],
            Some(&context),
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].chunk.id, 2);
    }

    #[test]
    fn topic_preference_is_a_hard_filter() {
        let context = ctx(5, &["grace"]);
        let kept = apply_profile_filters(
            vec![
                matched(1, "about grace", 3, &["grace"], 0.5),
                matched(2, "about food", 3, &["diet"], 0.9),
            ],
            Some(&context),
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].chunk.id, 1);
    }

    #[test]
    fn candidate_ceiling_is_enforced() {
        let matches: Vec<MatchedChunk> = (0..120)
            .map(|i| matched(i, "pure awareness", 3, &[], 0.5))
            .collect();
        let scored = score_candidates(matches, None);
        assert_eq!(scored.len(), MAX_CANDIDATE_CHUNKS);
    }
}
