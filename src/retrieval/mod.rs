//! Retrieval and context-assembly pipeline
//!
//! The stages run strictly in order within a request: vector search and
//! profile re-weighting, diversity selection, similarity-floor guardrail,
//! MMR re-ranking, then context assembly. Each stage consumes the full
//! output of the previous one.

pub mod context;
pub mod diversity;
pub mod pipeline;
pub mod rerank;
pub mod retriever;

pub use context::ContextAssembler;
pub use diversity::DiversityStrategy;
pub use diversity::GreedyDiversitySelector;
pub use pipeline::ChatOutcome;
pub use pipeline::ChatPipeline;
pub use pipeline::ChatQuery;
pub use pipeline::SearchMethod;
pub use pipeline::SearchStats;
pub use retriever::CandidateRetriever;

use crate::models::Chunk;

/// Relevance score below which a chunk is considered off-topic.
pub const SIMILARITY_THRESHOLD: f32 = 0.65;

/// Maximum number of chunks in the final assembled context.
pub const MAX_CHUNKS: usize = 25;

/// Maximum number of candidates considered before diversity selection.
pub const MAX_CANDIDATE_CHUNKS: usize = 75;

/// Relevance-vs-redundancy trade-off for MMR re-ranking.
pub const RERANK_LAMBDA: f32 = 0.7;

/// Low floor passed to the vector store; real filtering happens later.
pub const MATCH_THRESHOLD: f32 = 0.1;

/// Narrative markers that identify incident passages.
pub const INCIDENT_KEYWORDS: [&str; 10] = [
    "devotee",
    "asked",
    "question",
    "said",
    "replied",
    "conversation",
    "interaction",
    "experience",
    "story",
    "incident",
];

/// A chunk with request-scoped scoring state.
///
/// `similarity` is the re-weighted relevance (starts at 1.0, adjusted
/// multiplicatively); `raw_sim` preserves the vector store's score for the
/// re-ranker.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub similarity: f32,
    pub raw_sim: f32,
    pub has_incident: bool,
}

impl ScoredChunk {
    /// Wrap a chunk that arrived outside the scored vector-search path
    /// (text-search fallback, keyword-expansion merge). Carries no store
    /// score, so it only survives the similarity guardrail when the
    /// guardrail itself is bypassed.
    #[must_use]
    pub fn unscored(chunk: Chunk) -> Self {
        let has_incident = detect_incident(&chunk.content);
        Self {
            chunk,
            similarity: 0.0,
            raw_sim: 0.0,
            has_incident,
        }
    }
}

/// Case-insensitive scan for narrative/incident markers.
#[must_use]
pub fn detect_incident(content: &str) -> bool {
    let lower = content.to_lowercase();
    INCIDENT_KEYWORDS.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
pub(crate) fn test_chunk(id: i64, source: &str, category: &str, content: &str) -> Chunk {
    Chunk {
        id,
        content: content.to_string(),
        source: source.to_string(),
        category: category.to_string(),
        tags: Vec::new(),
        key_concepts: Vec::new(),
        importance: 3,
        word_count: content.split_whitespace().count() as i32,
    }
}
