//! Core data types shared across the retrieval pipeline

use serde::Deserialize;
use serde::Serialize;

/// A single indexed passage of corpus text with metadata.
///
/// Immutable once indexed; the pipeline never mutates the corpus. The
/// embedding column stays in the vector store and is never materialized here.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub id: i64,
    pub content: String,
    pub source: String,
    pub category: String,
    pub tags: Vec<String>,
    pub key_concepts: Vec<String>,
    pub importance: i32,
    pub word_count: i32,
}

/// Raw database row for a chunk. Nullable metadata is defaulted exactly once,
/// at this boundary, so downstream code works with a strict value type.
#[derive(Debug, sqlx::FromRow)]
pub struct ChunkRow {
    pub id: i64,
    pub content: String,
    pub source: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub key_concepts: Option<Vec<String>>,
    pub importance: Option<i32>,
    pub word_count: Option<i32>,
}

impl From<ChunkRow> for Chunk {
    fn from(row: ChunkRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            source: row.source.unwrap_or_else(|| "unknown".to_string()),
            category: row.category.unwrap_or_else(|| "general".to_string()),
            tags: row.tags.unwrap_or_default(),
            key_concepts: row.key_concepts.unwrap_or_default(),
            importance: row.importance.unwrap_or(3),
            word_count: row.word_count.unwrap_or(0),
        }
    }
}

/// Caller-supplied seeker profile, read-only input to re-weighting and
/// prompt construction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserContext {
    pub spiritual_level: Option<u8>,
    pub preferred_topics: Vec<String>,
    pub preferred_style: Option<String>,
    pub meditation_experience: Option<String>,
    pub spiritual_goals: Vec<String>,
}

impl UserContext {
    /// Spiritual level on a 1-10 scale, defaulting to 1 when unset.
    #[must_use]
    pub fn level(&self) -> u8 {
        self.spiritual_level.unwrap_or(1)
    }
}

/// Role of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One prior turn of the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTurn {
    pub role: Role,
    pub content: String,
}

/// Thematic section a passage was placed in by the context assembler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Incident,
    Teaching,
    Philosophy,
    Practice,
    Other,
}

/// Attribution record for one passage included in the final context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceAttribution {
    pub source: String,
    pub category: String,
    pub importance: i32,
    pub tags: Vec<String>,
    pub word_count: i32,
    #[serde(rename = "type")]
    pub section: SectionKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_row_defaults_applied_once() {
        let row = ChunkRow {
            id: 7,
            content: "The Self alone is real.".to_string(),
            source: None,
            category: None,
            tags: None,
            key_concepts: None,
            importance: None,
            word_count: None,
        };
        let chunk = Chunk::from(row);
        assert_eq!(chunk.source, "unknown");
        assert_eq!(chunk.category, "general");
        assert_eq!(chunk.importance, 3);
        assert_eq!(chunk.word_count, 0);
        assert!(chunk.tags.is_empty());
    }

    #[test]
    fn user_context_level_defaults_to_one() {
        let ctx = UserContext::default();
        assert_eq!(ctx.level(), 1);
        let ctx = UserContext {
            spiritual_level: Some(8),
            ..UserContext::default()
        };
        assert_eq!(ctx.level(), 8);
    }

    #[test]
    fn attribution_serializes_section_as_type() {
        let attribution = SourceAttribution {
            source: "Who am I?".to_string(),
            category: "teaching".to_string(),
            importance: 4,
            tags: vec!["self-inquiry".to_string()],
            word_count: 120,
            section: SectionKind::Incident,
        };
        let json = serde_json::to_value(&attribution).unwrap();
        assert_eq!(json["type"], "incident");
        assert_eq!(json["word_count"], 120);
    }

    #[test]
    fn user_context_deserializes_camel_case() {
        let json = r#"{"spiritualLevel":3,"preferredTopics":["meditation"],"spiritualGoals":[]}"#;
        let ctx: UserContext = serde_json::from_str(json).unwrap();
        assert_eq!(ctx.level(), 3);
        assert_eq!(ctx.preferred_topics, vec!["meditation"]);
    }
}
