//! Knowledge-base chunk queries: vector similarity search, keyword fallback
//! search, and the insert path used by offline ingestion.

use pgvector::Vector;

use super::Database;
use crate::models::Chunk;
use crate::models::ChunkRow;
use crate::Result;

/// A chunk returned by similarity search, with the store's raw score.
#[derive(Debug, Clone)]
pub struct MatchedChunk {
    pub chunk: Chunk,
    pub similarity: f32,
}

/// A chunk record to insert during ingestion.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct NewChunk {
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub key_concepts: Vec<String>,
    #[serde(default)]
    pub importance: Option<i32>,
    #[serde(default)]
    pub word_count: Option<i32>,
}

#[derive(Debug, sqlx::FromRow)]
struct MatchRow {
    id: i64,
    content: String,
    source: Option<String>,
    category: Option<String>,
    tags: Option<Vec<String>>,
    key_concepts: Option<Vec<String>>,
    importance: Option<i32>,
    word_count: Option<i32>,
    // PostgreSQL returns FLOAT8 (f64) from the distance operator
    similarity: f64,
}

impl Database {
    /// Nearest-neighbor search above a similarity floor.
    ///
    /// Cosine similarity is `1 - (embedding <=> query)`; results come back
    /// ordered best-first, at most `count` of them.
    pub async fn match_chunks(
        &self,
        embedding: &[f32],
        threshold: f32,
        count: i64,
    ) -> Result<Vec<MatchedChunk>> {
        let query_vector = Vector::from(embedding.to_vec());

        let rows: Vec<MatchRow> = sqlx::query_as(
            r"
            SELECT
                id, content, source, category, tags, key_concepts, importance, word_count,
                1 - (embedding <=> $1) AS similarity
            FROM knowledge_chunks
            WHERE 1 - (embedding <=> $1) >= $2
            ORDER BY similarity DESC
            LIMIT $3
            ",
        )
        .bind(&query_vector)
        .bind(f64::from(threshold))
        .bind(count)
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let similarity = row.similarity as f32;
                let chunk = Chunk::from(ChunkRow {
                    id: row.id,
                    content: row.content,
                    source: row.source,
                    category: row.category,
                    tags: row.tags,
                    key_concepts: row.key_concepts,
                    importance: row.importance,
                    word_count: row.word_count,
                });
                MatchedChunk { chunk, similarity }
            })
            .collect())
    }

    /// Full-text search over chunk content, ordered by importance.
    ///
    /// Degraded path used when embedding generation fails entirely.
    pub async fn text_search(&self, query: &str, limit: i64) -> Result<Vec<Chunk>> {
        let rows: Vec<ChunkRow> = sqlx::query_as(
            r"
            SELECT id, content, source, category, tags, key_concepts, importance, word_count
            FROM knowledge_chunks
            WHERE to_tsvector('english', content) @@ websearch_to_tsquery('english', $1)
            ORDER BY importance DESC NULLS LAST
            LIMIT $2
            ",
        )
        .bind(query)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Chunk::from).collect())
    }

    /// Simple ILIKE term search, used for keyword-expansion lookups and as
    /// the last-resort fallback when full-text search fails.
    pub async fn ilike_search(&self, terms: &[String], limit: i64) -> Result<Vec<Chunk>> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let conditions: Vec<String> = (1..=terms.len())
            .map(|idx| format!("content ILIKE ${idx}"))
            .collect();
        let sql = format!(
            "SELECT id, content, source, category, tags, key_concepts, importance, word_count \
             FROM knowledge_chunks WHERE {} ORDER BY importance DESC NULLS LAST LIMIT {limit}",
            conditions.join(" OR ")
        );

        let mut query = sqlx::query_as::<_, ChunkRow>(&sql);
        for term in terms {
            query = query.bind(format!("%{term}%"));
        }

        let rows = query.fetch_all(self.pool()).await?;
        Ok(rows.into_iter().map(Chunk::from).collect())
    }

    /// Insert one chunk with its embedding. Ingestion only; the serving
    /// pipeline never writes to the corpus.
    pub async fn insert_chunk(&self, chunk: &NewChunk, embedding: &[f32]) -> Result<i64> {
        let vector = Vector::from(embedding.to_vec());
        let word_count = chunk
            .word_count
            .unwrap_or_else(|| chunk.content.split_whitespace().count() as i32);

        let (id,): (i64,) = sqlx::query_as(
            r"
            INSERT INTO knowledge_chunks
                (content, embedding, source, category, tags, key_concepts, importance, word_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(&chunk.content)
        .bind(&vector)
        .bind(chunk.source.as_deref().unwrap_or("unknown"))
        .bind(chunk.category.as_deref().unwrap_or("general"))
        .bind(&chunk.tags)
        .bind(&chunk.key_concepts)
        .bind(chunk.importance.unwrap_or(3))
        .bind(word_count)
        .fetch_one(self.pool())
        .await?;

        Ok(id)
    }
}
