//! Embedding generation for query text
//!
//! One upstream embedding service with a primary and a fallback model. A
//! failed primary call costs one extra round trip, never a retry loop.

pub mod client;

pub use client::EmbeddingClient;

/// Default embedding dimension for gemini-embedding-001
pub const DEFAULT_EMBEDDING_DIM: usize = 768;
