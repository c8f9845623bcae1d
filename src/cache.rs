//! Response cache keyed by (language, normalized question)
//!
//! Exact-match memoization of finished responses; a hit short-circuits the
//! whole retrieval pipeline. Bounded: the oldest entries are evicted once
//! the configured capacity is reached. Injected into the pipeline at
//! startup, never held as ambient global state.

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::SourceAttribution;

/// Cached value for one (language, question) pair.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub response: String,
    pub source_attribution: Vec<SourceAttribution>,
    pub follow_up_questions: Vec<String>,
    pub topics_discussed: Vec<String>,
}

#[derive(Default)]
struct CacheInner {
    map: HashMap<String, CachedResponse>,
    // Insertion order for eviction
    order: VecDeque<String>,
}

/// In-memory response cache service.
pub struct ResponseCache {
    inner: RwLock<CacheInner>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

fn cache_key(lang: &str, question: &str) -> String {
    format!("{lang}::{}", question.trim().to_lowercase())
}

impl ResponseCache {
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: RwLock::new(CacheInner::default()),
            max_entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a finished response for this language/question pair.
    pub async fn get(&self, lang: &str, question: &str) -> Option<CachedResponse> {
        let key = cache_key(lang, question);
        let inner = self.inner.read().await;
        match inner.map.get(&key) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Response cache hit for key {}", key);
                Some(entry.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a finished response. Evicts oldest entries beyond capacity.
    pub async fn put(&self, lang: &str, question: &str, entry: CachedResponse) {
        let key = cache_key(lang, question);
        let mut inner = self.inner.write().await;
        while inner.map.len() >= self.max_entries {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.map.remove(&oldest);
        }
        if inner.map.insert(key.clone(), entry).is_none() {
            inner.order.push_back(key);
        }
    }

    /// (hits, misses) counters since startup.
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}
