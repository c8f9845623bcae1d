//! Query preparation: history-aware rewriting, translation to the indexing
//! language, and keyword expansion.
//!
//! The rewrite and translate steps must never fail the request. Each makes a
//! single attempt and degrades to its input on any error, with the
//! degradation visible in the returned [`Degradable`] rather than hidden in a
//! catch block.

use std::sync::Arc;

use tracing::debug;

use crate::lang::looks_transliterated;
use crate::llm::prompts;
use crate::llm::GenerationClient;
use crate::models::MessageTurn;

/// Outcome of a sub-step that prefers a worse value over a failed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradable<T> {
    /// The step ran as intended.
    Full(T),
    /// The step failed; `value` is the safe fallback.
    Degraded { value: T, reason: String },
}

impl<T> Degradable<T> {
    /// The carried value, regardless of degradation.
    pub fn value(&self) -> &T {
        match self {
            Self::Full(value) | Self::Degraded { value, .. } => value,
        }
    }

    /// Consume into the carried value.
    pub fn into_value(self) -> T {
        match self {
            Self::Full(value) | Self::Degraded { value, .. } => value,
        }
    }

    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Synonym groups bridging English phrasing and the corpus vocabulary.
const EXPANSION_GROUPS: [&[&str]; 5] = [
    &["who am i", "nan yar", "self inquiry", "atma vichara"],
    &["arunachala", "mount arunachala", "tiruvannamalai"],
    &["surrender", "prapatti", "bhakti"],
    &["grace", "kripa"],
    &["meditation", "dhyana"],
];

/// Expand a question into related corpus terms.
///
/// Returns the union of every matched synonym group, deduplicated, in group
/// order. Empty when nothing matches.
#[must_use]
pub fn expand_query_terms(question: &str) -> Vec<String> {
    let lower = question.to_lowercase();
    let mut expansions: Vec<String> = Vec::new();
    for group in EXPANSION_GROUPS {
        if group.iter().any(|term| lower.contains(term)) {
            for term in group {
                if !expansions.iter().any(|t| t == term) {
                    expansions.push((*term).to_string());
                }
            }
        }
    }
    expansions
}

/// Rewrites conversational questions into self-contained retrieval queries
/// and translates them to the corpus's indexing language.
pub struct QueryRewriter {
    llm: Arc<GenerationClient>,
}

impl QueryRewriter {
    #[must_use]
    pub fn new(llm: Arc<GenerationClient>) -> Self {
        Self { llm }
    }

    /// Restate the question using the last two turns of conversation so it
    /// stands alone. Used only to improve retrieval, never shown to the user.
    pub async fn rewrite_with_history(
        &self,
        message: &str,
        history: &[MessageTurn],
    ) -> Degradable<String> {
        let prompt = prompts::rewrite_prompt(message, history);
        match self.llm.complete_one_line(&prompt).await {
            Ok(rewritten) if !rewritten.is_empty() => Degradable::Full(rewritten),
            Ok(_) => Degradable::Degraded {
                value: message.to_string(),
                reason: "rewrite returned empty output".to_string(),
            },
            Err(err) => {
                debug!("History-aware rewrite degraded: {}", err);
                Degradable::Degraded {
                    value: message.to_string(),
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Translate the query to English for embedding, unless it is already
    /// English and does not read like a romanized Telugu question.
    pub async fn translate_to_english(&self, text: &str, lang_short: &str) -> Degradable<String> {
        if lang_short == "en" && !looks_transliterated(text) {
            return Degradable::Full(text.to_string());
        }

        let prompt = prompts::translate_prompt(text);
        match self.llm.complete_one_line(&prompt).await {
            Ok(translated) if !translated.is_empty() => Degradable::Full(translated),
            Ok(_) => Degradable::Degraded {
                value: text.to_string(),
                reason: "translation returned empty output".to_string(),
            },
            Err(err) => {
                debug!("Translation degraded: {}", err);
                Degradable::Degraded {
                    value: text.to_string(),
                    reason: err.to_string(),
                }
            }
        }
    }
}
