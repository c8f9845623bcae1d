//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::models::MessageTurn;
use crate::models::SourceAttribution;
use crate::models::UserContext;
use crate::retrieval::ChatOutcome;
use crate::retrieval::SearchStats;

/// Chat request body. `message` is validated in the handler so its absence
/// maps to a 400 rather than a body-rejection status.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub message_history: Vec<MessageTurn>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_context: Option<UserContext>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Chat response body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
    pub follow_up_questions: Vec<String>,
    pub source_attribution: Vec<SourceAttribution>,
    pub topics_discussed: Vec<String>,
    pub detected_language: String,
    pub search_stats: SearchStats,
}

impl From<ChatOutcome> for ChatResponse {
    fn from(outcome: ChatOutcome) -> Self {
        Self {
            response: outcome.response,
            conversation_id: outcome.conversation_id,
            follow_up_questions: outcome.follow_up_questions,
            source_attribution: outcome.source_attribution,
            topics_discussed: outcome.topics_discussed,
            detected_language: outcome.detected_language,
            search_stats: outcome.search_stats,
        }
    }
}

/// Server-sent event payloads for the streaming response mode
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Chunk { content: String },
    End { sources: Vec<SourceAttribution> },
}

/// Query parameters on the chat endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ChatParams {
    #[serde(default)]
    pub stream: Option<String>,
}

impl ChatParams {
    /// `?stream=1` selects the server-sent-event response mode.
    #[must_use]
    pub fn wants_stream(&self) -> bool {
        self.stream.as_deref() == Some("1")
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
