//! API request handlers

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::response::sse::Event;
use axum::response::sse::Sse;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use futures::stream;
use futures::StreamExt;
use tracing::error;
use tracing::info;

use super::rate_limit::RateLimiter;
use super::types::ChatParams;
use super::types::ChatRequest;
use super::types::ChatResponse;
use super::types::ErrorBody;
use super::types::HealthResponse;
use super::types::StreamEvent;
use crate::errors::SatsangRagError;
use crate::retrieval::ChatOutcome;
use crate::retrieval::ChatPipeline;
use crate::retrieval::ChatQuery;

/// Pacing delay between emitted stream chunks.
const STREAM_CHUNK_DELAY: Duration = Duration::from_millis(10);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
    pub rate_limiter: Arc<RateLimiter>,
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Chat handler (POST /api/chat, `?stream=1` for SSE)
pub async fn chat(
    State(state): State<AppState>,
    Query(params): Query<ChatParams>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Response {
    let client = client_ip(&headers);
    if !state.rate_limiter.allow(&client) {
        return error_response(&SatsangRagError::RateLimited);
    }

    let Some(message) = request
        .message
        .filter(|m| !m.trim().is_empty())
    else {
        return error_response(&SatsangRagError::Validation(
            "Message is required".to_string(),
        ));
    };

    info!("POST /api/chat ({} chars)", message.len());

    let query = ChatQuery {
        message,
        conversation_id: request.conversation_id,
        message_history: request.message_history,
        user_context: request.user_context,
        language_code: request.language_code,
        user_name: request.user_name,
    };

    match state.pipeline.answer(query).await {
        Ok(outcome) if params.wants_stream() => stream_response(outcome),
        Ok(outcome) => Json(ChatResponse::from(outcome)).into_response(),
        Err(err) => {
            error!("Chat pipeline failed: {}", err);
            error_response(&err)
        }
    }
}

/// First hop of X-Forwarded-For, or "unknown".
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| "unknown".to_string(), ToString::to_string)
}

/// Render the finished answer as a paced chunk stream with a terminal
/// sources event. The answer is fully generated before streaming begins;
/// the pacing is purely a perceived-typing effect.
fn stream_response(outcome: ChatOutcome) -> Response {
    let chars: Vec<char> = outcome.response.chars().collect();
    let step = (chars.len() / 100).max(24);
    let mut events: Vec<StreamEvent> = chars
        .chunks(step)
        .map(|piece| StreamEvent::Chunk {
            content: piece.iter().collect(),
        })
        .collect();
    events.push(StreamEvent::End {
        sources: outcome.source_attribution,
    });

    let stream = stream::iter(events.into_iter().enumerate()).then(|(idx, event)| async move {
        if idx > 0 {
            tokio::time::sleep(STREAM_CHUNK_DELAY).await;
        }
        Ok::<_, Infallible>(match Event::default().json_data(&event) {
            Ok(sse_event) => sse_event,
            Err(err) => Event::default().data(format!("{{\"type\":\"error\",\"details\":\"{err}\"}}")),
        })
    });

    Sse::new(stream).into_response()
}

/// Map a pipeline error to its HTTP response.
fn error_response(err: &SatsangRagError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match err {
        SatsangRagError::RateLimited => ErrorBody {
            error: "Too Many Requests. Please slow down and try again shortly.".to_string(),
            details: None,
        },
        SatsangRagError::Validation(message) => ErrorBody {
            error: message.clone(),
            details: None,
        },
        other => ErrorBody {
            error: "Internal server error".to_string(),
            details: Some(other.to_string()),
        },
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ip_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "9.8.7.6, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers), "9.8.7.6");
    }

    #[test]
    fn client_ip_defaults_to_unknown() {
        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn validation_errors_map_to_400() {
        let response = error_response(&SatsangRagError::Validation("Message is required".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rate_limit_maps_to_429() {
        let response = error_response(&SatsangRagError::RateLimited);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn upstream_errors_map_to_500() {
        let response = error_response(&SatsangRagError::Upstream {
            status: 503,
            message: "embedding service down".into(),
        });
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let response = error_response(&SatsangRagError::Configuration("no key".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
