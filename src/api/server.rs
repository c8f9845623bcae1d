//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::rate_limit::RateLimiter;
use crate::api::routes;
use crate::cache::ResponseCache;
use crate::config::AppConfig;
use crate::database::Database;
use crate::embeddings::EmbeddingClient;
use crate::llm::GenerationClient;
use crate::retrieval::ChatPipeline;
use crate::Result;

/// Start the API server
pub async fn serve_api(config: &AppConfig, host: String, port: u16) -> Result<()> {
    info!("Starting satsang API server...");

    // Initialize services; the cache and limiter are explicit objects
    // injected here, not process globals
    let database = Arc::new(Database::from_config(config).await?);
    let embeddings = Arc::new(EmbeddingClient::new(config)?);
    let llm = Arc::new(GenerationClient::new(config)?);
    let cache = Arc::new(ResponseCache::new(config.cache.max_entries));
    let pipeline = Arc::new(ChatPipeline::new(database, embeddings, llm, cache));
    let rate_limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));

    let state = AppState {
        pipeline,
        rate_limiter,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /api/health - Health check");
    info!("  POST /api/chat   - Chat query (?stream=1 for SSE)");

    axum::serve(listener, app).await?;

    Ok(())
}
