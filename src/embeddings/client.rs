//! Embedding API client with a single fallback hop

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::SatsangRagError;

/// Client for generating query embeddings.
///
/// Calls the primary model first; on a non-success response it makes exactly
/// one attempt against the fallback model. No retry or backoff beyond that
/// hop, trading latency for availability headroom.
pub struct EmbeddingClient {
    endpoint: String,
    model: String,
    fallback_model: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValue,
}

#[derive(Deserialize)]
struct EmbeddingValue {
    value: Vec<f32>,
}

impl EmbeddingClient {
    /// Create a new embedding client from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.embeddings.request_timeout_secs,
            ))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| SatsangRagError::Http(e.to_string()))?;

        Ok(Self {
            endpoint: config.embeddings.endpoint.clone(),
            model: config.embeddings.model.clone(),
            fallback_model: config.embeddings.fallback_model.clone(),
            api_key: config.embeddings_api_key(),
            client,
        })
    }

    /// Generate an embedding vector for the given text.
    ///
    /// # Errors
    /// - `Configuration` when no API key is available
    /// - `Upstream` when both the primary and fallback models fail
    /// - `Http` on transport failures
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            SatsangRagError::Configuration("embedding API key is not configured".to_string())
        })?;

        match self.embed_with_model(&self.model, api_key, text).await {
            Ok(embedding) => Ok(embedding),
            Err(primary_err) => {
                warn!(
                    "Primary embedding model {} failed ({}), trying fallback {}",
                    self.model, primary_err, self.fallback_model
                );
                self.embed_with_model(&self.fallback_model, api_key, text)
                    .await
            }
        }
    }

    async fn embed_with_model(&self, model: &str, api_key: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!(
            "{}/v1beta/models/{model}:embedText?key={api_key}",
            self.endpoint
        );
        debug!("Calling embedding API model {}", model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&EmbedRequest { text })
            .send()
            .await
            .map_err(|e| SatsangRagError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SatsangRagError::Upstream { status, message });
        }

        let result: EmbedResponse = response
            .json()
            .await
            .map_err(|e| SatsangRagError::Http(format!("Failed to parse response: {e}")))?;

        Ok(result.embedding.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_key() -> AppConfig {
        let mut config = AppConfig::default();
        config.embeddings.api_key = None;
        config
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_error() {
        // Guard against a key leaking in from the environment
        if std::env::var("GEMINI_API_KEY").is_ok() {
            return;
        }
        let client = EmbeddingClient::new(&config_without_key()).unwrap();
        let err = client.embed("who am i?").await.unwrap_err();
        assert!(matches!(err, SatsangRagError::Configuration(_)));
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn embeds_real_text() {
        let config = AppConfig::default();
        let client = EmbeddingClient::new(&config).unwrap();
        let embedding = client.embed("What is self-inquiry?").await.unwrap();
        assert!(!embedding.is_empty());
    }
}
