//! Generation API client

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::prompts;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::errors::SatsangRagError;
use crate::models::MessageTurn;
use crate::models::UserContext;

/// Client for the text-generation service.
///
/// Used for three things: the final answer, the history-aware rewrite, and
/// the pre-embedding translation. All share one request shape.
pub struct GenerationClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn default_safety_settings() -> Vec<SafetySetting> {
    [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    })
    .collect()
}

impl GenerationClient {
    /// Create a new generation client from configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.llm.request_timeout_secs,
            ))
            .pool_max_idle_per_host(16)
            .pool_idle_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| SatsangRagError::Http(e.to_string()))?;

        Ok(Self {
            endpoint: config.llm.endpoint.clone(),
            model: config.llm.model.clone(),
            api_key: config.llm_api_key(),
            client,
        })
    }

    /// Generate the final answer from the assembled context.
    ///
    /// # Errors
    /// - `Configuration` when no API key is available
    /// - `Upstream` on a non-success response
    pub async fn generate_answer(
        &self,
        question: &str,
        context: &str,
        history: &[MessageTurn],
        user_context: Option<&UserContext>,
        lang_short: &str,
    ) -> Result<String> {
        let system = prompts::system_prompt(user_context, history, lang_short);
        let contents = vec![
            Content {
                role: "user".to_string(),
                parts: vec![Part { text: system }],
            },
            Content {
                role: "model".to_string(),
                parts: vec![Part {
                    text: prompts::PERSONA_ACK.to_string(),
                }],
            },
            Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompts::answer_request(context, question, lang_short),
                }],
            },
        ];

        let config = GenerationConfig {
            temperature: 0.3,
            top_k: 40,
            top_p: 0.8,
            max_output_tokens: 1600,
        };

        self.generate(contents, Some(config), default_safety_settings())
            .await
    }

    /// Single-prompt completion used by the rewriter and translator.
    /// Returns the trimmed first-candidate text, possibly empty.
    pub async fn complete_one_line(&self, prompt: &str) -> Result<String> {
        let contents = vec![Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        }];
        let text = self.generate(contents, None, Vec::new()).await?;
        Ok(text.trim().to_string())
    }

    async fn generate(
        &self,
        contents: Vec<Content>,
        generation_config: Option<GenerationConfig>,
        safety_settings: Vec<SafetySetting>,
    ) -> Result<String> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            SatsangRagError::Configuration("generation API key is not configured".to_string())
        })?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={api_key}",
            self.endpoint, self.model
        );
        debug!("Calling generation API model {}", self.model);

        let request = GenerateRequest {
            contents,
            generation_config,
            safety_settings,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
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

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SatsangRagError::Http(format!("Failed to parse response: {e}")))?;

        Ok(result
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_is_a_configuration_error() {
        if std::env::var("GEMINI_API_KEY").is_ok() {
            return;
        }
        let mut config = AppConfig::default();
        config.llm.api_key = None;
        let client = GenerationClient::new(&config).unwrap();
        let err = client.complete_one_line("hello").await.unwrap_err();
        assert!(matches!(err, SatsangRagError::Configuration(_)));
    }
}
