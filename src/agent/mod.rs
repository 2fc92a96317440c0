pub mod gemini_api;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::RelayConfig;
use crate::errors::AppError;
use crate::models::Generation;

use self::gemini_api::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Anything that can turn one user message into generated text plus sources.
///
/// Every call maps to exactly one upstream request; implementations never
/// retry.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, message: &str) -> Result<Generation, AppError>;
}

/// Client for the Gemini `generateContent` endpoint with Google Search
/// grounding enabled. Each call is an independent single-turn request.
#[derive(Clone)]
pub struct GeminiAgentService {
    client: reqwest::Client,
    base_url: String,
    url: String,
    api_key: String,
    temperature: f32,
}

impl GeminiAgentService {
    pub fn new(config: &RelayConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| AppError::Unexpected(format!("Failed to build HTTP client: {e}")))?;
        let base_url = config.api_base_url.trim_end_matches('/').to_string();
        let url = format!(
            "{base_url}/v1beta/models/{}:generateContent",
            config.model
        );
        Ok(Self {
            client,
            base_url,
            url,
            api_key: config.api_key.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl GenerationClient for GeminiAgentService {
    async fn generate(&self, message: &str) -> Result<Generation, AppError> {
        let request = GenerateContentRequest::single_turn(message, self.temperature);

        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini request to {} failed: {e}", self.base_url);
                AppError::UpstreamUnavailable {
                    host: self.base_url.clone(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("Failed to read Gemini response body: {e}");
            AppError::UpstreamUnavailable {
                host: self.base_url.clone(),
                message: e.to_string(),
            }
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                });
            error!("Gemini returned {status}: {message}");
            return Err(AppError::UpstreamStatus { status: status.as_u16(), message });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Gemini response did not match the expected shape: {e}");
            AppError::malformed_upstream(e.to_string())
        })?;

        let generation = parsed.into_generation()?;
        debug!(
            "Gemini generated {} chars with {} grounding sources",
            generation.text.len(),
            generation.sources.len()
        );
        Ok(generation)
    }
}
