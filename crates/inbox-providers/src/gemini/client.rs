//! HTTP client for the Gemini API.
//!
//! Sends one non-streaming `generateContent` request per reply and retries
//! once on transient errors (429, 500, 503).

use std::time::Duration;

use async_trait::async_trait;
use inbox_common::GeminiConfig;
use inbox_core::{ContentGenerator, GenerationRequest, ProviderResult};
use tracing::{debug, instrument, warn};

use super::types::{
    ApiErrorResponse, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use crate::error::{truncate_body, ProviderError, Upstream};

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    default_model: String,
    temperature: f32,
    max_output_tokens: u32,
    max_retries: u32,
    retry_delay: Duration,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    #[cfg(test)]
    fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    fn build_request(&self, request: &GenerationRequest) -> GenerateContentRequest {
        let system = request.system_instruction.trim();
        GenerateContentRequest {
            system_instruction: (!system.is_empty()).then(|| Content::system(system)),
            contents: request.messages.iter().map(Content::from).collect(),
            generation_config: GenerationConfig {
                temperature: request.temperature.unwrap_or(self.temperature),
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    async fn complete(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let model = request
            .model
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model);
        let body = self.build_request(request);
        let url = self.endpoint(model);

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying generation request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&url)
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .await
                .map_err(|e| ProviderError::transport(Upstream::Generator, &e.without_url()))?;

            let status = response.status();
            debug!(status = %status, attempt, model, "generation response received");

            let text = response
                .text()
                .await
                .map_err(|e| ProviderError::transport(Upstream::Generator, &e.without_url()))?;

            if status.is_success() {
                let parsed: GenerateContentResponse =
                    serde_json::from_str(&text).map_err(|e| ProviderError::Decode {
                        upstream: Upstream::Generator,
                        message: e.to_string(),
                    })?;
                let output = parsed.text().trim().to_string();
                if output.is_empty() {
                    let reason = parsed
                        .candidates
                        .first()
                        .and_then(|c| c.finish_reason.clone())
                        .unwrap_or_default();
                    warn!(finish_reason = %reason, "generation returned no text");
                    return Err(ProviderError::Empty(Upstream::Generator));
                }
                return Ok(output);
            }

            let error = ProviderError::Status {
                upstream: Upstream::Generator,
                status: status.as_u16(),
                body: error_message(&text),
            };

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error, will retry");
                last_error = Some(error);
                continue;
            }

            return Err(error);
        }

        Err(last_error.unwrap_or(ProviderError::Empty(Upstream::Generator)))
    }
}

/// Prefer the API's structured error message over the raw body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!("{}: {}", api_err.error.status, api_err.error.message),
        Err(_) => truncate_body(body),
    }
}

fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[async_trait]
impl ContentGenerator for GeminiClient {
    #[instrument(skip(self, request), fields(messages = request.messages.len()))]
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String> {
        Ok(self.complete(request).await?)
    }
}
