//! Gemini REST client
//!
//! Each call is stateless: one prompt, one `generateContent` request. Server
//! errors are retried with exponential backoff; quota and key problems are
//! returned straight away with their own error variants.

use crate::auth;
use crate::circuit_breaker::CircuitBreaker;
use crate::types::{GeminiRequest, GeminiResponse, TextModel};
use async_trait::async_trait;
use autoblog_core::config::GeneratorConfig;
use autoblog_core::{AutoblogError, Result};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

const INITIAL_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 8_000;

/// Client for the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    max_retries: u32,
    breaker: Arc<CircuitBreaker>,
}

impl GeminiClient {
    /// Resolve the API key from the environment and build a client
    pub fn from_config(config: &GeneratorConfig) -> Result<Self> {
        let api_key = auth::resolve_api_key(&config.api_key_envs)?;
        Self::new(api_key, config)
    }

    pub fn new(api_key: impl Into<String>, config: &GeneratorConfig) -> Result<Self> {
        let api_key = api_key.into();
        if !auth::looks_like_api_key(&api_key) {
            tracing::warn!("API key does not look like a Google API key; trying anyway");
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AutoblogError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_retries: config.max_retries,
            breaker: Arc::new(CircuitBreaker::default()),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

/// Map a non-success response onto the error taxonomy
pub(crate) fn classify_failure(status: StatusCode, body: &str) -> AutoblogError {
    let lower = body.to_lowercase();

    if status == StatusCode::TOO_MANY_REQUESTS || lower.contains("quota") {
        return AutoblogError::QuotaExceeded(format!("Gemini API {}: {}", status, body));
    }

    let key_problem = lower.contains("api key") || lower.contains("api_key");
    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || (status == StatusCode::BAD_REQUEST && key_problem)
    {
        return AutoblogError::Auth(format!("Gemini API rejected the key ({}): {}", status, body));
    }

    AutoblogError::Generation(format!("Gemini API error {}: {}", status, body))
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if !self.breaker.can_execute() {
            return Err(AutoblogError::Generation(format!(
                "Too many consecutive API failures, retry in {} s",
                self.breaker.retry_in().as_secs().max(1)
            )));
        }

        let request = GeminiRequest::from_prompt(prompt);
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            tracing::debug!(
                "Sending generateContent to {} (attempt {})",
                self.model,
                retries + 1
            );

            let response = self
                .http
                .post(self.endpoint())
                .query(&[("key", self.api_key.as_str())])
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    // the URL carries the key
                    AutoblogError::Generation(format!("Failed to send request: {}", e.without_url()))
                })?;

            let status = response.status();

            if !status.is_success() {
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown".to_string());

                if status.is_server_error() && retries < self.max_retries {
                    retries += 1;
                    tracing::warn!(
                        "Server error ({}). Waiting {} ms before retry {}/{}",
                        status,
                        backoff_ms,
                        retries,
                        self.max_retries
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                    continue;
                }

                self.breaker.record_failure();
                tracing::error!(
                    "Gemini call failed with {} ({} in a row)",
                    status,
                    self.breaker.failure_count()
                );
                return Err(classify_failure(status, &body));
            }

            let parsed: GeminiResponse = response
                .json()
                .await
                .map_err(|e| {
                    AutoblogError::Generation(format!("Failed to parse response: {}", e.without_url()))
                })?;

            let Some(text) = parsed.text() else {
                let reason = parsed
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "empty response".to_string());
                self.breaker.record_failure();
                return Err(AutoblogError::Generation(format!(
                    "No content in response ({})",
                    reason
                )));
            };

            self.breaker.record_success();
            tracing::info!("Completion received ({} chars)", text.len());
            return Ok(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_classification() {
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert_eq!(err.code(), "QUOTA_EXCEEDED");

        let err = classify_failure(StatusCode::FORBIDDEN, "Quota exceeded for metric");
        assert_eq!(err.code(), "QUOTA_EXCEEDED");
    }

    #[test]
    fn test_key_classification() {
        let err = classify_failure(StatusCode::BAD_REQUEST, "API key not valid. Please pass a valid API key.");
        assert_eq!(err.code(), "INVALID_API_KEY");

        let err = classify_failure(StatusCode::UNAUTHORIZED, "unauthenticated");
        assert_eq!(err.code(), "INVALID_API_KEY");
    }

    #[test]
    fn test_other_failures_are_generation_errors() {
        let err = classify_failure(StatusCode::BAD_REQUEST, "invalid argument");
        assert_eq!(err.code(), "GENERATION_FAILED");

        let err = classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.code(), "GENERATION_FAILED");
    }

    #[test]
    fn test_debug_hides_key() {
        let client = GeminiClient::new("secret-test-key", &GeneratorConfig::default()).unwrap();
        assert!(!format!("{:?}", client).contains("secret-test-key"));
    }

    #[test]
    fn test_endpoint_uses_model() {
        let config = GeneratorConfig {
            api_base: "http://localhost:9999/".to_string(),
            ..GeneratorConfig::default()
        };
        let client = GeminiClient::new("test-key", &config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_is_generation_error() {
        let config = GeneratorConfig {
            api_base: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..GeneratorConfig::default()
        };
        let client = GeminiClient::new("test-key", &config).unwrap();
        let err = client.complete("hello").await.unwrap_err();
        assert_eq!(err.code(), "GENERATION_FAILED");
    }
}
