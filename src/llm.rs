//! Language model gateway abstraction and implementations.
//!
//! Defines the [`LanguageModelGateway`] trait and concrete implementations:
//! - **[`DisabledGateway`]** — returns errors; used when no provider is configured.
//! - **[`OpenAiGateway`]** — calls the OpenAI chat completions API with retry and backoff.
//!
//! # Retry Strategy
//!
//! The OpenAI gateway uses exponential backoff for transient errors:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::config::LlmConfig;
use crate::error::GatewayError;

/// Trait for text-generation backends.
///
/// Implementations take a prepared system/user prompt pair and return
/// the generated answer text. Failures are reported as [`GatewayError`]
/// so the query router can embed them in a response instead of
/// propagating.
#[async_trait]
pub trait LanguageModelGateway: Send + Sync {
    /// Returns the model identifier (e.g. `"gpt-4o-mini"`).
    fn model_name(&self) -> &str;

    /// Generate a completion for the given prompts.
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, GatewayError>;
}

/// Instantiate the gateway named by the configuration.
pub fn create_gateway(config: &LlmConfig) -> Result<Box<dyn LanguageModelGateway>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledGateway)),
        "openai" => Ok(Box::new(OpenAiGateway::new(config)?)),
        other => anyhow::bail!("Unknown llm provider: {}", other),
    }
}

// ============ Disabled Gateway ============

/// A no-op gateway that always returns errors.
///
/// Used when `llm.provider = "disabled"` in the configuration.
pub struct DisabledGateway;

#[async_trait]
impl LanguageModelGateway for DisabledGateway {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn complete(&self, _system: &str, _user: &str) -> Result<String, GatewayError> {
        Err(GatewayError(
            "Language model provider is disabled".to_string(),
        ))
    }
}

// ============ OpenAI Gateway ============

/// Gateway using the OpenAI chat completions API.
///
/// Calls `POST /v1/chat/completions` with the configured model.
/// Requires the `OPENAI_API_KEY` environment variable to be set.
pub struct OpenAiGateway {
    model: String,
    timeout_secs: u64,
    max_retries: u32,
}

impl OpenAiGateway {
    /// Create a new OpenAI gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is not in the environment.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if std::env::var("OPENAI_API_KEY").is_err() {
            anyhow::bail!("OPENAI_API_KEY environment variable not set");
        }
        Ok(Self {
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl LanguageModelGateway for OpenAiGateway {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, GatewayError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| GatewayError("OPENAI_API_KEY not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| GatewayError(format!("failed to build HTTP client: {e}")))?;

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                debug!(attempt, delay_secs = delay.as_secs(), "retrying completion");
                tokio::time::sleep(delay).await;
            }

            let resp = client
                .post("https://api.openai.com/v1/chat/completions")
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response
                            .json()
                            .await
                            .map_err(|e| GatewayError(format!("invalid API response: {e}")))?;
                        return parse_completion(&json);
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err = Some(GatewayError(format!(
                            "OpenAI API error {}: {}",
                            status, body_text
                        )));
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    return Err(GatewayError(format!(
                        "OpenAI API error {}: {}",
                        status, body_text
                    )));
                }
                Err(e) => {
                    last_err = Some(GatewayError(format!("request failed: {e}")));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| GatewayError("completion failed with no attempts".to_string())))
    }
}

fn parse_completion(json: &serde_json::Value) -> Result<String, GatewayError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| GatewayError("response missing choices[0].message.content".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_gateway_always_errors() {
        let gateway = DisabledGateway;
        let err = gateway.complete("system", "user").await.unwrap_err();
        assert!(err.to_string().contains("disabled"));
    }

    #[test]
    fn test_create_gateway_rejects_unknown_provider() {
        let config = LlmConfig {
            provider: "mystery".to_string(),
            ..LlmConfig::default()
        };
        assert!(create_gateway(&config).is_err());
    }

    #[test]
    fn test_parse_completion() {
        let json = json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello."}}]
        });
        assert_eq!(parse_completion(&json).unwrap(), "Hello.");
        assert!(parse_completion(&json!({"choices": []})).is_err());
    }
}
