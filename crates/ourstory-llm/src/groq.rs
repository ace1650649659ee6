//! Groq (OpenAI-compatible) API backend implementation.
//!
//! This module provides `GroqBackend` which connects to Groq's chat
//! completions endpoint or any OpenAI-compatible service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::debug;

use crate::backend::CompletionBackend;
use crate::error::{LlmError, Result};
use crate::types::{CompletionRequest, CompletionResponse};

/// Default Groq chat completions endpoint.
const DEFAULT_GROQ_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model when none is configured.
const DEFAULT_GROQ_MODEL: &str = "llama-3.1-70b-versatile";

/// Default timeout for requests. Generous: a slow reply is still a reply,
/// and on expiry the caller takes its fallback path.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for the Groq backend.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// API key for bearer authentication.
    pub api_key: String,

    /// Full URL of the chat completions endpoint.
    pub endpoint: String,

    /// Model to request.
    pub model: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl GroqConfig {
    /// Create a new config with the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_GROQ_ENDPOINT.to_string(),
            model: DEFAULT_GROQ_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create config from environment.
    ///
    /// Reads `GROQ_API_KEY` (required), `GROQ_API_URL` and `GROQ_MODEL`
    /// (optional, defaulted).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GROQ_API_KEY")
            .map_err(|_| LlmError::Config("GROQ_API_KEY environment variable not set".to_string()))?;

        let mut config = Self::new(api_key);
        if let Ok(endpoint) = std::env::var("GROQ_API_URL") {
            config.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("GROQ_MODEL") {
            config.model = model;
        }
        Ok(config)
    }

    /// Set a custom endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Groq Backend
// ─────────────────────────────────────────────────────────────────────────────

/// Groq (OpenAI-compatible) API backend.
pub struct GroqBackend {
    client: Client,
    config: GroqConfig,
}

impl GroqBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: GroqConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create a backend from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GroqConfig::from_env()?)
    }
}

#[async_trait]
impl CompletionBackend for GroqBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!(model = %request.model, endpoint = %self.config.endpoint, "Sending completion request");

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let completion = response.json::<CompletionResponse>().await?;
        Ok(completion)
    }

    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = GroqConfig::new("key");
        assert_eq!(config.endpoint, DEFAULT_GROQ_ENDPOINT);
        assert_eq!(config.model, DEFAULT_GROQ_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_config_builder() {
        let config = GroqConfig::new("key")
            .with_endpoint("http://localhost:9999/v1/chat/completions")
            .with_model("llama-3.1-8b-instant")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.endpoint, "http://localhost:9999/v1/chat/completions");
        assert_eq!(config.model, "llama-3.1-8b-instant");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_backend_reports_configured_model() {
        let backend = GroqBackend::new(GroqConfig::new("key").with_model("custom-model")).unwrap();
        assert_eq!(backend.model(), "custom-model");
        assert_eq!(backend.name(), "groq");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_a_network_error() {
        // Nothing listens on this port; the connection should fail fast.
        let backend = GroqBackend::new(
            GroqConfig::new("key")
                .with_endpoint("http://127.0.0.1:1/v1/chat/completions")
                .with_timeout(Duration::from_secs(2)),
        )
        .unwrap();

        let err = backend
            .complete(CompletionRequest::single_turn("m", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Network(_)));
    }
}
