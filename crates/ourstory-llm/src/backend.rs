//! Completion backend trait and mock implementation.
//!
//! The trait is the seam between the chat proxy and the external provider,
//! so handler logic can be tested against a deterministic in-process fake.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{LlmError, Result};
use crate::types::{CompletionRequest, CompletionResponse};

// ─────────────────────────────────────────────────────────────────────────────
// Completion Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for chat completion providers.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Execute a completion request and return the full response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Name of this backend (for logging).
    fn name(&self) -> &str;

    /// The configured model identifier.
    fn model(&self) -> &str;
}

/// A backend that can be shared across threads.
pub type SharedBackend = Arc<dyn CompletionBackend>;

// ─────────────────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────────────────

/// A scripted reply for [`MockBackend`].
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this completion.
    Reply(CompletionResponse),
    /// Fail as if the provider returned this HTTP status.
    Failure {
        /// HTTP status to report.
        status: u16,
        /// Error body to report.
        message: String,
    },
}

/// A mock backend for testing purposes.
///
/// Returns scripted responses in order and records every request it
/// receives. If more requests are made than responses available, an error
/// is returned.
#[derive(Debug)]
pub struct MockBackend {
    name: String,
    model: String,
    script: std::sync::Mutex<Vec<MockResponse>>,
    request_log: std::sync::Mutex<Vec<CompletionRequest>>,
    /// When set, every call fails with this status instead of consuming the script.
    repeat_failure: Option<u16>,
}

impl MockBackend {
    /// Create a new mock backend with the given script.
    pub fn new(script: Vec<MockResponse>) -> Self {
        Self {
            name: "mock".to_string(),
            model: "mock-model".to_string(),
            script: std::sync::Mutex::new(script),
            request_log: std::sync::Mutex::new(Vec::new()),
            repeat_failure: None,
        }
    }

    /// Create a mock backend that replies with a single text response.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(vec![MockResponse::Reply(CompletionResponse::text_reply(
            "mock-model",
            text,
        ))])
    }

    /// Create a mock backend whose every call fails with HTTP 500.
    pub fn failing() -> Self {
        Self::failing_with_status(500)
    }

    /// Create a mock backend whose every call fails with the given status.
    ///
    /// The script never runs dry: the failure repeats for each request.
    pub fn failing_with_status(status: u16) -> Self {
        let mut backend = Self::new(Vec::new());
        backend.name = "mock-failing".to_string();
        backend.repeat_failure = Some(status);
        backend
    }

    /// Override the model identifier reported by this backend.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Get all requests that were made to this backend.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.request_log.lock().unwrap().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.request_log.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.request_log.lock().unwrap().push(request);

        if let Some(status) = self.repeat_failure {
            return Err(LlmError::Api {
                status,
                message: "mock upstream failure".to_string(),
            });
        }

        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            return Err(LlmError::Api {
                status: 500,
                message: "MockBackend: no more responses available".to_string(),
            });
        }

        match script.remove(0) {
            MockResponse::Reply(response) => Ok(response),
            MockResponse::Failure { status, message } => Err(LlmError::Api { status, message }),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_single_response() {
        let backend = MockBackend::with_text("Hello!");

        let request = CompletionRequest::single_turn("mock-model", "Hi");
        let response = backend.complete(request).await.unwrap();

        assert_eq!(response.text(), Some("Hello!"));
        assert_eq!(backend.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_backend_responses_in_order() {
        let backend = MockBackend::new(vec![
            MockResponse::Reply(CompletionResponse::text_reply("m", "First")),
            MockResponse::Reply(CompletionResponse::text_reply("m", "Second")),
        ]);

        let first = backend
            .complete(CompletionRequest::single_turn("m", "a"))
            .await
            .unwrap();
        let second = backend
            .complete(CompletionRequest::single_turn("m", "b"))
            .await
            .unwrap();

        assert_eq!(first.text(), Some("First"));
        assert_eq!(second.text(), Some("Second"));
    }

    #[tokio::test]
    async fn test_mock_backend_exhausted_script_errors() {
        let backend = MockBackend::new(Vec::new());

        let err = backend
            .complete(CompletionRequest::single_turn("m", "a"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_failing_backend_repeats_failure() {
        let backend = MockBackend::failing_with_status(503);

        for _ in 0..3 {
            let err = backend
                .complete(CompletionRequest::single_turn("m", "a"))
                .await
                .unwrap_err();
            assert!(matches!(err, LlmError::Api { status: 503, .. }));
        }
        assert_eq!(backend.request_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_backend_records_requests() {
        let backend = MockBackend::with_text("ok");

        backend
            .complete(CompletionRequest::single_turn("mock-model", "what was our first date?"))
            .await
            .unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].messages[0].content, "what was our first date?");
    }
}
