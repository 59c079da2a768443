//! Mock Inference Provider for testing and offline runs.
//!
//! Provides a configurable implementation of the `InferenceProvider` port,
//! so the evaluate-speech flow can run without a loaded model.
//!
//! # Features
//!
//! - Pre-configured generations, consumed in order
//! - Truncated generations (`FinishReason::Length`)
//! - Simulated delays for timeout testing
//! - Error injection for resilience testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockInferenceProvider::new()
//!     .with_response(r#"{"sections": {"Content": {"score": 8, "maxScore": 10}}}"#)
//!     .with_delay(Duration::from_millis(100));
//!
//! let response = provider.infer(request).await?;
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    FinishReason, InferenceError, InferenceProvider, InferenceRequest, InferenceResponse,
    ProviderInfo, TokenUsage,
};

/// Generation returned once the queue is exhausted.
const DEFAULT_GENERATION: &str = r#"{"sections": {}, "timeline_markers": []}"#;

/// Mock inference provider.
#[derive(Debug, Clone)]
pub struct MockInferenceProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<InferenceRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        text: String,
        usage: TokenUsage,
        finish_reason: FinishReason,
    },
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    Unavailable { message: String },
    MediaUnreadable { message: String },
    GenerationFailed { message: String },
    Timeout { timeout_secs: u32 },
}

impl From<MockError> for InferenceError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::Unavailable { message } => InferenceError::unavailable(message),
            MockError::MediaUnreadable { message } => InferenceError::media_unreadable(message),
            MockError::GenerationFailed { message } => InferenceError::generation_failed(message),
            MockError::Timeout { timeout_secs } => InferenceError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockInferenceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInferenceProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-vlm-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a complete generation to the queue.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_response_full(text, TokenUsage::new(1200, 400), FinishReason::Stop)
    }

    /// Adds a generation that stopped at the token budget.
    pub fn with_truncated_response(self, text: impl Into<String>) -> Self {
        self.with_response_full(text, TokenUsage::new(1200, 3072), FinishReason::Length)
    }

    pub fn with_response_full(
        self,
        text: impl Into<String>,
        usage: TokenUsage,
        finish_reason: FinishReason,
    ) -> Self {
        lock(&self.responses).push_back(MockResponse::Success {
            text: text.into(),
            usage,
            finish_reason,
        });
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        lock(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<InferenceRequest> {
        lock(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                text: DEFAULT_GENERATION.to_string(),
                usage: TokenUsage::new(5, 10),
                finish_reason: FinishReason::Stop,
            })
    }
}

/// Locks shared mock state; a panicked test thread must not wedge the mock.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl InferenceProvider for MockInferenceProvider {
    async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success {
                text,
                usage,
                finish_reason,
            } => Ok(InferenceResponse::new(text, self.info.model.clone(), finish_reason).with_usage(usage)),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::EvaluationId;
    use crate::ports::{MediaReference, RequestMetadata};

    fn test_request() -> InferenceRequest {
        InferenceRequest::new("Evaluate", RequestMetadata::new(EvaluationId::new(), "trace-123"))
            .with_media(MediaReference::new("speech.mp4"))
    }

    #[tokio::test]
    async fn returns_configured_response() {
        let provider = MockInferenceProvider::new().with_response("{\"sections\": {}}");

        let response = provider.infer(test_request()).await.unwrap();

        assert_eq!(response.text, "{\"sections\": {}}");
        assert_eq!(response.model, "mock-vlm-1");
        assert_eq!(response.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn returns_responses_in_order() {
        let provider = MockInferenceProvider::new()
            .with_response("first")
            .with_truncated_response("second");

        assert_eq!(provider.infer(test_request()).await.unwrap().text, "first");
        let second = provider.infer(test_request()).await.unwrap();
        assert_eq!(second.text, "second");
        assert!(second.is_truncated());
    }

    #[tokio::test]
    async fn falls_back_to_default_generation() {
        let provider = MockInferenceProvider::new();
        let response = provider.infer(test_request()).await.unwrap();
        assert_eq!(response.text, DEFAULT_GENERATION);
    }

    #[tokio::test]
    async fn injects_errors() {
        let provider = MockInferenceProvider::new().with_error(MockError::Unavailable {
            message: "model not loaded".to_string(),
        });

        let err = provider.infer(test_request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Unavailable { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn records_calls() {
        let provider = MockInferenceProvider::new();
        provider.infer(test_request()).await.unwrap();
        provider.infer(test_request()).await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(
            provider.get_calls()[0].media.as_ref().map(MediaReference::as_str),
            Some("speech.mp4")
        );

        provider.clear_calls();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn simulates_delay() {
        let provider = MockInferenceProvider::new().with_delay(Duration::from_millis(50));

        let start = std::time::Instant::now();
        provider.infer(test_request()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
