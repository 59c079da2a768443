//! Inference Provider Port - Interface for the multimodal evaluation model.
//!
//! This port abstracts the remote model that watches a speech recording and
//! writes an evaluation. The normalization pipeline never calls it; the
//! application layer does, and hands the raw text to the normalizer.
//!
//! # Design
//!
//! - One request carries one prompt plus an opaque media reference
//! - Generation length is bounded by `max_new_tokens`; hitting the bound is
//!   reported as `FinishReason::Length`, not as an error
//! - Errors cover transport and model failures only. Malformed output is
//!   the normalizer's concern.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl InferenceProvider for EchoProvider {
//!     async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
//!         Ok(InferenceResponse::new(request.prompt, "echo", FinishReason::Stop))
//!     }
//!     // ... other methods
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::EvaluationId;

/// Port for the evaluation model.
///
/// Implementations own model loading, media decoding and any retry policy.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Generates raw evaluation text for one prompt.
    async fn infer(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError>;

    /// Get provider information (name, model, limits).
    fn provider_info(&self) -> ProviderInfo;
}

/// Opaque reference to the recording being evaluated (path, URI, blob key).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaReference(String);

impl MediaReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request for one evaluation generation.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Full instruction text, rubric included.
    pub prompt: String,
    /// Recording to evaluate, if any.
    pub media: Option<MediaReference>,
    /// Generation budget in tokens.
    pub max_new_tokens: Option<u32>,
    /// Request metadata for tracing.
    pub metadata: RequestMetadata,
}

impl InferenceRequest {
    /// Creates a new inference request with required metadata.
    pub fn new(prompt: impl Into<String>, metadata: RequestMetadata) -> Self {
        Self {
            prompt: prompt.into(),
            media: None,
            max_new_tokens: None,
            metadata,
        }
    }

    /// Attaches the recording to evaluate.
    pub fn with_media(mut self, media: MediaReference) -> Self {
        self.media = Some(media);
        self
    }

    /// Sets the generation budget.
    pub fn with_max_new_tokens(mut self, max: u32) -> Self {
        self.max_new_tokens = Some(max);
        self
    }
}

/// Request metadata for tracing.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub evaluation_id: EvaluationId,
    /// Trace ID for distributed tracing.
    pub trace_id: String,
}

impl RequestMetadata {
    pub fn new(evaluation_id: EvaluationId, trace_id: impl Into<String>) -> Self {
        Self {
            evaluation_id,
            trace_id: trace_id.into(),
        }
    }
}

/// Raw generation returned by the model.
#[derive(Debug, Clone)]
pub struct InferenceResponse {
    /// Generated text, untrusted and possibly truncated.
    pub text: String,
    /// Model that generated the response.
    pub model: String,
    /// Why the model stopped generating.
    pub finish_reason: FinishReason,
    pub usage: TokenUsage,
}

impl InferenceResponse {
    pub fn new(text: impl Into<String>, model: impl Into<String>, finish_reason: FinishReason) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            finish_reason,
            usage: TokenUsage::default(),
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    /// True when generation stopped at the token budget.
    pub fn is_truncated(&self) -> bool {
        self.finish_reason == FinishReason::Length
    }
}

/// Token usage for one generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop (end of response).
    Stop,
    /// Hit the `max_new_tokens` budget.
    Length,
}

/// Provider information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "local-vlm", "mock").
    pub name: String,
    /// Model identifier.
    pub model: String,
    /// Whether the provider accepts video input.
    pub supports_video: bool,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            supports_video: true,
        }
    }

    pub fn with_video(mut self, supports: bool) -> Self {
        self.supports_video = supports;
        self
    }
}

/// Inference provider errors.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// Model is not loaded or the endpoint is down.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// The media reference could not be read or decoded.
    #[error("media unreadable: {0}")]
    MediaUnreadable(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Generation started but failed.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },
}

impl InferenceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn media_unreadable(message: impl Into<String>) -> Self {
        Self::MediaUnreadable(message.into())
    }

    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::GenerationFailed(message.into())
    }

    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InferenceError::Unavailable { .. } | InferenceError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_metadata() -> RequestMetadata {
        RequestMetadata::new(EvaluationId::new(), "trace-123")
    }

    #[test]
    fn inference_request_builder_works() {
        let request = InferenceRequest::new("Evaluate this speech", test_metadata())
            .with_media(MediaReference::new("uploads/speech.mp4"))
            .with_max_new_tokens(3072);

        assert_eq!(request.prompt, "Evaluate this speech");
        assert_eq!(request.media.as_ref().map(MediaReference::as_str), Some("uploads/speech.mp4"));
        assert_eq!(request.max_new_tokens, Some(3072));
        assert_eq!(request.metadata.trace_id, "trace-123");
    }

    #[test]
    fn token_usage_calculates_total() {
        let usage = TokenUsage::new(900, 300);
        assert_eq!(usage.total_tokens, 1200);
    }

    #[test]
    fn length_finish_marks_truncation() {
        assert!(InferenceResponse::new("{", "m", FinishReason::Length).is_truncated());
        assert!(!InferenceResponse::new("{}", "m", FinishReason::Stop).is_truncated());
    }

    #[test]
    fn finish_reason_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&FinishReason::Length).unwrap(), "\"length\"");
    }

    #[test]
    fn inference_error_retryable_classification() {
        assert!(InferenceError::unavailable("model not loaded").is_retryable());
        assert!(InferenceError::Timeout { timeout_secs: 30 }.is_retryable());
        assert!(!InferenceError::media_unreadable("bad codec").is_retryable());
        assert!(!InferenceError::generation_failed("oom").is_retryable());
    }

    #[test]
    fn inference_error_displays_correctly() {
        assert_eq!(
            InferenceError::unavailable("warming up").to_string(),
            "provider unavailable: warming up"
        );
        assert_eq!(
            InferenceError::Timeout { timeout_secs: 90 }.to_string(),
            "request timed out after 90s"
        );
    }
}
