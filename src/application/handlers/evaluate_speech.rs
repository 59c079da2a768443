//! EvaluateSpeechHandler - Command handler for grading one speech recording.
//!
//! Builds the rubric prompt, asks the inference provider for an evaluation
//! and normalizes whatever text comes back into a rubric-conformant
//! `ScoringDocument`.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::domain::foundation::EvaluationId;
use crate::domain::rubric::{EvaluationPrompt, Rubric};
use crate::domain::scoring::{ResponseNormalizer, ScoringDocument};
use crate::ports::{
    BehaviorCatalog, FinishReason, InferenceError, InferenceProvider, InferenceRequest,
    MediaReference, RequestMetadata,
};

/// Command to evaluate a speech.
#[derive(Debug, Clone, Default)]
pub struct EvaluateSpeechCommand {
    pub media: Option<MediaReference>,
    pub rubric: Option<Rubric>,
}

/// Result of a completed evaluation.
#[derive(Debug, Clone)]
pub struct EvaluateSpeechResult {
    pub evaluation_id: EvaluationId,
    pub document: ScoringDocument,
    pub finish_reason: FinishReason,
    pub model: String,
    pub completed_at: DateTime<Utc>,
}

/// Errors from the evaluate-speech flow. Malformed model output is not an
/// error; it degrades the returned document instead.
#[derive(Debug, thiserror::Error)]
pub enum EvaluateSpeechError {
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}

/// Handler settings.
#[derive(Debug, Clone)]
pub struct EvaluateSpeechConfig {
    /// Generation budget passed to the provider.
    pub max_new_tokens: u32,
}

impl Default for EvaluateSpeechConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 3072,
        }
    }
}

/// Handler for evaluating speeches.
pub struct EvaluateSpeechHandler {
    provider: Arc<dyn InferenceProvider>,
    behaviors: Arc<dyn BehaviorCatalog>,
    normalizer: ResponseNormalizer,
    config: EvaluateSpeechConfig,
}

impl EvaluateSpeechHandler {
    pub fn new(
        provider: Arc<dyn InferenceProvider>,
        behaviors: Arc<dyn BehaviorCatalog>,
        normalizer: ResponseNormalizer,
        config: EvaluateSpeechConfig,
    ) -> Self {
        Self {
            provider,
            behaviors,
            normalizer,
            config,
        }
    }

    #[tracing::instrument(skip_all, fields(evaluation_id))]
    pub async fn handle(
        &self,
        cmd: EvaluateSpeechCommand,
    ) -> Result<EvaluateSpeechResult, EvaluateSpeechError> {
        let evaluation_id = EvaluationId::new();
        tracing::Span::current().record("evaluation_id", tracing::field::display(&evaluation_id));

        // 1. Build the prompt; a broken catalogue only loses the behavior block
        let behaviors = match self.behaviors.behaviors().await {
            Ok(behaviors) => behaviors,
            Err(e) => {
                tracing::warn!(error = %e, "behavior catalog unavailable; prompting without it");
                Vec::new()
            }
        };
        let prompt = EvaluationPrompt::build(cmd.rubric.as_ref(), &behaviors);

        // 2. Generate
        let mut request = InferenceRequest::new(
            prompt,
            RequestMetadata::new(evaluation_id, evaluation_id.to_string()),
        )
        .with_max_new_tokens(self.config.max_new_tokens);
        if let Some(media) = cmd.media {
            request = request.with_media(media);
        }
        let response = self.provider.infer(request).await?;

        if response.is_truncated() {
            tracing::warn!(
                max_new_tokens = self.config.max_new_tokens,
                completion_tokens = response.usage.completion_tokens,
                "generation hit the token budget; output may be truncated"
            );
        }

        // 3. Normalize
        let document = self.normalizer.normalize(&response.text, cmd.rubric.as_ref());

        tracing::info!(
            model = %response.model,
            sections = document.sections.len(),
            markers = document.timeline_markers.len(),
            total_score = document.total_score(),
            "evaluation completed"
        );

        Ok(EvaluateSpeechResult {
            evaluation_id,
            document,
            finish_reason: response.finish_reason,
            model: response.model,
            completed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockError, MockInferenceProvider};
    use crate::adapters::behavior::StaticBehaviorCatalog;
    use crate::domain::rubric::{BehaviorReference, RubricCategory, RubricSubcategory};
    use crate::domain::scoring::DIAGNOSTIC_PREFIX;
    use crate::ports::{BehaviorCatalogError, ProviderInfo};
    use async_trait::async_trait;

    struct FailingCatalog;

    #[async_trait]
    impl BehaviorCatalog for FailingCatalog {
        async fn behaviors(&self) -> Result<Vec<BehaviorReference>, BehaviorCatalogError> {
            Err(BehaviorCatalogError::InvalidFormat {
                path: "behaviors.json".into(),
                message: "expected array".to_string(),
            })
        }
    }

    fn rubric() -> Rubric {
        Rubric {
            total_points: Some(50.0),
            categories: vec![RubricCategory::new("Content")
                .with_subcategory(RubricSubcategory::new("Organization"))
                .with_subcategory(RubricSubcategory::new("Evidence"))],
            ..Default::default()
        }
    }

    fn handler(provider: MockInferenceProvider) -> EvaluateSpeechHandler {
        EvaluateSpeechHandler::new(
            Arc::new(provider),
            Arc::new(StaticBehaviorCatalog::new(vec![BehaviorReference::new(
                "Hands in pockets",
                "delivery",
            )])),
            ResponseNormalizer::default(),
            EvaluateSpeechConfig::default(),
        )
    }

    fn command() -> EvaluateSpeechCommand {
        EvaluateSpeechCommand {
            media: Some(MediaReference::new("uploads/speech.mp4")),
            rubric: Some(rubric()),
        }
    }

    #[tokio::test]
    async fn normalizes_model_output_against_rubric() {
        let provider = MockInferenceProvider::new().with_response(
            r#"{"sections": {"Content": {"score": 8, "maxScore": 10, "subcategories": [{"name": "Organization", "points": 4, "maxPoints": 5}]}}}"#,
        );
        let result = handler(provider).handle(command()).await.unwrap();

        let content = result.document.sections.get("Content").unwrap();
        assert_eq!(content.subcategories[0].max_points, Some(25.0));
        assert_eq!(content.subcategories[0].points, 20.0);
        assert_eq!(result.finish_reason, FinishReason::Stop);
        assert_eq!(result.model, "mock-vlm-1");
    }

    #[tokio::test]
    async fn sends_prompt_media_and_budget() {
        let provider = MockInferenceProvider::new();
        let handler = handler(provider.clone());

        handler.handle(command()).await.unwrap();

        let calls = provider.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].max_new_tokens, Some(3072));
        assert_eq!(
            calls[0].media.as_ref().map(MediaReference::as_str),
            Some("uploads/speech.mp4")
        );
        assert!(calls[0].prompt.contains("exactly these keys: Content"));
        assert!(calls[0].prompt.contains("- Hands in pockets (delivery)"));
    }

    #[tokio::test]
    async fn truncated_generation_is_still_normalized() {
        let provider = MockInferenceProvider::new()
            .with_truncated_response(r#"{"sections": {"Content": {"score": 5, "maxScore": 10"#);
        let result = handler(provider).handle(command()).await.unwrap();

        assert_eq!(result.finish_reason, FinishReason::Length);
        let content = result.document.sections.get("Content").unwrap();
        assert_eq!(content.max_score, Some(50.0));
        assert_eq!(content.score, 25.0);
    }

    #[tokio::test]
    async fn unparseable_generation_returns_diagnostic_document() {
        let provider = MockInferenceProvider::new().with_response("Sorry, I cannot watch videos.");
        let result = handler(provider).handle(command()).await.unwrap();

        assert!(result.document.sections.is_empty());
        assert!(result.document.overall_comments.starts_with(DIAGNOSTIC_PREFIX));
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let provider = MockInferenceProvider::new().with_error(MockError::MediaUnreadable {
            message: "unsupported codec".to_string(),
        });
        let err = handler(provider).handle(command()).await.unwrap_err();

        assert!(matches!(
            err,
            EvaluateSpeechError::Inference(InferenceError::MediaUnreadable(_))
        ));
    }

    #[tokio::test]
    async fn catalog_failure_does_not_block_evaluation() {
        let provider = MockInferenceProvider::new()
            .with_provider_info(ProviderInfo::new("mock", "other-model"));
        let handler = EvaluateSpeechHandler::new(
            Arc::new(provider.clone()),
            Arc::new(FailingCatalog),
            ResponseNormalizer::default(),
            EvaluateSpeechConfig { max_new_tokens: 512 },
        );

        let result = handler.handle(command()).await.unwrap();

        assert_eq!(result.model, "other-model");
        assert_eq!(provider.get_calls()[0].max_new_tokens, Some(512));
        assert!(!provider.get_calls()[0].prompt.contains("Identify and timestamp"));
    }
}
