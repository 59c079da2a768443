//! Inference configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::application::EvaluateSpeechConfig;

/// Inference request configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct InferenceConfig {
    /// Generation budget per evaluation
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// JSON behavior catalogue woven into the prompt
    pub behavior_references_path: Option<PathBuf>,
}

impl InferenceConfig {
    /// Settings for the evaluate-speech handler
    pub fn handler_config(&self) -> EvaluateSpeechConfig {
        EvaluateSpeechConfig {
            max_new_tokens: self.max_new_tokens,
        }
    }

    /// Validate inference configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_new_tokens == 0 {
            return Err(ValidationError::InvalidTokenBudget);
        }
        Ok(())
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: default_max_new_tokens(),
            behavior_references_path: None,
        }
    }
}

fn default_max_new_tokens() -> u32 {
    3072
}
