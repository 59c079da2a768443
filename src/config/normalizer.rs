//! Response normalizer configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::scoring::{NormalizerSettings, ScrapeWindows};

/// Tunables for turning raw generations into scoring documents
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Characters of raw output quoted when no JSON is recovered
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Scraper look-ahead after a category name
    #[serde(default = "default_category_window")]
    pub category_window_chars: usize,

    /// Scraper look-ahead after a subcategory name
    #[serde(default = "default_subcategory_window")]
    pub subcategory_window_chars: usize,

    /// Markers quoted in synthesized section feedback
    #[serde(default = "default_max_observations")]
    pub max_feedback_observations: usize,
}

impl NormalizerConfig {
    /// Domain settings for `ResponseNormalizer`
    pub fn settings(&self) -> NormalizerSettings {
        NormalizerSettings {
            preview_chars: self.preview_chars,
            scrape_windows: ScrapeWindows {
                category_chars: self.category_window_chars,
                subcategory_chars: self.subcategory_window_chars,
            },
            max_feedback_observations: self.max_feedback_observations,
        }
    }

    /// Validate normalizer configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let checks = [
            (self.preview_chars, "NORMALIZER__PREVIEW_CHARS"),
            (self.category_window_chars, "NORMALIZER__CATEGORY_WINDOW_CHARS"),
            (self.subcategory_window_chars, "NORMALIZER__SUBCATEGORY_WINDOW_CHARS"),
            (self.max_feedback_observations, "NORMALIZER__MAX_FEEDBACK_OBSERVATIONS"),
        ];
        match checks.iter().find(|(value, _)| *value == 0) {
            Some((_, name)) => Err(ValidationError::MustBePositive(name)),
            None => Ok(()),
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            preview_chars: default_preview_chars(),
            category_window_chars: default_category_window(),
            subcategory_window_chars: default_subcategory_window(),
            max_feedback_observations: default_max_observations(),
        }
    }
}

fn default_preview_chars() -> usize {
    500
}

fn default_category_window() -> usize {
    280
}

fn default_subcategory_window() -> usize {
    120
}

fn default_max_observations() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_domain_defaults() {
        assert_eq!(NormalizerConfig::default().settings(), NormalizerSettings::default());
    }

    #[test]
    fn test_settings_mapping() {
        let config = NormalizerConfig {
            preview_chars: 100,
            category_window_chars: 300,
            subcategory_window_chars: 90,
            max_feedback_observations: 3,
        };
        let settings = config.settings();
        assert_eq!(settings.preview_chars, 100);
        assert_eq!(settings.scrape_windows.category_chars, 300);
        assert_eq!(settings.scrape_windows.subcategory_chars, 90);
        assert_eq!(settings.max_feedback_observations, 3);
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = NormalizerConfig {
            subcategory_window_chars: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MustBePositive("NORMALIZER__SUBCATEGORY_WINDOW_CHARS"))
        );
    }
}
