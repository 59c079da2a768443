//! Response normalizer - turns one raw generation into a `ScoringDocument`.
//!
//! # Flow
//!
//! ```text
//! raw text ──► extract ──┬── nothing recovered ──► diagnostic document
//!                        │
//!                        └── extracted ──► markers ──► sections
//!                                                       │
//!              (absent + rubric)  placeholders + scrape ┤
//!              (all zero + rubric) scrape a copy        ┤
//!                                                       ▼
//!                                      backfill feedback ──► rescale to rubric
//! ```
//!
//! The normalizer is a pure function of `(raw, rubric)`. It holds only
//! immutable settings, so one instance can be shared freely across threads.

use serde_json::Value;

use super::extractor::{ExtractedResponse, ResponseExtractor};
use super::feedback::backfill_feedback;
use super::normalizer::normalize_sections;
use super::scraper::{placeholder_sections, scrape_scores, ScrapeWindows};
use super::timeline::normalize_markers;
use super::{ScoringDocument, Sections};
use crate::domain::rubric::{PointDistribution, Rubric};

/// Prefix of `overallComments` when no JSON could be recovered.
pub const DIAGNOSTIC_PREFIX: &str = "Model could not return valid JSON. Raw output: ";

/// `overallComments` when only timeline markers came back.
pub const SCORES_MISSING_MESSAGE: &str =
    "Scores were not returned by the model; see timeline for observed behaviors.";

/// Tunables for the normalization pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerSettings {
    /// Characters of raw output quoted in the diagnostic document.
    pub preview_chars: usize,
    pub scrape_windows: ScrapeWindows,
    /// Maximum markers quoted in synthesized feedback.
    pub max_feedback_observations: usize,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            preview_chars: 500,
            scrape_windows: ScrapeWindows::default(),
            max_feedback_observations: 5,
        }
    }
}

/// Orchestrates extraction, fallback scraping, feedback backfill and rescaling.
#[derive(Debug, Clone, Default)]
pub struct ResponseNormalizer {
    settings: NormalizerSettings,
    extractor: ResponseExtractor,
}

impl ResponseNormalizer {
    pub fn new(settings: NormalizerSettings) -> Self {
        Self {
            settings,
            extractor: ResponseExtractor::new(),
        }
    }

    pub fn settings(&self) -> &NormalizerSettings {
        &self.settings
    }

    /// Normalizes one raw generation against an optional rubric.
    ///
    /// Never fails: degraded input produces a degraded but well-formed
    /// document (empty sections, diagnostic comments).
    pub fn normalize(&self, raw: &str, rubric: Option<&Rubric>) -> ScoringDocument {
        let Some(extracted) = self.extractor.extract(raw) else {
            tracing::debug!(raw_len = raw.len(), "no JSON recovered from model output");
            return self.diagnostic_document(raw);
        };

        let ExtractedResponse {
            sections: raw_sections,
            timeline_markers,
            overall_comments,
            transcript,
        } = extracted;

        let timeline_markers = normalize_markers(timeline_markers.as_ref());
        let mut overall_comments = overall_comments.unwrap_or_default();
        let mut sections = raw_sections
            .as_ref()
            .map(Sections::from_model_value)
            .unwrap_or_default();

        let distribution = rubric.map(PointDistribution::from_rubric);

        if let Some(distribution) = &distribution {
            if sections.is_empty() {
                tracing::debug!("model returned no sections; scraping into rubric placeholders");
                sections = scrape_scores(
                    raw,
                    &placeholder_sections(distribution),
                    self.settings.scrape_windows,
                );
                if !timeline_markers.is_empty()
                    && !sections.any_score_positive()
                    && overall_comments.trim().is_empty()
                {
                    overall_comments = SCORES_MISSING_MESSAGE.to_string();
                }
            } else if sections.all_scores_zero() {
                tracing::debug!("all model scores are zero; scraping raw text");
                sections = scrape_scores(raw, &sections, self.settings.scrape_windows);
            }
        }

        backfill_feedback(
            &mut sections,
            &timeline_markers,
            self.settings.max_feedback_observations,
        );

        if let Some(distribution) = &distribution {
            sections = normalize_sections(&sections, distribution);
        }

        ScoringDocument {
            sections,
            overall_comments,
            transcript: transcript_text(transcript),
            timeline_markers,
        }
    }

    fn diagnostic_document(&self, raw: &str) -> ScoringDocument {
        let preview: String = raw.chars().take(self.settings.preview_chars).collect();
        ScoringDocument {
            overall_comments: format!("{DIAGNOSTIC_PREFIX}{preview}"),
            ..Default::default()
        }
    }
}

fn transcript_text(transcript: Option<Value>) -> String {
    match transcript {
        Some(Value::String(text)) => text,
        _ => String::new(),
    }
}
