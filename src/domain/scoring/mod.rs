//! Scoring Module - normalization of raw model output into scoring documents.
//!
//! # Components
//!
//! - `ResponseExtractor` - Recovers JSON from fenced, chatty or truncated output
//! - `normalize_markers` - Converts model markers to the UI timeline shape
//! - `scrape_scores` - Fallback score recovery from prose
//! - `backfill_feedback` - Section feedback synthesized from the timeline
//! - `normalize_sections` - Rescales model scores onto the rubric's maxima
//! - `ResponseNormalizer` - Runs the whole pipeline for one generation

mod document;
mod extractor;
mod feedback;
mod normalizer;
mod pipeline;
mod scraper;
mod timeline;

pub use document::{
    ScoringDocument, ScoringSection, Sections, Severity, SubcategoryScore, TimelineMarker,
};
pub use extractor::{recover_first_object, strip_code_fence, ExtractedResponse, ResponseExtractor};
pub use feedback::{backfill_feedback, FALLBACK_FEEDBACK};
pub use normalizer::normalize_sections;
pub use pipeline::{
    NormalizerSettings, ResponseNormalizer, DIAGNOSTIC_PREFIX, SCORES_MISSING_MESSAGE,
};
pub use scraper::{placeholder_sections, scrape_scores, ScrapeWindows};
pub use timeline::{format_timestamp, normalize_marker, normalize_markers};
