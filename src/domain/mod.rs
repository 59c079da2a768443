//! Domain layer containing the scoring logic and its types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, lenient JSON readers)
//! - `rubric` - Rubrics, canonical point distribution, evaluation prompt
//! - `scoring` - Scoring documents and the response normalization pipeline

pub mod foundation;
pub mod rubric;
pub mod scoring;
