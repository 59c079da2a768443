//! Speech Grader - rubric-conformant scoring of model-generated speech evaluations.
//!
//! A multimodal model watches a speech recording and writes an evaluation.
//! Its output is untrusted text: fenced, chatty, truncated at the token
//! budget, or scored against maxima it invented. This crate turns that text
//! into a `ScoringDocument` whose every maximum comes from the rubric.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod observability;
pub mod ports;
