//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers and the lenient scalar readers used by every
//! entity that is decoded from untrusted JSON.

mod ids;
pub mod lenient;

pub use ids::EvaluationId;
