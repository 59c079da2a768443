//! Rubric Module - scoring templates and everything derived from them.
//!
//! # Components
//!
//! - `Rubric` - Forgiving decoder for instructor-authored rubric JSON
//! - `PointDistribution` - Canonical maxScore / maxPoints per category
//! - `BehaviorReference` - Catalogued behaviors the model should timestamp
//! - `EvaluationPrompt` - Prompt text restating the rubric for the model
//!
//! Everything here is a pure function of its inputs.

mod behavior;
mod distribution;
mod prompt;
#[allow(clippy::module_inception)]
mod rubric;

pub use behavior::BehaviorReference;
pub use distribution::{CategoryAllocation, PointDistribution, SubcategoryAllocation};
pub use prompt::{EvaluationPrompt, DEFAULT_SECTION_KEYS};
pub use rubric::{
    ExampleVideo, Rubric, RubricCategory, RubricError, RubricSubcategory, DEFAULT_TOTAL_POINTS,
};
