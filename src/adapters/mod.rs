//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Inference provider implementations (mock)
//! - `behavior` - Behavior catalogue sources (JSON file, static)

pub mod ai;
pub mod behavior;

pub use ai::MockInferenceProvider;
pub use behavior::{JsonFileBehaviorCatalog, StaticBehaviorCatalog};
