//! Behavior Catalog Adapters.

mod json_catalog;

pub use json_catalog::{JsonFileBehaviorCatalog, StaticBehaviorCatalog};
