//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Model Ports
//!
//! - `InferenceProvider` - Multimodal model that writes the raw evaluation
//!
//! ## Reference Data Ports
//!
//! - `BehaviorCatalog` - Behaviors the model is asked to timestamp

mod behavior_catalog;
mod inference_provider;

pub use behavior_catalog::{BehaviorCatalog, BehaviorCatalogError};
pub use inference_provider::{
    FinishReason, InferenceError, InferenceProvider, InferenceRequest, InferenceResponse,
    MediaReference, ProviderInfo, RequestMetadata, TokenUsage,
};
