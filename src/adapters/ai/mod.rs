//! Inference Provider Adapters.
//!
//! Implementations of the InferenceProvider port.
//!
//! ## Available Adapters
//!
//! - `MockInferenceProvider` - Configurable mock for tests and offline runs

mod mock_provider;

pub use mock_provider::{MockError, MockInferenceProvider, MockResponse};
