//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod evaluate_speech;

pub use evaluate_speech::{
    EvaluateSpeechCommand, EvaluateSpeechConfig, EvaluateSpeechError, EvaluateSpeechHandler,
    EvaluateSpeechResult,
};
