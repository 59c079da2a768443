//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SPEECH_GRADER` prefix and nested values are separated by double underscores.
//! Every value has a default, so an empty environment yields a usable config.
//!
//! # Example
//!
//! ```no_run
//! use speech_grader::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Generation budget: {}", config.inference.max_new_tokens);
//! ```

mod error;
mod inference;
mod logging;
mod normalizer;

pub use error::{ConfigError, ValidationError};
pub use inference::InferenceConfig;
pub use logging::LoggingConfig;
pub use normalizer::NormalizerConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Inference request settings
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Response normalization tunables
    #[serde(default)]
    pub normalizer: NormalizerConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SPEECH_GRADER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SPEECH_GRADER__LOGGING__LEVEL=debug` -> `logging.level = "debug"`
    /// - `SPEECH_GRADER__NORMALIZER__PREVIEW_CHARS=300` -> `normalizer.preview_chars = 300`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SPEECH_GRADER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.inference.validate()?;
        self.normalizer.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "SPEECH_GRADER__LOGGING__LEVEL",
        "SPEECH_GRADER__LOGGING__JSON",
        "SPEECH_GRADER__INFERENCE__MAX_NEW_TOKENS",
        "SPEECH_GRADER__INFERENCE__BEHAVIOR_REFERENCES_PATH",
        "SPEECH_GRADER__NORMALIZER__PREVIEW_CHARS",
        "SPEECH_GRADER__NORMALIZER__CATEGORY_WINDOW_CHARS",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_defaults_from_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.inference.max_new_tokens, 3072);
        assert_eq!(config.normalizer.preview_chars, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_overrides_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SPEECH_GRADER__LOGGING__LEVEL", "debug");
        env::set_var("SPEECH_GRADER__LOGGING__JSON", "true");
        env::set_var("SPEECH_GRADER__INFERENCE__MAX_NEW_TOKENS", "4096");
        env::set_var("SPEECH_GRADER__INFERENCE__BEHAVIOR_REFERENCES_PATH", "/etc/behaviors.json");
        env::set_var("SPEECH_GRADER__NORMALIZER__PREVIEW_CHARS", "300");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.inference.max_new_tokens, 4096);
        assert_eq!(
            config.inference.behavior_references_path,
            Some(PathBuf::from("/etc/behaviors.json"))
        );
        assert_eq!(config.normalizer.preview_chars, 300);
        assert_eq!(config.normalizer.category_window_chars, 280);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SPEECH_GRADER__NORMALIZER__CATEGORY_WINDOW_CHARS", "0");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MustBePositive(_))
        ));
    }

    #[test]
    fn test_unparseable_value_is_load_error() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("SPEECH_GRADER__INFERENCE__MAX_NEW_TOKENS", "lots");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
