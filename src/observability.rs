//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays clean for JSON documents. `RUST_LOG`
//! overrides the configured level.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Subscriber installation failed (usually: one is already installed).
#[derive(Debug, thiserror::Error)]
#[error("failed to initialise tracing: {0}")]
pub struct TracingInitError(#[from] TryInitError);

/// Installs the global subscriber described by `config`.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TracingInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&config.level)));

    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}

/// Scopes a bare level to this crate; full directives pass through.
pub fn filter_directive(level: &str) -> String {
    let level = level.trim();
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("speech_grader={level}")
    }
}
