//! speech-grader - command-line access to the scoring pipeline.
//!
//! Normalizes stored model generations, prints canonical point
//! distributions and renders evaluation prompts.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use speech_grader::adapters::JsonFileBehaviorCatalog;
use speech_grader::config::{AppConfig, ConfigError, ValidationError};
use speech_grader::domain::rubric::{EvaluationPrompt, PointDistribution, Rubric, RubricError};
use speech_grader::domain::scoring::ResponseNormalizer;
use speech_grader::observability;
use speech_grader::ports::BehaviorCatalog;

/// Rubric-conformant scoring of model-generated speech evaluations
#[derive(Parser, Debug)]
#[command(name = "speech-grader")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter (overrides SPEECH_GRADER__LOGGING__LEVEL)
    #[arg(long, global = true, env = "SPEECH_GRADER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize a stored raw generation into a scoring document
    Normalize {
        /// File with the raw model output, or `-` for stdin
        #[arg(long)]
        raw: PathBuf,

        /// Rubric JSON to normalize against
        #[arg(long)]
        rubric: Option<PathBuf>,

        /// Pretty-print the document
        #[arg(long)]
        pretty: bool,
    },

    /// Print the canonical point distribution of a rubric
    Distribution {
        #[arg(long)]
        rubric: PathBuf,
    },

    /// Print the evaluation prompt for a rubric
    Prompt {
        #[arg(long)]
        rubric: Option<PathBuf>,
    },

    /// Decode a rubric a model transcribed from a document
    ExtractRubric {
        /// File with the raw model output, or `-` for stdin
        #[arg(long)]
        raw: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("{path}: {source}")]
    Rubric {
        path: PathBuf,
        #[source]
        source: RubricError,
    },

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    if let Err(e) = observability::init_tracing(&config.logging) {
        eprintln!("Warning: {e}");
    }

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, CliError> {
    let mut config = AppConfig::load()?;
    config.logging.json |= cli.log_json;
    config.validate()?;
    Ok(config)
}

async fn run(command: Commands, config: &AppConfig) -> Result<(), CliError> {
    match command {
        Commands::Normalize { raw, rubric, pretty } => {
            let text = read_input(&raw)?;
            let rubric = rubric.as_deref().map(read_rubric).transpose()?;
            let normalizer = ResponseNormalizer::new(config.normalizer.settings());

            let document = normalizer.normalize(&text, rubric.as_ref());
            tracing::info!(
                sections = document.sections.len(),
                markers = document.timeline_markers.len(),
                "normalized raw generation"
            );
            print_json(&document, pretty)
        }
        Commands::Distribution { rubric } => {
            let rubric = read_rubric(&rubric)?;
            print_json(&PointDistribution::from_rubric(&rubric), true)
        }
        Commands::Prompt { rubric } => {
            let rubric = rubric.as_deref().map(read_rubric).transpose()?;
            let behaviors = match &config.inference.behavior_references_path {
                Some(path) => match JsonFileBehaviorCatalog::new(path).behaviors().await {
                    Ok(behaviors) => behaviors,
                    Err(e) => {
                        tracing::warn!(error = %e, "ignoring behavior catalog");
                        Vec::new()
                    }
                },
                None => Vec::new(),
            };
            println!("{}", EvaluationPrompt::build(rubric.as_ref(), &behaviors));
            Ok(())
        }
        Commands::ExtractRubric { raw } => {
            let text = read_input(&raw)?;
            let rubric = Rubric::from_model_output(&text).map_err(|source| CliError::Rubric {
                path: raw.clone(),
                source,
            })?;
            tracing::info!(categories = rubric.categories.len(), "extracted rubric");
            print_json(&rubric, true)
        }
    }
}

fn read_input(path: &Path) -> Result<String, CliError> {
    let read_err = |source| CliError::Read {
        path: path.to_path_buf(),
        source,
    };
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(read_err)?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).map_err(read_err)
    }
}

fn read_rubric(path: &Path) -> Result<Rubric, CliError> {
    let text = read_input(path)?;
    Rubric::from_json(&text).map_err(|source| CliError::Rubric {
        path: path.to_path_buf(),
        source,
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
