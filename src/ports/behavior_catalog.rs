//! Behavior Catalog Port - source of the behavior references woven into prompts.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::rubric::BehaviorReference;

/// Port for reading the behavior catalogue.
///
/// An absent catalogue is not an error; implementations return an empty list.
#[async_trait]
pub trait BehaviorCatalog: Send + Sync {
    async fn behaviors(&self) -> Result<Vec<BehaviorReference>, BehaviorCatalogError>;
}

/// Behavior catalogue errors.
#[derive(Debug, thiserror::Error)]
pub enum BehaviorCatalogError {
    #[error("failed to read behavior catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid behavior catalog {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },
}
