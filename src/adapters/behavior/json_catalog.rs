//! JSON Behavior Catalog Adapter - Implementation of BehaviorCatalog.
//!
//! Reads a JSON array of behavior references from disk:
//!
//! ```json
//! [
//!   {"label": "Hands in pockets", "type": "delivery",
//!    "description": "Hands hidden in pockets.", "scoring_guidance": "Deduct under Delivery."}
//! ]
//! ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::rubric::BehaviorReference;
use crate::ports::{BehaviorCatalog, BehaviorCatalogError};

/// Behavior catalogue backed by a JSON file.
///
/// A missing file yields an empty catalogue. The file is re-read on every
/// call so edits take effect without a restart.
#[derive(Debug, Clone)]
pub struct JsonFileBehaviorCatalog {
    path: PathBuf,
}

impl JsonFileBehaviorCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, contents: &str) -> Result<Vec<BehaviorReference>, BehaviorCatalogError> {
        serde_json::from_str(contents).map_err(|e| BehaviorCatalogError::InvalidFormat {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl BehaviorCatalog for JsonFileBehaviorCatalog {
    async fn behaviors(&self) -> Result<Vec<BehaviorReference>, BehaviorCatalogError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "behavior catalog not found; using none");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(BehaviorCatalogError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let behaviors = self.parse(&contents)?;
        tracing::debug!(path = %self.path.display(), count = behaviors.len(), "loaded behavior catalog");
        Ok(behaviors)
    }
}

/// Fixed in-memory catalogue, used when no file is configured.
#[derive(Debug, Clone, Default)]
pub struct StaticBehaviorCatalog {
    behaviors: Vec<BehaviorReference>,
}

impl StaticBehaviorCatalog {
    pub fn new(behaviors: Vec<BehaviorReference>) -> Self {
        Self { behaviors }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BehaviorCatalog for StaticBehaviorCatalog {
    async fn behaviors(&self) -> Result<Vec<BehaviorReference>, BehaviorCatalogError> {
        Ok(self.behaviors.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn catalog_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn loads_behaviors_from_file() {
        let file = catalog_file(
            r#"[{"label": "Hands in pockets", "type": "delivery", "description": "Hidden hands."},
                {"label": "Purpose statement", "type": "content"}]"#,
        );
        let catalog = JsonFileBehaviorCatalog::new(file.path());

        let behaviors = catalog.behaviors().await.unwrap();

        assert_eq!(behaviors.len(), 2);
        assert_eq!(behaviors[0].label, "Hands in pockets");
        assert_eq!(behaviors[1].kind, "content");
    }

    #[tokio::test]
    async fn missing_file_is_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = JsonFileBehaviorCatalog::new(dir.path().join("absent.json"));
        assert!(catalog.behaviors().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_array_is_invalid_format() {
        let file = catalog_file(r#"{"label": "Not a list"}"#);
        let err = JsonFileBehaviorCatalog::new(file.path()).behaviors().await.unwrap_err();
        assert!(matches!(err, BehaviorCatalogError::InvalidFormat { .. }));
    }

    #[tokio::test]
    async fn directory_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonFileBehaviorCatalog::new(dir.path()).behaviors().await.unwrap_err();
        assert!(matches!(err, BehaviorCatalogError::Io { .. }));
    }

    #[tokio::test]
    async fn static_catalog_returns_its_behaviors() {
        let catalog = StaticBehaviorCatalog::new(vec![BehaviorReference::new("Swaying", "delivery")]);
        assert_eq!(catalog.behaviors().await.unwrap().len(), 1);
        assert!(StaticBehaviorCatalog::empty().behaviors().await.unwrap().is_empty());
    }
}
