//! Rubric - the externally authored scoring template.
//!
//! Rubrics arrive per request as JSON written by instructors (or extracted
//! from a document by a model), so the decoder is deliberately forgiving:
//! subcategories may be bare strings, point values may be strings, and
//! most fields may be missing or `null`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::lenient::{deserialize_null_default, deserialize_optional_number};
use crate::domain::scoring::recover_first_object;

/// Total points assumed when a rubric omits `totalPoints` or sets it to zero.
pub const DEFAULT_TOTAL_POINTS: f64 = 50.0;

/// Name given to object subcategories that carry no name.
const UNNAMED_SUBCATEGORY: &str = "Item";

/// Errors that can occur while decoding a rubric.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RubricError {
    #[error("Invalid rubric JSON: {0}")]
    InvalidJson(String),

    #[error("No rubric object found in model output")]
    NotFound,
}

/// Scoring template supplied by the caller for one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rubric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, alias = "speech_type", skip_serializing_if = "Option::is_none")]
    pub speech_type: Option<String>,

    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub categories: Vec<RubricCategory>,

    #[serde(
        default,
        alias = "total_points",
        deserialize_with = "deserialize_optional_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_points: Option<f64>,

    /// Instructor-provided reference videos, mentioned in the prompt only.
    #[serde(
        default,
        alias = "example_videos",
        deserialize_with = "deserialize_null_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub example_videos: Vec<ExampleVideo>,
}

impl Rubric {
    /// Decodes a rubric from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, RubricError> {
        serde_json::from_str(json).map_err(|e| RubricError::InvalidJson(e.to_string()))
    }

    /// Decodes a rubric a model transcribed from a document.
    ///
    /// The output may be fenced, wrapped in prose, or cut off at the token
    /// budget; the first JSON object is recovered and dangling commas and
    /// open brackets are closed before decoding.
    pub fn from_model_output(raw: &str) -> Result<Self, RubricError> {
        let obj = recover_first_object(raw).ok_or(RubricError::NotFound)?;
        serde_json::from_value(serde_json::Value::Object(obj))
            .map_err(|e| RubricError::InvalidJson(e.to_string()))
    }

    /// Total points, falling back to [`DEFAULT_TOTAL_POINTS`] when absent or non-positive.
    pub fn effective_total_points(&self) -> f64 {
        match self.total_points {
            Some(total) if total > 0.0 => total,
            _ => DEFAULT_TOTAL_POINTS,
        }
    }

    /// Names of all named categories, in rubric order.
    pub fn category_names(&self) -> Vec<&str> {
        self.categories
            .iter()
            .map(|c| c.name.as_str())
            .filter(|n| !n.is_empty())
            .collect()
    }

    /// Number of subcategories across the whole rubric.
    pub fn subcategory_count(&self) -> usize {
        self.categories.iter().map(|c| c.subcategories.len()).sum()
    }
}

/// One top-level rubric category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "CategoryRepr")]
pub struct RubricCategory {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub subcategories: Vec<RubricSubcategory>,
}

impl RubricCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            subcategories: Vec::new(),
        }
    }

    pub fn with_subcategory(mut self, subcategory: RubricSubcategory) -> Self {
        self.subcategories.push(subcategory);
        self
    }
}

/// One subcategory; `points` is absent when the rubric leaves it to the
/// even split computed by the point distribution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SubcategoryRepr")]
pub struct RubricSubcategory {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RubricSubcategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: None,
            description: None,
        }
    }

    pub fn with_points(mut self, points: f64) -> Self {
        self.points = Some(points);
        self
    }
}

/// Reference video listed in the rubric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleVideo {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

// Wire representations accepting either a bare name or a full object.

#[derive(Deserialize)]
#[serde(untagged)]
enum CategoryRepr {
    Name(String),
    Detailed {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default, deserialize_with = "deserialize_null_default")]
        subcategories: Vec<RubricSubcategory>,
    },
}

impl From<CategoryRepr> for RubricCategory {
    fn from(repr: CategoryRepr) -> Self {
        match repr {
            CategoryRepr::Name(name) => RubricCategory::new(name),
            CategoryRepr::Detailed {
                name,
                description,
                subcategories,
            } => RubricCategory {
                name: name.unwrap_or_default(),
                description: description.filter(|d| !d.trim().is_empty()),
                subcategories,
            },
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SubcategoryRepr {
    Name(String),
    Detailed {
        #[serde(default)]
        name: Option<String>,
        #[serde(default, deserialize_with = "deserialize_optional_number")]
        points: Option<f64>,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<SubcategoryRepr> for RubricSubcategory {
    fn from(repr: SubcategoryRepr) -> Self {
        match repr {
            SubcategoryRepr::Name(name) => RubricSubcategory::new(name),
            SubcategoryRepr::Detailed {
                name,
                points,
                description,
            } => RubricSubcategory {
                name: name.unwrap_or_else(|| UNNAMED_SUBCATEGORY.to_string()),
                points,
                description: description.filter(|d| !d.trim().is_empty()),
            },
        }
    }
}
