//! Scoring document types - the rubric-conformant output consumed by the grading UI.
//!
//! Model output is decoded into these types field by field. Every field is
//! checked for presence rather than assumed, and values of the wrong shape
//! are treated as absent.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::domain::foundation::lenient::{number_field, text_field};

/// Scored subcategory within a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryScore {
    pub name: String,
    pub points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_points: Option<f64>,
    pub feedback: String,
}

impl SubcategoryScore {
    pub fn new(name: impl Into<String>, points: f64, max_points: Option<f64>) -> Self {
        Self {
            name: name.into(),
            points,
            max_points,
            feedback: String::new(),
        }
    }

    /// Decodes a model-reported subcategory. Bare strings become named
    /// subcategories with zero points; other non-objects are rejected.
    pub fn from_model_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => Some(Self::new(name.clone(), 0.0, None)),
            Value::Object(obj) => Some(Self {
                name: text_field(obj, "name").unwrap_or_default().to_string(),
                points: number_field(obj, "points").unwrap_or(0.0),
                max_points: number_field(obj, "maxPoints"),
                feedback: text_field(obj, "feedback").unwrap_or_default().to_string(),
            }),
            _ => None,
        }
    }
}

/// One category's scored block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringSection {
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    pub feedback: String,
    pub subcategories: Vec<SubcategoryScore>,
}

impl ScoringSection {
    pub fn new(score: f64, max_score: Option<f64>) -> Self {
        Self {
            score,
            max_score,
            feedback: String::new(),
            subcategories: Vec::new(),
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = feedback.into();
        self
    }

    pub fn with_subcategory(mut self, subcategory: SubcategoryScore) -> Self {
        self.subcategories.push(subcategory);
        self
    }

    /// Decodes a model-reported section; `None` when the value is not an object.
    pub fn from_model_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let subcategories = obj
            .get("subcategories")
            .and_then(Value::as_array)
            .map(|subs| subs.iter().filter_map(SubcategoryScore::from_model_value).collect())
            .unwrap_or_default();
        Some(Self {
            score: number_field(obj, "score").unwrap_or(0.0),
            max_score: number_field(obj, "maxScore"),
            feedback: text_field(obj, "feedback").unwrap_or_default().to_string(),
            subcategories,
        })
    }

    pub fn has_feedback(&self) -> bool {
        !self.feedback.trim().is_empty()
    }
}

/// Sections keyed by category name, unique keys, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sections {
    entries: Vec<(String, ScoringSection)>,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the model's `sections` object. Entries that are not objects
    /// are dropped; anything other than an object yields no sections.
    pub fn from_model_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            tracing::debug!("sections value is not an object; ignoring");
            return Self::new();
        };
        let mut sections = Self::new();
        for (name, raw) in obj {
            match ScoringSection::from_model_value(raw) {
                Some(section) => {
                    sections.insert(name.clone(), section);
                }
                None => tracing::debug!(section = %name, "dropping non-object section value"),
            }
        }
        sections
    }

    /// Inserts or replaces a section, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, section: ScoringSection) -> Option<ScoringSection> {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, section)),
            None => {
                self.entries.push((name, section));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ScoringSection> {
        self.entries.iter().find(|(key, _)| key == name).map(|(_, s)| s)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ScoringSection> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, s)| s)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScoringSection)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), s))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ScoringSection)> {
        self.entries.iter_mut().map(|(k, s)| (k.as_str(), s))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when every section scored exactly zero (vacuously true when empty).
    pub fn all_scores_zero(&self) -> bool {
        self.entries.iter().all(|(_, s)| s.score == 0.0)
    }

    pub fn any_score_positive(&self) -> bool {
        self.entries.iter().any(|(_, s)| s.score > 0.0)
    }
}

impl FromIterator<(String, ScoringSection)> for Sections {
    fn from_iter<I: IntoIterator<Item = (String, ScoringSection)>>(iter: I) -> Self {
        let mut sections = Self::new();
        for (name, section) in iter {
            sections.insert(name, section);
        }
        sections
    }
}

impl IntoIterator for Sections {
    type Item = (String, ScoringSection);
    type IntoIter = std::vec::IntoIter<(String, ScoringSection)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Sections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, section) in &self.entries {
            map.serialize_entry(name, section)?;
        }
        map.end()
    }
}

/// Impact of an observed behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Positive,
    #[default]
    Minor,
    Moderate,
    Major,
}

impl Severity {
    /// Parses a severity label case-insensitively.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Self::Positive),
            "minor" => Some(Self::Minor),
            "moderate" => Some(Self::Moderate),
            "major" => Some(Self::Major),
            _ => None,
        }
    }
}

/// Timestamped observation in the UI shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineMarker {
    /// `m:ss` rendering of `seconds`.
    pub timestamp: String,
    pub seconds: f64,
    pub category: String,
    pub issue: String,
    pub severity: Severity,
    pub note: String,
}

/// The complete, rubric-conformant result of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoringDocument {
    pub sections: Sections,
    #[serde(rename = "overallComments")]
    pub overall_comments: String,
    pub transcript: String,
    #[serde(rename = "timeline_markers")]
    pub timeline_markers: Vec<TimelineMarker>,
}

impl ScoringDocument {
    /// Sum of all section scores.
    pub fn total_score(&self) -> f64 {
        self.sections.iter().map(|(_, s)| s.score).sum()
    }

    /// Sum of all known section maxima.
    pub fn total_max_score(&self) -> f64 {
        self.sections.iter().filter_map(|(_, s)| s.max_score).sum()
    }
}
