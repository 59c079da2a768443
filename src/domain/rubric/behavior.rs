//! Behavior references - observable speaking behaviors the model is asked
//! to look for and timestamp (hands in pockets, purpose statement, ...).

use serde::{Deserialize, Serialize};

/// One catalogued behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorReference {
    #[serde(default = "default_label")]
    pub label: String,
    /// Behavior family, e.g. `delivery` or `content`.
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub scoring_guidance: String,
}

impl BehaviorReference {
    pub fn new(label: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: kind.into(),
            description: String::new(),
            scoring_guidance: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_scoring_guidance(mut self, guidance: impl Into<String>) -> Self {
        self.scoring_guidance = guidance.into();
        self
    }
}

fn default_label() -> String {
    "Behavior".to_string()
}

fn default_kind() -> String {
    "delivery".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let behavior: BehaviorReference = serde_json::from_str("{}").unwrap();
        assert_eq!(behavior.label, "Behavior");
        assert_eq!(behavior.kind, "delivery");
        assert!(behavior.description.is_empty());
    }

    #[test]
    fn reads_type_field_as_kind() {
        let behavior: BehaviorReference = serde_json::from_str(
            r#"{"label": "Purpose statement", "type": "content", "scoring_guidance": "Reward clarity"}"#,
        )
        .unwrap();
        assert_eq!(behavior.kind, "content");
        assert_eq!(behavior.scoring_guidance, "Reward clarity");
    }
}
