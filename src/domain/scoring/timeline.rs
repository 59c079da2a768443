//! Timeline normalization - raw model markers to the UI marker shape.

use serde_json::Value;

use super::{Severity, TimelineMarker};
use crate::domain::foundation::lenient::{first_text_field, number_field};

const DEFAULT_CATEGORY: &str = "Delivery";
const DEFAULT_ISSUE: &str = "Observation";

/// Normalizes the model's `timeline_markers` value.
///
/// Anything other than an array yields no markers; array entries that are
/// not objects are dropped.
pub fn normalize_markers(raw: Option<&Value>) -> Vec<TimelineMarker> {
    let Some(items) = raw.and_then(Value::as_array) else {
        if raw.is_some() {
            tracing::debug!("timeline_markers is not an array; ignoring");
        }
        return Vec::new();
    };
    items.iter().filter_map(normalize_marker).collect()
}

/// Normalizes one marker.
///
/// Accepts both the model spelling (`label`, `observation`) and the UI
/// spelling (`issue`, `note`) so already-normalized markers pass through
/// unchanged. A UI-spelled `issue` never backfills an empty `note`.
pub fn normalize_marker(value: &Value) -> Option<TimelineMarker> {
    let obj = value.as_object()?;

    let seconds = number_field(obj, "seconds")
        .filter(|s| *s >= 0.0)
        .unwrap_or(0.0);
    let label = first_text_field(obj, &["label"]);
    let issue = label.or_else(|| first_text_field(obj, &["issue"]));
    let observation = first_text_field(obj, &["observation", "note"]);

    Some(TimelineMarker {
        timestamp: format_timestamp(seconds),
        seconds,
        category: first_text_field(obj, &["category"])
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string(),
        issue: issue.or(observation).unwrap_or(DEFAULT_ISSUE).to_string(),
        severity: first_text_field(obj, &["severity"])
            .and_then(Severity::from_label)
            .unwrap_or_default(),
        note: observation.or(label).unwrap_or_default().to_string(),
    })
}

/// Renders seconds as `m:ss`.
pub fn format_timestamp(seconds: f64) -> String {
    let whole = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", whole / 60, whole % 60)
}
