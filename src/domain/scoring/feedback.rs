//! Feedback backfill - synthesizes section feedback from timeline markers.

use super::{Sections, TimelineMarker};

/// Feedback used when no marker relates to a section.
pub const FALLBACK_FEEDBACK: &str = "See timeline for observed behaviors.";

/// Fills blank section feedback from related timeline markers.
///
/// A marker relates to a section when its category is a case-insensitive
/// substring of the section key, or when any hyphen-separated segment of
/// the key appears in the category. Sections that already have feedback
/// are left untouched.
pub fn backfill_feedback(sections: &mut Sections, markers: &[TimelineMarker], max_observations: usize) {
    for (name, section) in sections.iter_mut() {
        if section.has_feedback() {
            continue;
        }
        let observations: Vec<String> = markers
            .iter()
            .filter(|m| category_matches(name, &m.category))
            .take(max_observations)
            .map(|m| format!("[{}] {}", m.timestamp, m.issue))
            .collect();

        section.feedback = if observations.is_empty() {
            FALLBACK_FEEDBACK.to_string()
        } else {
            format!("Observations: {}.", observations.join("; "))
        };
    }
}

fn category_matches(section_key: &str, category: &str) -> bool {
    let category = category.trim().to_lowercase();
    if category.is_empty() {
        return false;
    }
    let key = section_key.to_lowercase();
    key.contains(&category)
        || key
            .split('-')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .any(|segment| category.contains(segment))
}
