//! Section normalizer - rescales model scores onto the rubric's canonical maxima.
//!
//! Model-reported points are trusted only as proportions of the model's own
//! maxima. Every maximum in the output comes from the `PointDistribution`.

use super::{ScoringSection, Sections, SubcategoryScore};
use crate::domain::foundation::lenient::round2;
use crate::domain::rubric::{CategoryAllocation, PointDistribution};

/// Rescales every section found in `distribution`; others pass through.
///
/// # Rules
/// - `pct = min(1, score / modelMax)` when `modelMax > 0`, else 0
/// - category score = `clamp(pct * rubricMax, 0, rubricMax)`
/// - subcategories rescale the same way onto their matched `maxPoints`
/// - with subcategories present, the category score becomes the sum of
///   those matched to the rubric, clamped into `[0, rubricMax]`
/// - unmatched subcategories stay visible with zero points and no maximum
///
/// Applying this twice gives the same result as applying it once.
pub fn normalize_sections(sections: &Sections, distribution: &PointDistribution) -> Sections {
    if distribution.is_empty() {
        return sections.clone();
    }
    sections
        .iter()
        .map(|(name, section)| {
            let normalized = match distribution.find(name) {
                Some(allocation) => normalize_section(section, allocation),
                None => {
                    tracing::debug!(section = %name, "no rubric category for section; passing through");
                    section.clone()
                }
            };
            (name.to_string(), normalized)
        })
        .collect()
}

fn normalize_section(section: &ScoringSection, allocation: &CategoryAllocation) -> ScoringSection {
    let rubric_max = allocation.max_score;

    let mut matched_sum = 0.0;
    let mut matched_any = false;
    let subcategories: Vec<SubcategoryScore> = section
        .subcategories
        .iter()
        .enumerate()
        .map(|(i, sub)| match allocation.match_subcategory(&sub.name, i) {
            Some(target) => {
                let points = rescale(sub.points, sub.max_points, target.max_points);
                matched_sum += points;
                matched_any = true;
                SubcategoryScore {
                    points,
                    max_points: Some(target.max_points),
                    ..sub.clone()
                }
            }
            None => {
                tracing::debug!(subcategory = %sub.name, "no rubric subcategory; keeping it unscored");
                SubcategoryScore {
                    points: 0.0,
                    max_points: None,
                    ..sub.clone()
                }
            }
        })
        .collect();

    let score = if matched_any {
        round2(matched_sum).clamp(0.0, rubric_max.max(0.0))
    } else {
        rescale(section.score, section.max_score, rubric_max)
    };

    ScoringSection {
        score,
        max_score: Some(rubric_max),
        feedback: section.feedback.clone(),
        subcategories,
    }
}

/// Maps `value / model_max` onto `[0, target_max]`, rounded to cents.
fn rescale(value: f64, model_max: Option<f64>, target_max: f64) -> f64 {
    let target_max = target_max.max(0.0);
    let pct = match model_max {
        Some(max) if max > 0.0 => (value / max).clamp(0.0, 1.0),
        _ => 0.0,
    };
    round2(pct * target_max).clamp(0.0, target_max)
}
