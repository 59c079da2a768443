//! Evaluation prompt - instruction text sent to the inference endpoint.
//!
//! The prompt restates the canonical point distribution so the model has
//! the right maxima in front of it. The normalizer never relies on the
//! model honouring them.

use super::{BehaviorReference, PointDistribution, Rubric};

/// Section keys used when no rubric is supplied.
pub const DEFAULT_SECTION_KEYS: &str = "Content, Delivery";

const NO_RUBRIC_STRUCTURE: &str =
    "Categories: Content, Delivery. Subcategories: score each as appropriate.";

const INSTRUCTIONS: &str = "\
Watch and listen to this speech video and evaluate it with the rubric below.

How to assess:
- Content and verbal delivery: judge from what is said and how it is said (main ideas, organization, purpose statement, evidence, pacing, vocalized pauses, clarity).
- Non-verbal delivery: judge from what is seen (eye contact, posture, gestures, hands, movement, setup).
- Timeline markers: for every specific behavior you observe, record the approximate time in seconds from the start and what occurred.";

const OUTPUT_FORMAT: &str = r#"Output ONLY one valid JSON object with no markdown and no explanation. Put "sections" first so scores are not cut off:
1) "sections": one entry per category name above; each value has "score", "maxScore", "feedback" (1-2 sentences) and "subcategories" (array of {"name", "points", "maxPoints", "feedback"}). Give every category a real numeric score between 0 and maxScore.
2) "timeline_markers": array of {"seconds": number, "label": "short behavior name", "observation": "brief note", "severity": "positive" | "minor" | "moderate" | "major", "category": category name}.

Example shape (use YOUR rubric's names):
{"sections": {"Category A": {"score": 8, "maxScore": 10, "feedback": "What you observed.", "subcategories": [{"name": "Subcategory 1", "points": 4, "maxPoints": 5, "feedback": "Brief note."}]}}, "timeline_markers": [{"seconds": 30, "label": "Behavior name", "observation": "What occurred", "severity": "minor", "category": "Category A"}]}"#;

/// Builds evaluation prompts from a rubric and the behavior catalogue.
pub struct EvaluationPrompt;

impl EvaluationPrompt {
    /// Renders the full prompt.
    pub fn build(rubric: Option<&Rubric>, behaviors: &[BehaviorReference]) -> String {
        let distribution = rubric.map(PointDistribution::from_rubric).unwrap_or_default();
        let section_keys = Self::section_keys(rubric);

        let mut blocks = vec![
            INSTRUCTIONS.to_string(),
            format!(
                "Rubric categories and subcategories to score:\n{}",
                Self::rubric_structure(rubric, &distribution)
            ),
        ];
        blocks.extend(rubric.and_then(|r| Self::point_block(r, &distribution)));
        blocks.extend(rubric.and_then(Self::example_videos_block));
        blocks.extend(Self::behavior_block(behaviors));
        blocks.push(format!(
            "IMPORTANT: the \"sections\" object must use exactly these keys: {section_keys}. \
             Use the exact maxScore and maxPoints values above; do not invent your own."
        ));
        blocks.push(OUTPUT_FORMAT.to_string());

        blocks.join("\n\n")
    }

    /// Comma-separated category names the model must use as section keys.
    pub fn section_keys(rubric: Option<&Rubric>) -> String {
        let names = rubric.map(Rubric::category_names).unwrap_or_default();
        if names.is_empty() {
            DEFAULT_SECTION_KEYS.to_string()
        } else {
            names.join(", ")
        }
    }

    /// One line per category, one bullet per subcategory, with canonical maxima.
    pub fn rubric_structure(rubric: Option<&Rubric>, distribution: &PointDistribution) -> String {
        let Some(rubric) = rubric.filter(|r| !r.categories.is_empty()) else {
            return NO_RUBRIC_STRUCTURE.to_string();
        };

        let mut lines = Vec::new();
        for category in &rubric.categories {
            let name = if category.name.is_empty() {
                "Category"
            } else {
                category.name.as_str()
            };
            let allocation = distribution.get(name);

            if category.subcategories.is_empty() {
                lines.push(format!("- {name}"));
                continue;
            }

            let mut header = format!("- {name}");
            if let Some(allocation) = allocation {
                header.push_str(&format!(" [category maxScore: {}]", allocation.max_score));
            }
            if let Some(description) = &category.description {
                header.push_str(&format!(" — {}", description.trim()));
            }
            lines.push(header);

            for (i, sub) in category.subcategories.iter().enumerate() {
                let max_points = allocation
                    .and_then(|a| a.subcategories.get(i))
                    .map(|s| s.max_points)
                    .or(sub.points);
                let mut line = match max_points {
                    Some(points) => format!("  • {} (max {} pts)", sub.name, points),
                    None => format!("  • {}", sub.name),
                };
                if let Some(description) = &sub.description {
                    line.push_str(&format!(" — {}", description.trim()));
                }
                lines.push(line);
            }
        }
        lines.join("\n")
    }

    fn point_block(rubric: &Rubric, distribution: &PointDistribution) -> Option<String> {
        if distribution.is_empty() {
            return None;
        }
        let mut lines = vec![format!(
            "CRITICAL: Total = {} points. Each category has a fixed maxScore; use these exact values:",
            rubric.effective_total_points()
        )];
        for category in &distribution.categories {
            let subs = category
                .subcategories
                .iter()
                .map(|s| format!("{}({})", s.name, s.max_points))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!(
                "  \"{}\" maxScore={} | subcategories: {}",
                category.name, category.max_score, subs
            ));
        }
        Some(lines.join("\n"))
    }

    fn example_videos_block(rubric: &Rubric) -> Option<String> {
        let videos: Vec<String> = rubric
            .example_videos
            .iter()
            .filter(|v| !v.url.trim().is_empty())
            .map(|v| match v.label.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
                Some(label) => format!("- {} ({})", v.url, label),
                None => format!("- {}", v.url),
            })
            .collect();
        if videos.is_empty() {
            return None;
        }
        Some(format!(
            "Reference example videos (instructor-provided, for context):\n{}",
            videos.join("\n")
        ))
    }

    fn behavior_block(behaviors: &[BehaviorReference]) -> Option<String> {
        if behaviors.is_empty() {
            return None;
        }
        let mut lines = vec![
            "Identify and timestamp these behaviors when you see or hear them (use them for scoring and timeline_markers):"
                .to_string(),
        ];
        for b in behaviors {
            lines.push(format!(
                "- {} ({}): {} Scoring: {}",
                b.label, b.kind, b.description, b.scoring_guidance
            ));
        }
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rubric::{ExampleVideo, RubricCategory, RubricSubcategory};

    fn speech_rubric() -> Rubric {
        Rubric {
            total_points: Some(50.0),
            categories: vec![
                RubricCategory {
                    description: Some("What is said".to_string()),
                    ..RubricCategory::new("Content")
                        .with_subcategory(RubricSubcategory::new("Organization"))
                        .with_subcategory(RubricSubcategory::new("Evidence"))
                },
                RubricCategory::new("Delivery")
                    .with_subcategory(RubricSubcategory::new("Eye contact").with_points(10.0)),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn section_keys_list_rubric_categories() {
        assert_eq!(
            EvaluationPrompt::section_keys(Some(&speech_rubric())),
            "Content, Delivery"
        );
        let renamed = Rubric {
            categories: vec![RubricCategory::new("Voice"), RubricCategory::new("Body")],
            ..Default::default()
        };
        assert_eq!(EvaluationPrompt::section_keys(Some(&renamed)), "Voice, Body");
    }

    #[test]
    fn section_keys_default_without_rubric() {
        assert_eq!(EvaluationPrompt::section_keys(None), DEFAULT_SECTION_KEYS);
    }

    #[test]
    fn structure_uses_canonical_maxima() {
        let rubric = speech_rubric();
        let dist = PointDistribution::from_rubric(&rubric);
        let structure = EvaluationPrompt::rubric_structure(Some(&rubric), &dist);

        assert!(structure.contains("- Content [category maxScore: 33.33] — What is said"));
        assert!(structure.contains("  • Organization (max 16.67 pts)"));
        assert!(structure.contains("  • Eye contact (max 10 pts)"));
    }

    #[test]
    fn structure_falls_back_without_rubric() {
        let structure = EvaluationPrompt::rubric_structure(None, &PointDistribution::default());
        assert_eq!(structure, NO_RUBRIC_STRUCTURE);
    }

    #[test]
    fn prompt_contains_point_block_and_keys() {
        let prompt = EvaluationPrompt::build(Some(&speech_rubric()), &[]);
        assert!(prompt.contains("CRITICAL: Total = 50 points."));
        assert!(prompt.contains("\"Delivery\" maxScore=10 | subcategories: Eye contact(10)"));
        assert!(prompt.contains("exactly these keys: Content, Delivery"));
        assert!(prompt.contains("\"timeline_markers\""));
    }

    #[test]
    fn prompt_lists_behaviors_and_example_videos() {
        let rubric = Rubric {
            example_videos: vec![
                ExampleVideo {
                    url: "https://example.org/model.mp4".to_string(),
                    label: Some("Model speech".to_string()),
                },
                ExampleVideo {
                    url: "  ".to_string(),
                    label: None,
                },
            ],
            ..speech_rubric()
        };
        let behaviors = vec![BehaviorReference::new("Hands in pockets", "delivery")
            .with_description("Hands hidden in pockets.")
            .with_scoring_guidance("Deduct under Delivery.")];

        let prompt = EvaluationPrompt::build(Some(&rubric), &behaviors);
        assert!(prompt.contains("- https://example.org/model.mp4 (Model speech)"));
        assert!(prompt.contains(
            "- Hands in pockets (delivery): Hands hidden in pockets. Scoring: Deduct under Delivery."
        ));
    }

    #[test]
    fn prompt_without_rubric_omits_point_block() {
        let prompt = EvaluationPrompt::build(None, &[]);
        assert!(!prompt.contains("CRITICAL"));
        assert!(prompt.contains(NO_RUBRIC_STRUCTURE));
    }
}
