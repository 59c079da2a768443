//! Raw-text scraper - best-effort score recovery when structured parsing
//! produced nothing usable.
//!
//! The scraper anchors on each category and subcategory name in the raw
//! text and looks a short distance ahead for a `score:` or `points:` token.
//! It never fails; values it cannot find stay as they were.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{ScoringSection, Sections, SubcategoryScore};
use crate::domain::rubric::PointDistribution;

// The key must not be the tail of a longer word, so `maxScore` and
// `maxPoints` never count as a score.
static SCORE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|[^A-Za-z0-9_])["']?score["']?\s*:\s*(-?\d+(?:\.\d+)?)"#)
        .expect("valid score regex")
});

static POINTS_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|[^A-Za-z0-9_])["']?points["']?\s*:\s*(-?\d+(?:\.\d+)?)"#)
        .expect("valid points regex")
});

/// Search window sizes, in characters after the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeWindows {
    pub category_chars: usize,
    pub subcategory_chars: usize,
}

impl Default for ScrapeWindows {
    fn default() -> Self {
        Self {
            category_chars: 280,
            subcategory_chars: 120,
        }
    }
}

/// Zero-score sections carrying the canonical maxima, in rubric order.
pub fn placeholder_sections(distribution: &PointDistribution) -> Sections {
    distribution
        .categories
        .iter()
        .map(|category| {
            let section = category.subcategories.iter().fold(
                ScoringSection::new(0.0, Some(category.max_score)),
                |section, sub| {
                    section.with_subcategory(SubcategoryScore::new(
                        sub.name.clone(),
                        0.0,
                        Some(sub.max_points),
                    ))
                },
            );
            (category.name.clone(), section)
        })
        .collect()
}

/// Returns a copy of `base` with scores filled from `raw` where found.
///
/// Category scores prefer a `score:` token over `points:`; subcategories
/// prefer `points:`. Values are clamped into `[0, max]` when a positive
/// maximum is known. A category whose name (or the last `" - "` segment of
/// a compound name) does not occur in the text is left untouched.
pub fn scrape_scores(raw: &str, base: &Sections, windows: ScrapeWindows) -> Sections {
    let mut out = base.clone();
    if raw.is_empty() {
        return out;
    }

    let mut found = 0usize;
    for (name, section) in out.iter_mut() {
        if let Some(idx) = find_anchor(raw, name) {
            let chunk = window(raw, idx, windows.category_chars);
            if let Some(n) = first_number(chunk, &[&SCORE_TOKEN, &POINTS_TOKEN]) {
                section.score = clamp_to_max(n, section.max_score);
                found += 1;
            }
        }

        for sub in section.subcategories.iter_mut() {
            if sub.name.is_empty() {
                continue;
            }
            let Some(idx) = raw.find(sub.name.as_str()) else {
                continue;
            };
            let chunk = window(raw, idx, windows.subcategory_chars);
            if let Some(n) = first_number(chunk, &[&POINTS_TOKEN, &SCORE_TOKEN]) {
                sub.points = clamp_to_max(n, sub.max_points);
                found += 1;
            }
        }
    }

    tracing::debug!(found, sections = out.len(), "scraped scores from raw text");
    out
}

fn find_anchor(raw: &str, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    raw.find(name).or_else(|| {
        let (_, last) = name.rsplit_once(" - ")?;
        let last = last.trim();
        (!last.is_empty()).then(|| raw.find(last)).flatten()
    })
}

/// Slice of at most `chars` characters starting at byte offset `start`.
fn window(raw: &str, start: usize, chars: usize) -> &str {
    let rest = &raw[start..];
    match rest.char_indices().nth(chars) {
        Some((end, _)) => &rest[..end],
        None => rest,
    }
}

fn first_number(chunk: &str, patterns: &[&Regex]) -> Option<f64> {
    patterns.iter().find_map(|re| {
        re.captures(chunk)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    })
}

fn clamp_to_max(value: f64, max: Option<f64>) -> f64 {
    match max.filter(|m| *m > 0.0) {
        Some(max) => value.clamp(0.0, max),
        None => value.max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rubric::{Rubric, RubricCategory, RubricSubcategory};

    fn distribution() -> PointDistribution {
        PointDistribution::from_rubric(&Rubric {
            total_points: Some(50.0),
            categories: vec![
                RubricCategory::new("Content")
                    .with_subcategory(RubricSubcategory::new("Organization"))
                    .with_subcategory(RubricSubcategory::new("Evidence")),
                RubricCategory::new("Delivery - Nonverbal")
                    .with_subcategory(RubricSubcategory::new("Eye contact")),
            ],
            ..Default::default()
        })
    }

    #[test]
    fn placeholders_carry_canonical_maxima() {
        let sections = placeholder_sections(&distribution());
        let content = sections.get("Content").unwrap();
        assert_eq!(content.score, 0.0);
        assert_eq!(content.max_score, Some(33.33));
        assert_eq!(content.subcategories[1].name, "Evidence");
        assert_eq!(content.subcategories[1].max_points, Some(16.66));
        assert!(sections.get("Delivery - Nonverbal").is_some());
    }

    #[test]
    fn scrapes_category_and_subcategory_tokens() {
        let raw = r#"Content: "score": 27, details... Organization "points": 14 then Evidence points: 99"#;
        let scraped = scrape_scores(raw, &placeholder_sections(&distribution()), ScrapeWindows::default());

        let content = scraped.get("Content").unwrap();
        assert_eq!(content.score, 27.0);
        assert_eq!(content.subcategories[0].points, 14.0);
        // Clamped to the canonical maximum.
        assert_eq!(content.subcategories[1].points, 16.66);
    }

    #[test]
    fn falls_back_to_last_segment_of_compound_name() {
        let raw = "Nonverbal score: 9.5 overall";
        let scraped = scrape_scores(raw, &placeholder_sections(&distribution()), ScrapeWindows::default());
        assert_eq!(scraped.get("Delivery - Nonverbal").unwrap().score, 9.5);
    }

    #[test]
    fn missing_anchor_leaves_section_untouched() {
        let raw = "score: 12 but no category names anywhere";
        let base = placeholder_sections(&distribution());
        let scraped = scrape_scores(raw, &base, ScrapeWindows::default());
        assert_eq!(scraped, base);
    }

    #[test]
    fn token_outside_window_is_ignored() {
        let raw = format!("Content {} score: 10", "x".repeat(400));
        let scraped = scrape_scores(&raw, &placeholder_sections(&distribution()), ScrapeWindows::default());
        assert_eq!(scraped.get("Content").unwrap().score, 0.0);
    }

    #[test]
    fn negative_tokens_clamp_to_zero() {
        let raw = "Content score: -5";
        let scraped = scrape_scores(raw, &placeholder_sections(&distribution()), ScrapeWindows::default());
        assert_eq!(scraped.get("Content").unwrap().score, 0.0);
    }

    #[test]
    fn does_not_mutate_input() {
        let base = placeholder_sections(&distribution());
        let before = base.clone();
        let _ = scrape_scores("Content score: 20", &base, ScrapeWindows::default());
        assert_eq!(base, before);
    }

    #[test]
    fn max_keys_are_not_scores() {
        let raw = r#"{"Content": {"maxScore": 25, "score": 0, "subcategories": [{"name": "Organization", "maxPoints": 12.5, "points": 0}]}}"#;
        let scraped = scrape_scores(raw, &placeholder_sections(&distribution()), ScrapeWindows::default());

        let content = scraped.get("Content").unwrap();
        assert_eq!(content.score, 0.0);
        assert_eq!(content.subcategories[0].points, 0.0);
    }

    #[test]
    fn max_key_alone_yields_nothing() {
        let raw = r#"Content {"maxScore": 25} Organization {"maxPoints": 12.5}"#;
        let base = placeholder_sections(&distribution());
        assert_eq!(scrape_scores(raw, &base, ScrapeWindows::default()), base);
    }

    #[test]
    fn key_at_start_of_text_still_matches() {
        assert_eq!(first_number("score: 7", &[&SCORE_TOKEN]), Some(7.0));
        assert_eq!(first_number("'Points':3.5", &[&POINTS_TOKEN]), Some(3.5));
    }

    #[test]
    fn window_counts_characters_not_bytes() {
        assert_eq!(window("ééééé", 0, 2), "éé");
        assert_eq!(window("ab", 0, 10), "ab");
    }
}
