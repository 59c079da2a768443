//! Point Distribution - canonical maxScore / maxPoints derived from a rubric.
//!
//! The distribution is the single source of truth for every maximum that
//! appears in a scoring document. Model-reported maxima are only ever used
//! as denominators for proportions.

use serde::{Deserialize, Serialize};

use super::Rubric;

/// Canonical maximum for one subcategory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryAllocation {
    pub name: String,
    pub max_points: f64,
}

/// Canonical maxima for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAllocation {
    pub name: String,
    pub max_score: f64,
    pub subcategories: Vec<SubcategoryAllocation>,
}

impl CategoryAllocation {
    /// Finds the subcategory allocation for a model-reported subcategory.
    ///
    /// Matches the trimmed name case-insensitively, then falls back to the
    /// entry at the same position.
    pub fn match_subcategory(&self, name: &str, position: usize) -> Option<&SubcategoryAllocation> {
        let wanted = name.trim().to_lowercase();
        if !wanted.is_empty() {
            if let Some(found) = self
                .subcategories
                .iter()
                .find(|s| s.name.trim().to_lowercase() == wanted)
            {
                return Some(found);
            }
        }
        self.subcategories.get(position)
    }
}

/// Per-category maxima for a whole rubric, in rubric order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointDistribution {
    pub categories: Vec<CategoryAllocation>,
}

impl PointDistribution {
    /// Derives the distribution from a rubric.
    ///
    /// # Algorithm
    /// - total = `totalPoints`, or 50 when absent/zero
    /// - unit = total / (subcategory count across the entire rubric)
    /// - subcategories without explicit points receive `unit`
    /// - category maxScore = Σ of its subcategory maxPoints
    ///
    /// All values are computed in whole cents. A category's defaulted pool
    /// (`unit` × its defaulted subcategories) is rounded once and its
    /// remainder goes to that category's earliest defaulted subcategories.
    /// Subcategory sums match their category exactly; the rubric total is
    /// off by at most half a cent per category.
    ///
    /// # Edge Cases
    /// - No subcategories anywhere: empty distribution
    /// - Unnamed categories are skipped
    /// - Negative explicit points count as zero
    pub fn from_rubric(rubric: &Rubric) -> Self {
        let total_subs = rubric.subcategory_count();
        if total_subs == 0 {
            return Self::default();
        }

        let unit_cents = rubric.effective_total_points() * 100.0 / total_subs as f64;

        let mut categories = Vec::with_capacity(rubric.categories.len());
        for category in &rubric.categories {
            if category.name.is_empty() {
                continue;
            }

            // Each category rounds its own defaulted pool, so identical
            // categories always receive identical maxima.
            let defaulted = category
                .subcategories
                .iter()
                .filter(|s| s.points.is_none())
                .count();
            let mut default_shares =
                split_cents(unit_cents * defaulted as f64, defaulted).into_iter();

            let subs: Vec<(String, i64)> = category
                .subcategories
                .iter()
                .map(|s| {
                    let cents = match s.points {
                        Some(points) => (points.max(0.0) * 100.0).round() as i64,
                        None => default_shares.next().unwrap_or(0),
                    };
                    (s.name.clone(), cents)
                })
                .collect();

            let max_cents: i64 = subs.iter().map(|(_, cents)| cents).sum();
            categories.push(CategoryAllocation {
                name: category.name.clone(),
                max_score: from_cents(max_cents),
                subcategories: subs
                    .into_iter()
                    .map(|(name, cents)| SubcategoryAllocation {
                        name,
                        max_points: from_cents(cents),
                    })
                    .collect(),
            });
        }

        Self { categories }
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Finds a category by exact name.
    pub fn get(&self, name: &str) -> Option<&CategoryAllocation> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Finds a category by exact name, then case-insensitively.
    pub fn find(&self, name: &str) -> Option<&CategoryAllocation> {
        self.get(name).or_else(|| {
            let wanted = name.trim().to_lowercase();
            self.categories
                .iter()
                .find(|c| c.name.trim().to_lowercase() == wanted)
        })
    }

    /// Sum of all category maxima.
    pub fn total(&self) -> f64 {
        from_cents(
            self.categories
                .iter()
                .map(|c| (c.max_score * 100.0).round() as i64)
                .sum(),
        )
    }
}

/// Splits a pool of cents into `parts` whole-cent shares that sum to the
/// rounded pool, larger shares first.
fn split_cents(pool_cents: f64, parts: usize) -> Vec<i64> {
    if parts == 0 {
        return Vec::new();
    }
    let pool = pool_cents.round().max(0.0) as i64;
    let parts_i = parts as i64;
    let base = pool / parts_i;
    let remainder = pool - base * parts_i;
    (0..parts_i)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}

fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}
