use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

use crate::recipe::{Corpus, RecipeRecord};
use crate::search::normalize::normalize_text;
use crate::search::vector_space::VectorSpace;

/// Score added per query term found in a recipe's normalized ingredients.
pub const TERM_BOOST_WEIGHT: f64 = 0.15;

/// Per-search filter and scoring settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QueryFilters {
    pub vegetarian_only: bool,
    /// Inclusive upper bound, in minutes.
    pub max_cook_time: u32,
    /// Inclusive upper bound on calories.
    pub max_calories: Option<u32>,
    /// Inclusive lower bound on protein.
    pub min_protein: Option<u32>,
    pub top_n: usize,
    /// 0.0 ranks by similarity alone.
    pub boost_weight: f64,
}

impl Default for QueryFilters {
    fn default() -> Self {
        Self {
            vegetarian_only: false,
            max_cook_time: 1000,
            max_calories: None,
            min_protein: None,
            top_n: 10,
            boost_weight: 0.0,
        }
    }
}

impl QueryFilters {
    pub fn with_term_boost(mut self) -> Self {
        self.boost_weight = TERM_BOOST_WEIGHT;
        self
    }

    fn uses_nutrition(&self) -> bool {
        self.max_calories.is_some() || self.min_protein.is_some()
    }

    fn accepts(&self, record: &RecipeRecord) -> bool {
        if self.vegetarian_only && !record.is_vegetarian() {
            return false;
        }
        if record.minutes > self.max_cook_time {
            return false;
        }
        if self.uses_nutrition() {
            let Some(nutrition) = record.nutrition() else {
                return false;
            };
            if let Some(max) = self.max_calories {
                if nutrition.calories > f64::from(max) {
                    return false;
                }
            }
            if let Some(min) = self.min_protein {
                if nutrition.protein < f64::from(min) {
                    return false;
                }
            }
        }
        true
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredResult<'a> {
    pub record: &'a RecipeRecord,
    pub similarity: f64,
    pub final_score: f64,
}

/// Ranks `corpus` against `query` and returns at most `filters.top_n` results.
///
/// Records are scored by cosine similarity in `vector_space`, optionally
/// boosted, stably sorted by final score (ties keep corpus order), then
/// filtered. An empty or non-alphabetic query yields no results.
pub fn search<'a>(
    query: &str,
    vector_space: &VectorSpace,
    corpus: &'a Corpus,
    filters: &QueryFilters,
) -> Vec<ScoredResult<'a>> {
    let normalized = normalize_text(query);
    if normalized.is_empty() || filters.top_n == 0 {
        return Vec::new();
    }

    let start = Instant::now();
    let query_vector = vector_space.transform(&normalized);
    let mut terms: Vec<&str> = normalized.split_whitespace().collect();
    terms.sort_unstable();
    terms.dedup();

    let mut scored: Vec<ScoredResult<'a>> = corpus
        .records()
        .par_iter()
        .map(|record| {
            let similarity = if query_vector.is_zero() {
                0.0
            } else {
                query_vector.cosine(&vector_space.transform(&record.ingredients_normalized))
            };
            let final_score = if filters.boost_weight != 0.0 {
                let hits = terms
                    .iter()
                    .filter(|t| record.ingredients_normalized.contains(**t))
                    .count();
                similarity + hits as f64 * filters.boost_weight
            } else {
                similarity
            };
            ScoredResult {
                record,
                similarity,
                final_score,
            }
        })
        .collect();

    // Stable, so equal scores keep corpus order.
    scored.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

    let results: Vec<ScoredResult<'a>> = scored
        .into_iter()
        .filter(|r| filters.accepts(r.record))
        .take(filters.top_n)
        .collect();

    debug!(
        query = %normalized,
        scored = corpus.len(),
        returned = results.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "search complete"
    );
    results
}
