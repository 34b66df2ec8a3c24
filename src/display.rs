//! Terminal rendering of search results.

use crate::search::ScoredResult;

pub const EMPTY_QUERY_MESSAGE: &str = "Start typing ingredients to search.";
pub const NO_RESULTS_MESSAGE: &str = "No recipes matched your filters.";

/// Final score as a percentage, capped at 100 and rounded to one decimal.
pub fn score_percent(final_score: f64) -> f64 {
    (final_score.min(1.0) * 1000.0).round() / 10.0
}

/// Joins ingredients with `, `, wrapping in `*...*` those that occur in the query.
pub fn highlight_ingredients<S: AsRef<str>>(ingredients: &[S], query: &str) -> String {
    let query = query.to_lowercase();
    ingredients
        .iter()
        .map(|ing| {
            let ing = ing.as_ref();
            if query.contains(&ing.to_lowercase()) {
                format!("*{}*", ing)
            } else {
                ing.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_result(result: &ScoredResult<'_>, query: &str) -> String {
    let record = result.record;
    let mut out = format!("{}\n", record.name);
    out.push_str(&format!("  Similarity Score: {}%\n", score_percent(result.final_score)));

    let description = record.description.trim();
    if !description.is_empty() {
        out.push_str(&format!("  Description: {}\n", description));
    }
    let ingredients = record.ingredient_list();
    if !ingredients.is_empty() {
        out.push_str(&format!("  Ingredients: {}\n", highlight_ingredients(&ingredients, query)));
    }
    let tags = record.tags_list();
    if !tags.is_empty() {
        out.push_str(&format!("  Tags: {}\n", tags.join(", ")));
    }
    out.push_str(&format!("  Cooking Time: {} mins\n", record.minutes));
    if let Some(nutrition) = record.nutrition() {
        out.push_str(&format!(
            "  Nutrition: Calories: {} kcal | Protein: {} g\n",
            nutrition.calories, nutrition.protein
        ));
    }
    match record.steps_list() {
        Some(steps) => {
            out.push_str("  Steps:\n");
            for (i, step) in steps.iter().enumerate() {
                out.push_str(&format!("    {}. {}\n", i + 1, step));
            }
        }
        None => out.push_str("  Steps unavailable.\n"),
    }
    out
}

pub fn render_results(results: &[ScoredResult<'_>], query: &str) -> String {
    if results.is_empty() {
        return format!("{}\n", NO_RESULTS_MESSAGE);
    }
    results
        .iter()
        .map(|r| render_result(r, query))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_json(results: &[ScoredResult<'_>]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(results)
}
