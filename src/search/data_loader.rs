use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{LoaderError, Result};
use crate::literal::parse_string_list;
use crate::recipe::{Corpus, RecipeRecord};
use crate::search::normalize::normalize_ingredients;

// Define expected column headers
pub const NAME_COL: &str = "name";
pub const INGREDIENTS_COL: &str = "ingredients";
pub const TAGS_COL: &str = "tags";
pub const STEPS_COL: &str = "steps";
pub const MINUTES_COL: &str = "minutes";
pub const NUTRITION_COL: &str = "nutrition";
pub const DESCRIPTION_COL: &str = "description";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LoaderOptions {
    /// Also require the `nutrition` and `description` columns, and a
    /// `nutrition` value on every kept row.
    pub require_nutrition: bool,
}

impl LoaderOptions {
    pub fn filter_rich() -> Self {
        Self {
            require_nutrition: true,
        }
    }
}

struct ColumnIndices {
    name: usize,
    ingredients: usize,
    tags: usize,
    steps: usize,
    minutes: usize,
    nutrition: Option<usize>,
    description: Option<usize>,
}

impl ColumnIndices {
    fn resolve(headers: &StringRecord, options: &LoaderOptions) -> Result<Self> {
        let find = |col: &str| headers.iter().position(|h| h.trim() == col);
        let require = |col: &str| {
            find(col).ok_or_else(|| LoaderError::Schema(format!("Column '{}' not found", col)))
        };

        let indices = Self {
            name: require(NAME_COL)?,
            ingredients: require(INGREDIENTS_COL)?,
            tags: require(TAGS_COL)?,
            steps: require(STEPS_COL)?,
            minutes: require(MINUTES_COL)?,
            nutrition: if options.require_nutrition {
                Some(require(NUTRITION_COL)?)
            } else {
                find(NUTRITION_COL)
            },
            description: if options.require_nutrition {
                Some(require(DESCRIPTION_COL)?)
            } else {
                find(DESCRIPTION_COL)
            },
        };
        Ok(indices)
    }
}

/// Loads the recipe table at `csv_path` with the basic column set.
pub fn load_corpus(csv_path: &Path) -> Result<Corpus> {
    load_corpus_with(csv_path, &LoaderOptions::default())
}

pub fn load_corpus_with(csv_path: &Path, options: &LoaderOptions) -> Result<Corpus> {
    if !csv_path.exists() {
        return Err(LoaderError::data_source(format!(
            "Recipe CSV file not found at: {:?}",
            csv_path
        )));
    }
    let file = std::fs::File::open(csv_path).map_err(|e| {
        LoaderError::data_source_with(
            format!("Failed to open recipe CSV file at {:?}", csv_path),
            e,
        )
    })?;
    info!(path = %csv_path.display(), "loading recipe corpus");
    load_corpus_from_reader(file, options)
}

/// Loads a corpus from any CSV byte stream.
///
/// Rows missing a required value are dropped. A `minutes` value that is
/// present but cannot be read as a non-negative integer fails the whole load.
pub fn load_corpus_from_reader<R: Read>(reader: R, options: &LoaderOptions) -> Result<Corpus> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(LoaderError::data_source("source contains no table"));
    }
    let columns = ColumnIndices::resolve(&headers, options)?;

    let mut records = Vec::new();
    let mut rows_read = 0usize;
    for (row_index, result) in rdr.records().enumerate() {
        rows_read += 1;
        let record = match result {
            Ok(record) => record,
            Err(err) if matches!(err.kind(), csv::ErrorKind::Utf8 { .. }) => {
                warn!(row = row_index, "skipping row that is not valid UTF-8");
                continue;
            }
            Err(err) => {
                return Err(LoaderError::data_source_with(
                    format!("Failed to read record at row index {}", row_index),
                    err,
                ))
            }
        };

        match parse_row(&record, &columns, options, row_index)? {
            Some(recipe) => records.push(recipe),
            None => debug!(row = row_index, "dropping row with a missing required value"),
        }
    }

    if records.is_empty() {
        return Err(LoaderError::EmptyCorpus(format!(
            "No valid recipes loaded ({} rows read)",
            rows_read
        )));
    }

    info!(rows_read, rows_kept = records.len(), "recipe corpus loaded");
    Ok(Corpus::new(records))
}

fn field<'r>(record: &'r StringRecord, index: usize) -> Option<&'r str> {
    record.get(index).filter(|v| !v.trim().is_empty())
}

fn parse_row(
    record: &StringRecord,
    columns: &ColumnIndices,
    options: &LoaderOptions,
    row_index: usize,
) -> Result<Option<RecipeRecord>> {
    let (Some(name), Some(ingredients), Some(tags), Some(steps), Some(minutes)) = (
        field(record, columns.name),
        field(record, columns.ingredients),
        field(record, columns.tags),
        field(record, columns.steps),
        field(record, columns.minutes),
    ) else {
        return Ok(None);
    };

    let nutrition = columns.nutrition.and_then(|i| field(record, i));
    if options.require_nutrition && nutrition.is_none() {
        return Ok(None);
    }
    let description = columns
        .description
        .and_then(|i| record.get(i))
        .unwrap_or_default();

    let minutes = coerce_minutes(minutes).ok_or_else(|| {
        LoaderError::Schema(format!(
            "Invalid '{}' value {:?} at row index {}",
            MINUTES_COL, minutes, row_index
        ))
    })?;

    let ingredients_normalized = match parse_string_list(ingredients) {
        Some(items) => normalize_ingredients(&items),
        None => {
            debug!(row = row_index, "unparseable ingredient list, indexing as empty");
            String::new()
        }
    };

    Ok(Some(RecipeRecord {
        name: name.trim().to_string(),
        ingredients: ingredients.to_string(),
        steps: steps.to_string(),
        tags: tags.to_string(),
        description: description.to_string(),
        nutrition: nutrition.unwrap_or_default().to_string(),
        minutes,
        ingredients_normalized,
    }))
}

/// Integer text, or finite float text truncated toward zero. Negative is invalid.
fn coerce_minutes(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if let Ok(value) = raw.parse::<i64>() {
        return u32::try_from(value).ok();
    }
    let value = raw.parse::<f64>().ok().filter(|v| v.is_finite())?;
    if value < 0.0 || value > u32::MAX as f64 {
        return None;
    }
    Some(value.trunc() as u32)
}
