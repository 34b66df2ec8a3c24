use serde::Serialize;

use crate::literal::{parse_number_sequence, parse_string_list};

/// One row of the recipe corpus.
///
/// The serialized fields are kept verbatim; the parsed views
/// (`ingredient_list`, `steps_list`, ...) recover from malformed text by
/// returning an empty or absent value.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RecipeRecord {
    pub name: String,
    pub ingredients: String,
    pub steps: String,
    pub tags: String,
    pub description: String,
    pub nutrition: String,
    pub minutes: u32,
    /// Lowercased, letters-and-spaces ingredient text. Built once at load time.
    pub ingredients_normalized: String,
}

impl RecipeRecord {
    pub fn ingredient_list(&self) -> Vec<String> {
        parse_string_list(&self.ingredients).unwrap_or_default()
    }

    /// `None` when the steps text is not a list literal.
    pub fn steps_list(&self) -> Option<Vec<String>> {
        parse_string_list(&self.steps)
    }

    /// Tags stored either as a list literal or as a comma/space joined string.
    pub fn tags_list(&self) -> Vec<String> {
        if let Some(tags) = parse_string_list(&self.tags) {
            return tags;
        }
        self.tags
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn nutrition(&self) -> Option<Nutrition> {
        Nutrition::parse(&self.nutrition)
    }

    pub fn is_vegetarian(&self) -> bool {
        self.tags.to_lowercase().contains("vegetarian")
    }
}

/// The fixed-order nutrition tuple:
/// `[calories, total_fat, sugar, sodium, protein, saturated_fat, carbohydrates]`.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Default)]
pub struct Nutrition {
    pub calories: f64,
    pub total_fat: f64,
    pub sugar: f64,
    pub sodium: f64,
    pub protein: f64,
    pub saturated_fat: f64,
    pub carbohydrates: f64,
}

impl Nutrition {
    pub const FIELD_COUNT: usize = 7;

    /// Parses the serialized tuple. Anything but exactly seven numbers is `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let values = parse_number_sequence(text)?;
        if values.len() != Self::FIELD_COUNT {
            return None;
        }
        Some(Self {
            calories: values[0],
            total_fat: values[1],
            sugar: values[2],
            sodium: values[3],
            protein: values[4],
            saturated_fat: values[5],
            carbohydrates: values[6],
        })
    }
}

/// Immutable, ordered collection of validated recipes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Corpus {
    records: Vec<RecipeRecord>,
}

impl Corpus {
    pub fn new(records: Vec<RecipeRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RecipeRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&RecipeRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RecipeRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a RecipeRecord;
    type IntoIter = std::slice::Iter<'a, RecipeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
