use clap::Parser;
use std::path::PathBuf;

use crate::search::{LoaderOptions, QueryFilters};

#[derive(Parser, Debug)]
#[command(author, version, about = "Search a recipe table by ingredients", long_about = None)]
pub struct Cli {
    /// Path to the recipe CSV file
    #[arg(short, long, env = "RECIPE_DATA_PATH", default_value = "RAW_recipes.csv")]
    pub data: PathBuf,

    /// Ingredients to search for. Reads one query per line from stdin when omitted
    #[arg(short, long)]
    pub query: Option<String>,

    /// Only vegetarian recipes
    #[arg(long)]
    pub vegetarian: bool,

    /// Maximum cook time in minutes
    #[arg(long, default_value_t = 60)]
    pub max_cook_time: u32,

    /// Maximum calories per serving
    #[arg(long)]
    pub max_calories: Option<u32>,

    /// Minimum protein per serving
    #[arg(long)]
    pub min_protein: Option<u32>,

    /// Number of recipes to show
    #[arg(short = 'n', long, default_value_t = 5)]
    pub top_n: usize,

    /// Boost recipes containing the query terms verbatim
    #[arg(long)]
    pub boost: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn filters(&self) -> QueryFilters {
        let filters = QueryFilters {
            vegetarian_only: self.vegetarian,
            max_cook_time: self.max_cook_time,
            max_calories: self.max_calories,
            min_protein: self.min_protein,
            top_n: self.top_n,
            ..QueryFilters::default()
        };
        if self.boost {
            filters.with_term_boost()
        } else {
            filters
        }
    }

    /// Calorie and protein filters need the nutrition column.
    pub fn loader_options(&self) -> LoaderOptions {
        if self.max_calories.is_some() || self.min_protein.is_some() {
            LoaderOptions::filter_rich()
        } else {
            LoaderOptions::default()
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
