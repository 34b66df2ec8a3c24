pub mod cli;
pub mod display;
pub mod error;
pub mod literal;
pub mod recipe;
pub mod search;
