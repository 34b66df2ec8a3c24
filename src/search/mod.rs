pub mod cache;
pub mod data_loader;
pub mod engine;
pub mod normalize;
pub mod vector_space;

// Re-export the pipeline entry points for easier access from outside the search module
pub use cache::{IndexCache, SearchIndex};
pub use data_loader::{load_corpus, load_corpus_from_reader, load_corpus_with, LoaderOptions};
pub use engine::{search, QueryFilters, ScoredResult, TERM_BOOST_WEIGHT};
pub use normalize::normalize_text;
pub use vector_space::{build_vector_space, SparseVector, VectorSpace};
