use std::error::Error;
use std::fmt;

/// Fatal startup errors raised while loading a corpus or fitting a vector space.
///
/// Per-row and per-field problems never surface here; they are recovered
/// locally and only show up as a smaller corpus or an excluded record.
#[derive(Debug)]
pub enum LoaderError {
    /// The source could not be read, or is not a parseable table.
    DataSource {
        message: String,
        source: Option<Box<dyn Error + Send + Sync + 'static>>,
    },
    /// A required column is missing or a required value could not be coerced.
    Schema(String),
    /// Zero usable rows survived validation.
    EmptyCorpus(String),
}

pub type Result<T> = std::result::Result<T, LoaderError>;

impl LoaderError {
    pub fn data_source(message: impl Into<String>) -> Self {
        LoaderError::DataSource {
            message: message.into(),
            source: None,
        }
    }

    pub fn data_source_with<E>(message: impl Into<String>, err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        LoaderError::DataSource {
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoaderError::DataSource { message, source } => match source {
                Some(err) => write!(f, "Data source error: {}: {}", message, err),
                None => write!(f, "Data source error: {}", message),
            },
            LoaderError::Schema(message) => write!(f, "Schema error: {}", message),
            LoaderError::EmptyCorpus(message) => write!(f, "Empty corpus: {}", message),
        }
    }
}

impl Error for LoaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoaderError::DataSource {
                source: Some(err), ..
            } => Some(err.as_ref() as &(dyn Error + 'static)),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LoaderError {
    fn from(err: std::io::Error) -> Self {
        LoaderError::data_source_with("I/O failure", err)
    }
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        LoaderError::data_source_with("malformed table", err)
    }
}
