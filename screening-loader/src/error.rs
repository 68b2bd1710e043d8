//! Error types for list loading

use thiserror::Error;

/// Loader error
#[derive(Debug, Error)]
pub enum LoaderError {
    /// File could not be opened or read
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV content
    #[error("failed to parse {path}: {message}")]
    Csv { path: String, message: String },

    /// A required column is missing from the header row
    #[error("{path} has no '{column}' column")]
    MissingColumn { path: String, column: &'static str },
}

/// Result type
pub type Result<T> = std::result::Result<T, LoaderError>;
