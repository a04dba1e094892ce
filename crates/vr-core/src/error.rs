//! Error types for vr-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vr-core
///
/// Every variant is fatal for the run that raised it. Field-level problems
/// (bad dates, bad amounts) are not errors; they are reported as
/// [`ParseWarning`](crate::records::ParseWarning)s and substituted.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse CSV
    #[error("failed to parse CSV '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV parsing error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required input column is absent
    #[error("missing required column '{column}' in '{path}'")]
    MissingColumn { column: String, path: PathBuf },

    /// Table has no columns at all
    #[error("table '{0}' has no columns")]
    EmptyTable(PathBuf),

    /// Nothing to process
    #[error("no input files found: {0}")]
    NoInputs(String),

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error means the input did not have the expected shape
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Error::MissingColumn { .. } | Error::EmptyTable(_))
    }
}
