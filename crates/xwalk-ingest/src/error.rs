//! Error types for input loading.

use std::path::PathBuf;
use thiserror::Error;

use xwalk_model::ModelError;

/// Errors that can occur while loading an input table.
///
/// Every variant is fatal: a malformed input is never coerced.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("input file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Parsing Errors ===
    /// Failed to parse a delimited file.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// File has a header but no data rows.
    #[error("input file has no data rows: {path}")]
    Empty { path: PathBuf },

    // === Schema Errors ===
    /// Required column not found.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Required cell is blank.
    #[error("blank '{column}' at line {line} of {path}")]
    BlankValue {
        column: String,
        line: u64,
        path: PathBuf,
    },

    /// Cell value cannot be parsed for its column.
    #[error("invalid {column} value '{value}' at line {line} of {path}")]
    InvalidValue {
        column: String,
        value: String,
        line: u64,
        path: PathBuf,
    },

    /// Record-level validation failed.
    #[error("invalid record in {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    /// A key that must be unique carries two different values.
    #[error("conflicting {column} for {key} in {path}: '{first}' vs '{second}'")]
    ConflictingValue {
        column: String,
        key: String,
        first: String,
        second: String,
        path: PathBuf,
    },
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::FileRead { path, source }
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn model(path: impl Into<PathBuf>, source: ModelError) -> Self {
        Self::Model {
            path: path.into(),
            source,
        }
    }
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, IngestError>;
