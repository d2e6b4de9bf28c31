//! Error types for the gridquery engine.

use thiserror::Error;

/// Errors raised while loading data, configuring the grid or running queries.
///
/// Every parsing problem is detected eagerly at load or generation time and
/// carries the 1-based input line number plus the offending value, so input
/// data can be diagnosed without re-running anything.
#[derive(Debug, Error)]
pub enum GridQueryError {
    /// A data row has a non-numeric or non-finite coordinate, the wrong
    /// number of fields, or inverted bounds.
    #[error("malformed record at line {line}: {reason} (value: '{value}')")]
    MalformedRecord {
        line: usize,
        value: String,
        reason: String,
    },

    /// The header row is missing or lacks a required column.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The same id appears twice within one dataset load.
    #[error("duplicate id '{id}' at line {line}")]
    DuplicateId { line: usize, id: String },

    /// `k < 1`, `m < 1`, inverted domain bounds, non-finite query coordinates.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl GridQueryError {
    pub(crate) fn malformed(
        line: usize,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        GridQueryError::MalformedRecord {
            line,
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Line number of the offending input row, when the error refers to one.
    pub fn line(&self) -> Option<usize> {
        match self {
            GridQueryError::MalformedRecord { line, .. } | GridQueryError::DuplicateId { line, .. } => {
                Some(*line)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GridQueryError>;
