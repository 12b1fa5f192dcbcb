//! Error types shared by every part of the engine.

use thiserror::Error;

use crate::data_type::DataType;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by tables, columns, the query front end and ingestion.
///
/// Every variant is returned at the point of violation and propagated
/// unchanged through `Schema`, `Table` and `Column` boundaries.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed request against an otherwise valid structure: out of range
    /// row window, unknown column, row length mismatch, bad index.
    #[error("validation error: {0}")]
    Validation(String),

    /// A value cannot be coerced to the dtype of its column.
    #[error("cannot coerce {value} to {dtype}")]
    Dtype { value: String, dtype: DataType },

    /// Structural violation of a table or of the schema registry.
    #[error("table consistency error: {0}")]
    TableConsistency(String),

    /// I/O failure while reading or writing a table file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn consistency(msg: impl Into<String>) -> Self {
        Self::TableConsistency(msg.into())
    }

    pub(crate) fn dtype(value: impl ToString, dtype: DataType) -> Self {
        Self::Dtype {
            value: value.to_string(),
            dtype,
        }
    }
}
