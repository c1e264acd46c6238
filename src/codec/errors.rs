//! Decode errors for the postal-code record codec

use thiserror::Error;

/// Result type for codec operations
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Reasons a line cannot be turned into a record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("Expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Header row")]
    HeaderRow,

    #[error("Invalid {field}: {value:?}")]
    InvalidCoordinate { field: &'static str, value: String },

    #[error("Payload is not valid UTF-8")]
    InvalidUtf8,
}

impl DecodeError {
    /// Header rows are expected in source files and are skipped quietly
    pub fn is_header(&self) -> bool {
        matches!(self, DecodeError::HeaderRow)
    }
}
