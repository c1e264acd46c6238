//! Index error types
//!
//! Error codes:
//! - ZIP_INDEX_BUILD_HEADER: store header unreadable, build aborted
//! - ZIP_INDEX_IO_ERROR: index or store file could not be opened/written
//! - ZIP_INDEX_TRUNCATED: index file shorter than its entry count implies
//! - ZIP_INDEX_TRAILING_DATA: bytes after the last declared entry
//! - ZIP_INDEX_INVALID_KEY: key bytes are not UTF-8
//! - ZIP_INDEX_KEY_TOO_LONG: key does not fit a u16 length
//! - ZIP_INDEX_TOO_MANY_ENTRIES: entry count does not fit a u32

use std::error::Error as StdError;
use std::fmt;
use std::io;

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    BuildHeader,
    Io,
    Truncated,
    TrailingData,
    InvalidKey,
    KeyTooLong,
    TooManyEntries,
}

impl IndexErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::BuildHeader => "ZIP_INDEX_BUILD_HEADER",
            IndexErrorCode::Io => "ZIP_INDEX_IO_ERROR",
            IndexErrorCode::Truncated => "ZIP_INDEX_TRUNCATED",
            IndexErrorCode::TrailingData => "ZIP_INDEX_TRAILING_DATA",
            IndexErrorCode::InvalidKey => "ZIP_INDEX_INVALID_KEY",
            IndexErrorCode::KeyTooLong => "ZIP_INDEX_KEY_TOO_LONG",
            IndexErrorCode::TooManyEntries => "ZIP_INDEX_TOO_MANY_ENTRIES",
        }
    }

    /// Returns whether this is a format error in a persisted index
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            IndexErrorCode::Truncated | IndexErrorCode::TrailingData | IndexErrorCode::InvalidKey
        )
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug)]
pub struct IndexError {
    code: IndexErrorCode,
    message: String,
    offset: Option<u64>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl IndexError {
    fn new(code: IndexErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            offset: None,
            source: None,
        }
    }

    /// Store header could not be read; nothing was indexed
    pub fn build_header(source: crate::store::StoreError) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(IndexErrorCode::BuildHeader, "Store header unreadable")
        }
    }

    /// Create an I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(IndexErrorCode::Io, message)
        }
    }

    /// Create a truncation error at a byte offset of the index file
    pub fn truncated(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            offset: Some(offset),
            ..Self::new(IndexErrorCode::Truncated, reason)
        }
    }

    /// Create a trailing data error
    pub fn trailing_data(offset: u64, extra: u64) -> Self {
        Self {
            offset: Some(offset),
            ..Self::new(
                IndexErrorCode::TrailingData,
                format!("{} unexpected bytes after last entry", extra),
            )
        }
    }

    /// Create an invalid key error
    pub fn invalid_key(offset: u64) -> Self {
        Self {
            offset: Some(offset),
            ..Self::new(IndexErrorCode::InvalidKey, "Index key is not valid UTF-8")
        }
    }

    /// Create a key too long error
    pub fn key_too_long(len: usize) -> Self {
        Self::new(
            IndexErrorCode::KeyTooLong,
            format!("Key of {} bytes exceeds u16 length prefix", len),
        )
    }

    /// Create a too many entries error
    pub fn too_many_entries(count: usize) -> Self {
        Self::new(
            IndexErrorCode::TooManyEntries,
            format!("{} entries exceed u32 entry count", count),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the byte offset if applicable
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Returns whether the underlying cause is a missing file
    pub fn is_not_found(&self) -> bool {
        self.source
            .as_deref()
            .and_then(|e| e.downcast_ref::<io::Error>())
            .map(|e| e.kind() == io::ErrorKind::NotFound)
            .unwrap_or(false)
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        if let Some(offset) = self.offset {
            write!(f, " (byte_offset: {})", offset)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl StdError for IndexError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
