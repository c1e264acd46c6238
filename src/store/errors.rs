//! Store error types
//!
//! Error codes:
//! - ZIP_STORE_IO_ERROR (ERROR severity)
//! - ZIP_STORE_SEEK_FAILED (ERROR severity)
//! - ZIP_STORE_TRUNCATED (FATAL severity)
//! - ZIP_STORE_UNSUPPORTED_VERSION (FATAL severity)
//! - ZIP_STORE_INVALID_HEADER (FATAL severity)
//! - ZIP_STORE_COUNT_MISMATCH (ERROR severity)

use std::fmt;
use std::io;

/// Severity levels for store errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, caller may continue
    Error,
    /// The store file cannot be trusted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// File could not be opened, created, read or written
    Io,
    /// Offset lies outside the store file
    Seek,
    /// Fewer bytes available than the declared structure requires
    Truncated,
    /// Header version byte is not a known layout
    UnsupportedVersion,
    /// Header field holds an impossible value
    InvalidHeader,
    /// Frames written disagree with the header's record count
    CountMismatch,
}

impl StoreErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::Io => "ZIP_STORE_IO_ERROR",
            StoreErrorCode::Seek => "ZIP_STORE_SEEK_FAILED",
            StoreErrorCode::Truncated => "ZIP_STORE_TRUNCATED",
            StoreErrorCode::UnsupportedVersion => "ZIP_STORE_UNSUPPORTED_VERSION",
            StoreErrorCode::InvalidHeader => "ZIP_STORE_INVALID_HEADER",
            StoreErrorCode::CountMismatch => "ZIP_STORE_COUNT_MISMATCH",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            StoreErrorCode::Io | StoreErrorCode::Seek | StoreErrorCode::CountMismatch => {
                Severity::Error
            }
            StoreErrorCode::Truncated
            | StoreErrorCode::UnsupportedVersion
            | StoreErrorCode::InvalidHeader => Severity::Fatal,
        }
    }

    /// Returns whether this is a format error rather than an I/O error
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            StoreErrorCode::Truncated
                | StoreErrorCode::UnsupportedVersion
                | StoreErrorCode::InvalidHeader
        )
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with context
#[derive(Debug)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StoreError {
    fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create an I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            source: Some(source),
            ..Self::new(StoreErrorCode::Io, message)
        }
    }

    /// Create a seek error for an offset outside the file
    pub fn seek_out_of_bounds(offset: u64, file_len: u64) -> Self {
        Self {
            details: Some(format!("byte_offset: {}, file_len: {}", offset, file_len)),
            ..Self::new(StoreErrorCode::Seek, "Offset outside store file")
        }
    }

    /// Create a seek error from a failed seek call
    pub fn seek_failed(offset: u64, source: io::Error) -> Self {
        Self {
            details: Some(format!("byte_offset: {}", offset)),
            source: Some(source),
            ..Self::new(StoreErrorCode::Seek, "Failed to seek store file")
        }
    }

    /// Create a truncation error
    pub fn truncated(reason: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::Truncated, reason)
    }

    /// Create a truncation error with byte offset context
    pub fn truncated_at(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            details: Some(format!("byte_offset: {}", offset)),
            ..Self::truncated(reason)
        }
    }

    /// Create an unsupported version error
    pub fn unsupported_version(version: u8) -> Self {
        Self::new(
            StoreErrorCode::UnsupportedVersion,
            format!("Unsupported store header version: {}", version),
        )
    }

    /// Create an invalid header error
    pub fn invalid_header(reason: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::InvalidHeader, reason)
    }

    /// Create a record count mismatch error
    pub fn count_mismatch(declared: u32, written: u64) -> Self {
        Self::new(
            StoreErrorCode::CountMismatch,
            format!(
                "Header declares {} records but {} were written",
                declared, written
            ),
        )
    }

    /// Maps a failed `read_exact` to truncation or I/O
    pub(crate) fn from_read(what: &str, offset: u64, e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::truncated_at(offset, format!("Unexpected end of file reading {}", what))
        } else {
            Self::io_error(format!("Failed to read {}", what), e)
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether the store must be considered unusable
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
