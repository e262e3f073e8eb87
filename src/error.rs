//! Error types and result type for the dictfile crate.
//!
//! All fallible operations return [`Result<T>`], where errors are represented
//! by [`DictError`]. The crate uses the `snafu` library for ergonomic error
//! handling with automatic backtrace capture.
//!
//! # Error Variants
//!
//! - [`DictError::Io`]: I/O errors from the underlying storage
//! - [`DictError::UnsupportedVersion`]: header version outside the readable range
//! - [`DictError::UnsupportedLanguage`]: index sort language not in the known table
//! - [`DictError::Corrupt`]: bad offsets, truncation, missing terminator, unknown
//!   row tag, or a failed element decode
//! - [`DictError::Closed`]: operation on a dictionary after `close()`
//! - [`DictError::InvalidParameter`]: invalid function parameters
//!
//! Cancellation of a search is not an error: the search operations return a
//! distinguished `None` result when the interrupt flag is raised.

use std::io;

use snafu::{Backtrace, Snafu};

// Re-export snafu for context providers
pub use snafu;

/// Main error type for the dictfile crate.
///
/// All errors include automatic backtrace capture for debugging purposes.
/// Use the helper methods on `DictError` for convenient error construction.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DictError {
    /// I/O error occurred while reading or writing dictionary data.
    #[snafu(display("IO error: {source}"))]
    Io {
        source: io::Error,
        backtrace: Backtrace,
    },

    /// The file header declares a version this build cannot read.
    #[snafu(display("Unsupported dictionary version: {version}"))]
    UnsupportedVersion {
        version: i32,
        backtrace: Backtrace,
    },

    /// An index declares a sort language missing from the known-language table.
    #[snafu(display("Unsupported language: {code}"))]
    UnsupportedLanguage {
        code: String,
        backtrace: Backtrace,
    },

    /// Dictionary file data is malformed or doesn't match the expected layout.
    #[snafu(display("Corrupt dictionary: {message}"))]
    Corrupt {
        message: String,
        backtrace: Backtrace,
    },

    /// The dictionary's file handle has been closed.
    #[snafu(display("Dictionary is closed"))]
    Closed {
        backtrace: Backtrace,
    },

    /// Function was called with invalid parameters.
    #[snafu(display("Invalid parameter: {message}"))]
    InvalidParameter {
        message: String,
        backtrace: Backtrace,
    },
}

// For automatic conversions from standard error types.
//
// Reads that go through `SectionReader` tunnel crate errors inside an
// `io::Error`; unwrap those back to the original variant so a `Closed`
// raised three layers down still surfaces as `Closed`.
impl From<io::Error> for DictError {
    fn from(source: io::Error) -> Self {
        match source.downcast::<DictError>() {
            Ok(err) => err,
            Err(source) => Self::Io { source, backtrace: Backtrace::capture() },
        }
    }
}

/// Helper methods for creating errors without context providers.
impl DictError {
    /// Creates a `Corrupt` error with the given message.
    pub fn corrupt<S: Into<String>>(message: S) -> Self {
        Self::Corrupt {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates an `InvalidParameter` error with the given message.
    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter {
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates an `UnsupportedVersion` error for the given header version.
    pub fn unsupported_version(version: i32) -> Self {
        Self::UnsupportedVersion {
            version,
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates an `UnsupportedLanguage` error for the given ISO code.
    pub fn unsupported_language<S: Into<String>>(code: S) -> Self {
        Self::UnsupportedLanguage {
            code: code.into(),
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates a `Closed` error.
    pub fn closed() -> Self {
        Self::Closed {
            backtrace: Backtrace::capture(),
        }
    }

    /// Checks if this error is a `Closed` variant.
    pub fn is_closed(&self) -> bool {
        matches!(self, DictError::Closed { .. })
    }

    /// Checks if this error is a `Corrupt` variant.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, DictError::Corrupt { .. })
    }
}

/// A specialized `Result` type for dictionary operations.
///
/// This is a convenience type alias that uses [`DictError`] as the error type.
pub type Result<T> = std::result::Result<T, DictError>;
