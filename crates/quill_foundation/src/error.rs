//! Error types for the Quill compiler frontend.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use thiserror::Error;

/// A specialized result type for Quill operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for Quill operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse_error(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self::new(ErrorKind::ParseError {
            message: message.into(),
            line,
            column,
        })
    }

    /// Creates an internal error (should not happen).
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The grammar failed to consume the input; carries the single
    /// deepest failure observed across the parse attempt.
    #[error("parse error at {line}:{column}: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Line number (1-indexed).
        line: u32,
        /// Column number (1-indexed).
        column: u32,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}
