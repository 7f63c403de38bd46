//! vCard parse error types.

use thiserror::Error;

/// Result type for vCard parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred while lexing a content line.
#[derive(Error, Debug, Clone)]
#[error("line {line}: {kind}: {message}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Line number where the error occurred (1-based).
    pub line: usize,
    /// Additional context or message.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            message: message.into(),
        }
    }
}

/// The kind of parse error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Line has no colon separating name from value.
    #[error("missing value separator")]
    MissingSeparator,
    /// Property name is empty or contains invalid characters.
    #[error("invalid property name")]
    InvalidPropertyName,
}
