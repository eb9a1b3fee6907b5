//! Error types for paragraph parsing and writing.

use thiserror::Error;

/// Errors raised while tokenizing or writing paragraphs.
#[derive(Debug, Error)]
pub enum ParagraphError {
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line could not be interpreted as a field or continuation.
    #[error("line {line}: {reason}")]
    Syntax { line: usize, reason: String },

    /// The same key appeared twice within one paragraph.
    #[error("line {line}: duplicate key {key:?}")]
    DuplicateKey { line: usize, key: String },

    /// A key cannot be represented in the text form.
    #[error("invalid key {0:?}")]
    InvalidKey(String),

    /// A value would not read back unchanged from the text form.
    #[error("value of {key:?} cannot be written: {reason}")]
    InvalidValue { key: String, reason: &'static str },
}

/// Result type for paragraph operations.
pub type Result<T> = std::result::Result<T, ParagraphError>;
