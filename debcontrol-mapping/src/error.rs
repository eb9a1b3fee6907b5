//! Error types for the mapping engine.

use debcontrol_paragraph::ParagraphError;
use thiserror::Error;

/// Boxed error returned by codec parse/format functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A record type whose field declarations are malformed or contradictory.
///
/// Detected the first time the type's schema is resolved and cached with it,
/// so every later use of the type reports the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid control schema for {record}: {reason}")]
pub struct SchemaError {
    pub record: &'static str,
    pub reason: String,
}

/// Errors surfaced by decode and encode calls.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A required key is absent from the source paragraph.
    #[error("required field {field} missing (key {key:?})")]
    RequiredField { field: &'static str, key: String },

    /// A raw value could not be converted into the field's scalar type.
    #[error("failed to set {field}: cannot convert {value:?}: {reason}")]
    Conversion {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The field's type has no built-in handling and no registered codec.
    #[error("field {field} has unsupported type {shape}: no codec registered")]
    UnsupportedType {
        field: &'static str,
        shape: &'static str,
    },

    /// A registered codec rejected the value.
    #[error("codec failed for {field}: {source}")]
    Codec {
        field: &'static str,
        #[source]
        source: BoxError,
    },

    /// The input stream held no paragraph to decode.
    #[error("no paragraph found in input")]
    NoParagraph,

    #[error(transparent)]
    Paragraph(#[from] ParagraphError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, ControlError>;
