//! Schema-driven mapping between control-file paragraphs and typed records.
//!
//! A record type implements [`Record`] once, declaring its fields with
//! [`Fields`]; the engine then decodes any [`Paragraph`] into it and encodes
//! it back without per-field glue code:
//!
//! - [`Schema`]: field metadata resolved once per type and cached
//! - [`CodecRegistry`]: parse/format functions for custom value types
//! - [`Decoder`] / [`from_paragraph`] / [`unmarshal`]: paragraph → record
//! - [`to_paragraph`] / [`marshal`]: record → paragraph
//! - [`Encoder`]: many records to one stream, blank-line separated
//!
//! Supported field shapes: strings and integers, delimiter-joined sequences
//! of those, codec-registered types and sequences of them, nested records
//! sharing the parent's key space, and one pass-through [`Paragraph`] that
//! keeps keys no field models.

mod codec;
mod decode;
mod encode;
mod error;
mod record;
mod scalar;
mod schema;
mod slot;

pub use codec::{Codec, CodecRegistry, ControlCodec};
pub use debcontrol_paragraph::{Paragraph, ParagraphError, ParagraphReader};
pub use decode::{Decoder, from_paragraph, unmarshal};
pub use encode::{Encoder, marshal, to_paragraph};
pub use error::{BoxError, ControlError, Result, SchemaError};
pub use record::{DEFAULT_DELIM, FieldDecl, Fields, Lens, Record, SKIP_KEY};
pub use scalar::Scalar;
pub use schema::{FieldSchema, Schema, schema_of};
