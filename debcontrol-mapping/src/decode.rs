//! Paragraph → record.

use crate::codec::CodecRegistry;
use crate::error::{ControlError, Result};
use crate::record::Record;
use crate::schema::{Entry, Schema};
use debcontrol_paragraph::{Paragraph, ParagraphReader};
use std::io::BufRead;
use tracing::trace;

/// Populates records from paragraphs.
///
/// Decoding is fail-fast: the first failing field aborts the call, and
/// fields handled before it stay populated.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r CodecRegistry,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r CodecRegistry) -> Self {
        Self { registry }
    }

    /// Decodes `paragraph` into `record`.
    ///
    /// Keys absent from the paragraph leave their fields untouched unless the
    /// field is required.
    pub fn decode<R: Record>(&self, record: &mut R, paragraph: &Paragraph) -> Result<()> {
        let schema = Schema::<R>::resolve()?;
        self.decode_with(&schema, record, paragraph)
    }

    /// Decodes `paragraph` into a fresh `R::default()`.
    pub fn from_paragraph<R: Record>(&self, paragraph: &Paragraph) -> Result<R> {
        let mut record = R::default();
        self.decode(&mut record, paragraph)?;
        Ok(record)
    }

    /// Reads the first paragraph from `reader` and decodes it.
    pub fn from_reader<R: Record, B: BufRead>(&self, reader: B) -> Result<R> {
        let paragraph = Paragraph::parse(reader)?.ok_or(ControlError::NoParagraph)?;
        self.from_paragraph(&paragraph)
    }

    /// Decodes every paragraph in `reader`, in order.
    pub fn decode_all<R: Record, B: BufRead>(&self, reader: B) -> Result<Vec<R>> {
        ParagraphReader::new(reader)
            .map(|paragraph| self.from_paragraph(&paragraph?))
            .collect()
    }

    pub(crate) fn decode_with<R>(
        &self,
        schema: &Schema<R>,
        record: &mut R,
        paragraph: &Paragraph,
    ) -> Result<()> {
        for entry in schema.entries() {
            match entry {
                Entry::Value { field, slot } => {
                    let Some(raw) = paragraph.get(&field.key) else {
                        if field.required {
                            return Err(ControlError::RequiredField {
                                field: field.name,
                                key: field.key.clone(),
                            });
                        }
                        continue;
                    };
                    trace!(record = schema.record(), key = %field.key, "decoding field");
                    slot.decode(record, raw, &field.delim, self.registry)
                        .map_err(|failure| failure.into_error(field))?;
                }
                Entry::Nested(nested) => nested.decode(record, paragraph, self)?,
            }
        }
        if let Some(passthrough) = schema.passthrough() {
            *passthrough.get_mut(record) = paragraph.clone();
        }
        Ok(())
    }
}

/// Decodes `paragraph` into a fresh `R` using `registry`.
pub fn from_paragraph<R: Record>(paragraph: &Paragraph, registry: &CodecRegistry) -> Result<R> {
    Decoder::new(registry).from_paragraph(paragraph)
}

/// Parses the first paragraph from `reader` and decodes it into a fresh `R`.
pub fn unmarshal<R: Record, B: BufRead>(reader: B, registry: &CodecRegistry) -> Result<R> {
    Decoder::new(registry).from_reader(reader)
}
