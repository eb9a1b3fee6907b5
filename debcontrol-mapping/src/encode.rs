//! Record → paragraph, and streams of records → text.

use crate::codec::CodecRegistry;
use crate::error::Result;
use crate::record::Record;
use crate::schema::{Entry, Schema};
use debcontrol_paragraph::Paragraph;
use std::io::Write;
use tracing::trace;

/// Converts `record` into a paragraph.
///
/// Keys follow field declaration order. If the record has a pass-through
/// paragraph, the produced fields are merged over it with
/// [`Paragraph::update`]. Nothing is returned on error.
pub fn to_paragraph<R: Record>(record: &R, registry: &CodecRegistry) -> Result<Paragraph> {
    let schema = Schema::<R>::resolve()?;
    encode_with(&schema, record, registry)
}

pub(crate) fn encode_with<R>(
    schema: &Schema<R>,
    record: &R,
    registry: &CodecRegistry,
) -> Result<Paragraph> {
    let produced = encode_fields(schema, record, registry)?;
    Ok(match schema.passthrough() {
        Some(passthrough) => passthrough.get(record).update(&produced),
        None => produced,
    })
}

/// Declared fields only, without the pass-through merge.
pub(crate) fn encode_fields<R>(
    schema: &Schema<R>,
    record: &R,
    registry: &CodecRegistry,
) -> Result<Paragraph> {
    let mut produced = Paragraph::new();
    for entry in schema.entries() {
        match entry {
            Entry::Value { field, slot } => {
                trace!(record = schema.record(), key = %field.key, "encoding field");
                let value = slot
                    .encode(record, &field.delim, registry)
                    .map_err(|failure| failure.into_error(field))?;
                produced.set(field.key.as_str(), value);
            }
            Entry::Nested(nested) => {
                let child = nested.encode(record, registry)?;
                produced.extend(child.iter());
            }
        }
    }
    Ok(produced)
}

/// Writes a single record to `writer` with no separator handling.
///
/// Use an [`Encoder`] to write several records to one stream.
pub fn marshal<W: Write, R: Record>(writer: W, record: &R, registry: &CodecRegistry) -> Result<()> {
    Encoder::new(writer, registry).encode(record)
}

/// Writes records to one output, separated by blank lines.
///
/// An encoder owns its sink and tracks whether a record has been written;
/// it is meant for a single output stream and a single caller at a time.
pub struct Encoder<'r, W> {
    writer: W,
    registry: &'r CodecRegistry,
    already_written: bool,
}

impl<'r, W: Write> Encoder<'r, W> {
    pub fn new(writer: W, registry: &'r CodecRegistry) -> Self {
        Self {
            writer,
            registry,
            already_written: false,
        }
    }

    /// Encodes and writes one record, preceded by a blank line unless it is
    /// the first.
    ///
    /// The record is encoded and rendered to text before anything is
    /// written, so a record that fails either step leaves the output
    /// untouched.
    pub fn encode<R: Record>(&mut self, record: &R) -> Result<()> {
        let paragraph = to_paragraph(record, self.registry)?;
        let mut rendered = Vec::new();
        paragraph.write_to(&mut rendered)?;
        if self.already_written {
            self.writer.write_all(b"\n")?;
        }
        self.writer.write_all(&rendered)?;
        self.already_written = true;
        Ok(())
    }

    /// Encodes each record in order, stopping at the first failure.
    /// Records already written stay written.
    pub fn encode_all<'a, R, I>(&mut self, records: I) -> Result<()>
    where
        R: Record,
        I: IntoIterator<Item = &'a R>,
    {
        for record in records {
            self.encode(record)?;
        }
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
