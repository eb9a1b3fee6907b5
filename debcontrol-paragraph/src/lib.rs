//! Ordered key/value paragraphs for Debian control files.
//!
//! A control file is a sequence of RFC822-like paragraphs separated by blank
//! lines. This crate provides:
//! - [`Paragraph`]: unique keys in insertion order, each mapped to a raw string
//! - [`Paragraph::update`]: overlay merge that keeps the base key order
//! - [`ParagraphReader`]: tokenizer turning a line stream into paragraphs
//!   (continuation lines, `#` comments, blank-line separation)
//! - [`Paragraph::write_to`]: the inverse of the tokenizer
//!
//! Values are never interpreted here; mapping them onto typed records is the
//! job of `debcontrol-mapping`.

mod error;
mod paragraph;
mod reader;

pub use error::{ParagraphError, Result};
pub use paragraph::{Iter, Paragraph, validate_key};
pub use reader::ParagraphReader;
