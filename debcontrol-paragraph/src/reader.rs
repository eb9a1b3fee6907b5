//! Line tokenizer for control-file text.

use crate::error::{ParagraphError, Result};
use crate::paragraph::Paragraph;
use std::io::BufRead;
use tracing::trace;

/// Reads successive paragraphs from a line-oriented source.
///
/// - a line starting with a space or tab continues the previous field; its
///   first character is dropped and a lone `.` stands for an empty line
/// - lines starting with `#` are comments and are ignored
/// - one or more blank lines end a paragraph
///
/// Iteration stops after the first error.
pub struct ParagraphReader<R> {
    reader: R,
    line: usize,
    buf: String,
    failed: bool,
}

impl<R: BufRead> ParagraphReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
            failed: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Reads the next paragraph, or `None` once the input is exhausted.
    pub fn next_paragraph(&mut self) -> Result<Option<Paragraph>> {
        let mut paragraph = Paragraph::new();
        let mut pending: Option<(String, String)> = None;

        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                break;
            }
            self.line += 1;
            let line = self.buf.trim_end_matches(['\n', '\r']);

            if line.trim().is_empty() {
                if paragraph.is_empty() && pending.is_none() {
                    continue;
                }
                break;
            }

            if line.starts_with('#') {
                trace!(line = self.line, "skipping comment line");
                continue;
            }

            if line.starts_with([' ', '\t']) {
                let Some((_, value)) = pending.as_mut() else {
                    return Err(self.syntax("continuation line before any field"));
                };
                let content = &line[1..];
                value.push('\n');
                if content != "." {
                    value.push_str(content);
                }
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                return Err(self.syntax(format!("expected `Key: value`, found {line:?}")));
            };
            let key = key.trim_end();
            if key.is_empty() {
                return Err(self.syntax("empty field name"));
            }
            let duplicate = paragraph.contains_key(key)
                || pending.as_ref().is_some_and(|(pending_key, _)| pending_key == key);
            if duplicate {
                return Err(ParagraphError::DuplicateKey {
                    line: self.line,
                    key: key.to_owned(),
                });
            }

            if let Some((k, v)) = pending.replace((key.to_owned(), value.trim().to_owned())) {
                paragraph.set(k, v);
            }
        }

        if let Some((k, v)) = pending {
            paragraph.set(k, v);
        }
        Ok((!paragraph.is_empty()).then_some(paragraph))
    }

    fn syntax(&self, reason: impl Into<String>) -> ParagraphError {
        ParagraphError::Syntax {
            line: self.line,
            reason: reason.into(),
        }
    }
}

impl<R: BufRead> Iterator for ParagraphReader<R> {
    type Item = Result<Paragraph>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_paragraph() {
            Ok(paragraph) => paragraph.map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl Paragraph {
    /// Parses the first paragraph from `reader`.
    ///
    /// Returns `None` if the input holds only blank and comment lines.
    pub fn parse<R: BufRead>(reader: R) -> Result<Option<Paragraph>> {
        ParagraphReader::new(reader).next_paragraph()
    }
}
