use crate::error::{ParagraphError, Result};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;

/// An ordered block of unique keys, each mapped to a raw string value.
///
/// Insertion order is the order fields are written back out. Setting an
/// existing key replaces its value in place; new keys are appended.
/// Multi-line values are stored with embedded `\n` and no continuation
/// indentation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl Paragraph {
    /// Creates an empty paragraph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Sets `key` to `value`, returning the previous value if the key existed.
    /// An existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.values.get_mut(&key) {
            return Some(std::mem::replace(slot, value));
        }
        self.order.push(key.clone());
        self.values.insert(key, value);
        None
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let value = self.values.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    /// Keys in paragraph order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// `(key, value)` pairs in paragraph order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            keys: self.order.iter(),
            values: &self.values,
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Merges `overlay` over this paragraph and returns the result.
    ///
    /// Overlay values replace base values for shared keys, base keys keep
    /// their relative order, and overlay-only keys are appended after every
    /// base key in overlay order.
    #[must_use]
    pub fn update(&self, overlay: &Paragraph) -> Paragraph {
        let mut merged = self.clone();
        for (key, value) in overlay {
            merged.set(key, value);
        }
        merged
    }

    /// Writes the paragraph in control-file form, one field per line and
    /// continuation lines indented by a single space. Empty interior lines
    /// are written as ` .`.
    ///
    /// Every key and value is checked before anything is written, so the
    /// output always parses back to an equal paragraph. Values fail with
    /// [`ParagraphError::InvalidValue`] when the first line has surrounding
    /// whitespace, or when an interior line is a lone `.`, is whitespace only,
    /// or ends with `\r`.
    ///
    /// No trailing blank line is written; separating paragraphs is up to the
    /// caller.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        for (key, value) in self {
            validate_key(key)?;
            validate_value(key, value)?;
        }
        writer.write_all(self.to_string().as_bytes())?;
        Ok(())
    }
}

/// Checks that `key` can be written as a field name: non-empty, not starting
/// with `#` or `-`, and free of `:`, whitespace and control characters.
pub fn validate_key(key: &str) -> Result<()> {
    let malformed = key.is_empty()
        || key.starts_with('#')
        || key.starts_with('-')
        || key.chars().any(|c| c == ':' || c.is_whitespace() || c.is_control());
    if malformed {
        return Err(ParagraphError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

// Rejects text the reader would not restore exactly.
fn validate_value(key: &str, value: &str) -> Result<()> {
    let invalid = |reason| ParagraphError::InvalidValue {
        key: key.to_owned(),
        reason,
    };

    let mut lines = value.split('\n');
    let first = lines.next().unwrap_or_default();
    if first.trim() != first {
        return Err(invalid("first line has leading or trailing whitespace"));
    }
    for line in lines {
        if line == "." {
            return Err(invalid("continuation line is a lone \".\""));
        }
        if !line.is_empty() && line.trim().is_empty() {
            return Err(invalid("continuation line is whitespace only"));
        }
        if line.ends_with('\r') {
            return Err(invalid("continuation line ends with a carriage return"));
        }
    }
    Ok(())
}

impl fmt::Display for Paragraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self {
            let mut lines = value.split('\n');
            match lines.next() {
                Some(first) if !first.is_empty() => write!(f, "{key}: {first}")?,
                _ => write!(f, "{key}:")?,
            }
            for line in lines {
                if line.is_empty() {
                    f.write_str("\n .")?;
                } else {
                    write!(f, "\n {line}")?;
                }
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Paragraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over a paragraph's fields in order.
pub struct Iter<'a> {
    keys: std::slice::Iter<'a, String>,
    values: &'a HashMap<String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        let value = self.values.get(key).map_or("", String::as_str);
        Some((key.as_str(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Paragraph {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Paragraph {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut paragraph = Paragraph::new();
        paragraph.extend(iter);
        paragraph
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Paragraph {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

// ── serde ────────────────────────────────────────────────────────
//
// Serialized as a map whose entry order is the paragraph order.

impl Serialize for Paragraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Paragraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ParagraphVisitor)
    }
}

struct ParagraphVisitor;

impl<'de> Visitor<'de> for ParagraphVisitor {
    type Value = Paragraph;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of control field names to string values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Paragraph, A::Error> {
        let mut paragraph = Paragraph::new();
        while let Some((key, value)) = access.next_entry::<String, String>()? {
            if paragraph.contains_key(&key) {
                return Err(serde::de::Error::custom(format!("duplicate key {key:?}")));
            }
            paragraph.set(key, value);
        }
        Ok(paragraph)
    }
}
