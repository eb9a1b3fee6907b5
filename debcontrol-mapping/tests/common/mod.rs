#![allow(dead_code)]

use debcontrol_mapping::{BoxError, CodecRegistry, ControlCodec, Fields, Paragraph, Record, field};

/// `major.minor`, registered through a pair of closures.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Revision {
    pub major: u32,
    pub minor: u32,
}

pub fn parse_revision(raw: &str) -> Result<Revision, BoxError> {
    let (major, minor) = raw
        .split_once('.')
        .ok_or_else(|| format!("revision {raw:?} has no '.'"))?;
    Ok(Revision {
        major: major.parse()?,
        minor: minor.parse()?,
    })
}

pub fn format_revision(revision: &Revision) -> Result<String, BoxError> {
    Ok(format!("{}.{}", revision.major, revision.minor))
}

/// `digest:size`, registered through [`ControlCodec`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Checksum {
    pub digest: String,
    pub size: u64,
}

impl ControlCodec for Checksum {
    fn parse_control(raw: &str) -> Result<Self, BoxError> {
        let (digest, size) = raw
            .split_once(':')
            .ok_or_else(|| format!("checksum {raw:?} has no ':'"))?;
        Ok(Checksum {
            digest: digest.to_owned(),
            size: size.parse()?,
        })
    }

    fn format_control(&self) -> Result<String, BoxError> {
        if self.digest.is_empty() {
            return Err("checksum without digest".into());
        }
        Ok(format!("{}:{}", self.digest, self.size))
    }
}

/// A type nobody registers a codec for.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Opaque(pub String);

pub fn registry() -> CodecRegistry {
    let mut registry = CodecRegistry::new();
    registry
        .register(parse_revision, format_revision)
        .register_codec::<Checksum>();
    registry
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct People {
    pub maintainer: String,
    pub uploaders: Vec<String>,
}

impl Record for People {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, maintainer)).key("Maintainer");
        fields.list(field!(Self, uploaders)).key("Uploaders").delim(", ");
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Package {
    pub name: String,
    pub installed_size: u64,
    pub priority: i32,
    pub architectures: Vec<String>,
    pub revision: Revision,
    pub checksums: Vec<Checksum>,
    pub people: People,
    pub scratch: String,
}

impl Record for Package {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, name)).key("Package").required();
        fields.scalar(field!(Self, installed_size)).key("Installed-Size");
        fields.scalar(field!(Self, priority));
        fields.list(field!(Self, architectures)).key("Architecture");
        fields.custom(field!(Self, revision)).key("Revision");
        fields.custom_list(field!(Self, checksums)).key("Checksums").delim(", ");
        fields.nested(field!(Self, people));
        fields.scalar(field!(Self, scratch)).skip().required();
    }
}

/// A record keeping unmodeled keys.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Source {
    pub source: String,
    pub version: String,
    pub extra: Paragraph,
}

impl Record for Source {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, source)).key("Source").required();
        fields.scalar(field!(Self, version)).key("Version");
        fields.passthrough(field!(Self, extra));
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct WithOpaque {
    pub name: String,
    pub opaque: Opaque,
}

impl Record for WithOpaque {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, name)).key("Name");
        fields.custom(field!(Self, opaque)).key("Opaque");
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct WithOpaqueList {
    pub opaque: Vec<Opaque>,
}

impl Record for WithOpaqueList {
    fn describe(fields: &mut Fields<Self>) {
        fields.custom_list(field!(Self, opaque)).key("Opaque");
    }
}

pub fn para(fields: &[(&str, &str)]) -> Paragraph {
    fields.iter().copied().collect()
}
