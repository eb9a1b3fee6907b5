//! Relationship fields: `Depends`, `Build-Depends`, `Breaks` and friends.
//!
//! A field is a comma separated list of possibilities; each possibility is
//! a `|` separated list of alternative relations:
//!
//! ```text
//! libc6 (>= 2.36), foo:any | bar [amd64 !i386] <!nocheck>
//! ```

use crate::arch::Arch;
use crate::error::{Result, ValueError};
use crate::version::Version;
use std::fmt;
use std::str::FromStr;

/// Version comparison operator inside a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    StrictlyEarlier,
    EarlierOrEqual,
    Equal,
    LaterOrEqual,
    StrictlyLater,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrictlyEarlier => "<<",
            Self::EarlierOrEqual => "<=",
            Self::Equal => "=",
            Self::LaterOrEqual => ">=",
            Self::StrictlyLater => ">>",
        }
    }

    /// Legacy single `<` and `>` mean `<=` and `>=`.
    fn parse(token: &str) -> Option<Self> {
        match token {
            "<<" => Some(Self::StrictlyEarlier),
            "<=" | "<" => Some(Self::EarlierOrEqual),
            "=" => Some(Self::Equal),
            ">=" | ">" => Some(Self::LaterOrEqual),
            ">>" => Some(Self::StrictlyLater),
            _ => None,
        }
    }

    pub fn satisfied_by(self, candidate: &Version, bound: &Version) -> bool {
        let ordering = candidate.cmp(bound);
        match self {
            Self::StrictlyEarlier => ordering.is_lt(),
            Self::EarlierOrEqual => ordering.is_le(),
            Self::Equal => ordering.is_eq(),
            Self::LaterOrEqual => ordering.is_ge(),
            Self::StrictlyLater => ordering.is_gt(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRelation {
    pub operator: Operator,
    pub version: Version,
}

impl VersionRelation {
    pub fn satisfied_by(&self, candidate: &Version) -> bool {
        self.operator.satisfied_by(candidate, &self.version)
    }
}

/// One entry of an `[arch ...]` restriction list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchRestriction {
    pub negated: bool,
    pub arch: Arch,
}

impl fmt::Display for ArchRestriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            f.write_str("!")?;
        }
        write!(f, "{}", self.arch)
    }
}

/// A single package relation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Relation {
    pub package: String,
    pub arch_qualifier: Option<Arch>,
    pub version: Option<VersionRelation>,
    pub architectures: Vec<ArchRestriction>,
    /// Build profile formulas; each inner list is one `<...>` group.
    pub profiles: Vec<Vec<String>>,
}

impl Relation {
    /// Whether the relation applies when building for `arch`.
    ///
    /// An empty restriction list applies everywhere. Positive entries
    /// require a match; negated entries exclude on a match.
    pub fn applies_to(&self, arch: &Arch) -> bool {
        if self.architectures.is_empty() {
            return true;
        }
        if self.architectures.iter().all(|r| r.negated) {
            return !self.architectures.iter().any(|r| r.arch.matches(arch));
        }
        self.architectures
            .iter()
            .any(|r| !r.negated && r.arch.matches(arch))
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.package)?;
        if let Some(qualifier) = &self.arch_qualifier {
            write!(f, ":{qualifier}")?;
        }
        if let Some(version) = &self.version {
            write!(f, " ({} {})", version.operator, version.version)?;
        }
        if !self.architectures.is_empty() {
            f.write_str(" [")?;
            for (i, restriction) in self.architectures.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{restriction}")?;
            }
            f.write_str("]")?;
        }
        for group in &self.profiles {
            write!(f, " <{}>", group.join(" "))?;
        }
        Ok(())
    }
}

/// Alternatives separated by `|`; any one satisfies the possibility.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Possibility {
    pub alternatives: Vec<Relation>,
}

impl fmt::Display for Possibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, relation) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{relation}")?;
        }
        Ok(())
    }
}

/// A full relationship field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dependency {
    pub relations: Vec<Possibility>,
}

impl Dependency {
    pub fn parse(input: &str) -> Result<Self> {
        let mut relations = Vec::new();
        for piece in input.split(',') {
            if piece.trim().is_empty() {
                continue;
            }
            let alternatives = piece
                .split('|')
                .map(|alternative| parse_relation(input, alternative))
                .collect::<Result<Vec<_>>>()?;
            relations.push(Possibility { alternatives });
        }
        Ok(Self { relations })
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Every relation name mentioned, in order of appearance.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.relations
            .iter()
            .flat_map(|possibility| possibility.alternatives.iter())
            .map(|relation| relation.package.as_str())
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, possibility) in self.relations.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{possibility}")?;
        }
        Ok(())
    }
}

impl FromStr for Dependency {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_relation(input: &str, text: &str) -> Result<Relation> {
    let invalid = |reason: String| ValueError::Dependency {
        input: input.to_owned(),
        reason,
    };

    let mut rest = text.trim_start();
    let name_len = rest
        .find(|c: char| c.is_whitespace() || "(<[".contains(c))
        .unwrap_or(rest.len());
    let (name, tail) = rest.split_at(name_len);
    rest = tail.trim_start();
    if name.is_empty() {
        return Err(invalid(format!("missing package name in {:?}", text.trim())));
    }

    let (package, arch_qualifier) = match name.split_once(':') {
        Some((package, qualifier)) => {
            let qualifier = Arch::parse(qualifier)
                .map_err(|err| invalid(format!("bad architecture qualifier: {err}")))?;
            (package, Some(qualifier))
        }
        None => (name, None),
    };
    if !package
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+-.".contains(c))
    {
        return Err(invalid(format!("invalid package name {package:?}")));
    }

    let mut relation = Relation {
        package: package.to_owned(),
        arch_qualifier,
        ..Relation::default()
    };

    if let Some(inner) = rest.strip_prefix('(') {
        let (body, tail) = inner
            .split_once(')')
            .ok_or_else(|| invalid("unterminated version constraint".to_owned()))?;
        rest = tail.trim_start();
        let body = body.trim();
        let op_len = body
            .find(|c: char| !"<=>".contains(c))
            .unwrap_or(body.len());
        let (token, version) = body.split_at(op_len);
        let operator = Operator::parse(token)
            .ok_or_else(|| invalid(format!("unknown version operator {token:?}")))?;
        let version = Version::parse(version)
            .map_err(|err| invalid(format!("bad version constraint: {err}")))?;
        relation.version = Some(VersionRelation { operator, version });
    }

    if let Some(inner) = rest.strip_prefix('[') {
        let (body, tail) = inner
            .split_once(']')
            .ok_or_else(|| invalid("unterminated architecture list".to_owned()))?;
        rest = tail.trim_start();
        for token in body.split_whitespace() {
            let (negated, name) = match token.strip_prefix('!') {
                Some(name) => (true, name),
                None => (false, token),
            };
            let arch = Arch::parse(name)
                .map_err(|err| invalid(format!("bad architecture restriction: {err}")))?;
            relation.architectures.push(ArchRestriction { negated, arch });
        }
        if relation.architectures.is_empty() {
            return Err(invalid("empty architecture list".to_owned()));
        }
    }

    while let Some(inner) = rest.strip_prefix('<') {
        let (body, tail) = inner
            .split_once('>')
            .ok_or_else(|| invalid("unterminated build profile".to_owned()))?;
        rest = tail.trim_start();
        let group: Vec<String> = body.split_whitespace().map(str::to_owned).collect();
        if group.is_empty() {
            return Err(invalid("empty build profile".to_owned()));
        }
        relation.profiles.push(group);
    }

    if !rest.trim().is_empty() {
        return Err(invalid(format!("unexpected trailing text {:?}", rest.trim())));
    }
    Ok(relation)
}
