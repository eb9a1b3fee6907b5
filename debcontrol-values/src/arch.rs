//! Architecture names and wildcards.

use crate::error::{Result, ValueError};
use std::fmt;
use std::str::FromStr;

const ANY: &str = "any";
const ALL: &str = "all";

/// A Debian architecture name such as `amd64`, `all`, `linux-any` or
/// `musl-linux-arm64`.
///
/// Names map onto an `(abi, os, cpu)` tuple; `any` in any position is a
/// wildcard. The name is kept verbatim for formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Arch {
    name: String,
}

impl Arch {
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| ValueError::Arch {
            input: input.to_owned(),
            reason: reason.to_owned(),
        };

        let name = input.trim();
        if name.is_empty() {
            return Err(invalid("empty architecture"));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(invalid("architecture names use lowercase letters, digits and '-'"));
        }
        let parts: Vec<&str> = name.split('-').collect();
        if parts.len() > 3 || parts.iter().any(|part| part.is_empty()) {
            return Err(invalid("expected [abi-][os-]cpu"));
        }
        if parts.len() > 1 && parts.contains(&ALL) {
            return Err(invalid("'all' cannot be part of a tuple"));
        }
        Ok(Self {
            name: name.to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The architecture-independent `all`.
    pub fn is_all(&self) -> bool {
        self.name == ALL
    }

    /// True if any tuple component is `any`.
    pub fn is_wildcard(&self) -> bool {
        self.name.split('-').any(|part| part == ANY)
    }

    /// The `(abi, os, cpu)` tuple. A bare cpu implies `gnu` on `linux`.
    pub fn tuple(&self) -> (&str, &str, &str) {
        let parts: Vec<&str> = self.name.split('-').collect();
        match *parts.as_slice() {
            [only] if only == ANY || only == ALL => (only, only, only),
            [cpu] => ("gnu", "linux", cpu),
            [os, cpu] if os == ANY || cpu == ANY => (ANY, os, cpu),
            [os, cpu] => ("gnu", os, cpu),
            [abi, os, cpu] => (abi, os, cpu),
            _ => (self.name.as_str(), self.name.as_str(), self.name.as_str()),
        }
    }

    /// Whether this architecture, used as a pattern, covers `concrete`.
    ///
    /// `all` only matches `all`; wildcards never match `all`.
    pub fn matches(&self, concrete: &Arch) -> bool {
        if self.is_all() || concrete.is_all() {
            return self.is_all() && concrete.is_all();
        }
        let (abi, os, cpu) = self.tuple();
        let (c_abi, c_os, c_cpu) = concrete.tuple();
        let covers = |pattern: &str, value: &str| pattern == ANY || pattern == value;
        covers(abi, c_abi) && covers(os, c_os) && covers(cpu, c_cpu)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for Arch {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
