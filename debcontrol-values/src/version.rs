//! Package versions and dpkg ordering.

use crate::error::{Result, ValueError};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A package version: `[epoch:]upstream[-revision]`.
///
/// Equality and ordering follow dpkg, so `1.0` and `1.00` compare equal.
#[derive(Debug, Clone, Default)]
pub struct Version {
    pub epoch: u32,
    pub upstream: String,
    /// Empty for native packages.
    pub revision: String,
}

impl Version {
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| ValueError::Version {
            input: input.to_owned(),
            reason: reason.to_owned(),
        };

        let text = input.trim();
        if text.is_empty() {
            return Err(invalid("empty version"));
        }
        if text.chars().any(char::is_whitespace) {
            return Err(invalid("embedded whitespace"));
        }

        let (epoch, rest) = match text.split_once(':') {
            Some((epoch, rest)) => {
                let epoch = epoch
                    .parse::<u32>()
                    .map_err(|_| invalid("epoch is not a number"))?;
                (epoch, rest)
            }
            None => (0, text),
        };

        let (upstream, revision) = match rest.rsplit_once('-') {
            Some((upstream, revision)) => (upstream, revision),
            None => (rest, ""),
        };
        if upstream.is_empty() {
            return Err(invalid("empty upstream version"));
        }
        if !upstream.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(invalid("upstream version must start with a digit"));
        }
        if !upstream.chars().all(|c| c.is_ascii_alphanumeric() || ".+~-:".contains(c)) {
            return Err(invalid("invalid character in upstream version"));
        }
        if rest.contains('-') && revision.is_empty() {
            return Err(invalid("empty revision"));
        }
        if !revision.chars().all(|c| c.is_ascii_alphanumeric() || ".+~".contains(c)) {
            return Err(invalid("invalid character in revision"));
        }

        Ok(Self {
            epoch,
            upstream: upstream.to_owned(),
            revision: revision.to_owned(),
        })
    }

    /// True for versions without a Debian revision.
    pub fn is_native(&self) -> bool {
        self.revision.is_empty()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch > 0 {
            write!(f, "{}:", self.epoch)?;
        }
        f.write_str(&self.upstream)?;
        if !self.revision.is_empty() {
            write!(f, "-{}", self.revision)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_part(&self.upstream, &other.upstream))
            .then_with(|| compare_part(&self.revision, &other.revision))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

// `~` sorts before everything, even the end of the string; letters sort
// before other punctuation.
fn weight(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(c) if c.is_ascii_digit() => 0,
        Some(c) if c.is_ascii_alphabetic() => i32::from(c),
        Some(b'~') => -1,
        Some(c) => i32::from(c) + 256,
    }
}

fn compare_part(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let (mut i, mut j) = (0, 0);
    let digit_at = |s: &[u8], k: usize| s.get(k).is_some_and(u8::is_ascii_digit);

    while i < a.len() || j < b.len() {
        while (i < a.len() && !digit_at(a, i)) || (j < b.len() && !digit_at(b, j)) {
            let (wa, wb) = (weight(a.get(i).copied()), weight(b.get(j).copied()));
            if wa != wb {
                return wa.cmp(&wb);
            }
            i += 1;
            j += 1;
        }

        while a.get(i) == Some(&b'0') {
            i += 1;
        }
        while b.get(j) == Some(&b'0') {
            j += 1;
        }

        let mut first_diff = Ordering::Equal;
        while digit_at(a, i) && digit_at(b, j) {
            if first_diff == Ordering::Equal {
                first_diff = a[i].cmp(&b[j]);
            }
            i += 1;
            j += 1;
        }
        if digit_at(a, i) {
            return Ordering::Greater;
        }
        if digit_at(b, j) {
            return Ordering::Less;
        }
        if first_diff != Ordering::Equal {
            return first_diff;
        }
    }
    Ordering::Equal
}
