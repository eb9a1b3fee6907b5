//! Reference value types for Debian control records.
//!
//! - [`Version`]: `[epoch:]upstream[-revision]` with dpkg ordering
//! - [`Arch`]: architecture names and wildcards (`amd64`, `linux-any`, `any`)
//! - [`Dependency`]: relation lists such as `libc6 (>= 2.34), foo | bar [amd64]`
//!
//! Each type implements `FromStr`/`Display`, serde as its string form, and
//! [`ControlCodec`](debcontrol_mapping::ControlCodec).
//! [`register_defaults`] installs all three into a
//! [`CodecRegistry`](debcontrol_mapping::CodecRegistry).

mod arch;
mod codec;
mod dependency;
mod error;
mod version;

pub use arch::Arch;
pub use codec::{default_registry, register_defaults};
pub use dependency::{ArchRestriction, Dependency, Operator, Possibility, Relation, VersionRelation};
pub use error::{Result, ValueError};
pub use version::Version;
