//! Registry and serde glue for the value types.

use crate::arch::Arch;
use crate::dependency::Dependency;
use crate::error::ValueError;
use crate::version::Version;
use debcontrol_mapping::{BoxError, CodecRegistry, ControlCodec};
use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use std::str::FromStr;

/// Installs the `Version`, `Arch` and `Dependency` codecs.
pub fn register_defaults(registry: &mut CodecRegistry) -> &mut CodecRegistry {
    registry
        .register_codec::<Version>()
        .register_codec::<Arch>()
        .register_codec::<Dependency>()
}

/// A fresh registry with [`register_defaults`] applied.
#[must_use]
pub fn default_registry() -> CodecRegistry {
    let mut registry = CodecRegistry::new();
    register_defaults(&mut registry);
    registry
}

macro_rules! text_value {
    ($($ty:ty),+ $(,)?) => {$(
        impl ControlCodec for $ty {
            fn parse_control(raw: &str) -> Result<Self, BoxError> {
                <$ty>::from_str(raw).map_err(Into::into)
            }

            fn format_control(&self) -> Result<String, BoxError> {
                Ok(self.to_string())
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                <$ty>::from_str(&raw).map_err(|err: ValueError| de::Error::custom(err))
            }
        }
    )+};
}

text_value!(Version, Arch, Dependency);
