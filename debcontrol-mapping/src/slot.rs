//! Typed conversions behind each declared field.

use crate::codec::CodecRegistry;
use crate::decode::Decoder;
use crate::encode::encode_fields;
use crate::error::{BoxError, ControlError, Result, SchemaError};
use crate::record::{Lens, Record};
use crate::scalar::Scalar;
use crate::schema::{FieldSchema, Schema};
use debcontrol_paragraph::Paragraph;
use std::any::type_name;
use std::marker::PhantomData;

/// Why a single field failed, before the field name is attached.
pub(crate) enum Failure {
    Conversion { value: String, reason: String },
    Unsupported(&'static str),
    Codec(BoxError),
}

impl Failure {
    pub(crate) fn into_error(self, field: &FieldSchema) -> ControlError {
        match self {
            Failure::Conversion { value, reason } => ControlError::Conversion {
                field: field.name,
                value,
                reason,
            },
            Failure::Unsupported(shape) => ControlError::UnsupportedType {
                field: field.name,
                shape,
            },
            Failure::Codec(source) => ControlError::Codec {
                field: field.name,
                source,
            },
        }
    }
}

/// Converts one element between text and `T`.
pub(crate) trait Convert<T>: 'static {
    /// Fails when `T` cannot be converted at all with this registry.
    fn check(_registry: &CodecRegistry) -> std::result::Result<(), Failure> {
        Ok(())
    }

    fn parse(raw: &str, registry: &CodecRegistry) -> std::result::Result<T, Failure>;

    fn format(value: &T, registry: &CodecRegistry) -> std::result::Result<String, Failure>;
}

/// Built-in handling for [`Scalar`] types.
pub(crate) struct Builtin;

impl<T: Scalar> Convert<T> for Builtin {
    fn parse(raw: &str, _registry: &CodecRegistry) -> std::result::Result<T, Failure> {
        T::parse_scalar(raw).map_err(|reason| Failure::Conversion {
            value: raw.to_owned(),
            reason,
        })
    }

    fn format(value: &T, _registry: &CodecRegistry) -> std::result::Result<String, Failure> {
        Ok(value.format_scalar())
    }
}

/// Handling through the codec registered for `T`.
pub(crate) struct Registered;

impl<T: Send + Sync + 'static> Convert<T> for Registered {
    fn check(registry: &CodecRegistry) -> std::result::Result<(), Failure> {
        if registry.contains::<T>() {
            Ok(())
        } else {
            Err(Failure::Unsupported(type_name::<T>()))
        }
    }

    fn parse(raw: &str, registry: &CodecRegistry) -> std::result::Result<T, Failure> {
        let codec = registry
            .lookup::<T>()
            .ok_or(Failure::Unsupported(type_name::<T>()))?;
        codec.parse(raw).map_err(Failure::Codec)
    }

    fn format(value: &T, registry: &CodecRegistry) -> std::result::Result<String, Failure> {
        let codec = registry
            .lookup::<T>()
            .ok_or(Failure::Unsupported(type_name::<T>()))?;
        codec.format(value).map_err(Failure::Codec)
    }
}

/// A field mapped to exactly one paragraph value.
pub(crate) trait ValueSlot<R>: Send + Sync {
    fn decode(
        &self,
        record: &mut R,
        raw: &str,
        delim: &str,
        registry: &CodecRegistry,
    ) -> std::result::Result<(), Failure>;

    fn encode(
        &self,
        record: &R,
        delim: &str,
        registry: &CodecRegistry,
    ) -> std::result::Result<String, Failure>;
}

pub(crate) struct Single<R, T, C> {
    lens: Lens<R, T>,
    _convert: PhantomData<fn() -> C>,
}

impl<R, T, C> Single<R, T, C> {
    pub(crate) fn new(lens: Lens<R, T>) -> Self {
        Self {
            lens,
            _convert: PhantomData,
        }
    }
}

impl<R, T, C> ValueSlot<R> for Single<R, T, C>
where
    T: Send + Sync + 'static,
    C: Convert<T>,
{
    fn decode(
        &self,
        record: &mut R,
        raw: &str,
        _delim: &str,
        registry: &CodecRegistry,
    ) -> std::result::Result<(), Failure> {
        <C as Convert<T>>::check(registry)?;
        *self.lens.get_mut(record) = C::parse(raw, registry)?;
        Ok(())
    }

    fn encode(
        &self,
        record: &R,
        _delim: &str,
        registry: &CodecRegistry,
    ) -> std::result::Result<String, Failure> {
        <C as Convert<T>>::check(registry)?;
        C::format(self.lens.get(record), registry)
    }
}

pub(crate) struct Repeated<R, T, C> {
    lens: Lens<R, Vec<T>>,
    _convert: PhantomData<fn() -> C>,
}

impl<R, T, C> Repeated<R, T, C> {
    pub(crate) fn new(lens: Lens<R, Vec<T>>) -> Self {
        Self {
            lens,
            _convert: PhantomData,
        }
    }
}

impl<R, T, C> ValueSlot<R> for Repeated<R, T, C>
where
    T: Send + Sync + 'static,
    C: Convert<T>,
{
    // Elements are collected before touching the record so a bad element
    // leaves the target sequence as it was.
    fn decode(
        &self,
        record: &mut R,
        raw: &str,
        delim: &str,
        registry: &CodecRegistry,
    ) -> std::result::Result<(), Failure> {
        <C as Convert<T>>::check(registry)?;
        if raw.is_empty() {
            return Ok(());
        }
        let values = raw
            .split(delim)
            .map(|token| C::parse(token, registry))
            .collect::<std::result::Result<Vec<T>, Failure>>()?;
        self.lens.get_mut(record).extend(values);
        Ok(())
    }

    fn encode(
        &self,
        record: &R,
        delim: &str,
        registry: &CodecRegistry,
    ) -> std::result::Result<String, Failure> {
        <C as Convert<T>>::check(registry)?;
        let tokens = self
            .lens
            .get(record)
            .iter()
            .map(|value| C::format(value, registry))
            .collect::<std::result::Result<Vec<String>, Failure>>()?;
        Ok(tokens.join(delim))
    }
}

/// A nested record flattened into the parent's key space.
pub(crate) trait NestedSlot<R>: Send + Sync {
    /// The nested record's resolved fields.
    fn fields(&self) -> std::result::Result<Vec<FieldSchema>, SchemaError>;

    fn has_passthrough(&self) -> std::result::Result<bool, SchemaError>;

    fn decode(&self, record: &mut R, paragraph: &Paragraph, decoder: &Decoder<'_>) -> Result<()>;

    fn encode(&self, record: &R, registry: &CodecRegistry) -> Result<Paragraph>;
}

pub(crate) struct NestedRecord<R, C> {
    lens: Lens<R, C>,
}

impl<R, C> NestedRecord<R, C> {
    pub(crate) fn new(lens: Lens<R, C>) -> Self {
        Self { lens }
    }
}

impl<R, C: Record> NestedSlot<R> for NestedRecord<R, C> {
    fn fields(&self) -> std::result::Result<Vec<FieldSchema>, SchemaError> {
        Ok(Schema::<C>::resolve()?.fields().to_vec())
    }

    fn has_passthrough(&self) -> std::result::Result<bool, SchemaError> {
        Ok(Schema::<C>::resolve()?.has_passthrough())
    }

    fn decode(&self, record: &mut R, paragraph: &Paragraph, decoder: &Decoder<'_>) -> Result<()> {
        let schema = Schema::<C>::resolve()?;
        decoder.decode_with(&schema, self.lens.get_mut(record), paragraph)
    }

    fn encode(&self, record: &R, registry: &CodecRegistry) -> Result<Paragraph> {
        let schema = Schema::<C>::resolve()?;
        encode_fields(&schema, self.lens.get(record), registry)
    }
}
