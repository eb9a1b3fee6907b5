//! Registry of parse/format pairs for custom value types.
//!
//! Any field declared with [`Fields::custom`](crate::Fields::custom) or
//! [`Fields::custom_list`](crate::Fields::custom_list) is converted through
//! the codec registered for its Rust type. Registration is expected to finish
//! before records are decoded or encoded; lookups only need `&CodecRegistry`
//! and are safe to share across threads.

use crate::error::BoxError;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

type AnyValue = dyn Any + Send + Sync;
type ParseFn = Box<dyn Fn(&str) -> Result<Box<AnyValue>, BoxError> + Send + Sync>;
type FormatFn = Box<dyn Fn(&AnyValue) -> Result<String, BoxError> + Send + Sync>;

/// A type that knows its own control-file text form.
///
/// Implementors can be registered with [`CodecRegistry::register_codec`]
/// instead of passing a pair of functions.
pub trait ControlCodec: Sized + Send + Sync + 'static {
    fn parse_control(raw: &str) -> Result<Self, BoxError>;

    fn format_control(&self) -> Result<String, BoxError>;
}

struct ErasedCodec {
    shape: &'static str,
    parse: ParseFn,
    format: FormatFn,
}

/// Maps Rust types to their registered parse/format functions.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: HashMap<TypeId, ErasedCodec>,
}

impl CodecRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `parse` and `format` for values of type `T`, replacing any
    /// earlier registration for `T`.
    pub fn register<T, P, F, E>(&mut self, parse: P, format: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        P: Fn(&str) -> Result<T, E> + Send + Sync + 'static,
        F: Fn(&T) -> Result<String, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        let shape = type_name::<T>();
        let codec = ErasedCodec {
            shape,
            parse: Box::new(move |raw: &str| {
                parse(raw)
                    .map(|value| Box::new(value) as Box<AnyValue>)
                    .map_err(Into::<BoxError>::into)
            }),
            format: Box::new(move |value: &AnyValue| match value.downcast_ref::<T>() {
                Some(value) => format(value).map_err(Into::into),
                None => Err(mismatch(shape)),
            }),
        };
        if self.codecs.insert(TypeId::of::<T>(), codec).is_some() {
            debug!(shape, "replaced control codec");
        } else {
            debug!(shape, "registered control codec");
        }
        self
    }

    /// Registers a type implementing [`ControlCodec`].
    pub fn register_codec<T: ControlCodec>(&mut self) -> &mut Self {
        self.register::<T, _, _, BoxError>(T::parse_control, T::format_control)
    }

    /// Looks up the codec registered for `T`.
    pub fn lookup<T: Send + Sync + 'static>(&self) -> Option<Codec<'_, T>> {
        self.codecs.get(&TypeId::of::<T>()).map(|codec| Codec {
            codec,
            _marker: PhantomData,
        })
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.codecs.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shapes: Vec<_> = self.codecs.values().map(|c| c.shape).collect();
        shapes.sort_unstable();
        f.debug_struct("CodecRegistry").field("shapes", &shapes).finish()
    }
}

/// Typed view of a registered codec.
pub struct Codec<'a, T> {
    codec: &'a ErasedCodec,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Codec<'_, T> {
    /// Name of the type this codec converts.
    pub fn shape(&self) -> &'static str {
        self.codec.shape
    }

    pub fn parse(&self, raw: &str) -> Result<T, BoxError> {
        let value = (self.codec.parse)(raw)?;
        value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| mismatch(self.codec.shape))
    }

    pub fn format(&self, value: &T) -> Result<String, BoxError> {
        (self.codec.format)(value as &AnyValue)
    }
}

fn mismatch(shape: &str) -> BoxError {
    format!("codec for {shape} was handed a value of another type").into()
}
