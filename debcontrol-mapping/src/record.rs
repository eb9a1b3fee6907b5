//! Declaring how a record type maps onto a paragraph.

use crate::scalar::Scalar;
use crate::slot::{Builtin, NestedRecord, NestedSlot, Registered, Repeated, Single, ValueSlot};
use debcontrol_paragraph::Paragraph;

/// Key that excludes a field from both decoding and encoding.
pub const SKIP_KEY: &str = "-";

/// Delimiter used by repeated fields that do not declare one.
pub const DEFAULT_DELIM: &str = " ";

/// A typed record that can be decoded from and encoded to a [`Paragraph`].
///
/// `describe` declares the fields in the order they are encoded:
///
/// ```ignore
/// impl Record for Binary {
///     fn describe(fields: &mut Fields<Self>) {
///         fields.scalar(field!(Self, package)).key("Package").required();
///         fields.custom(field!(Self, version)).key("Version");
///         fields.list(field!(Self, tags)).key("Tag").delim(", ");
///         fields.nested(field!(Self, maintainer));
///         fields.passthrough(field!(Self, extra));
///     }
/// }
/// ```
pub trait Record: Default + Send + Sync + 'static {
    fn describe(fields: &mut Fields<Self>);
}

/// Accessor pair for one field of `R`, plus the field's declared name.
///
/// Build with the [`field!`](crate::field) macro.
pub struct Lens<R, T> {
    name: &'static str,
    get: fn(&R) -> &T,
    get_mut: fn(&mut R) -> &mut T,
}

impl<R, T> Lens<R, T> {
    pub fn new(name: &'static str, get: fn(&R) -> &T, get_mut: fn(&mut R) -> &mut T) -> Self {
        Self { name, get, get_mut }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get<'a>(&self, record: &'a R) -> &'a T {
        (self.get)(record)
    }

    pub fn get_mut<'a>(&self, record: &'a mut R) -> &'a mut T {
        (self.get_mut)(record)
    }
}

impl<R, T> Clone for Lens<R, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, T> Copy for Lens<R, T> {}

/// Builds a [`Lens`] for `record.field`, named after the field.
#[macro_export]
macro_rules! field {
    ($record:ty, $field:ident) => {
        $crate::Lens::<$record, _>::new(
            ::core::stringify!($field),
            |record| &record.$field,
            |record| &mut record.$field,
        )
    };
}

pub(crate) enum Binding<R> {
    Value {
        slot: Box<dyn ValueSlot<R>>,
        repeated: bool,
    },
    Nested(Box<dyn NestedSlot<R>>),
    Passthrough(Lens<R, Paragraph>),
}

/// One declared field and its annotations.
pub struct FieldDecl<R> {
    pub(crate) name: &'static str,
    pub(crate) key: Option<String>,
    pub(crate) required: bool,
    pub(crate) delim: Option<String>,
    pub(crate) binding: Binding<R>,
}

impl<R> FieldDecl<R> {
    /// Paragraph key for this field. Defaults to the field name; [`SKIP_KEY`]
    /// excludes the field.
    pub fn key(&mut self, key: impl Into<String>) -> &mut Self {
        self.key = Some(key.into());
        self
    }

    /// Excludes the field from decoding and encoding.
    pub fn skip(&mut self) -> &mut Self {
        self.key(SKIP_KEY)
    }

    /// Decoding fails if the key is absent.
    pub fn required(&mut self) -> &mut Self {
        self.required = true;
        self
    }

    /// Separator for repeated fields.
    pub fn delim(&mut self, delim: impl Into<String>) -> &mut Self {
        self.delim = Some(delim.into());
        self
    }
}

/// Field declarations collected from [`Record::describe`].
pub struct Fields<R> {
    decls: Vec<FieldDecl<R>>,
}

impl<R: 'static> Fields<R> {
    pub(crate) fn new() -> Self {
        Self { decls: Vec::new() }
    }

    pub(crate) fn into_decls(self) -> Vec<FieldDecl<R>> {
        self.decls
    }

    /// A `String` or integer field.
    pub fn scalar<T: Scalar>(&mut self, lens: Lens<R, T>) -> &mut FieldDecl<R> {
        let slot = Single::<R, T, Builtin>::new(lens);
        self.push_value(lens.name(), Box::new(slot), false)
    }

    /// A sequence of scalars joined by the field's delimiter.
    pub fn list<T: Scalar>(&mut self, lens: Lens<R, Vec<T>>) -> &mut FieldDecl<R> {
        let slot = Repeated::<R, T, Builtin>::new(lens);
        self.push_value(lens.name(), Box::new(slot), true)
    }

    /// A value converted by the codec registered for `T`.
    pub fn custom<T: Send + Sync + 'static>(&mut self, lens: Lens<R, T>) -> &mut FieldDecl<R> {
        let slot = Single::<R, T, Registered>::new(lens);
        self.push_value(lens.name(), Box::new(slot), false)
    }

    /// A sequence of codec-converted values joined by the field's delimiter.
    pub fn custom_list<T: Send + Sync + 'static>(
        &mut self,
        lens: Lens<R, Vec<T>>,
    ) -> &mut FieldDecl<R> {
        let slot = Repeated::<R, T, Registered>::new(lens);
        self.push_value(lens.name(), Box::new(slot), true)
    }

    /// A nested record whose fields share this record's key space.
    pub fn nested<C: Record>(&mut self, lens: Lens<R, C>) -> &mut FieldDecl<R> {
        let slot = NestedRecord::new(lens);
        self.push(lens.name(), Binding::Nested(Box::new(slot)))
    }

    /// The paragraph slot keeping fields no other declaration models.
    ///
    /// Decoding stores the whole source paragraph here; encoding writes the
    /// record's own fields over it. Only the outermost record may declare
    /// one: a nested record with a pass-through slot is a schema error.
    pub fn passthrough(&mut self, lens: Lens<R, Paragraph>) -> &mut FieldDecl<R> {
        self.push(lens.name(), Binding::Passthrough(lens))
    }

    fn push_value(
        &mut self,
        name: &'static str,
        slot: Box<dyn ValueSlot<R>>,
        repeated: bool,
    ) -> &mut FieldDecl<R> {
        self.push(name, Binding::Value { slot, repeated })
    }

    fn push(&mut self, name: &'static str, binding: Binding<R>) -> &mut FieldDecl<R> {
        let index = self.decls.len();
        self.decls.push(FieldDecl {
            name,
            key: None,
            required: false,
            delim: None,
            binding,
        });
        &mut self.decls[index]
    }
}
