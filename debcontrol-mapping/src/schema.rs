//! Field schema resolution and the per-type schema cache.

use crate::error::SchemaError;
use crate::record::{Binding, DEFAULT_DELIM, FieldDecl, Fields, Lens, Record, SKIP_KEY};
use crate::slot::{NestedSlot, ValueSlot};
use debcontrol_paragraph::{Paragraph, validate_key};
use serde::Serialize;
use std::any::{Any, TypeId, type_name};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::debug;

/// Resolved mapping metadata for one paragraph key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    /// Declared Rust field name.
    pub name: &'static str,
    /// Paragraph key.
    pub key: String,
    pub required: bool,
    /// Separator between elements; only used when `repeated` is set.
    pub delim: String,
    pub repeated: bool,
    /// Contributed by a nested record rather than declared directly.
    pub nested: bool,
}

pub(crate) enum Entry<R> {
    Value {
        field: FieldSchema,
        slot: Box<dyn ValueSlot<R>>,
    },
    Nested(Box<dyn NestedSlot<R>>),
}

/// The resolved schema of a [`Record`] type.
///
/// Resolution runs once per type; later calls share the cached result.
pub struct Schema<R> {
    record: &'static str,
    fields: Vec<FieldSchema>,
    entries: Vec<Entry<R>>,
    passthrough: Option<Lens<R, Paragraph>>,
}

impl<R> Schema<R> {
    /// Type name of the record.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Every mapped field in encode order, nested records flattened in place.
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn has_passthrough(&self) -> bool {
        self.passthrough.is_some()
    }

    pub(crate) fn entries(&self) -> &[Entry<R>] {
        &self.entries
    }

    pub(crate) fn passthrough(&self) -> Option<&Lens<R, Paragraph>> {
        self.passthrough.as_ref()
    }
}

impl<R: Record> Schema<R> {
    /// Returns the schema for `R`, resolving and caching it on first use.
    pub fn resolve() -> Result<Arc<Self>, SchemaError> {
        let cache = SCHEMAS.get_or_init(Default::default);
        let id = TypeId::of::<R>();

        let hit = cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned();
        if let Some(cached) = hit {
            return unpack::<R>(cached);
        }

        // Built without holding the lock: nested records resolve their own
        // schemas through this same cache.
        let built: Resolved<R> = Self::build().map(Arc::new);
        let cached = cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_insert_with(|| Arc::new(built) as Cached)
            .clone();
        unpack::<R>(cached)
    }

    fn build() -> Result<Self, SchemaError> {
        let record = type_name::<R>();
        let invalid = |reason: String| SchemaError { record, reason };

        let mut decls = Fields::new();
        R::describe(&mut decls);

        let mut fields = Vec::new();
        let mut entries = Vec::new();
        let mut passthrough = None;

        for decl in decls.into_decls() {
            let FieldDecl {
                name,
                key,
                required,
                delim,
                binding,
            } = decl;

            if key.as_deref() == Some(SKIP_KEY) {
                continue;
            }
            if delim.as_deref() == Some("") {
                return Err(invalid(format!("field {name} has an empty delimiter")));
            }

            match binding {
                Binding::Value { slot, repeated } => {
                    if delim.is_some() && !repeated {
                        return Err(invalid(format!(
                            "field {name} is not repeated but declares a delimiter"
                        )));
                    }
                    let key = key.unwrap_or_else(|| name.to_owned());
                    if key.is_empty() {
                        return Err(invalid(format!("field {name} has an empty key")));
                    }
                    validate_key(&key).map_err(|err| invalid(format!("field {name}: {err}")))?;
                    let field = FieldSchema {
                        name,
                        key,
                        required,
                        delim: delim.unwrap_or_else(|| DEFAULT_DELIM.to_owned()),
                        repeated,
                        nested: false,
                    };
                    fields.push(field.clone());
                    entries.push(Entry::Value { field, slot });
                }
                Binding::Nested(slot) => {
                    if key.is_some() || required || delim.is_some() {
                        return Err(invalid(format!(
                            "nested field {name} takes no key, required or delimiter annotation"
                        )));
                    }
                    if slot.has_passthrough()? {
                        return Err(invalid(format!(
                            "nested field {name} keeps its own pass-through paragraph"
                        )));
                    }
                    fields.extend(slot.fields()?.into_iter().map(|field| FieldSchema {
                        nested: true,
                        ..field
                    }));
                    entries.push(Entry::Nested(slot));
                }
                Binding::Passthrough(lens) => {
                    if key.is_some() || required || delim.is_some() {
                        return Err(invalid(format!(
                            "pass-through field {name} takes no key, required or delimiter annotation"
                        )));
                    }
                    if passthrough.replace(lens).is_some() {
                        return Err(invalid(format!(
                            "field {name} is a second pass-through paragraph"
                        )));
                    }
                }
            }
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.key.as_str()) {
                return Err(invalid(format!("duplicate key {:?}", field.key)));
            }
        }

        debug!(record, fields = fields.len(), "resolved control schema");
        Ok(Self {
            record,
            fields,
            entries,
            passthrough,
        })
    }
}

/// Shorthand for [`Schema::resolve`].
pub fn schema_of<R: Record>() -> Result<Arc<Schema<R>>, SchemaError> {
    Schema::<R>::resolve()
}

type Resolved<R> = Result<Arc<Schema<R>>, SchemaError>;
type Cached = Arc<dyn Any + Send + Sync>;

static SCHEMAS: OnceLock<RwLock<HashMap<TypeId, Cached>>> = OnceLock::new();

fn unpack<R: Record>(cached: Cached) -> Resolved<R> {
    match cached.downcast::<Resolved<R>>() {
        Ok(resolved) => (*resolved).clone(),
        Err(_) => Err(SchemaError {
            record: type_name::<R>(),
            reason: "schema cache entry has the wrong type".to_owned(),
        }),
    }
}
