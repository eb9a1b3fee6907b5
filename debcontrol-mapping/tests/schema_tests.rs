mod common;

use common::{Package, People, Source};
use debcontrol_mapping::{
    CodecRegistry, ControlError, FieldSchema, Fields, Paragraph, Record, Schema, SchemaError,
    field, from_paragraph, schema_of, to_paragraph,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn keys<R: Record>() -> Vec<String> {
    schema_of::<R>()
        .unwrap()
        .fields()
        .iter()
        .map(|field| field.key.clone())
        .collect()
}

// ── Key resolution ───────────────────────────────────────────────

#[test]
fn keys_follow_declaration_order_with_nested_flattened() {
    assert_eq!(
        keys::<Package>(),
        vec![
            "Package",
            "Installed-Size",
            "priority",
            "Architecture",
            "Revision",
            "Checksums",
            "Maintainer",
            "Uploaders",
        ]
    );
}

#[test]
fn undeclared_key_defaults_to_field_name() {
    let schema = schema_of::<Package>().unwrap();
    let field = schema.field("priority").unwrap();
    assert_eq!(field.name, "priority");
    assert!(!field.required);
}

#[test]
fn skipped_field_is_absent_even_when_required() {
    let schema = schema_of::<Package>().unwrap();
    assert!(schema.fields().iter().all(|field| field.name != "scratch"));
    assert!(schema.field("-").is_none());
}

#[test]
fn delimiter_defaults_to_single_space() {
    let schema = schema_of::<Package>().unwrap();
    assert_eq!(schema.field("Architecture").unwrap().delim, " ");
    assert_eq!(schema.field("Checksums").unwrap().delim, ", ");
}

#[test]
fn nested_fields_are_marked() {
    let schema = schema_of::<Package>().unwrap();
    assert_eq!(
        schema.field("Uploaders").unwrap(),
        &FieldSchema {
            name: "uploaders",
            key: "Uploaders".to_owned(),
            required: false,
            delim: ", ".to_owned(),
            repeated: true,
            nested: true,
        }
    );
    assert!(!schema.field("Package").unwrap().nested);
}

#[test]
fn passthrough_is_not_a_keyed_field() {
    let schema = schema_of::<Source>().unwrap();
    assert!(schema.has_passthrough());
    assert_eq!(keys::<Source>(), vec!["Source", "Version"]);
    assert!(!schema_of::<People>().unwrap().has_passthrough());
}

// ── Caching ──────────────────────────────────────────────────────

#[test]
fn resolution_is_cached_and_idempotent() {
    let first = Schema::<Package>::resolve().unwrap();
    let second = Schema::<Package>::resolve().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.fields(), second.fields());
}

#[test]
fn concurrent_resolution_agrees() {
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(|| schema_of::<People>().unwrap().fields().to_vec()))
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn field_schema_serializes_to_json() {
    let schema = schema_of::<People>().unwrap();
    let json = serde_json::to_value(schema.fields()).unwrap();
    assert_eq!(json[0]["key"], "Maintainer");
    assert_eq!(json[1]["delim"], ", ");
    assert_eq!(json[1]["repeated"], true);
}

// ── Invalid declarations ─────────────────────────────────────────

#[derive(Debug, Default)]
struct DelimOnScalar {
    name: String,
}

impl Record for DelimOnScalar {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, name)).delim(",");
    }
}

#[derive(Debug, Default)]
struct EmptyDelim {
    items: Vec<String>,
}

impl Record for EmptyDelim {
    fn describe(fields: &mut Fields<Self>) {
        fields.list(field!(Self, items)).delim("");
    }
}

#[derive(Debug, Default)]
struct EmptyKey {
    name: String,
}

impl Record for EmptyKey {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, name)).key("");
    }
}

#[derive(Debug, Default)]
struct DuplicateKeys {
    a: String,
    b: String,
}

impl Record for DuplicateKeys {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, a)).key("Name");
        fields.scalar(field!(Self, b)).key("Name");
    }
}

#[derive(Debug, Default)]
struct ClashesWithNested {
    maintainer: String,
    people: People,
}

impl Record for ClashesWithNested {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, maintainer)).key("Maintainer");
        fields.nested(field!(Self, people));
    }
}

#[derive(Debug, Default)]
struct TwoPassthroughs {
    first: Paragraph,
    second: Paragraph,
}

impl Record for TwoPassthroughs {
    fn describe(fields: &mut Fields<Self>) {
        fields.passthrough(field!(Self, first));
        fields.passthrough(field!(Self, second));
    }
}

#[derive(Debug, Default)]
struct KeyedNested {
    people: People,
}

impl Record for KeyedNested {
    fn describe(fields: &mut Fields<Self>) {
        fields.nested(field!(Self, people)).key("People");
    }
}

#[derive(Debug, Default)]
struct SkippedNested {
    name: String,
    people: People,
}

impl Record for SkippedNested {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, name)).key("Name");
        fields.nested(field!(Self, people)).skip();
    }
}

#[derive(Debug, Default)]
struct SpacedKey {
    name: String,
}

impl Record for SpacedKey {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, name)).key("Bad Key");
    }
}

#[derive(Debug, Default)]
struct ColonKey {
    name: String,
}

impl Record for ColonKey {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, name)).key("Pre:Depends");
    }
}

#[derive(Debug, Default)]
struct Extras {
    comment: String,
    rest: Paragraph,
}

impl Record for Extras {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, comment)).key("Comment");
        fields.passthrough(field!(Self, rest));
    }
}

#[derive(Debug, Default)]
struct NestsExtras {
    name: String,
    extras: Extras,
}

impl Record for NestsExtras {
    fn describe(fields: &mut Fields<Self>) {
        fields.scalar(field!(Self, name)).key("Name");
        fields.nested(field!(Self, extras));
    }
}

fn schema_error<R: Record>() -> SchemaError {
    match schema_of::<R>() {
        Ok(_) => panic!("schema unexpectedly resolved"),
        Err(err) => err,
    }
}

#[test]
fn delimiter_on_scalar_is_rejected() {
    let err = schema_error::<DelimOnScalar>();
    assert!(err.reason.contains("delimiter"), "{err}");
    assert!(err.record.ends_with("DelimOnScalar"));
}

#[test]
fn empty_delimiter_is_rejected() {
    assert!(schema_error::<EmptyDelim>().reason.contains("empty delimiter"));
}

#[test]
fn empty_key_is_rejected() {
    assert!(schema_error::<EmptyKey>().reason.contains("empty key"));
}

#[test]
fn duplicate_keys_are_rejected() {
    assert!(schema_error::<DuplicateKeys>().reason.contains("duplicate key \"Name\""));
}

#[test]
fn duplicate_keys_across_nesting_are_rejected() {
    assert!(schema_error::<ClashesWithNested>().reason.contains("Maintainer"));
}

#[test]
fn second_passthrough_is_rejected() {
    assert!(schema_error::<TwoPassthroughs>().reason.contains("pass-through"));
}

#[test]
fn annotated_nested_record_is_rejected() {
    assert!(schema_error::<KeyedNested>().reason.contains("nested field people"));
}

#[test]
fn keys_the_writer_cannot_emit_are_rejected() {
    let err = schema_error::<SpacedKey>();
    assert!(err.reason.contains("invalid key"), "{err}");
    assert!(err.reason.contains("Bad Key"), "{err}");
    assert!(schema_error::<ColonKey>().reason.contains("Pre:Depends"));
}

#[test]
fn bad_key_fails_before_any_output() {
    let registry = CodecRegistry::new();
    let mut out = Vec::new();
    let err = debcontrol_mapping::marshal(&mut out, &SpacedKey::default(), &registry).unwrap_err();
    assert!(matches!(err, ControlError::Schema(_)), "{err}");
    assert!(out.is_empty());
}

#[test]
fn nested_record_with_passthrough_is_rejected() {
    assert!(schema_of::<Extras>().unwrap().has_passthrough());
    let err = schema_error::<NestsExtras>();
    assert!(err.reason.contains("nested field extras"), "{err}");
    assert!(err.reason.contains("pass-through"), "{err}");
}

#[test]
fn skipped_nested_record_contributes_nothing() {
    assert_eq!(keys::<SkippedNested>(), vec!["Name"]);
}

#[test]
fn schema_error_is_cached_and_surfaces_from_every_entry_point() {
    assert_eq!(schema_error::<DuplicateKeys>(), schema_error::<DuplicateKeys>());

    let registry = CodecRegistry::new();
    let err = from_paragraph::<DuplicateKeys>(&Paragraph::new(), &registry).unwrap_err();
    assert!(matches!(err, ControlError::Schema(_)));
    let err = to_paragraph(&DuplicateKeys::default(), &registry).unwrap_err();
    assert!(matches!(err, ControlError::Schema(_)));
}
