use debcontrol_paragraph::{Paragraph, ParagraphError, ParagraphReader};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::io::Cursor;

fn read_all(text: &str) -> Vec<Paragraph> {
    ParagraphReader::new(Cursor::new(text))
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

// ── Tokenizing ───────────────────────────────────────────────────

#[test]
fn parses_simple_paragraph() {
    let p = Paragraph::parse(Cursor::new("Package: hello\nVersion: 2.10-3\n"))
        .unwrap()
        .unwrap();
    assert_eq!(p.iter().collect::<Vec<_>>(), vec![("Package", "hello"), ("Version", "2.10-3")]);
}

#[test]
fn joins_continuation_lines() {
    let text = "Description: short\n long one\n .\n long two\n";
    let p = Paragraph::parse(Cursor::new(text)).unwrap().unwrap();
    assert_eq!(p.get("Description"), Some("short\nlong one\n\nlong two"));
}

#[test]
fn continuation_after_empty_first_line() {
    let text = "Files:\n abc 1 a.dsc\n def 2 a.tar.xz\n";
    let p = Paragraph::parse(Cursor::new(text)).unwrap().unwrap();
    assert_eq!(p.get("Files"), Some("\nabc 1 a.dsc\ndef 2 a.tar.xz"));
}

#[test]
fn skips_comment_lines() {
    let text = "# leading comment\nPackage: hello\n# inner comment\nVersion: 1\n";
    let p = Paragraph::parse(Cursor::new(text)).unwrap().unwrap();
    assert_eq!(p.keys().collect::<Vec<_>>(), vec!["Package", "Version"]);
}

#[test]
fn splits_on_blank_lines() {
    let text = "\n\nSource: hello\n\n\nPackage: hello\n\nPackage: hello-dbg\n";
    let paragraphs = read_all(text);
    assert_eq!(paragraphs.len(), 3);
    assert_eq!(paragraphs[0].get("Source"), Some("hello"));
    assert_eq!(paragraphs[2].get("Package"), Some("hello-dbg"));
}

#[test]
fn whitespace_only_line_separates_paragraphs() {
    let paragraphs = read_all("A: 1\n   \nB: 2\n");
    assert_eq!(paragraphs.len(), 2);
}

#[test]
fn handles_crlf_line_endings() {
    let p = Paragraph::parse(Cursor::new("A: 1\r\nB: 2\r\n")).unwrap().unwrap();
    assert_eq!(p.get("A"), Some("1"));
    assert_eq!(p.get("B"), Some("2"));
}

#[test]
fn empty_input_yields_none() {
    assert_eq!(Paragraph::parse(Cursor::new("")).unwrap(), None);
    assert_eq!(Paragraph::parse(Cursor::new("\n# only a comment\n\n")).unwrap(), None);
}

// ── Errors ───────────────────────────────────────────────────────

#[test]
fn rejects_line_without_colon() {
    let err = Paragraph::parse(Cursor::new("A: 1\nnot a field\n")).unwrap_err();
    assert!(matches!(err, ParagraphError::Syntax { line: 2, .. }), "{err}");
}

#[test]
fn rejects_leading_continuation() {
    let err = Paragraph::parse(Cursor::new(" orphan\n")).unwrap_err();
    assert!(matches!(err, ParagraphError::Syntax { line: 1, .. }));
}

#[test]
fn rejects_duplicate_keys() {
    let err = Paragraph::parse(Cursor::new("A: 1\nB: 2\nA: 3\n")).unwrap_err();
    match err {
        ParagraphError::DuplicateKey { line, key } => {
            assert_eq!(line, 3);
            assert_eq!(key, "A");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn iteration_stops_after_error() {
    let mut reader = ParagraphReader::new(Cursor::new("A: 1\n\nbroken\n\nB: 2\n"));
    assert!(reader.next().unwrap().is_ok());
    assert!(reader.next().unwrap().is_err());
    assert!(reader.next().is_none());
}

// ── Write/parse symmetry ─────────────────────────────────────────

fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][A-Za-z0-9]{0,11}").unwrap()
}

fn line_strategy() -> impl Strategy<Value = String> {
    // always accepted by the writer
    prop::string::string_regex("[a-z0-9(),<>=|]([a-z0-9 (),<>=|]{0,20}[a-z0-9(),<>=|])?").unwrap()
}

fn value_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop_oneof![line_strategy(), Just(String::new())], 1..4)
        .prop_map(|lines| lines.join("\n"))
}

fn rough_value_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::string::string_regex("[a. \\t\\r]{0,4}").unwrap(), 1..4)
        .prop_map(|lines| lines.join("\n"))
}

#[test]
fn dot_and_padding_survive_when_written() {
    let text = "A: .\n  indented\n .\n ..\n";
    let p = Paragraph::parse(Cursor::new(text)).unwrap().unwrap();
    assert_eq!(p.get("A"), Some(".\n indented\n\n.."));
    assert_eq!(p.to_string(), text);
}

proptest! {
    #[test]
    fn writing_either_round_trips_or_fails_cleanly(
        fields in prop::collection::vec((key_strategy(), rough_value_strategy()), 1..6)
    ) {
        let original: Paragraph = fields.into_iter().collect();
        let mut out = Vec::new();
        match original.write_to(&mut out) {
            Ok(()) => {
                let parsed = Paragraph::parse(Cursor::new(out)).unwrap().unwrap();
                prop_assert_eq!(parsed, original);
            }
            Err(ParagraphError::InvalidValue { .. }) => prop_assert!(out.is_empty()),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn written_paragraph_parses_back(
        fields in prop::collection::vec((key_strategy(), value_strategy()), 1..8)
    ) {
        let original: Paragraph = fields.into_iter().collect();
        let mut out = Vec::new();
        original.write_to(&mut out).unwrap();
        let parsed = Paragraph::parse(Cursor::new(out)).unwrap().unwrap();
        prop_assert_eq!(parsed, original);
    }
}
