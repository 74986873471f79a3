use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn until<'a>(src: &'a str, delimiter: &str) -> Section<'a> {
    scan_until(src, delimiter, ScanOptions::default()).unwrap()
}

#[test]
fn finds_bracket_contents() {
    let section = until("foo=\"(\", bar=\"}\"] bing bong", "]");
    assert_eq!(
        section,
        Section {
            start: 0,
            end: 16,
            src: "foo=\"(\", bar=\"}\""
        }
    );

    let section = until("foo=\"(\", bar=\"}\")] bing bong", ")");
    assert_eq!(section.end, 16);
    assert_eq!(section.src, "foo=\"(\", bar=\"}\"");
}

#[test]
fn finds_custom_delimiter() {
    let section = until("foo.bar(\"%>\").baz%> bing bong", "%>");
    assert_eq!((section.start, section.end), (0, 17));
    assert_eq!(section.src, "foo.bar(\"%>\").baz");

    let options = ScanOptions {
        start: 2,
        ..ScanOptions::default()
    };
    let section = scan_until("<%foo.bar(\"%>\").baz%> bing bong", "%>", options).unwrap();
    assert_eq!((section.start, section.end), (2, 19));
    assert_eq!(section.src, "foo.bar(\"%>\").baz");
}

#[test]
fn template_literals_nest() {
    let section = until("x = `foo${`)`}`)", ")");
    assert_eq!(
        section,
        Section {
            start: 0,
            end: 15,
            src: "x = `foo${`)`}`"
        }
    );

    let either = |rest: &str| rest.starts_with(']') || rest.starts_with(')');
    let section = scan_until("x = `foo${`)`}`])", either, ScanOptions::default()).unwrap();
    assert_eq!(section.end, 15);
}

#[test]
fn mismatched_bracket_is_an_error() {
    let err = scan_until("x = `foo${)}`)", ")", ScanOptions::default()).unwrap_err();
    assert!(matches!(err, ScanError::MismatchedBracket { found: ')', .. }));
}

#[test]
fn regular_expressions_hide_delimiters() {
    let section = until("foo=/\\//g, bar=\"}\") bing bong", ")");
    assert_eq!(section.end, 18);
    assert_eq!(section.src, "foo=/\\//g, bar=\"}\"");

    let section = until("foo = typeof /\\//g, bar=\"}\") bing bong", ")");
    assert_eq!(section.src, "foo = typeof /\\//g, bar=\"}\"");
}

#[test]
fn block_comments_hide_delimiters() {
    let section = until("/* ) */) bing bong", ")");
    assert_eq!((section.end, section.src), (7, "/* ) */"));

    let section = until("/* /) */) bing bong", ")");
    assert_eq!((section.end, section.src), (8, "/* /) */"));
}

#[test]
fn line_comment_can_be_ignored() {
    let options = ScanOptions {
        ignore_line_comment: true,
        ..ScanOptions::default()
    };
    let section = scan_until("a // b]", "]", options).unwrap();
    assert_eq!(section.src, "a // b");
    assert!(scan_until("a // b]", "]", ScanOptions::default()).is_err());
}

#[test]
fn ignore_nesting_stops_at_first_match() {
    let options = ScanOptions {
        ignore_nesting: true,
        ..ScanOptions::default()
    };
    let section = scan_until("(a]b)]", "]", options).unwrap();
    assert_eq!(section.src, "(a");
}

#[test]
fn end_of_string_reports_length() {
    let err = scan_until("(a, b", ")", ScanOptions::default()).unwrap_err();
    assert_eq!(err, ScanError::EndOfString { index: 5 });
}

#[test]
fn multibyte_text_uses_byte_offsets() {
    let section = until("\"é)\" + ü)", ")");
    assert_eq!(section.src, "\"é)\" + ü");
    assert_eq!(section.end, section.src.len());
}

fn balanced() -> impl Strategy<Value = String> {
    let leaf = "[a-z0-9 ,.+*]{0,6}".prop_map(String::from);
    leaf.prop_recursive(4, 64, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| format!("({s})")),
            inner.clone().prop_map(|s| format!("[{s}]")),
            inner.clone().prop_map(|s| format!("{{{s}}}")),
            "[a-z ]{0,6}".prop_map(|s| format!("\"{s}\"")),
            "[a-z ]{0,6}".prop_map(|s| format!("'{s}'")),
            (inner.clone(), inner).prop_map(|(a, b)| format!("{a}{b}")),
        ]
    })
}

proptest! {
    #[test]
    fn balanced_input_leaves_empty_stack(src in balanced()) {
        let state = scan(&src, None).unwrap();
        prop_assert!(state.stack().is_empty(), "stack not empty for {src:?}");
    }

    #[test]
    fn one_extra_open_bracket_reaches_end(src in balanced()) {
        let input = format!("[{src}");
        let options = ScanOptions { start: 1, ..ScanOptions::default() };
        let err = scan_until(&input, "]", options).unwrap_err();
        prop_assert_eq!(err, ScanError::EndOfString { index: input.len() });
    }
}
