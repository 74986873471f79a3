use pretty_assertions::assert_eq;

use crate::scan;

use super::*;

#[test]
fn tracks_depth_across_calls() {
    let state = scan("foo(arg1, arg2, {\n  foo: [a, b\n", None).unwrap();
    assert_eq!(
        state.stack(),
        &[Context::Paren, Context::Brace, Context::Bracket]
    );

    let state = scan("    c, d]\n  })", Some(state)).unwrap();
    assert!(state.stack().is_empty());
    assert!(!state.is_nesting());
}

#[test]
fn escapes_only_skip_one_character() {
    let state = scan(r#""a\"b"#, None).unwrap();
    assert!(state.is_string());
    let state = scan(r#""a\\"#, None).unwrap();
    assert!(state.is_string());
    let state = scan(r#""a\\""#, None).unwrap();
    assert!(!state.is_nesting());
}

#[test]
fn template_substitution_nests_inside_quote() {
    let state = scan("`a${b", None).unwrap();
    assert_eq!(state.stack(), &[Context::TemplateQuote, Context::Brace]);
    let state = scan("}`", Some(state)).unwrap();
    assert!(!state.is_nesting());
}

#[test]
fn dollar_without_brace_is_text() {
    let state = scan("`$ {x}", None).unwrap();
    assert_eq!(state.stack(), &[Context::TemplateQuote]);
}

#[test]
fn comments_are_nesting() {
    let state = scan("a // note", None).unwrap();
    assert!(state.is_comment());
    assert!(state.is_nesting());
    assert!(!state.is_nesting_ignoring_line_comment());

    let state = scan("a /* x */ b", None).unwrap();
    assert!(!state.is_nesting());
}

#[test]
fn slash_comment_retracts_regexp() {
    // `(` makes the `/` look like a regexp start; the second `/` turns it
    // into a line comment instead.
    let state = scan("(//", None).unwrap();
    assert_eq!(state.stack(), &[Context::Paren, Context::LineComment]);
}

#[test]
fn division_does_not_open_regexp() {
    let state = scan("(a)/2", None).unwrap();
    assert!(!state.is_nesting());
    let state = scan("x = a / b", None).unwrap();
    assert!(!state.is_nesting());
}

#[test]
fn regexp_after_keyword() {
    let state = scan("typeof /x", None).unwrap();
    assert_eq!(state.current(), Some(Context::Regexp));
}

#[test]
fn mismatched_close_reports_index() {
    let err = scan("a(]", None).unwrap_err();
    assert_eq!(err, ScanError::MismatchedBracket { index: 2, found: ']' });
    assert_eq!(err.to_string(), "Mismatched Bracket: ]");
    assert_eq!(err.code(), "CHARACTER_PARSER:MISMATCHED_BRACKET");
}

#[test]
fn src_accumulates_input() {
    let mut state = ScanState::new();
    for c in "ab".chars() {
        state.feed(c).unwrap();
    }
    assert_eq!(state.src(), "ab");
}
