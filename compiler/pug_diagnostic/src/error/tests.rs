use pretty_assertions::assert_eq;

use super::*;

#[test]
fn display_without_source() {
    let err = PugError::new(ErrorCode::UnexpectedText, "unexpected text \"%%%\"", 3, 5);
    assert_eq!(err.to_string(), "Pug:3:5\n\nunexpected text \"%%%\"");
}

#[test]
fn display_without_column() {
    let err = PugError::new(ErrorCode::InvalidToken, "boom", 2, 0)
        .with_filename(Some("views/index.pug".into()));
    assert_eq!(err.column, None);
    assert_eq!(err.to_string(), "views/index.pug:2\n\nboom");
}

#[test]
fn display_with_context_and_caret() {
    let src: Arc<str> = "html\n  body\n    p= foo(\n  footer".into();
    let err = PugError::new(ErrorCode::NoEndBracket, "missing )", 3, 8).with_src(src);
    let expected = "Pug:3:8\n\
        \x20   1| html\n\
        \x20   2|   body\n\
        \x20 > 3|     p= foo(\n\
        --------------^\n\
        \x20   4|   footer\n\
        \n\
        missing )";
    assert_eq!(err.to_string(), expected);
}

#[test]
fn excerpt_is_skipped_when_line_out_of_range() {
    let err = PugError::new(ErrorCode::SyntaxError, "bad", 9, 1).with_src("one line".into());
    assert_eq!(err.excerpt(), None);
}

#[test]
fn or_src_keeps_existing_source() {
    let first: Arc<str> = "a".into();
    let second: Arc<str> = "b".into();
    let err = PugError::new(ErrorCode::SyntaxError, "bad", 1, 1)
        .with_src(Arc::clone(&first))
        .or_src(&second);
    assert_eq!(err.src.as_deref(), Some("a"));
}
