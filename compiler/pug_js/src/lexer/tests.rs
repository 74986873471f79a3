use super::*;
use pretty_assertions::assert_eq;

fn kinds(src: &str) -> Vec<TokKind> {
    let lexer = Lexer::new(src);
    let mut out = Vec::new();
    let mut pos = 0;
    loop {
        let tok = match lexer.token_at(pos) {
            Ok(tok) => tok,
            Err(err) => panic!("lex error in {src:?}: {err}"),
        };
        out.push(tok.kind);
        if tok.kind == TokKind::Eof {
            return out;
        }
        pos = tok.end;
    }
}

fn raw(kind: RawTok) -> TokKind {
    TokKind::Raw(kind)
}

#[test]
fn punctuators_take_the_longest_match() {
    assert_eq!(
        kinds("a >>>= b ?? c ... **"),
        vec![
            raw(RawTok::Ident),
            raw(RawTok::Assign),
            raw(RawTok::Ident),
            raw(RawTok::QuestionQuestion),
            raw(RawTok::Ident),
            raw(RawTok::Ellipsis),
            raw(RawTok::StarStar),
            TokKind::Eof,
        ]
    );
}

#[test]
fn optional_chain_before_digit_is_a_question_mark() {
    assert_eq!(
        kinds("a?.5:1"),
        vec![
            raw(RawTok::Ident),
            raw(RawTok::Question),
            raw(RawTok::Number),
            raw(RawTok::Colon),
            raw(RawTok::Number),
            TokKind::Eof,
        ]
    );
}

#[test]
fn block_comments_are_trivia() {
    let lexer = Lexer::new("/* a\n b */ x");
    let tok = lexer.token_at(0).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(tok.kind, raw(RawTok::Ident));
    assert_eq!(tok.start, 11);
    assert!(tok.newline_before);
}

#[test]
fn line_comments_are_rejected() {
    let err = Lexer::new("a // b").token_at(1).err();
    assert_eq!(
        err.map(|e| e.message),
        Some("Line comments not allowed in an expression".to_string())
    );
}

#[test]
fn unicode_identifiers() {
    let lexer = Lexer::new("\u{e9}t\u{e9} + na\u{ef}ve");
    let first = lexer.token_at(0).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(lexer.slice(first.start, first.end), "\u{e9}t\u{e9}");
    let plus = lexer.token_at(first.end).unwrap_or_else(|e| panic!("{e}"));
    let second = lexer.token_at(plus.end).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(lexer.slice(second.start, second.end), "na\u{ef}ve");
}

#[test]
fn number_followed_by_identifier() {
    let err = Lexer::new("3in x").token_at(0).err();
    assert_eq!(
        err.map(|e| e.message),
        Some("Identifier directly after number".to_string())
    );
}

#[test]
fn unterminated_string() {
    let err = Lexer::new("'abc").token_at(0).err();
    assert_eq!(
        err.map(|e| (e.message, e.column)),
        Some(("Unterminated string constant".to_string(), 0))
    );
}

#[test]
fn cooks_string_escapes() {
    let src = r#""a\n\x41B\u{43}\'\101""#;
    let lexer = Lexer::new(src);
    assert_eq!(
        lexer.cook_string(0, src.len()),
        Ok("a\nABC'A".to_string())
    );
}

#[test]
fn line_continuation_in_string() {
    let src = "'a\\\nb'";
    let lexer = Lexer::new(src);
    let tok = lexer.token_at(0).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(tok.end, src.len());
    assert_eq!(lexer.cook_string(0, src.len()), Ok("ab".to_string()));
}

#[test]
fn regex_with_class_containing_slash() {
    let lexer = Lexer::new("/[/]a\\//gi.test(x)");
    assert_eq!(
        lexer.scan_regex(0),
        Ok(("[/]a\\/".to_string(), "gi".to_string(), 10))
    );
}

#[test]
fn regex_flags_are_validated() {
    let lexer = Lexer::new("/a/gg");
    assert_eq!(
        lexer.scan_regex(0).err().map(|e| e.message),
        Some("Invalid regular expression flag".to_string())
    );
    let lexer = Lexer::new("/a/q");
    assert!(lexer.scan_regex(0).is_err());
}

#[test]
fn template_chunks() {
    let src = "`a${b}c\\n`";
    let lexer = Lexer::new(src);
    let first = lexer.scan_template_chunk(1).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(first.cooked, "a");
    assert!(first.substitution);
    assert_eq!(first.end, 4);
    let second = lexer.scan_template_chunk(6).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(second.cooked, "c\n");
    assert!(!second.substitution);
    assert_eq!(second.end, src.len());
}

#[test]
fn skips_balanced_bodies() {
    let src = "{ return '}' + f(a[0]) }rest";
    let lexer = Lexer::new(src);
    assert_eq!(lexer.skip_balanced(0), Ok(src.len() - 4));
}

#[test]
fn line_comment_inside_body() {
    let lexer = Lexer::new("{ a // b\n }");
    assert_eq!(
        lexer.skip_balanced(0).err().map(|e| e.message),
        Some("Line comments not allowed in an expression".to_string())
    );
}

#[test]
fn number_values() {
    assert_eq!(number_value("0x1F"), Some(31.0));
    assert_eq!(number_value("0b101"), Some(5.0));
    assert_eq!(number_value("0o17"), Some(15.0));
    assert_eq!(number_value("017"), Some(15.0));
    assert_eq!(number_value("019"), Some(19.0));
    assert_eq!(number_value("1_000.5"), Some(1000.5));
    assert_eq!(number_value(".5e1"), Some(5.0));
    assert_eq!(number_value("1."), Some(1.0));
    assert_eq!(number_value("10n"), None);
}
