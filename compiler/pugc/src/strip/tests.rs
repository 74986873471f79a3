#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

use pug_ir::{Loc, Position};
use pug_lexer::{lex, LexerOptions};

fn kinds(src: &str, options: StripComments) -> Vec<TokenKind> {
    let tokens = lex(src, &LexerOptions::default()).unwrap();
    strip_comments(tokens, options)
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

fn token(kind: TokenKind, line: u32) -> Token {
    Token::new(kind, Loc::at(Position::new(line, 1), None))
}

fn comment(buffer: bool) -> TokenKind {
    TokenKind::Comment {
        val: String::new(),
        buffer,
    }
}

#[test]
fn unbuffered_comment_is_removed() {
    assert_eq!(
        kinds("//- hidden\np", StripComments::default()),
        vec![TokenKind::Newline, TokenKind::Tag("p".into()), TokenKind::Eos]
    );
}

#[test]
fn comment_body_goes_with_the_comment() {
    assert_eq!(
        kinds("//-\n  a\n  b", StripComments::default()),
        vec![TokenKind::Eos]
    );
}

#[test]
fn buffered_comment_is_kept_by_default() {
    assert_eq!(
        kinds("//\n  a", StripComments::default()),
        vec![
            comment(true),
            TokenKind::StartPipelessText,
            TokenKind::Text("a".into()),
            TokenKind::EndPipelessText,
            TokenKind::Eos,
        ]
    );
}

#[test]
fn flags_select_comment_kinds() {
    let options = StripComments {
        unbuffered: false,
        buffered: true,
    };
    assert_eq!(kinds("// shown", options), vec![TokenKind::Eos]);
    assert_eq!(
        kinds("//- kept", options),
        vec![
            TokenKind::Comment {
                val: " kept".into(),
                buffer: false,
            },
            TokenKind::Eos,
        ]
    );
}

#[test]
fn pipeless_text_outside_comments_is_kept() {
    let kept = kinds("script.\n  a", StripComments::default());
    assert!(kept.contains(&TokenKind::StartPipelessText));
    assert!(kept.contains(&TokenKind::Text("a".into())));
}

#[test]
fn comment_inside_comment() {
    let tokens = vec![token(comment(false), 1), token(comment(false), 2)];
    let err = strip_comments(tokens, StripComments::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnexpectedToken);
    assert_eq!(err.message, "`comment` encountered when already in a comment");
    assert_eq!(err.line, 2);
}

#[test]
fn unbalanced_pipeless_text_inside_comment() {
    let nested = vec![
        token(comment(false), 1),
        token(TokenKind::StartPipelessText, 1),
        token(TokenKind::StartPipelessText, 2),
    ];
    let err = strip_comments(nested, StripComments::default()).unwrap_err();
    assert_eq!(
        err.message,
        "`start-pipeless-text` encountered when already in pipeless text mode"
    );

    let unopened = vec![token(comment(false), 1), token(TokenKind::EndPipelessText, 1)];
    let err = strip_comments(unopened, StripComments::default()).unwrap_err();
    assert_eq!(
        err.message,
        "`end-pipeless-text` encountered when not in pipeless text mode"
    );
}
