//! Lexer for Pug templates.
//!
//! Turns template source into a flat [`Token`] stream terminated by `eos`.
//! The lexer is a fixed, ordered list of rules tried against the remaining
//! input; the first rule that matches consumes its text and pushes tokens.
//! Order matters because several rules share prefixes (`block` against
//! `block append`, `each` against `each ... of`).
//!
//! # Tag interpolation
//!
//! `#[...]` inside text lexes a nested template until the matching `]`.
//! Instead of a second lexer, the current [`Frame`] (remaining input,
//! indentation stack, interpolation flags) is swapped out for a fresh one;
//! line, column and the token buffer stay shared, so positions inside the
//! interpolation are already global. Nesting is capped by
//! [`LexerOptions::max_interpolation_depth`].
//!
//! # Embedded expressions
//!
//! Bracketed expression text is delimited with [`pug_lexer_core`] and
//! validated with [`pug_js`]. A validation failure is reported at the
//! offending position inside the template.

mod attrs;
mod frame;
mod indent;
mod patterns;
mod rules;
mod text;

use std::sync::Arc;

use pug_diagnostic::{ErrorCode, PugError, PugResult};
use pug_ir::{FileName, Loc, Position, Token, TokenKind};
use pug_lexer_core::{scan, scan_until, ScanError, ScanOptions};
use tracing::trace;

use crate::frame::Frame;

/// Default cap on `#[...]` nesting.
pub const DEFAULT_MAX_INTERPOLATION_DEPTH: usize = 32;

/// Options for [`lex`].
#[derive(Clone, Debug)]
pub struct LexerOptions {
    pub filename: Option<FileName>,
    /// Line of the first character, 1-based.
    pub starting_line: u32,
    /// Column of the first character, 1-based.
    pub starting_column: u32,
    pub max_interpolation_depth: usize,
}

impl Default for LexerOptions {
    fn default() -> Self {
        LexerOptions {
            filename: None,
            starting_line: 1,
            starting_column: 1,
            max_interpolation_depth: DEFAULT_MAX_INTERPOLATION_DEPTH,
        }
    }
}

impl LexerOptions {
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<FileName>) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Strip a leading byte order mark and normalise line endings to `\n`.
pub fn normalize_source(src: &str) -> String {
    let src = src.strip_prefix('\u{feff}').unwrap_or(src);
    src.replace("\r\n", "\n").replace('\r', "\n")
}

/// Lex a whole template.
pub fn lex(src: &str, options: &LexerOptions) -> PugResult<Vec<Token>> {
    let mut lexer = Lexer::new(normalize_source(src), options);
    lexer.run()?;
    trace!(tokens = lexer.tokens.len(), "lexed template");
    Ok(lexer.tokens)
}

type Rule = fn(&mut Lexer) -> PugResult<bool>;

/// Rules in precedence order; the first match wins.
const RULES: &[(&str, Rule)] = &[
    ("blank", Lexer::blank),
    ("eos", Lexer::eos),
    ("end-interpolation", Lexer::end_interpolation),
    ("yield", Lexer::yield_),
    ("doctype", Lexer::doctype),
    ("interpolation", Lexer::interpolation),
    ("case", Lexer::case),
    ("when", Lexer::when),
    ("default", Lexer::default_branch),
    ("extends", Lexer::extends),
    ("append", Lexer::append),
    ("prepend", Lexer::prepend),
    ("block", Lexer::block),
    ("mixin-block", Lexer::mixin_block),
    ("include", Lexer::include),
    ("mixin", Lexer::mixin),
    ("call", Lexer::call),
    ("conditional", Lexer::conditional),
    ("each-of", Lexer::each_of),
    ("each", Lexer::each),
    ("while", Lexer::while_),
    ("tag", Lexer::tag),
    ("filter", Lexer::top_level_filter),
    ("block-code", Lexer::block_code),
    ("code", Lexer::code),
    ("id", Lexer::id),
    ("dot", Lexer::dot),
    ("class", Lexer::class_name),
    ("attributes", Lexer::attrs),
    ("&attributes", Lexer::attributes_block),
    ("indent", Lexer::indent),
    ("text", Lexer::text),
    ("text-html", Lexer::text_html),
    ("comment", Lexer::comment),
    ("slash", Lexer::slash),
    ("colon", Lexer::colon),
];

pub(crate) struct Lexer {
    /// Normalised source, attached to errors for the excerpt.
    src: Arc<str>,
    filename: Option<FileName>,
    line: u32,
    column: u32,
    frame: Frame,
    depth: usize,
    max_depth: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(src: String, options: &LexerOptions) -> Self {
        Lexer {
            src: Arc::from(src.as_str()),
            filename: options.filename.clone(),
            line: options.starting_line,
            column: options.starting_column,
            frame: Frame::root(src),
            depth: 0,
            max_depth: options.max_interpolation_depth,
            tokens: Vec::new(),
        }
    }

    /// Advance until the current frame ends.
    fn run(&mut self) -> PugResult<()> {
        while !self.frame.ended {
            self.advance()?;
        }
        Ok(())
    }

    fn advance(&mut self) -> PugResult<()> {
        for &(name, rule) in RULES {
            if rule(self)? {
                trace!(rule = name, line = self.line, column = self.column, "matched");
                return Ok(());
            }
        }
        Err(self.fail())
    }

    /// Lex `input` as a `#[...]` interpolation and return what follows its
    /// closing bracket.
    fn lex_interpolated(&mut self, input: String) -> PugResult<String> {
        if self.depth >= self.max_depth {
            return Err(self.error(
                ErrorCode::InterpolationTooDeep,
                format!(
                    "Tag interpolation is nested more than {} levels deep",
                    self.max_depth
                ),
            ));
        }
        let parent = std::mem::replace(&mut self.frame, Frame::interpolated(input));
        self.depth += 1;
        trace!(depth = self.depth, "enter tag interpolation");
        let result = self.run();
        self.depth -= 1;
        let child = std::mem::replace(&mut self.frame, parent);
        result?;
        Ok(child.into_rest())
    }

    // Cursor

    #[inline]
    fn rest(&self) -> &str {
        self.frame.rest()
    }

    #[inline]
    fn consume(&mut self, len: usize) {
        self.frame.consume(len);
    }

    #[inline]
    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance_column(&mut self, n: usize) {
        self.column = self.column.saturating_add(to_u32(n));
    }

    fn retreat_column(&mut self, n: usize) {
        self.column = self.column.saturating_sub(to_u32(n));
    }

    fn set_column(&mut self, column: usize) {
        self.column = to_u32(column);
    }

    /// Move down `n` lines; any move resets the column.
    fn next_line(&mut self, n: usize) {
        self.line = self.line.saturating_add(to_u32(n));
        if n > 0 {
            self.column = 1;
        }
    }

    /// Advance over `c` as it appears in the source.
    fn step(&mut self, c: char) {
        if c == '\n' {
            self.next_line(1);
        } else {
            self.advance_column(1);
        }
    }

    fn step_over(&mut self, text: &str) {
        for c in text.chars() {
            self.step(c);
        }
    }

    /// Push a token spanning from `start` to the current position.
    fn push(&mut self, kind: TokenKind, start: Position) {
        let loc = Loc {
            start,
            end: self.position(),
            filename: self.filename.clone(),
        };
        self.tokens.push(Token::new(kind, loc));
    }

    // Errors

    #[cold]
    fn error(&self, code: ErrorCode, message: impl Into<String>) -> PugError {
        PugError::new(code, message, self.line, self.column)
            .with_filename(self.filename.clone())
            .with_src(Arc::clone(&self.src))
    }

    #[cold]
    fn fail(&self) -> PugError {
        let preview: String = self.rest().chars().take(5).collect();
        self.error(ErrorCode::UnexpectedText, format!("unexpected text \"{preview}\""))
    }

    /// Map a scanner failure; `unterminated` is the message for running off
    /// the end of the input.
    #[cold]
    fn scan_error(&self, err: &ScanError, unterminated: String) -> PugError {
        match err {
            ScanError::EndOfString { .. } => self.error(ErrorCode::NoEndBracket, unterminated),
            ScanError::MismatchedBracket { .. } => {
                self.error(ErrorCode::BracketMismatch, err.to_string())
            }
        }
    }

    // Embedded expressions

    /// The bracketed expression opening at byte `skip` of the remaining
    /// input. Returns the offset of the closing bracket and the text between.
    ///
    /// On failure the position moves to the offending character.
    fn bracket_expression(&mut self, skip: usize) -> PugResult<(usize, String)> {
        let rest = self.rest();
        let close = match rest[skip..].chars().next() {
            Some('(') => ')',
            Some('{') => '}',
            Some('[') => ']',
            _ => {
                return Err(self.error(
                    ErrorCode::AssertFailed,
                    "The start character should be \"(\", \"{\" or \"[\"",
                ))
            }
        };
        let options = ScanOptions {
            start: skip + 1,
            ..ScanOptions::default()
        };
        match scan_until(rest, close, options) {
            Ok(section) => Ok((section.end, section.src.to_string())),
            Err(err) => {
                let upto = rest[..err.index().min(rest.len())].to_string();
                self.step_over(&upto);
                Err(self.scan_error(
                    &err,
                    format!("The end of the string reached with no closing bracket {close} found."),
                ))
            }
        }
    }

    /// Require `src` to be a single expression.
    ///
    /// The current position must be at the start of `src`; on failure it
    /// moves to the reported position inside it.
    fn assert_expression(&mut self, src: &str) -> PugResult<()> {
        if let Err(err) = pug_js::parse_expression(src) {
            self.next_line(err.line.saturating_sub(1) as usize);
            self.advance_column(err.column as usize);
            return Err(self.error(
                ErrorCode::SyntaxError,
                format!("Syntax Error: {}", err.message),
            ));
        }
        Ok(())
    }

    /// Require balanced brackets and closed quotes, without requiring the
    /// text to be an expression.
    fn assert_nesting_correct(&self, src: &str) -> PugResult<()> {
        match scan(src, None) {
            Ok(state) if !state.is_nesting() => Ok(()),
            Ok(_) => Err(self.error(
                ErrorCode::IncorrectNesting,
                format!("Nesting must match on expression `{src}`"),
            )),
            Err(err) => Err(self.error(ErrorCode::BracketMismatch, err.to_string())),
        }
    }
}

/// Width in columns.
#[inline]
fn width(s: &str) -> usize {
    s.chars().count()
}

#[inline]
fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// `s` starts with `word` and the word ends there.
fn starts_with_word(s: &str, word: &str) -> bool {
    s.strip_prefix(word)
        .is_some_and(|after| !after.starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_'))
}
