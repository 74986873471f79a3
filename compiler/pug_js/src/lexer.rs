//! On-demand tokenizer.
//!
//! The parser asks for one token at a time from a byte offset. Whether a `/`
//! starts a regular expression, and where a template chunk ends, depends on
//! the parser's position in the grammar, so those are separate entry points.

use logos::Logos;
use pug_lexer_core::{Context, ScanState};

use crate::error::SyntaxError;
use crate::token::{RawTok, Tok, TokKind};

pub(crate) struct Lexer<'a> {
    src: &'a str,
}

/// A scanned template chunk.
pub(crate) struct TemplateChunk {
    pub cooked: String,
    /// Offset just past the closing backtick or the `${`.
    pub end: usize,
    /// The chunk ended at `${` rather than at the closing backtick.
    pub substitution: bool,
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub(crate) fn is_id_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

pub(crate) fn is_id_continue(c: char) -> bool {
    c == '$' || c == '_' || c == '\u{200c}' || c == '\u{200d}' || c.is_alphanumeric()
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer { src }
    }

    #[cold]
    pub fn error(&self, offset: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::new(self.src, offset, message)
    }

    /// The next token at or after `pos`.
    pub fn token_at(&self, pos: usize) -> Result<Tok, SyntaxError> {
        let (start, newline_before) = self.skip_trivia(pos)?;
        let rest = &self.src[start..];
        let Some(first) = rest.chars().next() else {
            return Ok(Tok {
                kind: TokKind::Eof,
                start,
                end: start,
                newline_before,
            });
        };

        if !first.is_ascii() {
            if is_id_start(first) {
                let end = self.identifier_end(start + first.len_utf8());
                return Ok(Tok {
                    kind: TokKind::Raw(RawTok::Ident),
                    start,
                    end,
                    newline_before,
                });
            }
            return Err(self.error(start, format!("Unexpected character '{first}'")));
        }

        let mut logos = RawTok::lexer(rest);
        let raw = match logos.next() {
            Some(Ok(raw)) => raw,
            Some(Err(())) | None => {
                let message = if first == '"' || first == '\'' {
                    "Unterminated string constant".to_string()
                } else {
                    format!("Unexpected character '{first}'")
                };
                return Err(self.error(start, message));
            }
        };
        let mut end = start + logos.span().end;

        let raw = match raw {
            // `a?.5:b` is a conditional, not an optional chain.
            RawTok::QuestionDot
                if self.src[end..].starts_with(|c: char| c.is_ascii_digit()) =>
            {
                end = start + 1;
                RawTok::Question
            }
            RawTok::Ident => {
                end = self.identifier_end(end);
                RawTok::Ident
            }
            RawTok::Number => {
                if self.src[end..].starts_with(|c: char| is_id_start(c) || c.is_ascii_digit()) {
                    return Err(self.error(end, "Identifier directly after number"));
                }
                RawTok::Number
            }
            other => other,
        };

        Ok(Tok {
            kind: TokKind::Raw(raw),
            start,
            end,
            newline_before,
        })
    }

    fn identifier_end(&self, mut end: usize) -> usize {
        for c in self.src[end..].chars() {
            if !is_id_continue(c) {
                break;
            }
            end += c.len_utf8();
        }
        end
    }

    /// Skip whitespace and block comments. Returns the offset of the next
    /// significant character and whether a line terminator was crossed.
    fn skip_trivia(&self, mut pos: usize) -> Result<(usize, bool), SyntaxError> {
        let mut newline = false;
        loop {
            let rest = &self.src[pos..];
            let Some(c) = rest.chars().next() else {
                return Ok((pos, newline));
            };
            if is_line_terminator(c) {
                newline = true;
                pos += c.len_utf8();
            } else if c.is_whitespace() || c == '\u{feff}' {
                pos += c.len_utf8();
            } else if rest.starts_with("//") {
                return Err(self.error(pos, "Line comments not allowed in an expression"));
            } else if rest.starts_with("/*") {
                let Some(close) = rest[2..].find("*/") else {
                    return Err(self.error(pos, "Unterminated comment"));
                };
                newline |= rest[2..2 + close].contains(is_line_terminator);
                pos += close + 4;
            } else {
                return Ok((pos, newline));
            }
        }
    }

    /// Scan a regular expression literal whose opening `/` is at `start`.
    /// Returns the pattern, the flags and the end offset.
    pub fn scan_regex(&self, start: usize) -> Result<(String, String, usize), SyntaxError> {
        let body = start + 1;
        let mut escaped = false;
        let mut in_class = false;
        let mut close = None;
        for (offset, c) in self.src[body..].char_indices() {
            if is_line_terminator(c) {
                break;
            }
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '[' {
                in_class = true;
            } else if c == ']' && in_class {
                in_class = false;
            } else if c == '/' && !in_class {
                close = Some(body + offset);
                break;
            }
        }
        let Some(close) = close else {
            return Err(self.error(start, "Unterminated regular expression"));
        };

        let flags_start = close + 1;
        let flags_end = self.identifier_end(flags_start);
        let flags = &self.src[flags_start..flags_end];
        let mut seen = String::new();
        for c in flags.chars() {
            if !"dgimsuyv".contains(c) || seen.contains(c) {
                return Err(self.error(flags_start, "Invalid regular expression flag"));
            }
            seen.push(c);
        }
        if seen.contains('u') && seen.contains('v') {
            return Err(self.error(flags_start, "Invalid regular expression flag"));
        }

        Ok((
            self.src[body..close].to_string(),
            flags.to_string(),
            flags_end,
        ))
    }

    /// Scan template text starting at `pos` (just after a backtick or the
    /// `}` closing a substitution).
    pub fn scan_template_chunk(&self, pos: usize) -> Result<TemplateChunk, SyntaxError> {
        let mut cooked = String::new();
        let mut i = pos;
        loop {
            let rest = &self.src[i..];
            let Some(c) = rest.chars().next() else {
                return Err(self.error(pos, "Unterminated template"));
            };
            match c {
                '`' => {
                    return Ok(TemplateChunk {
                        cooked,
                        end: i + 1,
                        substitution: false,
                    })
                }
                '$' if rest.starts_with("${") => {
                    return Ok(TemplateChunk {
                        cooked,
                        end: i + 2,
                        substitution: true,
                    })
                }
                '\\' => {
                    let (ch, next) = self.read_escape(i, true)?;
                    cooked.extend(ch);
                    i = next;
                }
                '\r' => {
                    cooked.push('\n');
                    i += if rest.starts_with("\r\n") { 2 } else { 1 };
                }
                _ => {
                    cooked.push(c);
                    i += c.len_utf8();
                }
            }
        }
    }

    /// The value of a quoted string token spanning `start..end`.
    pub fn cook_string(&self, start: usize, end: usize) -> Result<String, SyntaxError> {
        let mut cooked = String::new();
        let close = end - 1;
        let mut i = start + 1;
        while i < close {
            let Some(c) = self.src[i..].chars().next() else {
                break;
            };
            if c == '\\' {
                let (ch, next) = self.read_escape(i, false)?;
                cooked.extend(ch);
                i = next;
            } else {
                cooked.push(c);
                i += c.len_utf8();
            }
        }
        Ok(cooked)
    }

    /// Decode the escape sequence whose backslash is at `at`. `None` means a
    /// line continuation.
    fn read_escape(&self, at: usize, template: bool) -> Result<(Option<char>, usize), SyntaxError> {
        let bad = |msg: &str| Err(self.error(at, msg.to_string()));
        let rest = &self.src[at + 1..];
        let Some(c) = rest.chars().next() else {
            return bad("Unterminated string constant");
        };
        let after = at + 1 + c.len_utf8();
        let simple = |ch: char| Ok((Some(ch), after));
        match c {
            'n' => simple('\n'),
            't' => simple('\t'),
            'r' => simple('\r'),
            'b' => simple('\u{8}'),
            'f' => simple('\u{c}'),
            'v' => simple('\u{b}'),
            '\r' => Ok((None, if rest.starts_with("\r\n") { after + 1 } else { after })),
            '\n' | '\u{2028}' | '\u{2029}' => Ok((None, after)),
            'x' => {
                let hex = rest.get(1..3).filter(|h| h.chars().all(|d| d.is_ascii_hexdigit()));
                match hex.and_then(|h| u32::from_str_radix(h, 16).ok()).and_then(char::from_u32) {
                    Some(ch) => Ok((Some(ch), after + 2)),
                    None => bad("Bad character escape sequence"),
                }
            }
            'u' => self.read_unicode_escape(at, after),
            '0' if !rest[1..].starts_with(|d: char| d.is_ascii_digit()) => simple('\0'),
            '0'..='7' => {
                if template {
                    return bad("Octal literal in template string");
                }
                let digits: String = rest
                    .chars()
                    .take(3)
                    .take_while(|d| ('0'..='7').contains(d))
                    .collect();
                let mut value = 0u32;
                let mut used = 0;
                for d in digits.chars() {
                    let next = value * 8 + d.to_digit(8).unwrap_or(0);
                    if next > 255 {
                        break;
                    }
                    value = next;
                    used += 1;
                }
                let ch = char::from_u32(value).unwrap_or('\u{fffd}');
                Ok((Some(ch), at + 1 + used))
            }
            '8' | '9' if template => bad("Invalid escape sequence in template string"),
            other => simple(other),
        }
    }

    fn read_unicode_escape(&self, at: usize, body: usize) -> Result<(Option<char>, usize), SyntaxError> {
        let rest = &self.src[body..];
        let (code, end) = if let Some(braced) = rest.strip_prefix('{') {
            let Some(close) = braced.find('}') else {
                return Err(self.error(at, "Bad character escape sequence"));
            };
            let digits = &braced[..close];
            let code = if digits.is_empty() || !digits.chars().all(|d| d.is_ascii_hexdigit()) {
                None
            } else {
                u32::from_str_radix(digits, 16).ok()
            };
            match code {
                Some(code) if code <= 0x10_ffff => (code, body + close + 2),
                Some(_) => return Err(self.error(at, "Code point out of bounds")),
                None => return Err(self.error(at, "Bad character escape sequence")),
            }
        } else {
            match rest
                .get(..4)
                .filter(|h| h.chars().all(|d| d.is_ascii_hexdigit()))
                .and_then(|h| u32::from_str_radix(h, 16).ok())
            {
                Some(code) => (code, body + 4),
                None => return Err(self.error(at, "Bad character escape sequence")),
            }
        };
        // Lone surrogates have no `char`; they survive as U+FFFD.
        Ok((Some(char::from_u32(code).unwrap_or('\u{fffd}')), end))
    }

    /// Skip a bracketed region whose opening bracket is at `open`, returning
    /// the offset just past its matching close.
    ///
    /// Used for function, class and arrow bodies, which are only checked for
    /// balanced nesting.
    pub fn skip_balanced(&self, open: usize) -> Result<usize, SyntaxError> {
        let mut state = ScanState::new();
        for (offset, c) in self.src[open..].char_indices() {
            let index = open + offset;
            if state.feed(c).is_err() {
                return Err(self.error(index, "Unexpected token"));
            }
            if state.current() == Some(Context::LineComment) {
                return Err(self.error(
                    index.saturating_sub(1),
                    "Line comments not allowed in an expression",
                ));
            }
            if state.stack().is_empty() {
                return Ok(index + c.len_utf8());
            }
        }
        Err(self.error(self.src.len(), "Unexpected token"))
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.src[start..end]
    }
}

/// Numeric value of a number token. `None` for big integer literals.
pub(crate) fn number_value(text: &str) -> Option<f64> {
    if text.ends_with('n') {
        return None;
    }
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let radix = match digits.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return Some(radix_value(&digits[2..], radix));
    }
    // Legacy octal: a leading zero followed only by octal digits.
    if digits.len() > 1
        && digits.starts_with('0')
        && digits.chars().all(|c| c.is_ascii_digit())
    {
        if digits.chars().all(|c| ('0'..='7').contains(&c)) {
            return Some(radix_value(&digits[1..], 8));
        }
        return digits.parse().ok();
    }
    digits.parse().ok()
}

fn radix_value(digits: &str, radix: u32) -> f64 {
    digits.chars().fold(0.0, |acc, c| {
        acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
    })
}

#[cfg(test)]
mod tests;
