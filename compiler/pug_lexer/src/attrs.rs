//! Attribute lists: `(name=value, flag, 'quoted'!=raw)`.
//!
//! A value runs until a top-level `,` or whitespace that ends a complete
//! expression. Whitespace followed by a punctuator (other than a quote,
//! `:` or `...`) continues the value, so `a=b + c` is one attribute while
//! `a=b c=d` is two.

use pug_diagnostic::{ErrorCode, PugResult};
use pug_ir::{AttrValue, TokenKind};
use pug_lexer_core::{is_punctuator, ScanState};

use crate::Lexer;

/// Whitespace between attributes.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\t')
}

/// Bytes of leading attribute whitespace (all single-byte).
fn leading_space(s: &str) -> usize {
    s.len() - s.trim_start_matches(is_space).len()
}

struct ScannedValue<'s> {
    /// `None` for a boolean attribute.
    val: Option<String>,
    must_escape: bool,
    remaining: &'s str,
}

impl ScannedValue<'_> {
    fn boolean(remaining: &str) -> ScannedValue<'_> {
        ScannedValue {
            val: None,
            must_escape: true,
            remaining,
        }
    }
}

impl Lexer {
    pub(crate) fn attrs(&mut self) -> PugResult<bool> {
        if !self.rest().starts_with('(') {
            return Ok(false);
        }
        let start = self.position();
        let (end, _) = self.bracket_expression(0)?;
        let list = self.rest()[1..end].to_string();
        self.advance_column(1);
        self.push(TokenKind::StartAttributes, start);
        self.assert_nesting_correct(&list)?;
        self.consume(end + 1);

        let mut rest = list.as_str();
        while !rest.is_empty() {
            rest = self.attribute(rest)?;
        }

        let start = self.position();
        self.advance_column(1);
        self.push(TokenKind::EndAttributes, start);
        Ok(true)
    }

    /// Lex one attribute from the front of `list` and return the rest.
    fn attribute<'s>(&mut self, list: &'s str) -> PugResult<&'s str> {
        let skip = leading_space(list);
        self.step_over(&list[..skip]);
        let mut s = &list[skip..];
        if s.is_empty() {
            return Ok("");
        }
        let start = self.position();

        let quote = s.chars().next().filter(|c| matches!(c, '\'' | '"'));
        if quote.is_some() {
            self.advance_column(1);
            s = &s[1..];
        }

        let mut name = String::new();
        let mut i = 0;
        for c in s.chars() {
            if let Some(q) = quote {
                if c == q {
                    self.advance_column(1);
                    i += 1;
                    break;
                }
            } else if is_space(c) || matches!(c, '!' | '=' | ',') {
                break;
            }
            name.push(c);
            self.step(c);
            i += c.len_utf8();
        }

        let value = self.attribute_value(&s[i..])?;
        let (val, must_escape) = match value.val {
            Some(val) if !val.is_empty() => (AttrValue::Expr(val), value.must_escape),
            _ => (AttrValue::True, true),
        };
        self.push(
            TokenKind::Attribute {
                name,
                val,
                must_escape,
            },
            start,
        );

        let rest = value.remaining;
        let skip = leading_space(rest);
        self.step_over(&rest[..skip]);
        let rest = &rest[skip..];
        match rest.strip_prefix(',') {
            Some(after) => {
                self.advance_column(1);
                Ok(after)
            }
            None => Ok(rest),
        }
    }

    /// The `=value` or `!=value` after an attribute name.
    fn attribute_value<'s>(&mut self, s: &'s str) -> PugResult<ScannedValue<'s>> {
        let (mut line, mut column) = (self.line, self.column);
        let mut i = 0;
        for c in s.chars().take_while(|&c| is_space(c)) {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
            i += 1;
        }
        if i == s.len() {
            return Ok(ScannedValue::boolean(s));
        }

        let mut must_escape = true;
        if s[i..].starts_with('!') {
            must_escape = false;
            column += 1;
            i += 1;
            if !s[i..].starts_with('=') {
                let found = s[i..]
                    .chars()
                    .next()
                    .map_or_else(|| "undefined".to_string(), String::from);
                return Err(self.error(
                    ErrorCode::InvalidKeyCharacter,
                    format!("Unexpected character {found} expected `=`"),
                ));
            }
        }

        if !s[i..].starts_with('=') {
            // `div("foo"bar)`
            if let Some(first) = s.chars().next().filter(|&c| i == 0 && !is_space(c) && c != ',') {
                return Err(self.error(
                    ErrorCode::InvalidKeyCharacter,
                    format!("Unexpected character {first} expected `=`"),
                ));
            }
            return Ok(ScannedValue::boolean(s));
        }

        self.line = line;
        self.column = column + 1;
        i += 1;
        let skip = leading_space(&s[i..]);
        self.step_over(&s[i..i + skip]);
        i += skip;

        let (mut line, mut column) = (self.line, self.column);
        let mut state = ScanState::new();
        let mut val = String::new();
        while let Some(c) = s[i..].chars().next() {
            if !(state.is_nesting() || state.is_string()) {
                if is_space(c) {
                    let after = s[i..].trim_start_matches(is_space);
                    let Some(next) = after.chars().next() else {
                        break;
                    };
                    let ends_value = !is_punctuator(Some(next))
                        || matches!(next, '\'' | '"' | ':')
                        || after.starts_with("...");
                    if ends_value && pug_js::is_expression(&val) {
                        break;
                    }
                }
                if c == ',' && pug_js::is_expression(&val) {
                    break;
                }
            }
            if let Err(err) = state.feed(c) {
                return Err(self.error(ErrorCode::BracketMismatch, err.to_string()));
            }
            val.push(c);
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
            i += c.len_utf8();
        }

        self.assert_expression(&val)?;
        self.line = line;
        self.column = column;
        Ok(ScannedValue {
            val: Some(val),
            must_escape,
            remaining: &s[i..],
        })
    }
}
