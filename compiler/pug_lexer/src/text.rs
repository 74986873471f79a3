//! Text lines and the interpolation markers inside them.

use pug_diagnostic::PugResult;
use pug_ir::TokenKind;
use pug_lexer_core::{scan_until, ScanOptions};

use crate::patterns::{TEXT, TEXT_HTML};
use crate::{width, Lexer};

/// Which token plain text segments become.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TextKind {
    Text,
    Html,
}

impl TextKind {
    fn token(self, text: String) -> TokenKind {
        match self {
            TextKind::Text => TokenKind::Text(text),
            TextKind::Html => TokenKind::TextHtml(text),
        }
    }
}

/// A `#{` or `!{` in text.
#[derive(Copy, Clone, Debug)]
struct CodeMarker {
    /// Start of the marker, or of the backslash escaping it.
    index: usize,
    escaped: bool,
    lead: char,
}

fn find_code_marker(value: &str) -> Option<CodeMarker> {
    let bytes = value.as_bytes();
    let at = bytes
        .windows(2)
        .position(|pair| matches!(pair, [b'#' | b'!', b'{']))?;
    let escaped = at > 0 && bytes[at - 1] == b'\\';
    Some(CodeMarker {
        index: if escaped { at - 1 } else { at },
        escaped,
        lead: char::from(bytes[at]),
    })
}

/// The earliest marker in a text segment.
enum Marker {
    /// `\#[`: a literal `#[`.
    EscapedTag(usize),
    /// `#[`: a nested template.
    Tag(usize),
    /// `]` closing the interpolation being lexed.
    End(usize),
    Code(CodeMarker),
}

impl Lexer {
    pub(crate) fn text(&mut self) -> PugResult<bool> {
        let rest = self.rest();
        let (len, value) = if let Some(caps) = TEXT.captures(rest) {
            (caps[0].len(), caps[1].to_string())
        } else if rest.starts_with(' ') {
            (1, " ".to_string())
        } else if let Some(after) = rest.strip_prefix('|') {
            if after.starts_with(' ') {
                (2, " ".to_string())
            } else {
                (1, String::new())
            }
        } else {
            return Ok(false);
        };
        // The matched prefix (`|`, `| ` or ` `) is ASCII.
        let prefix = len - value.len();
        self.consume(len);
        self.advance_column(prefix);
        self.add_text(TextKind::Text, value)?;
        Ok(true)
    }

    /// A line starting with `<`, passed through as HTML.
    pub(crate) fn text_html(&mut self) -> PugResult<bool> {
        let Some(m) = TEXT_HTML.find(self.rest()) else {
            return Ok(false);
        };
        let value = m.as_str().to_string();
        self.consume(value.len());
        self.add_text(TextKind::Html, value)?;
        Ok(true)
    }

    fn next_marker(&self, value: &str) -> Option<Marker> {
        let end = if self.frame.interpolated { value.find(']') } else { None };
        let (tag, escaped_tag, code) = if self.frame.interpolation_allowed {
            (value.find("#["), value.find("\\#["), find_code_marker(value))
        } else {
            (None, None, None)
        };
        let candidates = [
            escaped_tag.map(Marker::EscapedTag),
            tag.map(Marker::Tag),
            end.map(Marker::End),
            code.map(Marker::Code),
        ];
        candidates.into_iter().flatten().min_by_key(|marker| match marker {
            Marker::EscapedTag(i) | Marker::Tag(i) | Marker::End(i) => *i,
            Marker::Code(code) => code.index,
        })
    }

    /// Push a text token for `text`; `escaped` counts backslashes dropped
    /// from it, which still occupy columns.
    fn push_text(&mut self, kind: TextKind, text: String, escaped: usize) {
        let start = self.position();
        self.advance_column(width(&text) + escaped);
        self.push(kind.token(text), start);
    }

    /// Split `value` into text tokens, `#[...]` interpolations and
    /// `#{...}`/`!{...}` code.
    pub(crate) fn add_text(&mut self, kind: TextKind, value: String) -> PugResult<()> {
        let mut value = value;
        let mut prefix = String::new();
        let mut escaped = 0;
        loop {
            if value.is_empty() && prefix.is_empty() {
                return Ok(());
            }
            match self.next_marker(&value) {
                Some(Marker::EscapedTag(i)) => {
                    prefix.push_str(&value[..i]);
                    prefix.push_str("#[");
                    value = value[i + 3..].to_string();
                    escaped += 1;
                }
                Some(Marker::Tag(i)) => {
                    let before = format!("{prefix}{}", &value[..i]);
                    self.push_text(kind, before, escaped);
                    let start = self.position();
                    self.advance_column(2);
                    self.push(TokenKind::StartPugInterpolation, start);
                    let remaining = self.lex_interpolated(value[i + 2..].to_string())?;
                    let start = self.position();
                    self.advance_column(1);
                    self.push(TokenKind::EndPugInterpolation, start);
                    value = remaining;
                    prefix.clear();
                    escaped = 0;
                }
                Some(Marker::End(i)) => {
                    if !(prefix.is_empty() && i == 0) {
                        let before = format!("{prefix}{}", &value[..i]);
                        self.push_text(kind, before, escaped);
                    }
                    self.frame.ended = true;
                    self.frame.prepend(&value[i + 1..]);
                    return Ok(());
                }
                Some(Marker::Code(marker)) if marker.escaped => {
                    prefix.push_str(&value[..marker.index]);
                    prefix.push(marker.lead);
                    prefix.push('{');
                    value = value[marker.index + 3..].to_string();
                    escaped += 1;
                }
                Some(Marker::Code(marker)) => {
                    let before = &value[..marker.index];
                    if !(prefix.is_empty() && before.is_empty()) {
                        let text = format!("{prefix}{before}");
                        self.push_text(kind, text, escaped);
                    }
                    let rest = value[marker.index + 2..].to_string();
                    match self.interpolated_code(&rest, marker.lead == '#')? {
                        Some(after) => {
                            value = after;
                            prefix.clear();
                            escaped = 0;
                        }
                        None => return Ok(()),
                    }
                }
                None => {
                    let text = format!("{prefix}{value}");
                    self.push_text(kind, text, escaped);
                    return Ok(());
                }
            }
        }
    }

    /// Lex the code after `#{` or `!{`. Returns the text after the closing
    /// `}`, if any.
    fn interpolated_code(&mut self, rest: &str, must_escape: bool) -> PugResult<Option<String>> {
        let start = self.position();
        self.advance_column(2);
        let section = match scan_until(rest, '}', ScanOptions::default()) {
            Ok(section) => section,
            Err(err) => {
                self.advance_column(width(&rest[..err.index().min(rest.len())]));
                return Err(self.scan_error(
                    &err,
                    "End of line was reached with no closing bracket for interpolation."
                        .to_string(),
                ));
            }
        };
        let code = section.src.to_string();
        self.assert_expression(&code)?;
        let kind = TokenKind::InterpolatedCode {
            val: code,
            must_escape,
            buffer: true,
        };
        if section.end + 1 < rest.len() {
            self.advance_column(width(&rest[..=section.end]));
            self.push(kind, start);
            Ok(Some(rest[section.end + 1..].to_string()))
        } else {
            self.advance_column(width(rest));
            self.push(kind, start);
            Ok(None)
        }
    }
}
