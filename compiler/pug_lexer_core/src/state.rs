//! The incremental scanner state.

use std::fmt;

use smallvec::SmallVec;

use crate::classify::starts_regexp;

/// One level of nesting.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Context {
    Paren,
    Brace,
    Bracket,
    SingleQuote,
    DoubleQuote,
    TemplateQuote,
    LineComment,
    BlockComment,
    Regexp,
}

impl Context {
    fn opened_by(c: char) -> Option<Context> {
        match c {
            '(' => Some(Context::Paren),
            '{' => Some(Context::Brace),
            '[' => Some(Context::Bracket),
            _ => None,
        }
    }

    fn closed_by(c: char) -> Option<Context> {
        match c {
            ')' => Some(Context::Paren),
            '}' => Some(Context::Brace),
            ']' => Some(Context::Bracket),
            _ => None,
        }
    }

    /// The character that closes this context, for brackets.
    pub fn closing_char(self) -> Option<char> {
        match self {
            Context::Paren => Some(')'),
            Context::Brace => Some('}'),
            Context::Bracket => Some(']'),
            _ => None,
        }
    }
}

/// Scanner failure. `index` is the byte offset of the offending character
/// (or of the end of input).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanError {
    MismatchedBracket { index: usize, found: char },
    EndOfString { index: usize },
}

impl ScanError {
    pub fn index(&self) -> usize {
        match self {
            ScanError::MismatchedBracket { index, .. } | ScanError::EndOfString { index } => *index,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ScanError::MismatchedBracket { .. } => "CHARACTER_PARSER:MISMATCHED_BRACKET",
            ScanError::EndOfString { .. } => "CHARACTER_PARSER:END_OF_STRING_REACHED",
        }
    }

    #[must_use]
    pub(crate) fn at(self, index: usize) -> Self {
        match self {
            ScanError::MismatchedBracket { found, .. } => {
                ScanError::MismatchedBracket { index, found }
            }
            ScanError::EndOfString { .. } => ScanError::EndOfString { index },
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::MismatchedBracket { found, .. } => write!(f, "Mismatched Bracket: {found}"),
            ScanError::EndOfString { .. } => {
                f.write_str("The end of the string was reached with no closing bracket found.")
            }
        }
    }
}

impl std::error::Error for ScanError {}

/// Nesting state after some prefix of an expression.
#[derive(Clone, Debug, Default)]
pub struct ScanState {
    stack: SmallVec<[Context; 8]>,
    /// A `/` just opened a regexp; a following `/` or `*` turns it into a
    /// comment instead.
    regexp_start: bool,
    escaped: bool,
    /// Inside a template quote, the previous character was an unescaped `$`.
    has_dollar: bool,
    src: String,
    /// Significant characters seen so far, comments excluded.
    history: String,
    last_char: Option<char>,
}

impl ScanState {
    pub fn new() -> Self {
        ScanState::default()
    }

    /// Innermost open context.
    #[inline]
    pub fn current(&self) -> Option<Context> {
        self.stack.last().copied()
    }

    pub fn stack(&self) -> &[Context] {
        &self.stack
    }

    /// All characters fed so far.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Inside any bracket, quote, comment or regexp.
    #[inline]
    pub fn is_nesting(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Like [`is_nesting`](Self::is_nesting), but a lone line comment at
    /// the top level does not count.
    pub fn is_nesting_ignoring_line_comment(&self) -> bool {
        !(self.stack.is_empty() || self.stack[..] == [Context::LineComment])
    }

    pub fn is_string(&self) -> bool {
        matches!(
            self.current(),
            Some(Context::SingleQuote | Context::DoubleQuote | Context::TemplateQuote)
        )
    }

    pub fn is_comment(&self) -> bool {
        matches!(
            self.current(),
            Some(Context::LineComment | Context::BlockComment)
        )
    }

    /// Advance by one character.
    ///
    /// The only failure is a close bracket that does not match the
    /// innermost open one. The error's index is zero; callers that know the
    /// position report it.
    pub fn feed(&mut self, c: char) -> Result<(), ScanError> {
        self.src.push(c);
        let was_comment = self.is_comment();
        let last_significant = self.history.chars().next_back();

        if self.regexp_start {
            if c == '/' || c == '*' {
                self.stack.pop();
            }
            self.regexp_start = false;
        }

        match self.current() {
            Some(Context::LineComment) => {
                if c == '\n' {
                    self.stack.pop();
                }
            }
            Some(Context::BlockComment) => {
                if self.last_char == Some('*') && c == '/' {
                    self.stack.pop();
                }
            }
            Some(Context::SingleQuote) => self.quoted(c, '\''),
            Some(Context::DoubleQuote) => self.quoted(c, '"'),
            Some(Context::Regexp) => self.quoted(c, '/'),
            Some(Context::TemplateQuote) => {
                if c == '`' && !self.escaped {
                    self.stack.pop();
                    self.has_dollar = false;
                } else if c == '\\' && !self.escaped {
                    self.escaped = true;
                    self.has_dollar = false;
                } else if c == '$' && !self.escaped {
                    self.has_dollar = true;
                } else if c == '{' && self.has_dollar {
                    self.stack.push(Context::Brace);
                    self.has_dollar = false;
                } else {
                    self.escaped = false;
                    self.has_dollar = false;
                }
            }
            Some(Context::Paren | Context::Brace | Context::Bracket) | None => {
                self.code_char(c, last_significant)?;
            }
        }

        if !self.is_comment() && !was_comment {
            self.history.push(c);
        }
        self.last_char = Some(c);
        Ok(())
    }

    /// Quote or regexp body: close on an unescaped `close`.
    fn quoted(&mut self, c: char, close: char) {
        if c == close && !self.escaped {
            self.stack.pop();
        } else if c == '\\' && !self.escaped {
            self.escaped = true;
        } else {
            self.escaped = false;
        }
    }

    /// A character outside strings, comments and regexps.
    fn code_char(&mut self, c: char, last_significant: Option<char>) -> Result<(), ScanError> {
        if let Some(open) = Context::opened_by(c) {
            self.stack.push(open);
        } else if let Some(close) = Context::closed_by(c) {
            if self.current() != Some(close) {
                return Err(ScanError::MismatchedBracket { index: 0, found: c });
            }
            self.stack.pop();
        } else if last_significant == Some('/') && c == '/' {
            self.history.pop();
            self.stack.push(Context::LineComment);
        } else if last_significant == Some('/') && c == '*' {
            self.history.pop();
            self.stack.push(Context::BlockComment);
        } else if c == '/' && starts_regexp(&self.history) {
            self.stack.push(Context::Regexp);
            self.regexp_start = true;
        } else if c == '\'' {
            self.stack.push(Context::SingleQuote);
        } else if c == '"' {
            self.stack.push(Context::DoubleQuote);
        } else if c == '`' {
            self.stack.push(Context::TemplateQuote);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
