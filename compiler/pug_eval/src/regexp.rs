//! Regular expression literals, folded through the `regex` crate.
//!
//! Script patterns are translated into `regex` syntax. Patterns that use
//! features `regex` does not support (backreferences, lookaround, sticky
//! matching) fail to compile and the expression stays unfolded.

use std::fmt;

use regex::{Regex, RegexBuilder};

/// A regular expression literal `/pattern/flags`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegExp {
    pub pattern: String,
    pub flags: String,
}

impl RegExp {
    pub fn new(pattern: impl Into<String>, flags: impl Into<String>) -> Self {
        RegExp {
            pattern: pattern.into(),
            flags: flags.into(),
        }
    }

    pub fn is_global(&self) -> bool {
        self.flags.contains('g')
    }

    /// Compile to a `regex::Regex`, or `None` when the pattern or flags
    /// are outside what can be matched faithfully.
    pub fn compile(&self) -> Option<Regex> {
        let mut builder_flags = (false, false, false);
        for flag in self.flags.chars() {
            match flag {
                'g' | 'u' | 'd' => {}
                'i' => builder_flags.0 = true,
                'm' => builder_flags.1 = true,
                's' => builder_flags.2 = true,
                _ => return None,
            }
        }
        let (case_insensitive, multi_line, dot_matches_new_line) = builder_flags;
        RegexBuilder::new(&translate(&self.pattern)?)
            .case_insensitive(case_insensitive)
            .multi_line(multi_line)
            .dot_matches_new_line(dot_matches_new_line)
            .build()
            .ok()
    }
}

impl fmt::Display for RegExp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pattern = if self.pattern.is_empty() {
            "(?:)"
        } else {
            &self.pattern
        };
        write!(f, "/{pattern}/{}", self.flags)
    }
}

/// Rewrite the escapes whose meaning differs between the two dialects:
/// script `\d`, `\w` and `\b` are ASCII-only.
fn translate(pattern: &str) -> Option<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut in_class = false;
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next()?;
                let ascii = match (escaped, in_class) {
                    ('d', false) => "[0-9]",
                    ('D', false) => "[^0-9]",
                    ('w', false) => "[0-9A-Za-z_]",
                    ('W', false) => "[^0-9A-Za-z_]",
                    ('b', false) => "(?-u:\\b)",
                    ('B', false) => "(?-u:\\B)",
                    ('d', true) => "0-9",
                    ('w', true) => "0-9A-Za-z_",
                    ('D' | 'W', true) => return None,
                    _ => {
                        out.push('\\');
                        out.push(escaped);
                        continue;
                    }
                };
                out.push_str(ascii);
            }
            '[' if !in_class => {
                in_class = true;
                out.push(c);
                // `[]` and `[^]` are valid script classes.
                let rest = chars.as_str();
                if rest.starts_with(']') {
                    chars.next();
                    out.push_str("^\\s\\S]");
                    in_class = false;
                } else if rest.starts_with("^]") {
                    chars.next();
                    chars.next();
                    out.push_str("\\s\\S]");
                    in_class = false;
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    Some(out)
}
