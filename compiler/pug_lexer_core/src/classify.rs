//! Lookbehind classification for the regex-or-division decision.

/// Reserved words after which a `/` starts a regular expression.
const KEYWORDS: &[&str] = &[
    "if", "in", "do", "var", "for", "new", "try", "let", "this", "else", "case", "void", "with",
    "enum", "while", "break", "catch", "throw", "const", "yield", "class", "super", "return",
    "typeof", "delete", "switch", "export", "import", "default", "finally", "extends",
    "function", "continue", "debugger", "package", "private", "interface", "instanceof",
    "implements", "protected", "public", "static",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Punctuation after which an operand is expected. `None` stands for the
/// start of input and counts as punctuation.
pub fn is_punctuator(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => matches!(
            c,
            '.' | '('
                | ')'
                | ';'
                | ','
                | '{'
                | '}'
                | '['
                | ']'
                | ':'
                | '?'
                | '~'
                | '%'
                | '&'
                | '*'
                | '+'
                | '-'
                | '/'
                | '<'
                | '>'
                | '^'
                | '|'
                | '!'
                | '='
        ),
    }
}

/// Whether a `/` following `history` (all significant characters so far,
/// in source order) starts a regular expression literal.
pub(crate) fn starts_regexp(history: &str) -> bool {
    let history = history.trim_end();
    let last = history.chars().next_back();
    match last {
        Some(')') => false,
        Some('}') => true,
        _ if is_punctuator(last) => true,
        _ => {
            let word_start = history
                .char_indices()
                .rev()
                .take_while(|&(_, c)| c.is_ascii_alphanumeric() || c == '_')
                .last()
                .map_or(history.len(), |(i, _)| i);
            let word = &history[word_start..];
            !word.is_empty() && is_keyword(word)
        }
    }
}
