//! Anchored patterns for the lexer rules.
//!
//! Word characters are spelled out as ASCII classes: template keywords and
//! identifiers are ASCII-only, and Unicode `\w` would accept more.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("lexer patterns are valid")
}

macro_rules! patterns {
    ($($(#[$meta:meta])* $name:ident = $pattern:literal;)*) => {
        $(
            $(#[$meta])*
            pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| compile($pattern));
        )*
    };
}

patterns! {
    /// A line holding only whitespace, followed by another line.
    BLANK = r"^\n[ \t]*\n";
    DOCTYPE = r"^doctype *([^\n]*)";
    CASE = r"^case +([^\n]+)";
    WHEN = r"^when +([^:\n]+)";
    /// Continues a `when` expression whose first part ended inside a string
    /// or bracket at a `:`.
    WHEN_CONTINUATION = r"^:([^:\n]+)";
    APPEND = r"^(?:block +)?append +([^\n]+)";
    PREPEND = r"^(?:block +)?prepend +([^\n]+)";
    BLOCK = r"^block +([^\n]+)";
    PATH = r"^ ([^\n]+)";
    /// Anything left after `include` that is not a path.
    NON_SPACE = r"^[^ \n]+";
    MIXIN = r"^mixin +([-A-Za-z0-9_]+)(?: *\((.*)\))? *";
    CALL = r"^\+(\s*)(?:([-A-Za-z0-9_]+)|#\{)";
    CALL_ARGUMENTS = r"^ *\(";
    /// Parenthesised text after a call that is an attribute list, not
    /// arguments.
    ATTRIBUTE_LIKE = r"^\s*[-A-Za-z0-9_]+ *=";
    WHILE = r"^while +([^\n]+)";
    EACH = r"^(?:each|for) +([A-Za-z_$][A-Za-z0-9_$]*)(?: *, *([A-Za-z_$][A-Za-z0-9_$]*))? * in *([^\n]+)";
    EACH_DASHED = r"^- *(?:each|for) +[A-Za-z_$][A-Za-z0-9_$]*(?: *, *[A-Za-z_$][A-Za-z0-9_$]*)? +in +[^\n]+";
    EACH_OF = r"^(?:each|for) (.*?) of +([^\n]+)";
    EACH_OF_DASHED = r"^- *(?:each|for) +[A-Za-z_$][A-Za-z0-9_$]*(?: *, *[A-Za-z_$][A-Za-z0-9_$]*)? +of +[^\n]+";
    EACH_OF_IDENT = r"^[A-Za-z_$][A-Za-z0-9_$]*$";
    EACH_OF_PAIR = r"^\[ *[A-Za-z_$][A-Za-z0-9_$]* *, *[A-Za-z_$][A-Za-z0-9_$]* *\]$";
    TAG = r"^[A-Za-z0-9_](?:[-:A-Za-z0-9_]*[A-Za-z0-9_])?";
    FILTER = r"^:([-A-Za-z0-9_]+)";
    CODE = r"^(!?=|-)[ \t]*([^\n]+)";
    ID = r"^#([-A-Za-z0-9_]+)";
    CLASS = r"^\.([-_A-Za-z0-9]*[_A-Za-z][-_A-Za-z0-9]*)";
    /// Tried after `CLASS` fails: a class with no letter or underscore.
    CLASS_WITHOUT_LETTER = r"^\.[-_A-Za-z0-9]+";
    TEXT = r"^(?:\| ?| )([^\n]+)";
    TEXT_HTML = r"^(<[^\n]*)";
    COMMENT = r"^//(-)?([^\n]*)";
    COLON = r"^: +";
}
