//! Lexer tokens.
//!
//! The token vocabulary mirrors the template syntax one-to-one: each
//! construct the lexer recognises produces one kind, and the structural
//! kinds come in open/close pairs (`Indent`/`Outdent`,
//! `StartAttributes`/`EndAttributes`, `StartPipelessText`/`EndPipelessText`,
//! `StartPugInterpolation`/`EndPugInterpolation`).

use std::fmt;

use crate::ast::AttrValue;
use crate::Loc;

/// How a named block combines with the block of the same name in a parent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockMode {
    #[default]
    Replace,
    Append,
    Prepend,
}

impl BlockMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BlockMode::Replace => "replace",
            BlockMode::Append => "append",
            BlockMode::Prepend => "prepend",
        }
    }
}

/// A token with its location.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub loc: Loc,
}

impl Token {
    #[inline]
    pub fn new(kind: TokenKind, loc: Loc) -> Self {
        Token { kind, loc }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {}", self.kind, self.loc.start)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    // Layout
    Newline,
    Indent(usize),
    Outdent,
    Eos,

    // Markup
    Tag(String),
    Id(String),
    Class(String),
    Text(String),
    TextHtml(String),
    Doctype(String),
    Comment {
        val: String,
        buffer: bool,
    },
    Filter(String),
    Dot,
    Slash,
    Colon,
    /// `#{expr}` used as a tag name.
    Interpolation(String),

    // Attributes
    StartAttributes,
    Attribute {
        name: String,
        val: AttrValue,
        must_escape: bool,
    },
    EndAttributes,
    /// `&attributes(expr)`
    AttributeBlock(String),

    // Code
    Code {
        val: String,
        must_escape: bool,
        buffer: bool,
    },
    InterpolatedCode {
        val: String,
        must_escape: bool,
        buffer: bool,
    },
    BlockCode,

    // Control flow
    If(String),
    ElseIf(String),
    Else,
    While(String),
    Case(String),
    When(String),
    Default,
    Each {
        val: String,
        key: Option<String>,
        code: String,
    },
    EachOf {
        val: String,
        code: String,
    },

    // Inheritance and reuse
    Extends,
    Include,
    Path(String),
    Block {
        name: String,
        mode: BlockMode,
    },
    MixinBlock,
    Yield,
    Mixin {
        name: String,
        args: Option<String>,
    },
    Call {
        name: String,
        args: Option<String>,
    },

    // Nested regions
    StartPipelessText,
    EndPipelessText,
    StartPugInterpolation,
    EndPugInterpolation,
}

impl TokenKind {
    /// The token's name as it appears in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Newline => "newline",
            TokenKind::Indent(_) => "indent",
            TokenKind::Outdent => "outdent",
            TokenKind::Eos => "eos",
            TokenKind::Tag(_) => "tag",
            TokenKind::Id(_) => "id",
            TokenKind::Class(_) => "class",
            TokenKind::Text(_) => "text",
            TokenKind::TextHtml(_) => "text-html",
            TokenKind::Doctype(_) => "doctype",
            TokenKind::Comment { .. } => "comment",
            TokenKind::Filter(_) => "filter",
            TokenKind::Dot => "dot",
            TokenKind::Slash => "slash",
            TokenKind::Colon => ":",
            TokenKind::Interpolation(_) => "interpolation",
            TokenKind::StartAttributes => "start-attributes",
            TokenKind::Attribute { .. } => "attribute",
            TokenKind::EndAttributes => "end-attributes",
            TokenKind::AttributeBlock(_) => "&attributes",
            TokenKind::Code { .. } => "code",
            TokenKind::InterpolatedCode { .. } => "interpolated-code",
            TokenKind::BlockCode => "blockcode",
            TokenKind::If(_) => "if",
            TokenKind::ElseIf(_) => "else-if",
            TokenKind::Else => "else",
            TokenKind::While(_) => "while",
            TokenKind::Case(_) => "case",
            TokenKind::When(_) => "when",
            TokenKind::Default => "default",
            TokenKind::Each { .. } => "each",
            TokenKind::EachOf { .. } => "eachOf",
            TokenKind::Extends => "extends",
            TokenKind::Include => "include",
            TokenKind::Path(_) => "path",
            TokenKind::Block { .. } => "block",
            TokenKind::MixinBlock => "mixin-block",
            TokenKind::Yield => "yield",
            TokenKind::Mixin { .. } => "mixin",
            TokenKind::Call { .. } => "call",
            TokenKind::StartPipelessText => "start-pipeless-text",
            TokenKind::EndPipelessText => "end-pipeless-text",
            TokenKind::StartPugInterpolation => "start-pug-interpolation",
            TokenKind::EndPugInterpolation => "end-pug-interpolation",
        }
    }

    /// The textual payload, for kinds that carry a single value.
    pub fn value(&self) -> Option<&str> {
        match self {
            TokenKind::Tag(v)
            | TokenKind::Id(v)
            | TokenKind::Class(v)
            | TokenKind::Text(v)
            | TokenKind::TextHtml(v)
            | TokenKind::Doctype(v)
            | TokenKind::Filter(v)
            | TokenKind::Interpolation(v)
            | TokenKind::AttributeBlock(v)
            | TokenKind::If(v)
            | TokenKind::ElseIf(v)
            | TokenKind::While(v)
            | TokenKind::Case(v)
            | TokenKind::When(v)
            | TokenKind::Path(v) => Some(v),
            TokenKind::Comment { val, .. }
            | TokenKind::Code { val, .. }
            | TokenKind::InterpolatedCode { val, .. } => Some(val),
            TokenKind::Block { name, .. }
            | TokenKind::Mixin { name, .. }
            | TokenKind::Call { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
