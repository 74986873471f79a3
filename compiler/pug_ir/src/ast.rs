//! Template AST.
//!
//! One [`Node`] variant per construct, so every pass matches exhaustively and
//! a new construct cannot be added without every pass handling it. The
//! parser builds one tree per file; the linker rewrites it in place; the code
//! generator only reads it.

use crate::{BlockMode, SourceLoc};

/// An ordered sequence of nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Block {
    pub nodes: Vec<Node>,
    pub loc: SourceLoc,
}

impl Block {
    pub fn new(loc: SourceLoc) -> Self {
        Block {
            nodes: Vec::new(),
            loc,
        }
    }

    pub fn with_nodes(nodes: Vec<Node>, loc: SourceLoc) -> Self {
        Block { nodes, loc }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Block(Block),
    NamedBlock(NamedBlock),
    Tag(Tag),
    /// A tag whose name is an expression (`#{expr}`); `Tag::name` holds
    /// the expression source.
    InterpolatedTag(Tag),
    Text(Text),
    Code(Code),
    Conditional(Conditional),
    While(While),
    Each(Each),
    EachOf(EachOf),
    Case(Case),
    When(When),
    Mixin(Mixin),
    /// `block` inside a mixin body: where the caller's block goes.
    MixinBlock(SourceLoc),
    Doctype(Doctype),
    Comment(Comment),
    BlockComment(BlockComment),
    Filter(Filter),
    Extends(Extends),
    Include(Include),
    RawInclude(RawInclude),
    /// `yield` inside an included file: where the includer's block goes.
    YieldBlock(SourceLoc),
}

impl Node {
    /// The node kind as named in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Block(_) => "Block",
            Node::NamedBlock(_) => "NamedBlock",
            Node::Tag(_) => "Tag",
            Node::InterpolatedTag(_) => "InterpolatedTag",
            Node::Text(_) => "Text",
            Node::Code(_) => "Code",
            Node::Conditional(_) => "Conditional",
            Node::While(_) => "While",
            Node::Each(_) => "Each",
            Node::EachOf(_) => "EachOf",
            Node::Case(_) => "Case",
            Node::When(_) => "When",
            Node::Mixin(_) => "Mixin",
            Node::MixinBlock(_) => "MixinBlock",
            Node::Doctype(_) => "Doctype",
            Node::Comment(_) => "Comment",
            Node::BlockComment(_) => "BlockComment",
            Node::Filter(_) => "Filter",
            Node::Extends(_) => "Extends",
            Node::Include(_) => "Include",
            Node::RawInclude(_) => "RawInclude",
            Node::YieldBlock(_) => "YieldBlock",
        }
    }

    pub fn loc(&self) -> &SourceLoc {
        match self {
            Node::Block(n) => &n.loc,
            Node::NamedBlock(n) => &n.loc,
            Node::Tag(n) | Node::InterpolatedTag(n) => &n.loc,
            Node::Text(n) => &n.loc,
            Node::Code(n) => &n.loc,
            Node::Conditional(n) => &n.loc,
            Node::While(n) => &n.loc,
            Node::Each(n) => &n.loc,
            Node::EachOf(n) => &n.loc,
            Node::Case(n) => &n.loc,
            Node::When(n) => &n.loc,
            Node::Mixin(n) => &n.loc,
            Node::MixinBlock(loc) | Node::YieldBlock(loc) => loc,
            Node::Doctype(n) => &n.loc,
            Node::Comment(n) => &n.loc,
            Node::BlockComment(n) => &n.loc,
            Node::Filter(n) => &n.loc,
            Node::Extends(n) => &n.loc,
            Node::Include(n) => &n.loc,
            Node::RawInclude(n) => &n.loc,
        }
    }

    /// Whether debug instrumentation should record this node's line.
    ///
    /// `else` code and `when` branches sit between a statement and its
    /// continuation, where an extra statement would break the output.
    pub fn wants_debug_line(&self) -> bool {
        match self {
            Node::Block(_) => false,
            Node::Code(code) => code.debug,
            Node::When(when) => when.debug,
            _ => true,
        }
    }
}

/// Identity of a named block, assigned by the linker.
///
/// Copies of one declaration made while applying overrides share an id, so
/// a later override reaches every copy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedBlock {
    pub name: String,
    pub mode: BlockMode,
    pub block: Block,
    pub id: BlockId,
    pub loc: SourceLoc,
}

/// Attribute value: either bare (`checked`) or an expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrValue {
    True,
    Expr(String),
}

impl AttrValue {
    /// The value as expression source; a bare attribute is `true`.
    pub fn as_source(&self) -> &str {
        match self {
            AttrValue::True => "true",
            AttrValue::Expr(src) => src,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub val: AttrValue,
    pub must_escape: bool,
    pub loc: SourceLoc,
}

/// `&attributes(expr)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeBlock {
    pub val: String,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub self_closing: bool,
    pub attrs: Vec<Attribute>,
    pub attribute_blocks: Vec<AttributeBlock>,
    pub block: Block,
    pub is_inline: bool,
    /// Body came from `tag.` pipeless text.
    pub text_only: bool,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    pub val: String,
    pub is_html: bool,
    pub loc: SourceLoc,
}

impl Text {
    pub fn new(val: impl Into<String>, loc: SourceLoc) -> Self {
        Text {
            val: val.into(),
            is_html: false,
            loc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Code {
    pub val: String,
    pub buffer: bool,
    pub must_escape: bool,
    pub is_inline: bool,
    pub block: Option<Block>,
    pub debug: bool,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conditional {
    pub test: String,
    pub consequent: Block,
    pub alternate: Option<Box<Alternate>>,
    pub loc: SourceLoc,
}

/// The `else` side of a conditional.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Alternate {
    ElseIf(Conditional),
    Else(Block),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct While {
    pub test: String,
    pub block: Block,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Each {
    pub obj: String,
    pub val: String,
    pub key: Option<String>,
    pub block: Block,
    /// Rendered when the collection is empty.
    pub alternate: Option<Block>,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EachOf {
    pub obj: String,
    /// Identifier or `[key, value]` destructuring pattern.
    pub val: String,
    pub block: Block,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Case {
    pub expr: String,
    pub block: Block,
    pub loc: SourceLoc,
}

/// A `when` branch; the `default` branch has `expr == "default"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct When {
    pub expr: String,
    pub block: Option<Block>,
    pub debug: bool,
    pub loc: SourceLoc,
}

impl When {
    pub fn is_default(&self) -> bool {
        self.expr == "default"
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mixin {
    /// Mixin name, or `#{expr}` for a dynamically named call.
    pub name: String,
    pub args: Option<String>,
    pub block: Option<Block>,
    pub call: bool,
    pub attrs: Vec<Attribute>,
    pub attribute_blocks: Vec<AttributeBlock>,
    pub loc: SourceLoc,
}

impl Mixin {
    /// Calls written `+#{expr}` pick the mixin at render time.
    pub fn is_dynamic(&self) -> bool {
        self.name.starts_with("#{")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Doctype {
    /// Empty for a bare `doctype`.
    pub val: String,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub val: String,
    pub buffer: bool,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockComment {
    pub val: String,
    pub buffer: bool,
    pub block: Block,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub block: Block,
    pub loc: SourceLoc,
}

/// A filter applied to a raw include (`include:name file`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncludeFilter {
    pub name: String,
    pub attrs: Vec<Attribute>,
    pub loc: SourceLoc,
}

/// A path written in `extends`/`include`, filled in by the load pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileReference {
    pub path: String,
    pub loc: SourceLoc,
    /// Resolved path.
    pub full_path: Option<String>,
    /// Raw file contents.
    pub contents: Option<String>,
    /// Parsed contents, for templates (not raw includes).
    pub ast: Option<Box<Block>>,
}

impl FileReference {
    pub fn new(path: impl Into<String>, loc: SourceLoc) -> Self {
        FileReference {
            path: path.into(),
            loc,
            full_path: None,
            contents: None,
            ast: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extends {
    pub file: FileReference,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Include {
    pub file: FileReference,
    /// Content yielded into the included file.
    pub block: Block,
    pub loc: SourceLoc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawInclude {
    pub file: FileReference,
    pub filters: Vec<IncludeFilter>,
    pub loc: SourceLoc,
}
