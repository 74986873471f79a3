//! Pug IR - shared data model of the template compiler.
//!
//! - Source locations ([`Position`], [`Loc`], [`SourceLoc`])
//! - The lexer's output ([`Token`], [`TokenKind`])
//! - The parser's output, mutated in place by the linker and read by the
//!   code generator ([`Block`], [`Node`] and the per-kind node structs)
//! - Mutable walk helpers over that tree ([`visit`])
//!
//! Every pass owns the structure it produces: tokens are consumed by value
//! by the parser, and a linked [`Block`] is handed to the code generator as
//! a shared borrow.

pub mod ast;
mod location;
mod token;
pub mod visit;

pub use ast::{
    Alternate, AttrValue, Attribute, AttributeBlock, Block, BlockComment, BlockId, Case, Code,
    Comment, Conditional, Doctype, Each, EachOf, Extends, FileReference, Filter, Include,
    IncludeFilter, Mixin, NamedBlock, Node, RawInclude, Tag, Text, When, While,
};
pub use location::{FileName, Loc, Position, SourceLoc};
pub use token::{BlockMode, Token, TokenKind};
