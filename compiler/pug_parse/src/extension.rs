//! Parser extension points.

use pug_diagnostic::PugResult;
use pug_ir::Node;

use crate::{Parser, TagContent};

/// Claims tokens the built-in grammar does not handle.
///
/// Every hook sees the unclaimed token at the front of the stream
/// (`parser.peek()`). Returning `Some` (or `true`) claims it, and the hook
/// must then have consumed at least that token. Returning `None` passes it
/// on to the next extension and finally to the `INVALID_TOKEN` error.
pub trait ParserExtension {
    /// A token where a statement is expected.
    fn expression(&self, _parser: &mut Parser<'_>) -> PugResult<Option<Node>> {
        Ok(None)
    }

    /// A token inside inline text or a pipeless text block.
    fn text(&self, _parser: &mut Parser<'_>) -> PugResult<Option<Node>> {
        Ok(None)
    }

    /// A token among the branches of a `case`.
    fn case_branch(&self, _parser: &mut Parser<'_>) -> PugResult<Option<Node>> {
        Ok(None)
    }

    /// A token inside a `-` code block; the result is appended to the code.
    fn block_code(&self, _parser: &mut Parser<'_>) -> PugResult<Option<String>> {
        Ok(None)
    }

    /// A token after a tag name, among its attributes or where its inline
    /// content would start.
    fn tag(&self, _parser: &mut Parser<'_>, _tag: &mut TagContent) -> PugResult<bool> {
        Ok(false)
    }
}
