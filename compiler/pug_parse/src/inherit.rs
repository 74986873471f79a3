//! Template reuse: `extends`, `include`, named blocks and mixins.

use pug_diagnostic::{ErrorCode, PugResult};
use pug_ir::{
    BlockId, Extends, FileReference, Include, Mixin, NamedBlock, Node, RawInclude, TokenKind,
};
use tracing::warn;

use crate::Parser;

impl Parser<'_> {
    /// The `path` token after `extends` or `include`.
    fn parse_path(&mut self) -> PugResult<FileReference> {
        let tok = self.expect("path")?;
        let path = match tok.kind {
            TokenKind::Path(path) => path,
            other => return Err(self.expected("path", &other, &tok.loc)),
        };
        Ok(FileReference::new(path.trim(), self.loc(&tok.loc)))
    }

    pub(crate) fn parse_extends(&mut self) -> PugResult<Node> {
        let tok = self.expect("extends")?;
        let file = self.parse_path()?;
        Ok(Node::Extends(Extends {
            file,
            loc: self.loc(&tok.loc),
        }))
    }

    /// `block name`, `block append name`, `prepend name`, ...
    pub(crate) fn parse_named_block(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let (name, mode) = match tok.kind {
            TokenKind::Block { name, mode } => (name, mode),
            other => return Err(self.expected("block", &other, &tok.loc)),
        };
        let block = self.optional_block(&tok.loc)?;
        Ok(Node::NamedBlock(NamedBlock {
            name: name.trim().to_string(),
            mode,
            block,
            id: BlockId::default(),
            loc: self.loc(&tok.loc),
        }))
    }

    pub(crate) fn parse_mixin_block(&mut self) -> PugResult<Node> {
        let tok = self.expect("mixin-block")?;
        if self.in_mixin == 0 {
            return Err(self.error(
                ErrorCode::BlockOutsideMixin,
                "Anonymous blocks are not allowed unless they are part of a mixin.",
                &tok.loc,
            ));
        }
        Ok(Node::MixinBlock(self.loc(&tok.loc)))
    }

    pub(crate) fn parse_yield(&mut self) -> PugResult<Node> {
        let tok = self.expect("yield")?;
        Ok(Node::YieldBlock(self.loc(&tok.loc)))
    }

    /// `include(:filter)* path`, with an optional block for templates.
    ///
    /// A `.pug` path without filters includes a template; anything else is
    /// included as raw text.
    pub(crate) fn parse_include(&mut self) -> PugResult<Node> {
        let tok = self.expect("include")?;
        let mut filters = Vec::new();
        while self.check("filter") {
            filters.push(self.parse_include_filter()?);
        }
        let file = self.parse_path()?;
        let loc = self.loc(&tok.loc);

        let is_jade = file.path.ends_with(".jade");
        if (is_jade || file.path.ends_with(".pug")) && filters.is_empty() {
            let block = self.optional_block(&tok.loc)?;
            if is_jade {
                warn!(
                    filename = ?self.filename,
                    line = tok.loc.start.line,
                    "The .jade extension is deprecated, use .pug for \"{}\".",
                    file.path
                );
            }
            return Ok(Node::Include(Include { file, block, loc }));
        }

        if self.check("indent") {
            let next = self.peek();
            return Err(self.error(
                ErrorCode::RawIncludeBlock,
                "Raw inclusion cannot contain a block",
                &next.loc,
            ));
        }
        Ok(Node::RawInclude(RawInclude { file, filters, loc }))
    }

    /// `mixin name(args)` declaration; the body is required.
    pub(crate) fn parse_mixin(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let (name, args) = match tok.kind {
            TokenKind::Mixin { name, args } => (name, args),
            other => return Err(self.expected("mixin", &other, &tok.loc)),
        };
        if !self.check("indent") {
            return Err(self.error(
                ErrorCode::MixinWithoutBody,
                format!("Mixin {name} declared without body"),
                &tok.loc,
            ));
        }
        self.in_mixin += 1;
        let body = self.block();
        self.in_mixin -= 1;
        Ok(Node::Mixin(Mixin {
            name,
            args,
            block: Some(body?),
            call: false,
            attrs: Vec::new(),
            attribute_blocks: Vec::new(),
            loc: self.loc(&tok.loc),
        }))
    }
}
