//! Recursive descent parser for Pug templates.
//!
//! Consumes the lexer's token stream and builds one [`Block`]-rooted tree
//! per file. Each routine expects its anchor token, builds a node at that
//! token's location, then parses any indented block or `:` expansion that
//! follows.
//!
//! One token of lookahead suffices except for the `#id`/`.class`
//! shortcut, which pushes an implicit `div` tag token back onto the stream
//! and dispatches again.
//!
//! Tokens no built-in rule handles can be claimed by a
//! [`ParserExtension`] before the parser reports `INVALID_TOKEN`.

mod control;
mod cursor;
mod extension;
mod inherit;
mod tag;
mod text;

use std::sync::Arc;

use pug_diagnostic::{ErrorCode, PugError, PugResult};
use pug_ir::{Block, FileName, Loc, Node, SourceLoc, Token, TokenKind};
use pug_stack::ensure_sufficient_stack;
use tracing::debug;

pub use cursor::TokenStream;
pub use extension::ParserExtension;
pub use tag::TagContent;

/// Options for [`parse`].
#[derive(Clone, Default)]
pub struct ParseOptions {
    pub filename: Option<FileName>,
    /// Template source, attached to errors for the excerpt.
    pub src: Option<Arc<str>>,
    /// Tried in order; the first to claim a token wins.
    pub extensions: Vec<Arc<dyn ParserExtension>>,
}

/// Parse a token stream into the file's root block.
pub fn parse(tokens: Vec<Token>, options: &ParseOptions) -> PugResult<Block> {
    let count = tokens.len();
    let block = Parser::new(tokens, options).parse()?;
    debug!(tokens = count, nodes = block.nodes.len(), "parsed");
    Ok(block)
}

/// Parser state.
pub struct Parser<'a> {
    tokens: TokenStream,
    filename: Option<FileName>,
    src: Option<Arc<str>>,
    /// Depth of mixin declarations being parsed; `block` is only legal
    /// inside one.
    in_mixin: u32,
    extensions: &'a [Arc<dyn ParserExtension>],
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, options: &'a ParseOptions) -> Self {
        Parser {
            tokens: TokenStream::new(tokens),
            filename: options.filename.clone(),
            src: options.src.clone(),
            in_mixin: 0,
            extensions: &options.extensions,
        }
    }

    /// Parse the whole stream.
    pub fn parse(mut self) -> PugResult<Block> {
        let mut block = Block::new(SourceLoc::new(0, 0, self.filename.clone()));
        while self.peek().kind != TokenKind::Eos {
            self.block_item(&mut block)?;
        }
        Ok(block)
    }

    pub fn filename(&self) -> Option<&FileName> {
        self.filename.as_ref()
    }

    // Cursor delegation

    #[inline]
    pub fn peek(&self) -> &Token {
        self.tokens.peek()
    }

    #[inline]
    pub fn lookahead(&self, n: usize) -> &Token {
        self.tokens.lookahead(n)
    }

    #[inline]
    pub fn advance(&mut self) -> Token {
        self.tokens.advance()
    }

    #[inline]
    pub fn defer(&mut self, token: Token) {
        self.tokens.defer(token);
    }

    /// Whether the next token is of the kind named `name`.
    #[inline]
    pub fn check(&self, name: &str) -> bool {
        self.peek().kind.name() == name
    }

    /// Consume the next token, which must be of the kind named `name`.
    pub fn expect(&mut self, name: &str) -> PugResult<Token> {
        if self.check(name) {
            Ok(self.advance())
        } else {
            let found = self.peek();
            Err(self.expected(name, &found.kind, &found.loc))
        }
    }

    /// Consume the next token if it is of the kind named `name`.
    pub fn accept(&mut self, name: &str) -> Option<Token> {
        self.check(name).then(|| self.advance())
    }

    // Errors

    #[cold]
    pub fn error(&self, code: ErrorCode, message: impl Into<String>, loc: &Loc) -> PugError {
        let err = PugError::at_token(code, message, loc).with_filename(self.filename.clone());
        match &self.src {
            Some(src) => err.with_src(Arc::clone(src)),
            None => err,
        }
    }

    #[cold]
    fn expected(&self, name: &str, found: &TokenKind, loc: &Loc) -> PugError {
        self.error(
            ErrorCode::InvalidToken,
            format!("expected \"{name}\", but got \"{}\"", found.name()),
            loc,
        )
    }

    /// Node location for a token.
    pub fn loc(&self, loc: &Loc) -> SourceLoc {
        SourceLoc::new(loc.start.line, loc.start.column, self.filename.clone())
    }

    /// An empty block at a token's line.
    fn empty_block(&self, loc: &Loc) -> Block {
        Block::new(SourceLoc::new(loc.start.line, 0, self.filename.clone()))
    }

    /// Offer the next token to each extension in turn.
    fn extend<T>(
        &mut self,
        mut hook: impl FnMut(&dyn ParserExtension, &mut Self) -> PugResult<Option<T>>,
    ) -> PugResult<Option<T>> {
        let extensions = self.extensions;
        for extension in extensions {
            if let Some(out) = hook(extension.as_ref(), self)? {
                return Ok(Some(out));
            }
        }
        Ok(None)
    }

    /// One statement in a block body. A parsed `Block` is flattened into
    /// its parent.
    fn block_item(&mut self, block: &mut Block) -> PugResult<()> {
        match self.peek().kind {
            TokenKind::Newline => {
                self.advance();
            }
            TokenKind::TextHtml(_) => {
                let nodes = self.parse_text_html()?;
                block.nodes.extend(nodes);
            }
            _ => match self.parse_expr()? {
                Node::Block(inner) => block.nodes.extend(inner.nodes),
                node => block.nodes.push(node),
            },
        }
        Ok(())
    }

    /// `indent expr* outdent`
    pub fn block(&mut self) -> PugResult<Block> {
        let tok = self.expect("indent")?;
        let mut block = self.empty_block(&tok.loc);
        while !self.check("outdent") {
            self.block_item(&mut block)?;
        }
        self.expect("outdent")?;
        Ok(block)
    }

    /// `':' expr` or an indented block.
    fn parse_block_expansion(&mut self) -> PugResult<Block> {
        match self.accept(":") {
            Some(colon) => Ok(match self.parse_expr()? {
                Node::Block(block) => block,
                node => Block::with_nodes(vec![node], self.loc(&colon.loc)),
            }),
            None => self.block(),
        }
    }

    /// Parse one construct, dispatching on the next token.
    pub fn parse_expr(&mut self) -> PugResult<Node> {
        ensure_sufficient_stack(|| self.parse_expr_inner())
    }

    fn parse_expr_inner(&mut self) -> PugResult<Node> {
        match &self.peek().kind {
            TokenKind::Tag(_) => self.parse_tag(),
            TokenKind::Mixin { .. } => self.parse_mixin(),
            TokenKind::Block { .. } => self.parse_named_block(),
            TokenKind::MixinBlock => self.parse_mixin_block(),
            TokenKind::Case(_) => self.parse_case(),
            TokenKind::Extends => self.parse_extends(),
            TokenKind::Include => self.parse_include(),
            TokenKind::Doctype(_) => self.parse_doctype(),
            TokenKind::Filter(_) => self.parse_filter(),
            TokenKind::Comment { .. } => self.parse_comment(),
            TokenKind::Text(_)
            | TokenKind::InterpolatedCode { .. }
            | TokenKind::StartPugInterpolation => self.parse_text(true),
            TokenKind::TextHtml(_) => {
                let loc = self.peek().loc.clone();
                let nodes = self.parse_text_html()?;
                Ok(Node::Block(Block::with_nodes(
                    nodes,
                    SourceLoc::new(loc.start.line, 0, self.filename.clone()),
                )))
            }
            TokenKind::Dot => self.parse_dot(),
            TokenKind::Each { .. } => self.parse_each(),
            TokenKind::EachOf { .. } => self.parse_each_of(),
            TokenKind::Code { .. } => self.parse_code(false),
            TokenKind::BlockCode => self.parse_block_code(),
            TokenKind::If(_) => self.parse_conditional(),
            TokenKind::While(_) => self.parse_while(),
            TokenKind::Call { .. } => self.parse_call(),
            TokenKind::Interpolation(_) => self.parse_interpolation(),
            TokenKind::Yield => self.parse_yield(),
            TokenKind::Id(_) | TokenKind::Class(_) => {
                let loc = self.peek().loc.clone();
                self.defer(Token::new(TokenKind::Tag("div".to_string()), loc));
                self.parse_expr()
            }
            _ => {
                if let Some(node) = self.extend(|ext, parser| ext.expression(parser))? {
                    return Ok(node);
                }
                let tok = self.peek();
                Err(self.error(
                    ErrorCode::InvalidToken,
                    format!("unexpected token \"{}\"", tok.kind.name()),
                    &tok.loc,
                ))
            }
        }
    }
}
