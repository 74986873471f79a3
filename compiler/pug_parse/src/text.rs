//! Text, raw HTML, comments, filters and code blocks.

use pug_diagnostic::{ErrorCode, PugResult};
use pug_ir::{
    Block, BlockComment, Code, Comment, Doctype, Filter, IncludeFilter, Loc, Node, Text,
    TokenKind,
};

use crate::Parser;

impl Parser<'_> {
    /// Inline code from `#{}`/`!{}` interpolation.
    fn interpolated_code(&self, val: String, must_escape: bool, buffer: bool, loc: &Loc) -> Node {
        Node::Code(Code {
            val,
            buffer,
            must_escape,
            is_inline: true,
            block: None,
            debug: true,
            loc: self.loc(loc),
        })
    }

    /// A run of text, interpolated code and `#[...]` tags.
    ///
    /// With `block`, newlines between text lines are kept as `"\n"` text.
    /// A single node is returned as itself, several as a `Block`.
    pub(crate) fn parse_text(&mut self, block: bool) -> PugResult<Node> {
        let start = self.peek().loc.clone();
        let mut tags = Vec::new();
        loop {
            match self.peek().kind {
                TokenKind::Text(_) | TokenKind::InterpolatedCode { .. } => {
                    let tok = self.advance();
                    match tok.kind {
                        TokenKind::Text(val) => {
                            tags.push(Node::Text(Text::new(val, self.loc(&tok.loc))));
                        }
                        TokenKind::InterpolatedCode {
                            val,
                            must_escape,
                            buffer,
                        } => tags.push(self.interpolated_code(val, must_escape, buffer, &tok.loc)),
                        other => return Err(self.expected("text", &other, &tok.loc)),
                    }
                }
                TokenKind::Newline if block => {
                    let tok = self.advance();
                    if matches!(
                        self.peek().kind,
                        TokenKind::Text(_) | TokenKind::InterpolatedCode { .. }
                    ) {
                        tags.push(Node::Text(Text::new("\n", self.loc(&tok.loc))));
                    }
                }
                TokenKind::StartPugInterpolation => {
                    self.advance();
                    tags.push(self.parse_expr()?);
                    self.expect("end-pug-interpolation")?;
                }
                TokenKind::Newline => break,
                _ => match self.extend(|ext, parser| ext.text(parser))? {
                    Some(node) => tags.push(node),
                    None => break,
                },
            }
        }
        if tags.len() == 1 {
            if let Some(node) = tags.pop() {
                return Ok(node);
            }
        }
        Ok(Node::Block(Block::with_nodes(tags, self.empty_block(&start).loc)))
    }

    /// Consecutive `<...>` lines merge into one HTML text node; indented
    /// children join the run.
    pub(crate) fn parse_text_html(&mut self) -> PugResult<Vec<Node>> {
        let mut nodes: Vec<Node> = Vec::new();
        // Index of the HTML text node later lines are appended to.
        let mut current: Option<usize> = None;
        loop {
            match self.peek().kind {
                TokenKind::TextHtml(_) => {
                    let tok = self.advance();
                    let TokenKind::TextHtml(val) = tok.kind else {
                        break;
                    };
                    let text = Text {
                        val,
                        is_html: true,
                        loc: self.loc(&tok.loc),
                    };
                    append_html(&mut nodes, &mut current, text);
                }
                TokenKind::Indent(_) => {
                    let block = self.block()?;
                    for node in block.nodes {
                        match node {
                            Node::Text(text) if text.is_html => {
                                append_html(&mut nodes, &mut current, text);
                            }
                            node => {
                                current = None;
                                nodes.push(node);
                            }
                        }
                    }
                }
                TokenKind::Code { .. } => {
                    current = None;
                    let code = self.parse_code(true)?;
                    nodes.push(code);
                }
                TokenKind::Newline => {
                    self.advance();
                }
                _ => break,
            }
        }
        Ok(nodes)
    }

    /// `start-pipeless-text (text | newline | interpolation)* end-pipeless-text`
    pub fn parse_text_block(&mut self) -> PugResult<Option<Block>> {
        let Some(open) = self.accept("start-pipeless-text") else {
            return Ok(None);
        };
        let mut block = self.empty_block(&open.loc);
        while !self.check("end-pipeless-text") {
            match self.peek().kind {
                TokenKind::Text(_) | TokenKind::Newline | TokenKind::InterpolatedCode { .. } => {
                    let tok = self.advance();
                    let node = match tok.kind {
                        TokenKind::Text(val) => Node::Text(Text::new(val, self.loc(&tok.loc))),
                        TokenKind::Newline => Node::Text(Text::new("\n", self.loc(&tok.loc))),
                        TokenKind::InterpolatedCode {
                            val,
                            must_escape,
                            buffer,
                        } => self.interpolated_code(val, must_escape, buffer, &tok.loc),
                        other => return Err(self.expected("text", &other, &tok.loc)),
                    };
                    block.nodes.push(node);
                }
                TokenKind::StartPugInterpolation => {
                    self.advance();
                    let node = self.parse_expr()?;
                    block.nodes.push(node);
                    self.expect("end-pug-interpolation")?;
                }
                _ => match self.extend(|ext, parser| ext.text(parser))? {
                    Some(node) => block.nodes.push(node),
                    None => {
                        let tok = self.peek();
                        return Err(self.error(
                            ErrorCode::InvalidToken,
                            format!("Unexpected token type: {}", tok.kind.name()),
                            &tok.loc,
                        ));
                    }
                },
            }
        }
        self.advance();
        Ok(Some(block))
    }

    /// A bare `.` followed by a text block.
    pub(crate) fn parse_dot(&mut self) -> PugResult<Node> {
        let dot = self.expect("dot")?;
        let block = match self.parse_text_block()? {
            Some(block) => block,
            None => self.empty_block(&dot.loc),
        };
        Ok(Node::Block(block))
    }

    /// `-` followed by an indented block of code, kept as one statement.
    pub(crate) fn parse_block_code(&mut self) -> PugResult<Node> {
        let tok = self.expect("blockcode")?;
        let mut text = String::new();
        if self.accept("start-pipeless-text").is_some() {
            while !self.check("end-pipeless-text") {
                match self.peek().kind {
                    TokenKind::Text(_) => {
                        if let TokenKind::Text(val) = self.advance().kind {
                            text.push_str(&val);
                        }
                    }
                    TokenKind::Newline => {
                        self.advance();
                        text.push('\n');
                    }
                    _ => match self.extend(|ext, parser| ext.block_code(parser))? {
                        Some(code) => text.push_str(&code),
                        None => {
                            let tok = self.peek();
                            return Err(self.error(
                                ErrorCode::InvalidToken,
                                format!("Unexpected token type: {}", tok.kind.name()),
                                &tok.loc,
                            ));
                        }
                    },
                }
            }
            self.advance();
        }
        Ok(Node::Code(Code {
            val: text,
            buffer: false,
            must_escape: false,
            is_inline: false,
            block: None,
            debug: true,
            loc: self.loc(&tok.loc),
        }))
    }

    /// `//` comment; with a text block it becomes a block comment.
    pub(crate) fn parse_comment(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let (val, buffer) = match tok.kind {
            TokenKind::Comment { val, buffer } => (val, buffer),
            other => return Err(self.expected("comment", &other, &tok.loc)),
        };
        let loc = self.loc(&tok.loc);
        Ok(match self.parse_text_block()? {
            Some(block) => Node::BlockComment(BlockComment {
                val,
                buffer,
                block,
                loc,
            }),
            None => Node::Comment(Comment { val, buffer, loc }),
        })
    }

    pub(crate) fn parse_doctype(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let val = match tok.kind {
            TokenKind::Doctype(val) => val,
            other => return Err(self.expected("doctype", &other, &tok.loc)),
        };
        Ok(Node::Doctype(Doctype {
            val,
            loc: self.loc(&tok.loc),
        }))
    }

    /// `:name(attrs)?` followed by inline text, a nested filter or a text
    /// block.
    pub(crate) fn parse_filter(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let name = match tok.kind {
            TokenKind::Filter(name) => name,
            other => return Err(self.expected("filter", &other, &tok.loc)),
        };
        let attrs = if self.check("start-attributes") {
            self.attrs(None)?
        } else {
            Vec::new()
        };

        let block = match self.peek().kind {
            TokenKind::Text(_) => {
                let text = self.advance();
                let val = match text.kind {
                    TokenKind::Text(val) => val,
                    other => return Err(self.expected("text", &other, &text.loc)),
                };
                Block::with_nodes(
                    vec![Node::Text(Text::new(val, self.loc(&text.loc)))],
                    self.empty_block(&text.loc).loc,
                )
            }
            TokenKind::Filter(_) => {
                let inner = self.parse_filter()?;
                Block::with_nodes(vec![inner], self.empty_block(&tok.loc).loc)
            }
            _ => match self.parse_text_block()? {
                Some(block) => block,
                None => self.empty_block(&tok.loc),
            },
        };

        Ok(Node::Filter(Filter {
            name,
            attrs,
            block,
            loc: self.loc(&tok.loc),
        }))
    }

    /// A filter applied to a raw include.
    pub(crate) fn parse_include_filter(&mut self) -> PugResult<IncludeFilter> {
        let tok = self.advance();
        let name = match tok.kind {
            TokenKind::Filter(name) => name,
            other => return Err(self.expected("filter", &other, &tok.loc)),
        };
        let attrs = if self.check("start-attributes") {
            self.attrs(None)?
        } else {
            Vec::new()
        };
        Ok(IncludeFilter {
            name,
            attrs,
            loc: self.loc(&tok.loc),
        })
    }
}

fn append_html(nodes: &mut Vec<Node>, current: &mut Option<usize>, text: Text) {
    if let Some(Node::Text(open)) = current.and_then(|i| nodes.get_mut(i)) {
        open.val.push('\n');
        open.val.push_str(&text.val);
        return;
    }
    *current = Some(nodes.len());
    nodes.push(Node::Text(text));
}
