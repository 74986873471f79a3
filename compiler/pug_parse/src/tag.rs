//! Tags, interpolated tags, mixin calls and their attributes.

use pug_diagnostic::{ErrorCode, PugResult};
use pug_ir::{
    AttrValue, Attribute, AttributeBlock, Block, Loc, Mixin, Node, Tag, Token, TokenKind,
};
use tracing::warn;

use crate::Parser;

/// Phrasing elements; rendered without pretty-printing line breaks.
const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "b", "br", "code", "em", "font", "i", "img", "ins", "kbd", "map",
    "samp", "small", "span", "strong", "sub", "sup",
];

/// What follows a tag name: attributes, then inline and block content.
///
/// Shared by tags, interpolated tags and mixin calls.
#[derive(Clone, Debug)]
pub struct TagContent {
    pub attrs: Vec<Attribute>,
    pub attribute_blocks: Vec<AttributeBlock>,
    pub block: Block,
    pub self_closing: bool,
    pub text_only: bool,
}

impl Parser<'_> {
    /// `tag (attrs | class | id)* (text | code | ':')? newline* block?`
    pub(crate) fn parse_tag(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let name = match tok.kind {
            TokenKind::Tag(name) => name,
            other => return Err(self.expected("tag", &other, &tok.loc)),
        };
        let content = self.tag_content(&tok.loc, true)?;
        Ok(Node::Tag(Tag {
            is_inline: INLINE_TAGS.contains(&name.as_str()),
            name,
            self_closing: content.self_closing,
            attrs: content.attrs,
            attribute_blocks: content.attribute_blocks,
            block: content.block,
            text_only: content.text_only,
            loc: self.loc(&tok.loc),
        }))
    }

    /// `#{expr}` as a tag name.
    pub(crate) fn parse_interpolation(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let expr = match tok.kind {
            TokenKind::Interpolation(expr) => expr,
            other => return Err(self.expected("interpolation", &other, &tok.loc)),
        };
        let content = self.tag_content(&tok.loc, true)?;
        Ok(Node::InterpolatedTag(Tag {
            name: expr,
            self_closing: content.self_closing,
            attrs: content.attrs,
            attribute_blocks: content.attribute_blocks,
            block: content.block,
            is_inline: false,
            text_only: content.text_only,
            loc: self.loc(&tok.loc),
        }))
    }

    /// `+name(args)`, with the same attributes and content as a tag.
    pub(crate) fn parse_call(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let (name, args) = match tok.kind {
            TokenKind::Call { name, args } => (name, args),
            other => return Err(self.expected("call", &other, &tok.loc)),
        };
        let content = self.tag_content(&tok.loc, false)?;
        Ok(Node::Mixin(Mixin {
            name,
            args,
            block: (!content.block.is_empty()).then_some(content.block),
            call: true,
            attrs: content.attrs,
            attribute_blocks: content.attribute_blocks,
            loc: self.loc(&tok.loc),
        }))
    }

    fn tag_content(&mut self, loc: &Loc, self_closing_allowed: bool) -> PugResult<TagContent> {
        let mut content = TagContent {
            attrs: Vec::new(),
            attribute_blocks: Vec::new(),
            block: self.empty_block(loc),
            self_closing: false,
            text_only: false,
        };
        let mut seen_attrs = false;
        let mut attribute_names = Vec::new();

        // (attrs | class | id)*
        loop {
            match self.peek().kind {
                TokenKind::Id(_) | TokenKind::Class(_) => {
                    let tok = self.advance();
                    let (name, val) = match tok.kind {
                        TokenKind::Id(val) => ("id", val),
                        TokenKind::Class(val) => ("class", val),
                        other => return Err(self.expected("id", &other, &tok.loc)),
                    };
                    if name == "id" {
                        if attribute_names.iter().any(|seen| seen == "id") {
                            return Err(self.error(
                                ErrorCode::DuplicateId,
                                "Duplicate attribute \"id\" is not allowed.",
                                &tok.loc,
                            ));
                        }
                        attribute_names.push("id".to_string());
                    }
                    content.attrs.push(Attribute {
                        name: name.to_string(),
                        val: AttrValue::Expr(format!("'{val}'")),
                        must_escape: false,
                        loc: self.loc(&tok.loc),
                    });
                }
                TokenKind::StartAttributes => {
                    if seen_attrs {
                        warn!(
                            filename = ?self.filename,
                            line = self.peek().loc.start.line,
                            "You should not have pug tags with multiple attributes."
                        );
                    }
                    seen_attrs = true;
                    let attrs = self.attrs(Some(&mut attribute_names))?;
                    content.attrs.extend(attrs);
                }
                TokenKind::AttributeBlock(_) => {
                    let tok = self.advance();
                    let val = match tok.kind {
                        TokenKind::AttributeBlock(val) => val,
                        other => return Err(self.expected("&attributes", &other, &tok.loc)),
                    };
                    content.attribute_blocks.push(AttributeBlock {
                        val,
                        loc: self.loc(&tok.loc),
                    });
                }
                _ => {
                    if !self.claim_tag_token(&mut content)? {
                        break;
                    }
                }
            }
        }

        if self.accept("dot").is_some() {
            content.text_only = true;
        }

        // (text | code | ':')?
        match self.peek().kind {
            TokenKind::Text(_) | TokenKind::InterpolatedCode { .. } => match self.parse_text(false)? {
                Node::Block(text) => content.block.nodes.extend(text.nodes),
                node => content.block.nodes.push(node),
            },
            TokenKind::Code { .. } => {
                let code = self.parse_code(true)?;
                content.block.nodes.push(code);
            }
            TokenKind::Colon => {
                self.advance();
                content.block = match self.parse_expr()? {
                    Node::Block(block) => block,
                    node => Block::with_nodes(vec![node], self.empty_block(loc).loc),
                };
            }
            TokenKind::Newline
            | TokenKind::Indent(_)
            | TokenKind::Outdent
            | TokenKind::Eos
            | TokenKind::StartPipelessText
            | TokenKind::EndPugInterpolation => {}
            TokenKind::Slash if self_closing_allowed => {
                self.advance();
                content.self_closing = true;
            }
            _ => {
                if !self.claim_tag_token(&mut content)? {
                    let slash = if self_closing_allowed { ", `slash`" } else { "" };
                    let tok = self.peek();
                    return Err(self.error(
                        ErrorCode::InvalidToken,
                        format!(
                            "Unexpected token `{}` expected `text`, `interpolated-code`, `code`, `:`{slash}, `newline` or `eos`",
                            tok.kind.name()
                        ),
                        &tok.loc,
                    ));
                }
            }
        }

        // newline*
        while self.accept("newline").is_some() {}

        // block?
        if content.text_only {
            content.block = match self.parse_text_block()? {
                Some(block) => block,
                None => self.empty_block(loc),
            };
        } else if self.check("indent") {
            let block = self.block()?;
            content.block.nodes.extend(block.nodes);
        }

        Ok(content)
    }

    fn claim_tag_token(&mut self, content: &mut TagContent) -> PugResult<bool> {
        let claimed = self.extend(|ext, parser| Ok(ext.tag(parser, content)?.then_some(())))?;
        Ok(claimed.is_some())
    }

    /// `start-attributes attribute* end-attributes`
    ///
    /// `names` collects attribute names seen on the element so far, for
    /// the duplicate check; `class` may repeat.
    pub(crate) fn attrs(&mut self, mut names: Option<&mut Vec<String>>) -> PugResult<Vec<Attribute>> {
        self.expect("start-attributes")?;
        let mut attrs = Vec::new();
        loop {
            let tok = self.advance();
            let (name, val, must_escape) = match tok.kind {
                TokenKind::Attribute {
                    name,
                    val,
                    must_escape,
                } => (name, val, must_escape),
                kind => {
                    self.defer(Token::new(kind, tok.loc));
                    break;
                }
            };
            if let Some(names) = names.as_deref_mut() {
                if name != "class" {
                    if names.contains(&name) {
                        return Err(self.error(
                            ErrorCode::DuplicateAttribute,
                            format!("Duplicate attribute \"{name}\" is not allowed."),
                            &tok.loc,
                        ));
                    }
                    names.push(name.clone());
                }
            }
            attrs.push(Attribute {
                name,
                val,
                must_escape,
                loc: self.loc(&tok.loc),
            });
        }
        self.expect("end-attributes")?;
        Ok(attrs)
    }
}
