//! Code and control flow: `-`/`=` code, conditionals, loops and `case`.

use pug_diagnostic::{ErrorCode, PugResult};
use pug_ir::{
    Alternate, Block, Case, Code, Conditional, Each, EachOf, Loc, Node, SourceLoc, TokenKind,
    When, While,
};

use crate::Parser;

impl Parser<'_> {
    /// `case expr` followed by an indented list of `when`/`default`.
    pub(crate) fn parse_case(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let expr = match tok.kind {
            TokenKind::Case(expr) => expr,
            other => return Err(self.expected("case", &other, &tok.loc)),
        };
        let mut block = Block::new(SourceLoc::new(
            tok.loc.start.line + 1,
            0,
            self.filename.clone(),
        ));
        self.expect("indent")?;
        while !self.check("outdent") {
            match self.peek().kind {
                TokenKind::Comment { .. } | TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::When(_) => {
                    let when = self.parse_when()?;
                    block.nodes.push(when);
                }
                TokenKind::Default => {
                    let default = self.parse_default()?;
                    block.nodes.push(default);
                }
                _ => match self.extend(|ext, parser| ext.case_branch(parser))? {
                    Some(node) => block.nodes.push(node),
                    None => {
                        let tok = self.peek();
                        return Err(self.error(
                            ErrorCode::InvalidToken,
                            format!(
                                "Unexpected token \"{}\", expected \"when\", \"default\" or \"newline\"",
                                tok.kind.name()
                            ),
                            &tok.loc,
                        ));
                    }
                },
            }
        }
        self.expect("outdent")?;
        Ok(Node::Case(Case {
            expr,
            block,
            loc: self.loc(&tok.loc),
        }))
    }

    /// `when expr`, with a body unless it falls through to the next branch.
    fn parse_when(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let expr = match tok.kind {
            TokenKind::When(expr) => expr,
            other => return Err(self.expected("when", &other, &tok.loc)),
        };
        let block = if self.check("newline") {
            None
        } else {
            Some(self.parse_block_expansion()?)
        };
        Ok(Node::When(When {
            expr,
            block,
            debug: false,
            loc: self.loc(&tok.loc),
        }))
    }

    fn parse_default(&mut self) -> PugResult<Node> {
        let tok = self.expect("default")?;
        let block = self.parse_block_expansion()?;
        Ok(Node::When(When {
            expr: "default".to_string(),
            block: Some(block),
            debug: false,
            loc: self.loc(&tok.loc),
        }))
    }

    /// `=`, `!=` or `-` code. `inline` code never owns a block.
    pub(crate) fn parse_code(&mut self, inline: bool) -> PugResult<Node> {
        let tok = self.advance();
        let (val, must_escape, buffer) = match tok.kind {
            TokenKind::Code {
                val,
                must_escape,
                buffer,
            } => (val, must_escape, buffer),
            other => return Err(self.expected("code", &other, &tok.loc)),
        };
        // `- else` continues a statement; a debug line before it would
        // split the statement.
        let debug = !val.trim_start_matches(' ').starts_with("else");
        let mut block = None;
        if !inline && self.check("indent") {
            if buffer {
                let next = self.peek();
                return Err(self.error(
                    ErrorCode::BlockInBufferedCode,
                    "Buffered code cannot have a block attached to it",
                    &next.loc,
                ));
            }
            block = Some(self.block()?);
        }
        Ok(Node::Code(Code {
            val,
            buffer,
            must_escape,
            is_inline: inline,
            block,
            debug,
            loc: self.loc(&tok.loc),
        }))
    }

    /// `if`/`unless`, then any `else if` links and a final `else`.
    pub(crate) fn parse_conditional(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let test = match tok.kind {
            TokenKind::If(test) => test,
            other => return Err(self.expected("if", &other, &tok.loc)),
        };
        let consequent = self.optional_block(&tok.loc)?;

        let mut links = Vec::new();
        let mut otherwise = None;
        loop {
            match self.peek().kind {
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::ElseIf(_) => {
                    let link = self.advance();
                    let test = match link.kind {
                        TokenKind::ElseIf(test) => test,
                        other => return Err(self.expected("else-if", &other, &link.loc)),
                    };
                    let consequent = self.optional_block(&link.loc)?;
                    links.push((test, consequent, self.loc(&link.loc)));
                }
                TokenKind::Else => {
                    self.advance();
                    if self.check("indent") {
                        otherwise = Some(self.block()?);
                    }
                    break;
                }
                _ => break,
            }
        }

        let mut alternate = otherwise.map(Alternate::Else);
        for (test, consequent, loc) in links.into_iter().rev() {
            alternate = Some(Alternate::ElseIf(Conditional {
                test,
                consequent,
                alternate: alternate.map(Box::new),
                loc,
            }));
        }
        Ok(Node::Conditional(Conditional {
            test,
            consequent,
            alternate: alternate.map(Box::new),
            loc: self.loc(&tok.loc),
        }))
    }

    /// An indented block if one follows, else an empty one.
    pub(crate) fn optional_block(&mut self, loc: &Loc) -> PugResult<Block> {
        if self.check("indent") {
            self.block()
        } else {
            Ok(self.empty_block(loc))
        }
    }

    pub(crate) fn parse_while(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let test = match tok.kind {
            TokenKind::While(test) => test,
            other => return Err(self.expected("while", &other, &tok.loc)),
        };
        let block = self.optional_block(&tok.loc)?;
        Ok(Node::While(While {
            test,
            block,
            loc: self.loc(&tok.loc),
        }))
    }

    /// `each val, key in obj` with an optional `else` for empty collections.
    pub(crate) fn parse_each(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let (val, key, obj) = match tok.kind {
            TokenKind::Each { val, key, code } => (val, key, code),
            other => return Err(self.expected("each", &other, &tok.loc)),
        };
        let block = self.block()?;
        let alternate = if self.accept("else").is_some() {
            Some(self.block()?)
        } else {
            None
        };
        Ok(Node::Each(Each {
            obj,
            val,
            key,
            block,
            alternate,
            loc: self.loc(&tok.loc),
        }))
    }

    pub(crate) fn parse_each_of(&mut self) -> PugResult<Node> {
        let tok = self.advance();
        let (val, obj) = match tok.kind {
            TokenKind::EachOf { val, code } => (val, code),
            other => return Err(self.expected("eachOf", &other, &tok.loc)),
        };
        let block = self.block()?;
        Ok(Node::EachOf(EachOf {
            obj,
            val,
            block,
            loc: self.loc(&tok.loc),
        }))
    }
}
