//! Recursive-descent expression parser.
//!
//! Binary operators use precedence climbing. Destructuring is parsed with
//! the usual cover grammar: object and array literals are parsed as
//! expressions and converted to patterns when an `=` or `=>` follows.

use pug_stack::ensure_sufficient_stack;

use crate::ast::{
    Argument, ArrayElement, BinaryOp, Expr, LogicalOp, MemberProperty, Property, PropertyKey,
    UnaryOp,
};
use crate::error::SyntaxError;
use crate::lexer::{number_value, Lexer};
use crate::token::{RawTok, Tok, TokKind};

/// Words that can never be identifiers in sloppy-mode scripts.
const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "export", "extends", "finally", "for", "function", "if", "import", "in",
    "instanceof", "new", "return", "super", "switch", "this", "throw", "try", "typeof", "var",
    "void", "while", "with", "null", "true", "false",
];

fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word) || word == "enum"
}

type PResult<T> = Result<T, SyntaxError>;

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    tok: Tok,
    /// Offset of the first `{ a = 1 }` cover initializer not yet resolved
    /// into a pattern.
    cover_init: Option<usize>,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> PResult<Self> {
        let lexer = Lexer::new(src);
        let tok = lexer.token_at(0)?;
        Ok(Parser {
            lexer,
            tok,
            cover_init: None,
        })
    }

    /// Parse the whole input as one expression.
    pub fn parse_complete(&mut self) -> PResult<Expr> {
        let expr = self.parse_expression()?;
        if self.tok.kind != TokKind::Eof {
            return Err(self.unexpected());
        }
        Ok(expr)
    }

    // Token plumbing

    fn bump(&mut self) -> PResult<Tok> {
        let tok = self.tok;
        self.tok = self.lexer.token_at(tok.end)?;
        Ok(tok)
    }

    /// Continue lexing from `pos`, discarding the current token.
    fn reset_to(&mut self, pos: usize) -> PResult<()> {
        self.tok = self.lexer.token_at(pos)?;
        Ok(())
    }

    fn peek(&self) -> PResult<Tok> {
        self.lexer.token_at(self.tok.end)
    }

    fn text(&self, tok: Tok) -> &'a str {
        self.lexer.slice(tok.start, tok.end)
    }

    fn is(&self, raw: RawTok) -> bool {
        self.tok.is(raw)
    }

    fn is_word(&self, word: &str) -> bool {
        self.is(RawTok::Ident) && self.text(self.tok) == word
    }

    fn eat(&mut self, raw: RawTok) -> PResult<bool> {
        if self.is(raw) {
            self.bump()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, raw: RawTok) -> PResult<Tok> {
        if self.is(raw) {
            self.bump()
        } else {
            Err(self.unexpected())
        }
    }

    #[cold]
    fn unexpected(&self) -> SyntaxError {
        self.lexer.error(self.tok.start, "Unexpected token")
    }

    #[cold]
    fn error(&self, offset: usize, message: impl Into<String>) -> SyntaxError {
        self.lexer.error(offset, message)
    }

    // Expressions

    pub fn parse_expression(&mut self) -> PResult<Expr> {
        let first = self.parse_maybe_assign(true)?;
        if !self.is(RawTok::Comma) {
            return Ok(first);
        }
        let mut items = vec![first];
        while self.eat(RawTok::Comma)? {
            items.push(self.parse_maybe_assign(true)?);
        }
        Ok(Expr::Sequence(items))
    }

    /// Assignment level. With `check_cover` false, an object or array
    /// literal holding a cover initializer is passed up unresolved; the
    /// caller is inside a literal that may still become a pattern.
    fn parse_maybe_assign(&mut self, check_cover: bool) -> PResult<Expr> {
        ensure_sufficient_stack(|| {
            let outer = self.cover_init.take();
            let start = self.tok.start;
            let left = self.parse_conditional()?;

            if self.is(RawTok::Assign) {
                let op = assign_op(self.text(self.tok));
                if op == "=" {
                    self.to_assignable(&left, start, false)?;
                    self.cover_init = None;
                } else if let Some(pos) = self.cover_init {
                    return Err(self.cover_error(pos));
                } else if !is_simple_target(&left) {
                    return Err(self.error(start, "Assigning to rvalue"));
                }
                self.bump()?;
                let value = self.parse_maybe_assign(true)?;
                self.cover_init = outer;
                return Ok(Expr::Assign {
                    op,
                    target: Box::new(left),
                    value: Box::new(value),
                });
            }

            if let Some(pos) = self.cover_init {
                if check_cover || !matches!(left, Expr::Object(_) | Expr::Array(_)) {
                    return Err(self.cover_error(pos));
                }
            }
            self.cover_init = self.cover_init.or(outer);
            Ok(left)
        })
    }

    #[cold]
    fn cover_error(&self, pos: usize) -> SyntaxError {
        self.error(
            pos,
            "Shorthand property assignments are valid only in destructuring patterns",
        )
    }

    fn parse_conditional(&mut self) -> PResult<Expr> {
        let test = self.parse_expr_ops()?;
        if is_arrow(&test) || !self.eat(RawTok::Question)? {
            return Ok(test);
        }
        let consequent = self.parse_maybe_assign(true)?;
        self.expect(RawTok::Colon)?;
        let alternate = self.parse_maybe_assign(true)?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn parse_expr_ops(&mut self) -> PResult<Expr> {
        let left = self.parse_maybe_unary()?;
        if is_arrow(&left) {
            return Ok(left);
        }
        self.parse_expr_op(left, -1)
    }

    fn parse_expr_op(&mut self, mut left: Expr, min_prec: i8) -> PResult<Expr> {
        loop {
            let Some(op) = self.binary_operator() else {
                return Ok(left);
            };
            let prec = op.precedence();
            if prec <= min_prec {
                return Ok(left);
            }
            let op_tok = self.bump()?;
            let operand = self.parse_maybe_unary()?;
            let next_min = if matches!(op, Operator::Binary(BinaryOp::Exp)) {
                prec - 1
            } else {
                prec
            };
            let right = self.parse_expr_op(operand, next_min)?;
            left = match op {
                Operator::Logical(logical) => {
                    let mixes = |e: &Expr| match e {
                        Expr::Logical { op: inner, .. } => {
                            (*inner == LogicalOp::Nullish) != (logical == LogicalOp::Nullish)
                        }
                        _ => false,
                    };
                    if mixes(&left) || mixes(&right) {
                        return Err(self.error(
                            op_tok.start,
                            "Logical expressions and coalesce expressions cannot be mixed. Wrap either by parentheses",
                        ));
                    }
                    Expr::Logical {
                        op: logical,
                        left: Box::new(left),
                        right: Box::new(right),
                    }
                }
                Operator::Binary(binary) => Expr::Binary {
                    op: binary,
                    left: Box::new(left),
                    right: Box::new(right),
                },
            };
        }
    }

    fn binary_operator(&self) -> Option<Operator> {
        let TokKind::Raw(raw) = self.tok.kind else {
            return None;
        };
        let binary = match raw {
            RawTok::PipePipe => return Some(Operator::Logical(LogicalOp::Or)),
            RawTok::AmpAmp => return Some(Operator::Logical(LogicalOp::And)),
            RawTok::QuestionQuestion => return Some(Operator::Logical(LogicalOp::Nullish)),
            RawTok::Pipe => BinaryOp::BitOr,
            RawTok::Caret => BinaryOp::BitXor,
            RawTok::Amp => BinaryOp::BitAnd,
            RawTok::EqEq => BinaryOp::Eq,
            RawTok::NotEq => BinaryOp::NotEq,
            RawTok::EqEqEq => BinaryOp::StrictEq,
            RawTok::NotEqEq => BinaryOp::StrictNotEq,
            RawTok::Lt => BinaryOp::Lt,
            RawTok::Gt => BinaryOp::Gt,
            RawTok::LtEq => BinaryOp::LtEq,
            RawTok::GtEq => BinaryOp::GtEq,
            RawTok::Shl => BinaryOp::Shl,
            RawTok::Shr => BinaryOp::Shr,
            RawTok::UShr => BinaryOp::UShr,
            RawTok::Plus => BinaryOp::Add,
            RawTok::Minus => BinaryOp::Sub,
            RawTok::Star => BinaryOp::Mul,
            RawTok::Slash => BinaryOp::Div,
            RawTok::Percent => BinaryOp::Rem,
            RawTok::StarStar => BinaryOp::Exp,
            RawTok::Ident => match self.text(self.tok) {
                "in" => BinaryOp::In,
                "instanceof" => BinaryOp::InstanceOf,
                _ => return None,
            },
            _ => return None,
        };
        Some(Operator::Binary(binary))
    }

    fn parse_maybe_unary(&mut self) -> PResult<Expr> {
        ensure_sufficient_stack(|| {
            let start = self.tok.start;
            let expr = if let Some(op) = self.unary_operator()? {
                self.bump()?;
                let arg = self.parse_maybe_unary()?;
                if self.is(RawTok::StarStar) {
                    return Err(self.unexpected());
                }
                Expr::Unary {
                    op,
                    arg: Box::new(arg),
                }
            } else if self.is(RawTok::Update) {
                self.bump()?;
                let arg_start = self.tok.start;
                let arg = self.parse_maybe_unary()?;
                if !is_simple_target(&arg) {
                    return Err(self.error(arg_start, "Assigning to rvalue"));
                }
                if self.is(RawTok::StarStar) {
                    return Err(self.unexpected());
                }
                Expr::Opaque("update")
            } else {
                let expr = self.parse_expr_subscripts()?;
                if self.is(RawTok::Update) && !self.tok.newline_before {
                    if !is_simple_target(&expr) {
                        return Err(self.error(start, "Assigning to rvalue"));
                    }
                    self.bump()?;
                    Expr::Opaque("update")
                } else {
                    expr
                }
            };
            Ok(expr)
        })
    }

    fn unary_operator(&self) -> PResult<Option<UnaryOp>> {
        let op = match self.tok.kind {
            TokKind::Raw(RawTok::Bang) => UnaryOp::Not,
            TokKind::Raw(RawTok::Tilde) => UnaryOp::BitNot,
            TokKind::Raw(RawTok::Plus) => UnaryOp::Plus,
            TokKind::Raw(RawTok::Minus) => UnaryOp::Neg,
            TokKind::Raw(RawTok::Ident) => match self.text(self.tok) {
                "typeof" => UnaryOp::TypeOf,
                "void" => UnaryOp::Void,
                "delete" => UnaryOp::Delete,
                "await" if self.await_is_operator()? => UnaryOp::Await,
                _ => return Ok(None),
            },
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    /// `await` is an operator when an operand follows on the same line;
    /// otherwise it is an ordinary identifier.
    fn await_is_operator(&self) -> PResult<bool> {
        let next = self.peek()?;
        if next.newline_before {
            return Ok(false);
        }
        Ok(match next.kind {
            TokKind::Raw(
                RawTok::Number
                | RawTok::String
                | RawTok::Backtick
                | RawTok::LParen
                | RawTok::LBracket
                | RawTok::LBrace
                | RawTok::Bang
                | RawTok::Tilde,
            ) => true,
            TokKind::Raw(RawTok::Ident) => {
                !matches!(self.text(next), "in" | "instanceof")
            }
            _ => false,
        })
    }

    fn parse_expr_subscripts(&mut self) -> PResult<Expr> {
        let base = self.parse_expr_atom()?;
        if is_arrow(&base) {
            return Ok(base);
        }
        self.parse_subscripts(base, false)
    }

    fn parse_subscripts(&mut self, mut base: Expr, no_calls: bool) -> PResult<Expr> {
        let mut in_chain = false;
        loop {
            if self.is(RawTok::QuestionDot) {
                if no_calls {
                    return Err(self.error(
                        self.tok.start,
                        "Optional chaining cannot appear in the callee of new expressions",
                    ));
                }
                self.bump()?;
                in_chain = true;
                base = if self.is(RawTok::LParen) {
                    let args = self.parse_arguments()?;
                    Expr::Call {
                        callee: Box::new(base),
                        args,
                        optional: true,
                    }
                } else if self.eat(RawTok::LBracket)? {
                    let property = self.parse_expression()?;
                    self.expect(RawTok::RBracket)?;
                    Expr::Member {
                        object: Box::new(base),
                        property: MemberProperty::Computed(Box::new(property)),
                        optional: true,
                    }
                } else if self.is(RawTok::Backtick) {
                    return Err(self.error(
                        self.tok.start,
                        "Optional chaining cannot appear in the tag of tagged template expressions",
                    ));
                } else {
                    let property = self.parse_member_name()?;
                    Expr::Member {
                        object: Box::new(base),
                        property,
                        optional: true,
                    }
                };
            } else if self.eat(RawTok::Dot)? {
                let property = self.parse_member_name()?;
                base = Expr::Member {
                    object: Box::new(base),
                    property,
                    optional: false,
                };
            } else if self.eat(RawTok::LBracket)? {
                let property = self.parse_expression()?;
                self.expect(RawTok::RBracket)?;
                base = Expr::Member {
                    object: Box::new(base),
                    property: MemberProperty::Computed(Box::new(property)),
                    optional: false,
                };
            } else if !no_calls && self.is(RawTok::LParen) {
                let args = self.parse_arguments()?;
                base = Expr::Call {
                    callee: Box::new(base),
                    args,
                    optional: false,
                };
            } else if self.is(RawTok::Backtick) {
                if in_chain {
                    return Err(self.error(
                        self.tok.start,
                        "Optional chaining cannot appear in the tag of tagged template expressions",
                    ));
                }
                self.parse_template()?;
                base = Expr::Opaque("tagged template");
            } else {
                return Ok(base);
            }
        }
    }

    fn parse_member_name(&mut self) -> PResult<MemberProperty> {
        if self.is(RawTok::Hash) {
            let hash = self.bump()?;
            let name = self.expect(RawTok::Ident)?;
            if name.start != hash.end {
                return Err(self.unexpected());
            }
            return Err(self.error(
                hash.start,
                format!(
                    "Private field '#{}' must be declared in an enclosing class",
                    self.text(name)
                ),
            ));
        }
        let name = self.expect(RawTok::Ident)?;
        Ok(MemberProperty::Ident(self.text(name).to_string()))
    }

    /// `( args )`, the current token being the `(`.
    fn parse_arguments(&mut self) -> PResult<Vec<Argument>> {
        self.expect(RawTok::LParen)?;
        let mut args = Vec::new();
        let mut first = true;
        while !self.eat(RawTok::RParen)? {
            if !first {
                self.expect(RawTok::Comma)?;
                if self.eat(RawTok::RParen)? {
                    break;
                }
            }
            first = false;
            if self.eat(RawTok::Ellipsis)? {
                args.push(Argument::Spread(self.parse_maybe_assign(true)?));
            } else {
                args.push(Argument::Expr(self.parse_maybe_assign(true)?));
            }
        }
        Ok(args)
    }

    fn parse_expr_atom(&mut self) -> PResult<Expr> {
        let tok = self.tok;
        let TokKind::Raw(raw) = tok.kind else {
            return Err(self.unexpected());
        };
        match raw {
            RawTok::Ident => self.parse_word(),
            RawTok::Number => {
                self.bump()?;
                Ok(number_value(self.text(tok)).map_or(Expr::Opaque("bigint"), Expr::Number))
            }
            RawTok::String => {
                self.bump()?;
                Ok(Expr::String(self.lexer.cook_string(tok.start, tok.end)?))
            }
            RawTok::Backtick => self.parse_template(),
            RawTok::LParen => self.parse_paren_or_arrow(),
            RawTok::LBracket => self.parse_array(),
            RawTok::LBrace => self.parse_object(),
            RawTok::Slash => self.parse_regex(),
            RawTok::Assign if self.text(tok) == "/=" => self.parse_regex(),
            _ => Err(self.unexpected()),
        }
    }

    fn parse_regex(&mut self) -> PResult<Expr> {
        let (pattern, flags, end) = self.lexer.scan_regex(self.tok.start)?;
        self.reset_to(end)?;
        Ok(Expr::Regex { pattern, flags })
    }

    fn parse_word(&mut self) -> PResult<Expr> {
        let tok = self.tok;
        let word = self.text(tok);
        match word {
            "this" => {
                self.bump()?;
                Ok(Expr::This)
            }
            "null" => {
                self.bump()?;
                Ok(Expr::Null)
            }
            "true" | "false" => {
                self.bump()?;
                Ok(Expr::Bool(word == "true"))
            }
            "function" => {
                self.bump()?;
                self.parse_function_rest()
            }
            "class" => self.parse_class(),
            "new" => self.parse_new(),
            "super" => Err(self.error(tok.start, "'super' keyword outside a method")),
            "import" => self.parse_import(),
            "async" => self.parse_async(),
            "enum" => Err(self.error(tok.start, "The keyword 'enum' is reserved")),
            _ if is_reserved(word) => {
                Err(self.error(tok.start, format!("Unexpected keyword '{word}'")))
            }
            _ => {
                self.bump()?;
                if self.is(RawTok::Arrow) && !self.tok.newline_before {
                    self.parse_arrow_body()?;
                    return Ok(Expr::Opaque("arrow function"));
                }
                Ok(Expr::Ident(word.to_string()))
            }
        }
    }

    /// After `function`: optional `*`, optional name, params, body.
    fn parse_function_rest(&mut self) -> PResult<Expr> {
        self.eat(RawTok::Star)?;
        if self.is(RawTok::Ident) {
            let name = self.text(self.tok);
            if is_reserved(name) {
                return Err(self.error(self.tok.start, format!("Unexpected keyword '{name}'")));
            }
            self.bump()?;
        }
        self.skip_group(RawTok::LParen)?;
        self.skip_group(RawTok::LBrace)?;
        Ok(Expr::Opaque("function"))
    }

    fn parse_class(&mut self) -> PResult<Expr> {
        self.bump()?;
        if self.is(RawTok::Ident) && !self.is_word("extends") {
            let name = self.text(self.tok);
            if is_reserved(name) {
                return Err(self.error(self.tok.start, format!("Unexpected keyword '{name}'")));
            }
            self.bump()?;
        }
        if self.is_word("extends") {
            self.bump()?;
            let base = self.parse_expr_atom()?;
            self.parse_subscripts(base, false)?;
        }
        self.skip_group(RawTok::LBrace)?;
        Ok(Expr::Opaque("class"))
    }

    fn parse_new(&mut self) -> PResult<Expr> {
        let new = self.bump()?;
        if self.is(RawTok::Dot) {
            return Err(self.error(new.start, "'new.target' can only be used in functions"));
        }
        let callee = if self.is_word("new") {
            self.parse_new()?
        } else {
            self.parse_expr_atom()?
        };
        if is_arrow(&callee) {
            return Err(self.unexpected());
        }
        self.parse_subscripts(callee, true)?;
        if self.is(RawTok::LParen) {
            self.parse_arguments()?;
        }
        Ok(Expr::Opaque("new"))
    }

    fn parse_import(&mut self) -> PResult<Expr> {
        let import = self.bump()?;
        if self.is(RawTok::Dot) {
            return Err(self.error(
                import.start,
                "Cannot use 'import.meta' outside a module",
            ));
        }
        if !self.is(RawTok::LParen) {
            return Err(self.unexpected());
        }
        let args = self.parse_arguments()?;
        if args.is_empty() || args.len() > 2 || args.iter().any(|a| matches!(a, Argument::Spread(_))) {
            return Err(self.error(import.start, "Invalid dynamic import"));
        }
        Ok(Expr::Opaque("import"))
    }

    fn parse_async(&mut self) -> PResult<Expr> {
        let async_tok = self.tok;
        let next = self.peek()?;
        if !next.newline_before && next.is(RawTok::Ident) {
            match self.text(next) {
                "function" => {
                    self.bump()?;
                    self.bump()?;
                    return self.parse_function_rest();
                }
                name => {
                    let after = self.lexer.token_at(next.end)?;
                    if after.is(RawTok::Arrow) && !after.newline_before {
                        if is_reserved(name) {
                            return Err(self.error(next.start, format!("Unexpected keyword '{name}'")));
                        }
                        self.bump()?;
                        self.bump()?;
                        self.parse_arrow_body()?;
                        return Ok(Expr::Opaque("arrow function"));
                    }
                }
            }
        }
        self.bump()?;
        if !next.newline_before && self.is(RawTok::LParen) {
            let args_start = self.tok.start;
            let args = self.parse_arguments()?;
            if self.is(RawTok::Arrow) && !self.tok.newline_before {
                let params: Vec<(Expr, bool)> = args
                    .into_iter()
                    .map(|a| match a {
                        Argument::Expr(e) => (e, false),
                        Argument::Spread(e) => (e, true),
                    })
                    .collect();
                self.check_params(&params, args_start)?;
                self.parse_arrow_body()?;
                return Ok(Expr::Opaque("arrow function"));
            }
            return Ok(Expr::Call {
                callee: Box::new(Expr::Ident(self.text(async_tok).to_string())),
                args,
                optional: false,
            });
        }
        if self.is(RawTok::Arrow) && !self.tok.newline_before {
            self.parse_arrow_body()?;
            return Ok(Expr::Opaque("arrow function"));
        }
        Ok(Expr::Ident(self.text(async_tok).to_string()))
    }

    /// Skip a balanced group that must start with `open`.
    fn skip_group(&mut self, open: RawTok) -> PResult<()> {
        if !self.is(open) {
            return Err(self.unexpected());
        }
        let end = self.lexer.skip_balanced(self.tok.start)?;
        self.reset_to(end)
    }

    /// The current token is `=>`.
    fn parse_arrow_body(&mut self) -> PResult<()> {
        self.bump()?;
        self.cover_init = None;
        if self.is(RawTok::LBrace) {
            self.skip_group(RawTok::LBrace)
        } else {
            self.parse_maybe_assign(true).map(drop)
        }
    }

    fn parse_paren_or_arrow(&mut self) -> PResult<Expr> {
        let open = self.bump()?;
        let mut items: Vec<(Expr, bool)> = Vec::new();
        let mut trailing_comma = None;
        let mut first = true;
        while !self.is(RawTok::RParen) {
            if !first {
                let comma = self.expect(RawTok::Comma)?;
                if self.is(RawTok::RParen) {
                    trailing_comma = Some(comma.start);
                    break;
                }
            }
            first = false;
            if self.eat(RawTok::Ellipsis)? {
                items.push((self.parse_maybe_assign(false)?, true));
                if !self.is(RawTok::RParen) {
                    return Err(self.error(self.tok.start, "Comma is not permitted after the rest element"));
                }
            } else {
                items.push((self.parse_maybe_assign(false)?, false));
            }
        }
        let close = self.expect(RawTok::RParen)?;

        if self.is(RawTok::Arrow) && !self.tok.newline_before {
            self.check_params(&items, open.end)?;
            self.parse_arrow_body()?;
            return Ok(Expr::Opaque("arrow function"));
        }

        if items.is_empty() {
            return Err(self.error(close.start, "Unexpected token"));
        }
        if let Some(pos) = trailing_comma {
            return Err(self.error(pos, "Unexpected token"));
        }
        if let Some(pos) = self.cover_init {
            return Err(self.cover_error(pos));
        }
        if items.iter().any(|(_, rest)| *rest) {
            return Err(self.error(open.start, "Unexpected token"));
        }
        let mut exprs: Vec<Expr> = items.into_iter().map(|(e, _)| e).collect();
        let inner = if exprs.len() == 1 {
            exprs.remove(0)
        } else {
            Expr::Sequence(exprs)
        };
        Ok(Expr::Paren(Box::new(inner)))
    }

    /// Validate arrow parameters: each must be a binding pattern, names
    /// must not repeat.
    fn check_params(&mut self, params: &[(Expr, bool)], start: usize) -> PResult<()> {
        let mut names = Vec::new();
        for (param, _) in params {
            let target = match param {
                Expr::Assign { op: "=", target, .. } => target,
                other => other,
            };
            self.to_assignable(target, start, true)?;
            collect_bound_names(target, &mut names);
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(self.error(start, "Argument name clash"));
            }
        }
        self.cover_init = None;
        Ok(())
    }

    fn parse_array(&mut self) -> PResult<Expr> {
        self.bump()?;
        let mut elements = Vec::new();
        let mut first = true;
        while !self.eat(RawTok::RBracket)? {
            if !first {
                self.expect(RawTok::Comma)?;
                if self.eat(RawTok::RBracket)? {
                    break;
                }
            }
            first = false;
            if self.is(RawTok::Comma) {
                elements.push(ArrayElement::Hole);
            } else if self.eat(RawTok::Ellipsis)? {
                elements.push(ArrayElement::Spread(self.parse_maybe_assign(false)?));
            } else {
                elements.push(ArrayElement::Expr(self.parse_maybe_assign(false)?));
            }
        }
        Ok(Expr::Array(elements))
    }

    fn parse_object(&mut self) -> PResult<Expr> {
        self.bump()?;
        let mut props = Vec::new();
        let mut first = true;
        while !self.eat(RawTok::RBrace)? {
            if !first {
                self.expect(RawTok::Comma)?;
                if self.eat(RawTok::RBrace)? {
                    break;
                }
            }
            first = false;
            props.push(self.parse_property()?);
        }
        Ok(Expr::Object(props))
    }

    fn parse_property(&mut self) -> PResult<Property> {
        if self.eat(RawTok::Ellipsis)? {
            return Ok(Property::Spread(self.parse_maybe_assign(false)?));
        }
        if self.eat(RawTok::Star)? {
            self.parse_property_key()?;
            return self.parse_method();
        }

        let key_tok = self.tok;
        let key = self.parse_property_key()?;

        // `get x() {}`, `set x(v) {}`, `async x() {}`, `async *x() {}`
        if let PropertyKey::Ident(word) = &key {
            let modifier = matches!(word.as_str(), "get" | "set" | "async");
            let ends_here = matches!(
                self.tok.kind,
                TokKind::Raw(
                    RawTok::Comma | RawTok::RBrace | RawTok::Colon | RawTok::LParen | RawTok::Assign
                )
            );
            if modifier && !ends_here {
                if word == "async" {
                    if self.tok.newline_before {
                        return Err(self.unexpected());
                    }
                    self.eat(RawTok::Star)?;
                }
                self.parse_property_key()?;
                return self.parse_method();
            }
        }

        if self.eat(RawTok::Colon)? {
            let value = self.parse_maybe_assign(false)?;
            return Ok(Property::Init { key, value });
        }
        if self.is(RawTok::LParen) {
            return self.parse_method();
        }

        let PropertyKey::Ident(name) = key else {
            return Err(self.unexpected());
        };
        if is_reserved(&name) {
            return Err(self.error(key_tok.start, format!("Unexpected keyword '{name}'")));
        }
        if self.is(RawTok::Assign) && self.text(self.tok) == "=" {
            self.cover_init.get_or_insert(self.tok.start);
            self.bump()?;
            let default = self.parse_maybe_assign(true)?;
            return Ok(Property::CoverInit { name, default });
        }
        Ok(Property::Shorthand(name))
    }

    fn parse_property_key(&mut self) -> PResult<PropertyKey> {
        let tok = self.tok;
        match tok.kind {
            TokKind::Raw(RawTok::Ident) => {
                self.bump()?;
                Ok(PropertyKey::Ident(self.text(tok).to_string()))
            }
            TokKind::Raw(RawTok::String) => {
                self.bump()?;
                Ok(PropertyKey::String(self.lexer.cook_string(tok.start, tok.end)?))
            }
            TokKind::Raw(RawTok::Number) => {
                self.bump()?;
                Ok(PropertyKey::Number(number_value(self.text(tok)).unwrap_or(f64::NAN)))
            }
            TokKind::Raw(RawTok::LBracket) => {
                self.bump()?;
                let key = self.parse_maybe_assign(true)?;
                self.expect(RawTok::RBracket)?;
                Ok(PropertyKey::Computed(Box::new(key)))
            }
            _ => Err(self.unexpected()),
        }
    }

    fn parse_method(&mut self) -> PResult<Property> {
        self.skip_group(RawTok::LParen)?;
        self.skip_group(RawTok::LBrace)?;
        Ok(Property::Method)
    }

    /// A template literal starting at the current backtick.
    fn parse_template(&mut self) -> PResult<Expr> {
        let mut pos = self.tok.end;
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        loop {
            let chunk = self.lexer.scan_template_chunk(pos)?;
            quasis.push(chunk.cooked);
            self.reset_to(chunk.end)?;
            if !chunk.substitution {
                break;
            }
            exprs.push(self.parse_expression()?);
            if !self.is(RawTok::RBrace) {
                return Err(self.unexpected());
            }
            pos = self.tok.end;
        }
        Ok(Expr::Template { quasis, exprs })
    }

    // Patterns

    /// Check that `expr` can be the target of `=` (or a binding, for arrow
    /// parameters).
    fn to_assignable(&self, expr: &Expr, start: usize, binding: bool) -> PResult<()> {
        match expr {
            Expr::Ident(_) => Ok(()),
            Expr::Member { .. } if in_optional_chain(expr) => Err(self.error(
                start,
                "Optional chaining cannot appear in left-hand side",
            )),
            Expr::Member { .. } if !binding => Ok(()),
            Expr::Paren(inner)
                if !binding && matches!(**inner, Expr::Ident(_) | Expr::Member { .. }) =>
            {
                self.to_assignable(inner, start, binding)
            }
            Expr::Object(props) => {
                for (i, prop) in props.iter().enumerate() {
                    match prop {
                        Property::Init { value, .. } => {
                            self.to_assignable_element(value, start, binding)?;
                        }
                        Property::Shorthand(_) | Property::CoverInit { .. } => {}
                        Property::Spread(target) => {
                            if i + 1 != props.len() {
                                return Err(self.error(
                                    start,
                                    "Comma is not permitted after the rest element",
                                ));
                            }
                            self.to_assignable(target, start, binding)?;
                        }
                        Property::Method => {
                            return Err(self.error(start, "Object pattern can't contain getter or setter"))
                        }
                    }
                }
                Ok(())
            }
            Expr::Array(elements) => {
                for (i, element) in elements.iter().enumerate() {
                    match element {
                        ArrayElement::Expr(e) => self.to_assignable_element(e, start, binding)?,
                        ArrayElement::Spread(e) => {
                            if i + 1 != elements.len() {
                                return Err(self.error(
                                    start,
                                    "Comma is not permitted after the rest element",
                                ));
                            }
                            self.to_assignable(e, start, binding)?;
                        }
                        ArrayElement::Hole => {}
                    }
                }
                Ok(())
            }
            _ if binding => Err(self.error(start, "Binding rvalue")),
            _ => Err(self.error(start, "Assigning to rvalue")),
        }
    }

    /// A pattern element, which may carry a `= default`.
    fn to_assignable_element(&self, expr: &Expr, start: usize, binding: bool) -> PResult<()> {
        match expr {
            Expr::Assign {
                op: "=", target, ..
            } => self.to_assignable(target, start, binding),
            other => self.to_assignable(other, start, binding),
        }
    }
}

#[derive(Copy, Clone)]
enum Operator {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

impl Operator {
    fn precedence(self) -> i8 {
        match self {
            Operator::Logical(LogicalOp::Or | LogicalOp::Nullish) => 1,
            Operator::Logical(LogicalOp::And) => 2,
            Operator::Binary(op) => match op {
                BinaryOp::BitOr => 3,
                BinaryOp::BitXor => 4,
                BinaryOp::BitAnd => 5,
                BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq => 6,
                BinaryOp::Lt
                | BinaryOp::Gt
                | BinaryOp::LtEq
                | BinaryOp::GtEq
                | BinaryOp::In
                | BinaryOp::InstanceOf => 7,
                BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => 8,
                BinaryOp::Add | BinaryOp::Sub => 9,
                BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 10,
                BinaryOp::Exp => 11,
            },
        }
    }
}

fn assign_op(text: &str) -> &'static str {
    match text {
        "+=" => "+=",
        "-=" => "-=",
        "*=" => "*=",
        "/=" => "/=",
        "%=" => "%=",
        "**=" => "**=",
        "<<=" => "<<=",
        ">>=" => ">>=",
        ">>>=" => ">>>=",
        "&=" => "&=",
        "|=" => "|=",
        "^=" => "^=",
        "&&=" => "&&=",
        "||=" => "||=",
        "??=" => "??=",
        _ => "=",
    }
}

fn is_arrow(expr: &Expr) -> bool {
    matches!(expr, Expr::Opaque("arrow function"))
}

/// Targets of compound assignment and update operators.
fn is_simple_target(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) => true,
        Expr::Member { .. } => !in_optional_chain(expr),
        Expr::Paren(inner) => is_simple_target(inner),
        _ => false,
    }
}

fn in_optional_chain(expr: &Expr) -> bool {
    match expr {
        Expr::Member {
            object, optional, ..
        } => *optional || in_optional_chain(object),
        Expr::Call {
            callee, optional, ..
        } => *optional || in_optional_chain(callee),
        _ => false,
    }
}

fn collect_bound_names(pattern: &Expr, names: &mut Vec<String>) {
    match pattern {
        Expr::Ident(name) => names.push(name.clone()),
        Expr::Assign { target, .. } => collect_bound_names(target, names),
        Expr::Array(elements) => {
            for element in elements {
                if let ArrayElement::Expr(e) | ArrayElement::Spread(e) = element {
                    collect_bound_names(e, names);
                }
            }
        }
        Expr::Object(props) => {
            for prop in props {
                match prop {
                    Property::Init { value, .. } | Property::Spread(value) => {
                        collect_bound_names(value, names);
                    }
                    Property::Shorthand(name) | Property::CoverInit { name, .. } => {
                        names.push(name.clone());
                    }
                    Property::Method => {}
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests;
