//! Syntax of the expression language embedded in Pug templates.
//!
//! Templates carry expressions in attribute values, interpolations, code
//! lines and control-flow headers. The lexer validates each one with
//! [`parse_expression`], and the constant evaluator folds the resulting
//! [`Expr`] trees when every input is known at compile time.
//!
//! The parser accepts the full expression grammar of modern scripts.
//! Function, class and block-bodied arrow bodies are checked for balanced
//! nesting only and come back as [`Expr::Opaque`]. Line comments are
//! rejected because generated code joins expressions onto single lines.

mod ast;
mod error;
mod lexer;
mod parser;
mod token;

pub use ast::{
    Argument, ArrayElement, BinaryOp, Expr, LogicalOp, MemberProperty, Property, PropertyKey,
    UnaryOp,
};
pub use error::SyntaxError;

use parser::Parser;

/// Parse `src` as a single expression. Trailing whitespace and block
/// comments are allowed; anything else after the expression is an error.
pub fn parse_expression(src: &str) -> Result<Expr, SyntaxError> {
    Parser::new(src)?.parse_complete()
}

/// Whether `src` parses as a single expression.
pub fn is_expression(src: &str) -> bool {
    parse_expression(src).is_ok()
}

/// Whether `name` is a plain identifier that is not a reserved word.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(lexer::is_id_start)
        && chars.all(lexer::is_id_continue)
        && matches!(parse_expression(name), Ok(Expr::Ident(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert!(is_identifier("foo"));
        assert!(is_identifier("$_x1"));
        assert!(is_identifier("caf\u{e9}"));
        assert!(!is_identifier("1a"));
        assert!(!is_identifier("class"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn expression_predicate() {
        assert!(is_expression("a + b"));
        assert!(!is_expression("a +"));
        assert!(!is_expression("a; b"));
    }
}
