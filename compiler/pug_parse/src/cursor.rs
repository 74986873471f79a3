//! Token stream with one-token push-back.

use std::collections::VecDeque;

use pug_ir::{Token, TokenKind};
use tracing::trace;

/// The tokens left to parse.
///
/// Once the stream is drained every read yields an `eos` token located at
/// the last real token, so a stream the lexer did not terminate still ends.
pub struct TokenStream {
    tokens: VecDeque<Token>,
    eos: Token,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let loc = tokens.last().map(|token| token.loc.clone()).unwrap_or_default();
        TokenStream {
            tokens: VecDeque::from(tokens),
            eos: Token::new(TokenKind::Eos, loc),
        }
    }

    #[inline]
    pub fn peek(&self) -> &Token {
        self.tokens.front().unwrap_or(&self.eos)
    }

    /// The token `n` places ahead; `lookahead(0)` is [`peek`](Self::peek).
    #[inline]
    pub fn lookahead(&self, n: usize) -> &Token {
        self.tokens.get(n).unwrap_or(&self.eos)
    }

    pub fn advance(&mut self) -> Token {
        let token = self.tokens.pop_front().unwrap_or_else(|| self.eos.clone());
        trace!(token = token.kind.name(), at = %token.loc.start, "advance");
        token
    }

    /// Put `token` back at the front.
    pub fn defer(&mut self, token: Token) {
        trace!(token = token.kind.name(), "defer");
        self.tokens.push_front(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pug_ir::{Loc, Position};

    fn token(kind: TokenKind, line: u32) -> Token {
        Token::new(kind, Loc::at(Position::new(line, 1), None))
    }

    #[test]
    fn defer_pushes_to_front() {
        let mut stream = TokenStream::new(vec![token(TokenKind::Newline, 1)]);
        stream.defer(token(TokenKind::Dot, 1));
        assert_eq!(stream.len(), 2);
        assert_eq!(stream.peek().kind, TokenKind::Dot);
        assert_eq!(stream.lookahead(1).kind, TokenKind::Newline);
    }

    #[test]
    fn drained_stream_yields_eos() {
        let mut stream = TokenStream::new(vec![token(TokenKind::Newline, 3)]);
        assert_eq!(stream.advance().kind, TokenKind::Newline);
        assert!(stream.is_empty());
        let eos = stream.advance();
        assert_eq!(eos.kind, TokenKind::Eos);
        assert_eq!(eos.loc.start, Position::new(3, 1));
        assert_eq!(stream.lookahead(5).kind, TokenKind::Eos);
    }
}
