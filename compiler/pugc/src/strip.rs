//! Comment stripping, between the lexer and the parser.
//!
//! A comment token is followed by its body as pipeless text. Stripping a
//! comment drops the comment token and that whole body; the next token
//! outside the body ends the comment.

use pug_diagnostic::{ErrorCode, PugError, PugResult};
use pug_ir::{Token, TokenKind};
use tracing::trace;

/// Which comments to strip.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StripComments {
    /// `//-` comments.
    pub unbuffered: bool,
    /// `//` comments, which are otherwise written to the output.
    pub buffered: bool,
}

impl Default for StripComments {
    fn default() -> Self {
        StripComments {
            unbuffered: true,
            buffered: false,
        }
    }
}

/// Remove the selected comments from `tokens`.
pub fn strip_comments(tokens: Vec<Token>, options: StripComments) -> PugResult<Vec<Token>> {
    let before = tokens.len();
    let mut in_comment = false;
    let mut in_pipeless_text = false;
    let mut out = Vec::with_capacity(before);

    for token in tokens {
        let keep = match token.kind {
            TokenKind::Comment { buffer, .. } => {
                if in_comment {
                    return Err(unexpected(&token, "already in a comment"));
                }
                in_comment = if buffer {
                    options.buffered
                } else {
                    options.unbuffered
                };
                !in_comment
            }
            TokenKind::StartPipelessText if in_comment => {
                if in_pipeless_text {
                    return Err(unexpected(&token, "already in pipeless text mode"));
                }
                in_pipeless_text = true;
                false
            }
            TokenKind::EndPipelessText if in_comment => {
                if !in_pipeless_text {
                    return Err(unexpected(&token, "not in pipeless text mode"));
                }
                in_pipeless_text = false;
                in_comment = false;
                false
            }
            TokenKind::StartPipelessText | TokenKind::EndPipelessText => true,
            // Text may follow the comment on its own line, before any
            // pipeless body.
            TokenKind::Text(_) => !in_comment,
            _ if in_pipeless_text => false,
            _ => {
                in_comment = false;
                true
            }
        };
        if keep {
            out.push(token);
        }
    }

    trace!(removed = before - out.len(), "stripped comments");
    Ok(out)
}

#[cold]
fn unexpected(token: &Token, occasion: &str) -> PugError {
    PugError::at_token(
        ErrorCode::UnexpectedToken,
        format!("`{}` encountered when {occasion}", token.kind.name()),
        &token.loc,
    )
}

#[cfg(test)]
mod tests;
