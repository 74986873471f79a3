//! The compile error type.

use std::fmt;
use std::sync::Arc;

use pug_ir::{FileName, Loc, SourceLoc};

use crate::ErrorCode;

pub type PugResult<T> = Result<T, PugError>;

/// A fatal compile error at a template position.
///
/// `column` is `None` when only the line is known. `src` is the text of
/// the file the position refers to; when present, [`fmt::Display`] shows
/// the surrounding lines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PugError {
    pub code: ErrorCode,
    pub message: String,
    pub line: u32,
    pub column: Option<u32>,
    pub filename: Option<FileName>,
    pub src: Option<Arc<str>>,
}

impl PugError {
    #[cold]
    pub fn new(code: ErrorCode, message: impl Into<String>, line: u32, column: u32) -> Self {
        PugError {
            code,
            message: message.into(),
            line,
            column: (column > 0).then_some(column),
            filename: None,
            src: None,
        }
    }

    /// Error at the start of a token.
    #[cold]
    pub fn at_token(code: ErrorCode, message: impl Into<String>, loc: &Loc) -> Self {
        PugError::new(code, message, loc.start.line, loc.start.column)
            .with_filename(loc.filename.clone())
    }

    /// Error at an AST node.
    #[cold]
    pub fn at_node(code: ErrorCode, message: impl Into<String>, loc: &SourceLoc) -> Self {
        PugError::new(code, message, loc.line, loc.column).with_filename(loc.filename.clone())
    }

    #[must_use]
    pub fn with_filename(mut self, filename: Option<FileName>) -> Self {
        self.filename = filename;
        self
    }

    #[must_use]
    pub fn with_src(mut self, src: Arc<str>) -> Self {
        self.src = Some(src);
        self
    }

    /// Attach source text unless some is already attached.
    #[must_use]
    pub fn or_src(mut self, src: &Arc<str>) -> Self {
        if self.src.is_none() {
            self.src = Some(Arc::clone(src));
        }
        self
    }

    /// `line` or `line:column`.
    pub fn location(&self) -> String {
        match self.column {
            Some(column) => format!("{}:{}", self.line, column),
            None => self.line.to_string(),
        }
    }

    /// Up to three lines either side of the error line, the error line
    /// marked with `>` and followed by a caret under the column.
    pub fn excerpt(&self) -> Option<String> {
        let src = self.src.as_deref()?;
        let lines: Vec<&str> = src.split('\n').collect();
        let line = self.line as usize;
        if line == 0 || line > lines.len() {
            return None;
        }
        let start = line.saturating_sub(3);
        let end = lines.len().min(line + 3);
        let mut out = Vec::with_capacity(end - start);
        for (offset, text) in lines[start..end].iter().enumerate() {
            let current = start + offset + 1;
            let marker = if current == line { "  > " } else { "    " };
            let preamble = format!("{marker}{current}| ");
            let mut rendered = format!("{preamble}{text}");
            if current == line {
                if let Some(column) = self.column {
                    rendered.push('\n');
                    let dashes = preamble.chars().count() + column as usize - 1;
                    rendered.push_str(&"-".repeat(dashes));
                    rendered.push('^');
                }
            }
            out.push(rendered);
        }
        Some(out.join("\n"))
    }
}

impl fmt::Display for PugError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filename = self.filename.as_deref().unwrap_or("Pug");
        match self.excerpt() {
            Some(context) => write!(
                f,
                "{filename}:{}\n{context}\n\n{}",
                self.location(),
                self.message
            ),
            None => write!(f, "{filename}:{}\n\n{}", self.location(), self.message),
        }
    }
}

impl std::error::Error for PugError {}

#[cfg(test)]
mod tests;
