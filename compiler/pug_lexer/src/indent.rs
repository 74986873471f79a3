//! Indentation and indented text blocks.

use pug_diagnostic::{ErrorCode, PugResult};
use pug_ir::TokenKind;

use crate::frame::IndentKind;
use crate::text::TextKind;
use crate::Lexer;

/// Outcome of measuring a pipeless text block.
enum Block {
    /// Lines to emit (without indentation, and whether each reached the
    /// block's indentation) and the bytes they span.
    Lines(Vec<(String, bool)>, usize),
    /// A line sits between the block indentation and the enclosing one;
    /// measure again at its width.
    Retry(usize),
}

impl Lexer {
    /// Width of the indentation after a leading `\n`, fixing the file's
    /// indentation character on the first indented line.
    fn scan_indentation(&mut self) -> Option<usize> {
        let line = self.rest().strip_prefix('\n')?;
        if let Some(kind) = self.frame.indent_kind {
            return Some(kind.width(line));
        }
        let tabs = IndentKind::Tabs.width(line);
        let (kind, width) = if tabs == 0 {
            (IndentKind::Spaces, IndentKind::Spaces.width(line))
        } else {
            (IndentKind::Tabs, tabs)
        };
        if width > 0 {
            self.frame.indent_kind = Some(kind);
        }
        Some(width)
    }

    /// A line break: `indent`, `outdent`s or `newline`.
    pub(crate) fn indent(&mut self) -> PugResult<bool> {
        let Some(indents) = self.scan_indentation() else {
            return Ok(false);
        };
        self.next_line(1);
        self.consume(indents + 1);

        if self.rest().starts_with([' ', '\t']) {
            return Err(self.error(
                ErrorCode::InvalidIndentation,
                "Invalid indentation, you can use tabs or spaces but not both",
            ));
        }

        // Whitespace-only line.
        if self.rest().starts_with('\n') {
            self.frame.interpolation_allowed = true;
            return Ok(true);
        }

        let current = self.frame.indent();
        if indents < current {
            let mut outdents = 0;
            while self.frame.indent() > indents {
                let top = self.frame.indent();
                let below = self.frame.indent_stack.iter().rev().nth(1).copied().unwrap_or(0);
                if below < indents {
                    return Err(self.error(
                        ErrorCode::InconsistentIndentation,
                        format!(
                            "Inconsistent indentation. Expecting either {below} or {top} spaces/tabs."
                        ),
                    ));
                }
                outdents += 1;
                self.frame.indent_stack.pop();
            }
            for _ in 0..outdents {
                self.set_column(1);
                let start = self.position();
                self.set_column(self.frame.indent() + 1);
                self.push(TokenKind::Outdent, start);
            }
        } else if indents > 0 && indents != current {
            let start = self.position();
            self.set_column(1 + indents);
            self.push(TokenKind::Indent(indents), start);
            self.frame.indent_stack.push(indents);
        } else {
            let start = self.position();
            self.set_column(1 + current.min(indents));
            self.push(TokenKind::Newline, start);
        }

        self.frame.interpolation_allowed = true;
        Ok(true)
    }

    /// The indented block under a `.`, filter, comment or `-`, as text.
    ///
    /// `indents` forces the block indentation; otherwise it is taken from
    /// the first line.
    pub(crate) fn pipeless_text(&mut self, indents: Option<usize>) -> PugResult<bool> {
        let mut indents = indents;
        loop {
            while self.blank()? {}
            let captured = self.scan_indentation();
            let width = match indents {
                Some(n) if n > 0 => n,
                _ => captured.unwrap_or(0),
            };
            if width <= self.frame.indent() {
                return Ok(false);
            }
            match self.measure_block(width) {
                Block::Retry(narrower) => indents = Some(narrower),
                Block::Lines(lines, len) => {
                    self.emit_block(lines, len, width)?;
                    return Ok(true);
                }
            }
        }
    }

    fn measure_block(&self, indents: usize) -> Block {
        let kind = self.frame.indent_kind.unwrap_or(IndentKind::Spaces);
        let enclosing = self.frame.indent();
        let input = self.rest();
        let mut lines = Vec::new();
        let mut ptr = 0;
        loop {
            let tail = &input[(ptr + 1).min(input.len())..];
            let line = tail.find('\n').map_or(tail, |i| &tail[..i]);
            let line_indents = kind.width(line);
            let deep_enough = line_indents >= indents;
            let is_match = deep_enough || line.trim().is_empty();
            if is_match {
                ptr += line.len() + 1;
                let text = line.char_indices().nth(indents).map_or("", |(i, _)| &line[i..]);
                lines.push((text.to_string(), deep_enough));
            } else if line_indents > enclosing {
                return Block::Retry(line_indents);
            }
            if !(is_match && ptr < input.len()) {
                break;
            }
        }
        Block::Lines(lines, ptr.min(input.len()))
    }

    fn emit_block(
        &mut self,
        mut lines: Vec<(String, bool)>,
        len: usize,
        indents: usize,
    ) -> PugResult<()> {
        let start = self.position();
        self.push(TokenKind::StartPipelessText, start);
        self.consume(len);
        if self.rest().is_empty() {
            while lines.last().is_some_and(|(text, _)| text.is_empty()) {
                lines.pop();
            }
        }
        for (i, (text, deep_enough)) in lines.into_iter().enumerate() {
            self.next_line(1);
            let start = self.position();
            if deep_enough {
                self.advance_column(indents);
            }
            if i != 0 {
                self.push(TokenKind::Newline, start);
            }
            self.add_text(TextKind::Text, text)?;
        }
        let start = self.position();
        self.push(TokenKind::EndPipelessText, start);
        Ok(())
    }
}
