//! Whole-string scanning.

use crate::state::{ScanError, ScanState};

/// Something that can end a scan: tested against the rest of the input at
/// each top-level position.
pub trait Delimiter {
    fn matches_at(&self, rest: &str) -> bool;
}

impl Delimiter for char {
    fn matches_at(&self, rest: &str) -> bool {
        rest.starts_with(*self)
    }
}

impl Delimiter for &str {
    fn matches_at(&self, rest: &str) -> bool {
        rest.starts_with(*self)
    }
}

impl<F: Fn(&str) -> bool> Delimiter for F {
    fn matches_at(&self, rest: &str) -> bool {
        self(rest)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Byte offset to start scanning at.
    pub start: usize,
    /// Accept the delimiter at any depth.
    pub ignore_nesting: bool,
    /// A line comment left open at depth zero does not hide the delimiter.
    pub ignore_line_comment: bool,
}

/// The text between `start` and the delimiter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Section<'a> {
    pub start: usize,
    /// Exclusive; the delimiter starts here.
    pub end: usize,
    pub src: &'a str,
}

/// Feed all of `src` into `state` (a fresh one if `None`).
pub fn scan(src: &str, state: Option<ScanState>) -> Result<ScanState, ScanError> {
    let mut state = state.unwrap_or_default();
    for (index, c) in src.char_indices() {
        state.feed(c).map_err(|err| err.at(index))?;
    }
    Ok(state)
}

/// Scan from `options.start` until `delimiter` appears outside any nesting.
///
/// Fails with [`ScanError::EndOfString`] (index = length of `src`) when the
/// input ends first, or [`ScanError::MismatchedBracket`] on a close bracket
/// that matches nothing.
pub fn scan_until<'a>(
    src: &'a str,
    delimiter: impl Delimiter,
    options: ScanOptions,
) -> Result<Section<'a>, ScanError> {
    let start = options.start;
    let mut state = ScanState::new();
    for (offset, c) in src[start..].char_indices() {
        let index = start + offset;
        let nesting = if options.ignore_line_comment {
            state.is_nesting_ignoring_line_comment()
        } else {
            state.is_nesting()
        };
        if (options.ignore_nesting || !nesting) && delimiter.matches_at(&src[index..]) {
            return Ok(Section {
                start,
                end: index,
                src: &src[start..index],
            });
        }
        state.feed(c).map_err(|err| err.at(index))?;
    }
    Err(ScanError::EndOfString { index: src.len() })
}

#[cfg(test)]
mod tests;
