//! Source locations.
//!
//! Lines and columns are 1-based. Columns count characters, not bytes.

use std::fmt;
use std::sync::Arc;

/// Shared template filename.
pub type FileName = Arc<str>;

/// A line/column pair.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Location of a token: where it starts, where it ends, and which file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Loc {
    pub start: Position,
    pub end: Position,
    pub filename: Option<FileName>,
}

impl Loc {
    /// A location that starts and (for now) ends at `start`.
    pub fn at(start: Position, filename: Option<FileName>) -> Self {
        Loc {
            start,
            end: start,
            filename,
        }
    }
}

/// Location carried by every AST node.
///
/// A `line` of zero marks a synthetic node that has no source position
/// (for example text spliced in from a raw include).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceLoc {
    pub line: u32,
    pub column: u32,
    pub filename: Option<FileName>,
}

impl SourceLoc {
    pub fn new(line: u32, column: u32, filename: Option<FileName>) -> Self {
        SourceLoc {
            line,
            column,
            filename,
        }
    }

    /// A location with no line information.
    pub fn synthetic(filename: Option<FileName>) -> Self {
        SourceLoc {
            line: 0,
            column: 0,
            filename,
        }
    }

    #[inline]
    pub fn has_line(&self) -> bool {
        self.line > 0
    }
}

impl From<&Loc> for SourceLoc {
    fn from(loc: &Loc) -> Self {
        SourceLoc {
            line: loc.start.line,
            column: loc.start.column,
            filename: loc.filename.clone(),
        }
    }
}
