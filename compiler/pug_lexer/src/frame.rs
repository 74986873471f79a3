//! Per-region lexer state.

/// The indentation character a file settled on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum IndentKind {
    Tabs,
    Spaces,
}

impl IndentKind {
    /// Leading indentation characters of `line`.
    pub(crate) fn width(self, line: &str) -> usize {
        let unit = match self {
            IndentKind::Tabs => '\t',
            IndentKind::Spaces => ' ',
        };
        line.chars().take_while(|&c| c == unit).count()
    }
}

/// The part of the state that a `#[...]` interpolation replaces.
///
/// The root frame holds the whole template. An interpolation frame holds
/// the rest of the enclosing text line and ends at its closing `]`.
#[derive(Debug)]
pub(crate) struct Frame {
    input: String,
    pos: usize,
    pub(crate) interpolated: bool,
    /// Open indentation widths; the bottom entry is always 0.
    pub(crate) indent_stack: Vec<usize>,
    /// Fixed by the first indented line.
    pub(crate) indent_kind: Option<IndentKind>,
    /// Whether `#[`, `#{` and `!{` are recognised in text.
    pub(crate) interpolation_allowed: bool,
    pub(crate) ended: bool,
}

impl Frame {
    pub(crate) fn root(input: String) -> Self {
        Frame {
            input,
            pos: 0,
            interpolated: false,
            indent_stack: vec![0],
            indent_kind: None,
            interpolation_allowed: true,
            ended: false,
        }
    }

    pub(crate) fn interpolated(input: String) -> Self {
        Frame {
            interpolated: true,
            ..Frame::root(input)
        }
    }

    #[inline]
    pub(crate) fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    #[inline]
    pub(crate) fn consume(&mut self, len: usize) {
        self.pos = (self.pos + len).min(self.input.len());
    }

    /// Put `text` back in front of the remaining input.
    pub(crate) fn prepend(&mut self, text: &str) {
        let mut input = String::with_capacity(text.len() + self.input.len() - self.pos);
        input.push_str(text);
        input.push_str(self.rest());
        self.input = input;
        self.pos = 0;
    }

    /// The innermost open indentation width.
    #[inline]
    pub(crate) fn indent(&self) -> usize {
        self.indent_stack.last().copied().unwrap_or(0)
    }

    /// Indentation levels still open above the base level.
    pub(crate) fn open_levels(&self) -> usize {
        self.indent_stack.iter().rev().take_while(|&&n| n > 0).count()
    }

    pub(crate) fn into_rest(mut self) -> String {
        self.input.drain(..self.pos);
        self.input
    }
}
