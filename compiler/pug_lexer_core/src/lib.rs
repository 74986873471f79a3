//! Character-level scanner for expressions embedded in templates.
//!
//! Templates carry expression text in many places: attribute values,
//! `#{...}` interpolation, mixin arguments, code lines. The lexer never
//! parses those expressions here. It only needs to know where one ends, which
//! means tracking brackets, string and template quotes, comments and regular
//! expression literals well enough that a `)` inside `"(" + x` or a `]`
//! inside `/]/` is not mistaken for the end.
//!
//! [`ScanState`] is the incremental state machine (one character at a time);
//! [`scan`] feeds a whole string and [`scan_until`] stops at the first
//! delimiter found at nesting depth zero.
//!
//! # Regex or division
//!
//! A `/` outside strings and comments is either division or the start of a
//! regular expression literal. The scanner decides by looking back at the
//! last significant character (comments excluded): after `)` it is division;
//! after `}`, any punctuator, the start of input, or a keyword such as
//! `typeof` or `return` it is a regex; otherwise division. If the next
//! character is `/` or `*` the decision is withdrawn and a comment begins.

mod classify;
mod scan;
mod state;

pub use classify::{is_keyword, is_punctuator};
pub use scan::{scan, scan_until, Delimiter, ScanOptions, Section};
pub use state::{Context, ScanError, ScanState};
