//! JavaScript code generation for linked Pug templates.
//!
//! Turns a linked, filtered template tree into the source of a single
//! render function, `function template(locals) {...}`, that concatenates
//! the output markup into `pug_html`.
//!
//! # Architecture
//!
//! ```text
//! linked Block
//!      ↓
//!  Generator         (walk the tree, buffer text and expressions)
//!      ↓               ← attrs: attribute lists, folded where constant
//!      ↓               ← ConstantEvaluator with the native runtime as `pug`
//!  wrappers          (locals, debug try/catch, inlined runtime helpers)
//!      ↓
//!  function source
//! ```
//!
//! Adjacent static text is merged into one string literal, and expressions
//! that fold at compile time are written as text.

mod attrs;
mod generator;
pub mod runtime;
mod stringify;

use pug_diagnostic::PugResult;
use pug_ir::Block;
use tracing::debug;

/// Indentation unit for pretty-printed output: non-empty whitespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Indent(String);

impl Indent {
    /// `None` unless `unit` is non-empty and all whitespace.
    pub fn new(unit: impl Into<String>) -> Option<Self> {
        let unit = unit.into();
        (!unit.is_empty() && unit.chars().all(char::is_whitespace)).then_some(Indent(unit))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Indent {
    /// Two spaces.
    fn default() -> Self {
        Indent("  ".to_string())
    }
}

/// Code generation options.
#[derive(Clone, Debug)]
pub struct CodeGenOptions {
    /// Indent the output markup; `None` for compact output.
    pub pretty: Option<Indent>,
    /// Track the current line and file at render time and annotate errors
    /// through `rethrow`.
    pub compile_debug: bool,
    /// Doctype to assume before any `doctype` line.
    pub doctype: Option<String>,
    /// Emit the used runtime helpers ahead of the function instead of
    /// referring to a `pug` object.
    pub inline_runtime_functions: bool,
    /// Expose locals as `self` rather than through a `with` statement.
    pub self_locals: bool,
    /// Names meant to resolve to globals rather than locals. The `with`
    /// wrapper falls through to the enclosing scope already, so these are
    /// carried for callers and not rewritten.
    pub globals: Vec<String>,
    /// Sources to embed for `rethrow`, by filename, in insertion order.
    pub include_sources: Option<Vec<(String, String)>>,
    /// Name of the generated function.
    pub template_name: String,
}

impl Default for CodeGenOptions {
    fn default() -> Self {
        CodeGenOptions {
            pretty: None,
            compile_debug: true,
            doctype: None,
            inline_runtime_functions: false,
            self_locals: false,
            globals: Vec::new(),
            include_sources: None,
            template_name: "template".to_string(),
        }
    }
}

/// Generate the render function for `ast`.
pub fn generate(ast: &Block, options: &CodeGenOptions) -> PugResult<String> {
    let js = generator::Generator::new(options).compile(ast)?;
    debug!(bytes = js.len(), "generated code");
    Ok(js)
}
