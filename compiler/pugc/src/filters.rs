//! The filter pass: render `:name` blocks and filtered raw includes to text
//! at compile time.
//!
//! Runs over the loaded tree before linking, descending into every loaded
//! dependency. A filter's attributes become its options, so they must fold
//! to constants.

use std::sync::Arc;

use pug_diagnostic::{ErrorCode, PugError, PugResult};
use pug_eval::{ConstantEvaluator, Object, Value};
use pug_ir::visit::{child_blocks_mut, dependency_mut};
use pug_ir::{AttrValue, Attribute, Block, Node, SourceLoc, Text};
use pug_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;
use tracing::trace;

/// Options handed to a filter: its folded attributes, then the configured
/// defaults for its name, then `filename`.
pub type FilterOptions = Object;

/// A text transform applied at compile time.
pub trait Filter {
    /// Render `text`. An `Err` carries the reason, reported as
    /// `FILTER_FAILED`.
    fn render(&self, text: &str, options: &FilterOptions) -> Result<String, String>;
}

impl<F> Filter for F
where
    F: Fn(&str, &FilterOptions) -> Result<String, String>,
{
    fn render(&self, text: &str, options: &FilterOptions) -> Result<String, String> {
        self(text, options)
    }
}

/// Replace every filter in `ast` and its dependencies with its output.
/// Returns the number of filters applied.
pub fn handle_filters(
    ast: &mut Block,
    filters: &FxHashMap<String, Arc<dyn Filter>>,
    aliases: &FxHashMap<String, String>,
    defaults: &FxHashMap<String, Object>,
) -> PugResult<usize> {
    let mut pass = FilterPass {
        filters,
        aliases,
        defaults,
        evaluator: ConstantEvaluator::new(),
        applied: 0,
    };
    pass.block(ast)?;
    Ok(pass.applied)
}

struct FilterPass<'a> {
    filters: &'a FxHashMap<String, Arc<dyn Filter>>,
    aliases: &'a FxHashMap<String, String>,
    defaults: &'a FxHashMap<String, Object>,
    evaluator: ConstantEvaluator,
    applied: usize,
}

impl FilterPass<'_> {
    fn block(&mut self, block: &mut Block) -> PugResult<()> {
        ensure_sufficient_stack(|| {
            for node in &mut block.nodes {
                self.node(node)?;
            }
            Ok(())
        })
    }

    fn node(&mut self, node: &mut Node) -> PugResult<()> {
        match node {
            Node::Filter(filter) => {
                // Inner filters render first; their text is this one's input.
                self.block(&mut filter.block)?;
                let text: String = filter
                    .block
                    .nodes
                    .iter()
                    .map(|node| match node {
                        Node::Text(text) => text.val.as_str(),
                        _ => "",
                    })
                    .collect();
                let mut options = self.options(&filter.name, &filter.attrs, &filter.loc)?;
                if let Some(filename) = &filter.loc.filename {
                    options.insert("filename", Value::string(&**filename));
                }
                let out = self.run(&filter.name, &text, &options, &filter.loc)?;
                let loc = filter.loc.clone();
                *node = Node::Text(Text::new(out, loc));
                return Ok(());
            }
            Node::RawInclude(raw) if !raw.filters.is_empty() => {
                let path = raw
                    .file
                    .full_path
                    .clone()
                    .unwrap_or_else(|| raw.file.path.clone());
                let mut text = raw.file.contents.clone().unwrap_or_default();
                // `include:outer:inner file` applies `inner` first.
                for filter in raw.filters.iter().rev() {
                    let mut options = self.options(&filter.name, &filter.attrs, &filter.loc)?;
                    options.insert("filename", Value::string(path.clone()));
                    text = self.run(&filter.name, &text, &options, &filter.loc)?;
                }
                let loc = raw.loc.clone();
                *node = Node::Text(Text::new(text, loc));
                return Ok(());
            }
            _ => {}
        }
        if let Some(dependency) = dependency_mut(node) {
            self.block(dependency)?;
        }
        for child in child_blocks_mut(node) {
            self.block(child)?;
        }
        Ok(())
    }

    fn options(
        &mut self,
        name: &str,
        attrs: &[Attribute],
        loc: &SourceLoc,
    ) -> PugResult<FilterOptions> {
        let mut options = FilterOptions::new();
        for attr in attrs {
            let value = match &attr.val {
                AttrValue::True => Value::Bool(true),
                AttrValue::Expr(src) => self
                    .evaluator
                    .evaluate(src)
                    .cloned()
                    .ok_or_else(|| not_constant(src, loc))?,
            };
            options.insert(attr.name.as_str(), value);
        }
        if let Some(defaults) = self.defaults.get(name) {
            for (key, value) in defaults.iter() {
                if !options.contains_key(key) {
                    options.insert(key, value.clone());
                }
            }
        }
        Ok(options)
    }

    fn run(
        &mut self,
        name: &str,
        text: &str,
        options: &FilterOptions,
        loc: &SourceLoc,
    ) -> PugResult<String> {
        let resolved = self.resolve(name, loc)?;
        let Some(filter) = self.filters.get(resolved) else {
            return Err(PugError::at_node(
                ErrorCode::UnknownFilter,
                format!("unknown filter \":{resolved}\""),
                loc,
            ));
        };
        trace!(filter = resolved, bytes = text.len(), "applying filter");
        let out = filter.render(text, options).map_err(|reason| {
            PugError::at_node(
                ErrorCode::FilterFailed,
                format!("The \"{resolved}\" filter failed: {reason}"),
                loc,
            )
        })?;
        self.applied += 1;
        Ok(out)
    }

    /// The registered name `name` stands for. Aliases do not chain.
    fn resolve<'s>(&'s self, name: &'s str, loc: &SourceLoc) -> PugResult<&'s str> {
        let Some(target) = self.aliases.get(name) else {
            return Ok(name);
        };
        if let Some(next) = self.aliases.get(target) {
            return Err(PugError::at_node(
                ErrorCode::FilterAliasChain,
                format!(
                    "The filter \"{name}\" is an alias for \"{target}\", which is an alias for \"{next}\".  Pug does not support chains of filter aliases."
                ),
                loc,
            ));
        }
        Ok(target)
    }
}

#[cold]
fn not_constant(src: &str, loc: &SourceLoc) -> PugError {
    PugError::at_node(
        ErrorCode::FilterOptionNotConstant,
        format!(
            "`{src}` is not constant. All filters are rendered compile-time so filter options must be constants."
        ),
        loc,
    )
}
