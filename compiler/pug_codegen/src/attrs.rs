//! Compilation of a tag's or mixin call's static attribute list.
//!
//! Attributes whose values fold to constants are rendered at compile time;
//! the rest become calls to the `attr`, `classes` and `style` helpers. All
//! `class` attributes combine into one, written first.

use pug_eval::Value;
use pug_ir::Attribute;

use crate::runtime::native;
use crate::runtime::Helper;
use crate::stringify::{stringify, stringify_str};

/// What attribute compilation needs from the generator.
pub(crate) trait AttrContext {
    /// How generated code refers to `helper`.
    fn runtime(&mut self, helper: Helper) -> String;

    /// The value of `src`, if it folds.
    fn constant(&mut self, src: &str) -> Option<Value>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum AttrFormat {
    /// An expression producing the rendered attribute markup.
    Html,
    /// An object literal expression, as passed to mixins and `attrs`.
    Object,
}

/// Compile `attrs` to a script expression in `format`.
pub(crate) fn compile_attrs(
    attrs: &[Attribute],
    terse: bool,
    format: AttrFormat,
    cx: &mut dyn AttrContext,
) -> String {
    let mut compiler = AttrCompiler {
        terse,
        format,
        cx,
        buf: Vec::new(),
    };
    compiler.classes(attrs);
    for attr in attrs {
        let src = attr.val.as_source();
        match attr.name.as_str() {
            "class" => {}
            "style" => {
                let style = compiler.style(src);
                compiler.add("style", &style, attr.must_escape);
            }
            key => compiler.add(key, src, attr.must_escape),
        }
    }
    match format {
        AttrFormat::Html if compiler.buf.is_empty() => "\"\"".to_string(),
        AttrFormat::Html => compiler.buf.join("+"),
        AttrFormat::Object => format!("{{{}}}", compiler.buf.join(",")),
    }
}

struct AttrCompiler<'a> {
    terse: bool,
    format: AttrFormat,
    cx: &'a mut dyn AttrContext,
    buf: Vec<String>,
}

impl AttrCompiler<'_> {
    fn classes(&mut self, attrs: &[Attribute]) {
        let (sources, mut escaping): (Vec<&str>, Vec<bool>) = attrs
            .iter()
            .filter(|attr| attr.name == "class")
            .map(|attr| (attr.val.as_source(), attr.must_escape))
            .unzip();
        if sources.is_empty() {
            return;
        }

        let constants: Option<Vec<Value>> =
            sources.iter().map(|src| self.cx.constant(src)).collect();
        let folded = constants.and_then(|values| {
            let flags = Value::Array(escaping.iter().map(|&e| Value::Bool(e)).collect());
            native::classes(&Value::Array(values), &flags)
        });
        if let Some(value) = folded {
            self.add("class", &stringify(&value), false);
            return;
        }

        // Constant items are escaped now, so they need no flag at render time.
        let mut items = Vec::with_capacity(sources.len());
        for (src, escape) in sources.iter().zip(escaping.iter_mut()) {
            let folded = self.cx.constant(src).and_then(|value| {
                if *escape {
                    native::escape(&value)
                } else {
                    Some(value)
                }
            });
            match folded {
                Some(value) if value.to_json().is_some() => {
                    *escape = false;
                    items.push(stringify(&value));
                }
                _ => items.push((*src).to_string()),
            }
        }
        let flags = Value::Array(escaping.into_iter().map(Value::Bool).collect());
        let call = format!(
            "{}([{}], {})",
            self.cx.runtime(Helper::Classes),
            items.join(","),
            stringify(&flags)
        );
        self.add("class", &call, false);
    }

    /// The source of the rendered style string for `src`.
    fn style(&mut self, src: &str) -> String {
        if let Some(style) = self.cx.constant(src).and_then(|value| native::style(&value)) {
            return stringify_str(&style);
        }
        format!("{}({src})", self.cx.runtime(Helper::Style))
    }

    fn add(&mut self, key: &str, src: &str, must_escape: bool) {
        if let Some(value) = self.cx.constant(src) {
            if self.add_constant(key, &value, must_escape) {
                return;
            }
        }
        let entry = match self.format {
            AttrFormat::Html => format!(
                "{}(\"{key}\", {src}, {must_escape}, {})",
                self.cx.runtime(Helper::Attr),
                self.terse
            ),
            AttrFormat::Object if must_escape => format!(
                "{}:{}({src})",
                stringify_str(key),
                self.cx.runtime(Helper::Escape)
            ),
            AttrFormat::Object => format!("{}:{src}", stringify_str(key)),
        };
        self.buf.push(entry);
    }

    /// Add a folded attribute. `false` when the value cannot be rendered
    /// at compile time after all.
    fn add_constant(&mut self, key: &str, value: &Value, must_escape: bool) -> bool {
        match self.format {
            AttrFormat::Html => {
                let Some(html) = native::attr(key, value, must_escape, self.terse) else {
                    return false;
                };
                let literal = stringify_str(&html);
                // Adjacent literals merge into one.
                match self.buf.last_mut() {
                    Some(last) if last.ends_with('"') => {
                        last.pop();
                        last.push_str(&literal[1..]);
                    }
                    _ => self.buf.push(literal),
                }
            }
            AttrFormat::Object => {
                let value = if must_escape {
                    match native::escape(value) {
                        Some(escaped) => escaped,
                        None => return false,
                    }
                } else {
                    value.clone()
                };
                if value.to_json().is_none() {
                    return false;
                }
                self.buf
                    .push(format!("{}:{}", stringify_str(key), stringify(&value)));
            }
        }
        true
    }
}

#[cfg(test)]
mod tests;
