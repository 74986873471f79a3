//! The tree walk that emits the render function body.
//!
//! Output is a list of script statements. Markup goes through
//! [`Generator::buffer`] and [`Generator::buffer_expression`], which extend
//! the previous `pug_html = pug_html + ...;` statement while nothing else
//! has been emitted since, so runs of static markup and interpolations
//! become one concatenation.

use std::ops::Range;

use pug_diagnostic::{ErrorCode, PugError, PugResult};
use pug_eval::{ConstantEvaluator, Constants, Value};
use pug_ir::{
    Alternate, Attribute, AttributeBlock, Block, BlockComment, Case, Code, Comment, Conditional,
    Doctype, Each, EachOf, Mixin, Node, Tag, When, While,
};
use pug_stack::ensure_sufficient_stack;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::attrs::{compile_attrs, AttrContext, AttrFormat};
use crate::runtime::{self, native, Helper};
use crate::stringify::{stringify_inner, stringify_str};
use crate::CodeGenOptions;

const DOCTYPES: [(&str, &str); 9] = [
    ("html", "<!DOCTYPE html>"),
    ("xml", r#"<?xml version="1.0" encoding="utf-8" ?>"#),
    (
        "transitional",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#,
    ),
    (
        "strict",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">"#,
    ),
    (
        "frameset",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Frameset//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-frameset.dtd">"#,
    ),
    (
        "1.1",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">"#,
    ),
    (
        "basic",
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML Basic 1.1//EN" "http://www.w3.org/TR/xhtml-basic/xhtml-basic11.dtd">"#,
    ),
    (
        "mobile",
        r#"<!DOCTYPE html PUBLIC "-//WAPFORUM//DTD XHTML Mobile 1.2//EN" "http://www.openmobilealliance.org/tech/DTD/xhtml-mobile12.dtd">"#,
    ),
    (
        "plist",
        r#"<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">"#,
    ),
];

/// Elements written as `<br>`/`<br/>` outside XML mode.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Content of these tags is never re-indented.
const WHITESPACE_SENSITIVE: [&str; 2] = ["pre", "textarea"];

/// Longest run of `+` terms in one buffering statement.
const MAX_CONCATENATIONS: u32 = 100;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Buffered {
    Text,
    Code,
}

#[derive(Default)]
struct MixinUse {
    used: bool,
    /// Statement ranges of each declaration.
    instances: Vec<Range<usize>>,
}

#[allow(clippy::struct_excessive_bools)]
pub(crate) struct Generator<'a> {
    options: &'a CodeGenOptions,
    pretty: Option<&'a str>,
    debug: bool,
    buf: Vec<String>,
    /// `buf.len()` right after the last buffering statement was written.
    last_buffered_idx: Option<usize>,
    last_buffered_kind: Buffered,
    /// Terms of the last buffering statement, after its opening.
    last_buffered: String,
    /// `"` when the last buffering statement opened with text.
    buffer_start: &'static str,
    concatenations: u32,
    indents: usize,
    parent_indents: usize,
    escape_pretty: bool,
    doctype: Option<String>,
    terse: bool,
    xml: bool,
    has_compiled_doctype: bool,
    has_compiled_tag: bool,
    mixins: FxHashMap<String, MixinUse>,
    dynamic_mixins: bool,
    each_count: u32,
    runtime_used: Vec<Helper>,
    /// Folds under the native runtime as `pug`, built once per generator.
    evaluator: ConstantEvaluator,
}

impl<'a> Generator<'a> {
    pub(crate) fn new(options: &'a CodeGenOptions) -> Self {
        let mut constants = Constants::new();
        constants.insert("pug", Value::Object(native::runtime_object()));
        constants.insert("pug_interp", Value::Undefined);

        let debug = options.compile_debug;
        let mut generator = Generator {
            options,
            pretty: options.pretty.as_ref().map(crate::Indent::as_str),
            debug,
            buf: Vec::new(),
            last_buffered_idx: None,
            last_buffered_kind: Buffered::Text,
            last_buffered: String::new(),
            buffer_start: "",
            concatenations: 0,
            indents: 0,
            parent_indents: 0,
            escape_pretty: false,
            doctype: None,
            terse: false,
            xml: false,
            has_compiled_doctype: false,
            has_compiled_tag: false,
            mixins: FxHashMap::default(),
            dynamic_mixins: false,
            each_count: 0,
            runtime_used: Vec::new(),
            evaluator: ConstantEvaluator::with_constants(constants),
        };
        if let Some(doctype) = options.doctype.as_deref().filter(|d| !d.is_empty()) {
            generator.set_doctype(doctype);
        }
        if debug && options.inline_runtime_functions {
            generator.runtime_used.push(Helper::Rethrow);
        }
        generator
    }

    pub(crate) fn compile(mut self, ast: &Block) -> PugResult<String> {
        if self.pretty.is_some() {
            self.buf.push("var pug_indent = [];".to_string());
        }
        self.visit_block(ast)?;

        // Without dynamic calls, every use of a mixin is known.
        if !self.dynamic_mixins {
            for (name, mixin) in &self.mixins {
                if mixin.used {
                    continue;
                }
                trace!(mixin = %name, "dropping unused mixin");
                for range in &mixin.instances {
                    for line in &mut self.buf[range.clone()] {
                        line.clear();
                    }
                }
            }
        }

        let mut js = self.buf.join("\n");
        if self.options.self_locals {
            js = format!("var self = locals || {{}};{js}");
        } else {
            trace!(globals = ?self.options.globals, "wrapping locals");
            js = format!("with (locals || {{}}) {{{js}}}");
        }
        if self.debug {
            let mut source_arg = "";
            if let Some(sources) = &self.options.include_sources {
                js = format!("var pug_debug_sources = {};\n{js}", sources_literal(sources));
                source_arg = ", pug_debug_sources[pug_debug_filename]";
            }
            let rethrow = if self.options.inline_runtime_functions {
                "pug_rethrow"
            } else {
                "pug.rethrow"
            };
            js = format!(
                "var pug_debug_filename, pug_debug_line;try {{{js}}} catch (err) {{{rethrow}(err, pug_debug_filename, pug_debug_line{source_arg});}}"
            );
        }

        let helpers = runtime::build(std::mem::take(&mut self.runtime_used));
        Ok(format!(
            "{helpers}function {}(locals) {{var pug_html = \"\", pug_mixins = {{}}, pug_interp;{js};return pug_html;}}",
            self.options.template_name
        ))
    }

    fn set_doctype(&mut self, name: &str) {
        let key = name.to_lowercase();
        let doctype = DOCTYPES
            .iter()
            .find(|(short, _)| *short == key)
            .map_or_else(|| format!("<!DOCTYPE {name}>"), |(_, full)| (*full).to_string());
        self.terse = doctype.to_lowercase() == "<!doctype html>";
        self.xml = doctype.starts_with("<?xml");
        self.doctype = Some(doctype);
    }

    fn runtime(&mut self, helper: Helper) -> String {
        if self.options.inline_runtime_functions {
            self.runtime_used.push(helper);
            format!("pug_{}", helper.name())
        } else {
            format!("pug.{}", helper.name())
        }
    }

    fn constant(&mut self, src: &str) -> Option<Value> {
        self.evaluator.evaluate(src).cloned()
    }

    /// What buffering `src` writes, if it is known now. `null` and
    /// `undefined` write nothing. Objects stay at render time, where a
    /// `toString` of their own would apply.
    fn constant_text(&mut self, src: &str) -> Option<String> {
        match self.constant(src)? {
            Value::Null | Value::Undefined => Some(String::new()),
            Value::Object(_) => None,
            value => value.to_js_string(),
        }
    }

    fn push(&mut self, statement: impl Into<String>) {
        self.buf.push(statement.into());
    }

    fn continues_buffer(&self) -> bool {
        self.last_buffered_idx == Some(self.buf.len()) && self.concatenations < MAX_CONCATENATIONS
    }

    fn rewrite_last(&mut self, statement: String) {
        if let Some(last) = self.buf.last_mut() {
            *last = statement;
        }
    }

    /// Append literal markup.
    fn buffer(&mut self, text: &str) {
        let text = stringify_inner(text);
        if self.continues_buffer() {
            if self.last_buffered_kind == Buffered::Code {
                self.last_buffered.push_str(" + \"");
                self.concatenations += 1;
            }
            self.last_buffered_kind = Buffered::Text;
            self.last_buffered.push_str(&text);
            let statement = format!(
                "pug_html = pug_html + {}{}\";",
                self.buffer_start, self.last_buffered
            );
            self.rewrite_last(statement);
        } else {
            self.concatenations = 0;
            self.push(format!("pug_html = pug_html + \"{text}\";"));
            self.last_buffered_kind = Buffered::Text;
            self.buffer_start = "\"";
            self.last_buffered = text;
            self.last_buffered_idx = Some(self.buf.len());
        }
    }

    /// Append the value of `src`, evaluated at render time unless it folds.
    fn buffer_expression(&mut self, src: &str) {
        if let Some(text) = self.constant(src).and_then(|value| value.to_js_string()) {
            self.buffer(&text);
            return;
        }
        if self.continues_buffer() {
            self.concatenations += 1;
            if self.last_buffered_kind == Buffered::Text {
                self.last_buffered.push('"');
            }
            self.last_buffered_kind = Buffered::Code;
            self.last_buffered.push_str(&format!(" + ({src})"));
            let statement = format!(
                "pug_html = pug_html + ({}{});",
                self.buffer_start, self.last_buffered
            );
            self.rewrite_last(statement);
        } else {
            self.concatenations = 0;
            self.push(format!("pug_html = pug_html + ({src});"));
            self.last_buffered_kind = Buffered::Code;
            self.buffer_start = "";
            self.last_buffered = format!("({src})");
            self.last_buffered_idx = Some(self.buf.len());
        }
    }

    /// A newline (optionally) and the indent for the current depth plus
    /// `offset`. Inside a mixin the caller's indent is added at render time.
    fn pretty_indent(&mut self, offset: usize, newline: bool) {
        let Some(unit) = self.pretty else {
            return;
        };
        let mut text = String::new();
        if newline {
            text.push('\n');
        }
        text.push_str(&unit.repeat((self.indents + offset).saturating_sub(1)));
        self.buffer(&text);
        if self.parent_indents > 0 {
            self.push("pug_html = pug_html + pug_indent.join(\"\");");
        }
    }

    fn visit(&mut self, node: &Node) -> PugResult<()> {
        let loc = node.loc();
        if self.debug && node.wants_debug_line() && loc.has_line() {
            let mut js = format!(";pug_debug_line = {}", loc.line);
            if let Some(filename) = &loc.filename {
                js.push_str(&format!(";pug_debug_filename = {}", stringify_str(filename)));
            }
            js.push(';');
            self.push(js);
        }
        ensure_sufficient_stack(|| self.visit_node(node))
    }

    fn visit_node(&mut self, node: &Node) -> PugResult<()> {
        match node {
            Node::Block(block) => self.visit_block(block),
            Node::NamedBlock(named) => self.visit_block(&named.block),
            Node::Tag(tag) => self.visit_tag(tag, false),
            Node::InterpolatedTag(tag) => self.visit_tag(tag, true),
            Node::Text(text) => {
                self.buffer(&text.val);
                Ok(())
            }
            Node::Code(code) => self.visit_code(code),
            Node::Conditional(cond) => self.visit_conditional(cond),
            Node::While(w) => self.visit_while(w),
            Node::Each(each) => self.visit_each(each),
            Node::EachOf(each) => self.visit_each_of(each),
            Node::Case(case) => self.visit_case(case),
            Node::When(when) => self.visit_when(when),
            Node::Mixin(mixin) => self.visit_mixin(mixin),
            Node::MixinBlock(_) => {
                self.visit_mixin_block();
                Ok(())
            }
            Node::Doctype(doctype) => {
                self.visit_doctype(Some(doctype));
                Ok(())
            }
            Node::Comment(comment) => {
                self.visit_comment(comment);
                Ok(())
            }
            Node::BlockComment(comment) => self.visit_block_comment(comment),
            // Only meaningful once included; a template compiled on its own
            // just drops it.
            Node::YieldBlock(_) => Ok(()),
            Node::Filter(_) | Node::Extends(_) | Node::Include(_) | Node::RawInclude(_) => {
                Err(unprocessed(node))
            }
        }
    }

    fn visit_block(&mut self, block: &Block) -> PugResult<()> {
        let pretty = self.pretty.is_some() && !self.escape_pretty;
        if pretty {
            if let [Node::Text(_), Node::Text(_), ..] = block.nodes.as_slice() {
                self.pretty_indent(1, true);
            }
        }
        let mut prev: Option<&Node> = None;
        for node in &block.nodes {
            if pretty {
                if let (Some(Node::Text(prev)), Node::Text(_)) = (prev, node) {
                    if prev.val.ends_with('\n') {
                        self.pretty_indent(1, false);
                    }
                }
            }
            self.visit(node)?;
            prev = Some(node);
        }
        Ok(())
    }

    fn visit_case(&mut self, case: &Case) -> PugResult<()> {
        self.push(format!("switch ({}){{", case.expr));
        self.visit_block(&case.block)?;
        self.push("}");
        Ok(())
    }

    fn visit_when(&mut self, when: &When) -> PugResult<()> {
        if when.is_default() {
            self.push("default:");
        } else {
            self.push(format!("case {}:", when.expr));
        }
        if let Some(block) = &when.block {
            self.visit_block(block)?;
            self.push("  break;");
        }
        Ok(())
    }

    fn visit_mixin_block(&mut self) {
        if let Some(unit) = self.pretty {
            let indent = stringify_str(&unit.repeat(self.indents));
            self.push(format!("pug_indent.push({indent});"));
        }
        self.push("block && block();");
        if self.pretty.is_some() {
            self.push("pug_indent.pop();");
        }
    }

    /// Write the doctype. Without a node this is the implicit doctype
    /// before a leading `html` tag, which only writes an already known one.
    fn visit_doctype(&mut self, doctype: Option<&Doctype>) {
        if let Some(doctype) = doctype {
            if !doctype.val.is_empty() || self.doctype.is_none() {
                let name = if doctype.val.is_empty() {
                    "html"
                } else {
                    doctype.val.as_str()
                };
                self.set_doctype(name);
            }
        }
        if let Some(doctype) = self.doctype.clone() {
            self.buffer(&doctype);
        }
        self.has_compiled_doctype = true;
    }

    fn visit_mixin(&mut self, mixin: &Mixin) -> PugResult<()> {
        let name = if mixin.is_dynamic() {
            self.dynamic_mixins = true;
            let expr = mixin
                .name
                .strip_prefix("#{")
                .map(|rest| {
                    let mut chars = rest.chars();
                    chars.next_back();
                    chars.as_str()
                })
                .unwrap_or_default();
            format!("pug_mixins[{expr}]")
        } else {
            format!("pug_mixins[\"{}\"]", mixin.name)
        };
        let args = mixin.args.as_deref().unwrap_or("");
        let usage = self.mixins.entry(mixin.name.clone()).or_default();

        if mixin.call {
            usage.used = true;
            self.visit_mixin_call(mixin, &name, args)
        } else {
            self.visit_mixin_declaration(mixin, &name, args)
        }
    }

    fn visit_mixin_call(&mut self, mixin: &Mixin, name: &str, args: &str) -> PugResult<()> {
        if let Some(unit) = self.pretty {
            let indent = stringify_str(&unit.repeat(self.indents));
            self.push(format!("pug_indent.push({indent});"));
        }
        let has_attrs = !mixin.attrs.is_empty() || !mixin.attribute_blocks.is_empty();
        if mixin.block.is_some() || has_attrs {
            self.push(format!("{name}.call({{"));
            if let Some(block) = &mixin.block {
                self.push("block: function(){");
                // The caller's indent is applied at render time.
                self.parent_indents += 1;
                let indents = std::mem::take(&mut self.indents);
                let result = self.visit_block(block);
                self.indents = indents;
                self.parent_indents -= 1;
                result?;
                self.push(if has_attrs { "}," } else { "}" });
            }

            if let Some(attributes) = self.attribute_object(&mixin.attrs, &mixin.attribute_blocks)
            {
                self.push(format!("attributes: {attributes}"));
            }

            if args.is_empty() {
                self.push("});");
            } else {
                self.push(format!("}}, {args});"));
            }
        } else {
            self.push(format!("{name}({args});"));
        }
        if self.pretty.is_some() {
            self.push("pug_indent.pop();");
        }
        Ok(())
    }

    /// The `attributes` value passed to a mixin, if it has any.
    fn attribute_object(
        &mut self,
        attrs: &[Attribute],
        blocks: &[AttributeBlock],
    ) -> Option<String> {
        if blocks.is_empty() {
            return (!attrs.is_empty()).then(|| self.attrs(attrs, AttrFormat::Object));
        }
        let sources = self.attribute_sources(attrs, blocks);
        Some(self.merged(sources))
    }

    fn visit_mixin_declaration(&mut self, mixin: &Mixin, name: &str, args: &str) -> PugResult<()> {
        let start = self.buf.len();
        let mut params: Vec<&str> = if args.is_empty() {
            Vec::new()
        } else {
            args.split(',').collect()
        };
        let rest = params
            .last()
            .and_then(|last| last.trim().strip_prefix("..."))
            .map(str::to_string);
        if rest.is_some() {
            params.pop();
        }
        self.push(format!("{name} = pug_interp = function({}){{", params.join(",")));
        self.push("var block = (this && this.block), attributes = (this && this.attributes) || {};");
        if let Some(rest) = rest {
            self.push(format!("var {rest} = [];"));
            self.push(format!(
                "for (pug_interp = {}; pug_interp < arguments.length; pug_interp++) {{",
                params.len()
            ));
            self.push(format!("  {rest}.push(arguments[pug_interp]);"));
            self.push("}");
        }
        self.parent_indents += 1;
        let result = match &mixin.block {
            Some(block) => self.visit_block(block),
            None => Ok(()),
        };
        self.parent_indents -= 1;
        result?;
        self.push("};");
        let end = self.buf.len();
        self.mixins
            .entry(mixin.name.clone())
            .or_default()
            .instances
            .push(start..end);
        Ok(())
    }

    fn visit_tag(&mut self, tag: &Tag, interpolated: bool) -> PugResult<()> {
        self.indents += 1;
        let sensitive = !interpolated && WHITESPACE_SENSITIVE.contains(&tag.name.as_str());
        if sensitive {
            self.escape_pretty = true;
        }

        if !self.has_compiled_tag {
            if !self.has_compiled_doctype && !interpolated && tag.name == "html" {
                self.visit_doctype(None);
            }
            self.has_compiled_tag = true;
        }

        let pretty = self.pretty.is_some();
        if pretty && !tag.is_inline {
            self.pretty_indent(0, true);
        }
        let void = !interpolated && VOID_ELEMENTS.contains(&tag.name.as_str());
        if tag.self_closing || (!self.xml && void) {
            self.buffer("<");
            self.buffer_tag_name(tag, interpolated);
            self.visit_attributes(&tag.attrs, &tag.attribute_blocks);
            if self.terse && !tag.self_closing {
                self.buffer(">");
            } else {
                self.buffer("/>");
            }
            let has_content = tag
                .block
                .nodes
                .iter()
                .any(|node| !matches!(node, Node::Text(text) if text.val.trim().is_empty()));
            if has_content {
                return Err(PugError::at_node(
                    ErrorCode::SelfClosingContent,
                    format!(
                        "{name} is a self closing element: <{name}/> but contains nested content.",
                        name = tag.name
                    ),
                    &tag.loc,
                ));
            }
        } else {
            self.buffer("<");
            self.buffer_tag_name(tag, interpolated);
            self.visit_attributes(&tag.attrs, &tag.attribute_blocks);
            self.buffer(">");
            self.visit_block(&tag.block)?;
            if pretty && !tag.is_inline && !sensitive && !tag_can_inline(tag) {
                self.pretty_indent(0, true);
            }
            self.buffer("</");
            self.buffer_tag_name(tag, interpolated);
            self.buffer(">");
        }

        if sensitive {
            self.escape_pretty = false;
        }
        self.indents -= 1;
        Ok(())
    }

    fn buffer_tag_name(&mut self, tag: &Tag, interpolated: bool) {
        if interpolated {
            self.buffer_expression(&tag.name);
        } else {
            self.buffer(&tag.name);
        }
    }

    fn visit_attributes(&mut self, attrs: &[Attribute], blocks: &[AttributeBlock]) {
        if !blocks.is_empty() {
            let sources = self.attribute_sources(attrs, blocks);
            let merged = self.merged(sources);
            let expr = format!("{}({merged}, {})", self.runtime(Helper::Attrs), self.terse);
            self.buffer_expression(&expr);
        } else if !attrs.is_empty() {
            let html = self.attrs(attrs, AttrFormat::Html);
            self.buffer_expression(&html);
        }
    }

    /// The `&attributes` expressions, preceded by the static attributes as
    /// an object when there are any.
    fn attribute_sources(&mut self, attrs: &[Attribute], blocks: &[AttributeBlock]) -> Vec<String> {
        let mut sources = Vec::with_capacity(blocks.len() + 1);
        if !attrs.is_empty() {
            sources.push(self.attrs(attrs, AttrFormat::Object));
        }
        sources.extend(blocks.iter().map(|block| block.val.clone()));
        sources
    }

    /// One attribute object from several.
    fn merged(&mut self, sources: Vec<String>) -> String {
        match <[String; 1]>::try_from(sources) {
            Ok([single]) => single,
            Err(sources) => format!("{}([{}])", self.runtime(Helper::Merge), sources.join(",")),
        }
    }

    fn attrs(&mut self, attrs: &[Attribute], format: AttrFormat) -> String {
        let terse = self.terse;
        compile_attrs(attrs, terse, format, self)
    }

    fn visit_comment(&mut self, comment: &Comment) {
        if !comment.buffer {
            return;
        }
        self.pretty_indent(1, true);
        self.buffer(&format!("<!--{}-->", comment.val));
    }

    fn visit_block_comment(&mut self, comment: &BlockComment) -> PugResult<()> {
        if !comment.buffer {
            return Ok(());
        }
        self.pretty_indent(1, true);
        self.buffer(&format!("<!--{}", comment.val));
        self.visit_block(&comment.block)?;
        self.pretty_indent(1, true);
        self.buffer("-->");
        Ok(())
    }

    fn visit_code(&mut self, code: &Code) -> PugResult<()> {
        if code.buffer {
            if let Some(text) = self.constant_text(code.val.trim()) {
                if code.must_escape {
                    self.buffer(&native::escape_html(&text));
                } else {
                    self.buffer(&text);
                }
            } else {
                let mut val = format!(
                    "null == (pug_interp = {}) ? \"\" : pug_interp",
                    code.val.trim()
                );
                if code.must_escape {
                    val = format!("{}({val})", self.runtime(Helper::Escape));
                }
                self.buffer_expression(&val);
            }
        } else {
            self.push(code.val.clone());
        }

        // Unbuffered code with a block is flow control: brace the block.
        if let Some(block) = &code.block {
            if !code.buffer {
                self.push("{");
            }
            self.visit_block(block)?;
            if !code.buffer {
                self.push("}");
            }
        }
        Ok(())
    }

    fn visit_conditional(&mut self, cond: &Conditional) -> PugResult<()> {
        self.push(format!("if ({}) {{", cond.test));
        self.visit_block(&cond.consequent)?;
        self.push("}");
        match cond.alternate.as_deref() {
            Some(Alternate::ElseIf(next)) => {
                self.push("else");
                ensure_sufficient_stack(|| self.visit_conditional(next))?;
            }
            Some(Alternate::Else(block)) => {
                self.push("else {");
                self.visit_block(block)?;
                self.push("}");
            }
            None => {}
        }
        Ok(())
    }

    fn visit_while(&mut self, w: &While) -> PugResult<()> {
        self.push(format!("while ({}) {{", w.test));
        self.visit_block(&w.block)?;
        self.push("}");
        Ok(())
    }

    /// Arrays and array-likes iterate by index; anything else by key.
    /// The body is emitted once for each form.
    fn visit_each(&mut self, each: &Each) -> PugResult<()> {
        let index = match &each.key {
            Some(key) => key.clone(),
            None => format!("pug_index{}", self.each_count),
        };
        self.each_count += 1;
        let (obj, val) = (&each.obj, &each.val);

        self.push(format!(
            "// iterate {obj}\n;(function(){{\n  var $$obj = {obj};\n  if ('number' == typeof $$obj.length) {{"
        ));
        if each.alternate.is_some() {
            self.push("    if ($$obj.length) {");
        }
        self.push(format!(
            "      for (var {index} = 0, $$l = $$obj.length; {index} < $$l; {index}++) {{\n        var {val} = $$obj[{index}];"
        ));
        self.visit_block(&each.block)?;
        self.push("      }");
        if let Some(alternate) = &each.alternate {
            self.push("    } else {");
            self.visit_block(alternate)?;
            self.push("    }");
        }

        self.push(format!(
            "  }} else {{\n    var $$l = 0;\n    for (var {index} in $$obj) {{\n      $$l++;\n      var {val} = $$obj[{index}];"
        ));
        self.visit_block(&each.block)?;
        self.push("    }");
        if let Some(alternate) = &each.alternate {
            self.push("    if ($$l === 0) {");
            self.visit_block(alternate)?;
            self.push("    }");
        }
        self.push("  }\n}).call(this);\n");
        Ok(())
    }

    fn visit_each_of(&mut self, each: &EachOf) -> PugResult<()> {
        self.push(format!(
            "// iterate {obj}\nfor (const {val} of {obj}) {{\n",
            obj = each.obj,
            val = each.val
        ));
        self.visit_block(&each.block)?;
        self.push("}\n");
        Ok(())
    }
}

impl AttrContext for Generator<'_> {
    fn runtime(&mut self, helper: Helper) -> String {
        Generator::runtime(self, helper)
    }

    fn constant(&mut self, src: &str) -> Option<Value> {
        Generator::constant(self, src)
    }
}

/// Whether every child renders inline, so the closing tag needs no indent.
fn tag_can_inline(tag: &Tag) -> bool {
    fn is_inline(node: &Node) -> bool {
        match node {
            Node::Block(block) => block.nodes.iter().all(is_inline),
            // An unused yield in a template compiled on its own.
            Node::YieldBlock(_) => true,
            Node::Text(text) => !text.val.contains('\n'),
            Node::Tag(tag) | Node::InterpolatedTag(tag) => tag.is_inline,
            Node::Code(code) => code.is_inline,
            _ => false,
        }
    }
    tag.block.nodes.iter().all(is_inline)
}

/// `{"file":"source",...}` in insertion order.
fn sources_literal(sources: &[(String, String)]) -> String {
    let entries: Vec<String> = sources
        .iter()
        .map(|(file, src)| format!("{}:{}", stringify_str(file), stringify_str(src)))
        .collect();
    format!("{{{}}}", entries.join(","))
}

#[cold]
fn unprocessed(node: &Node) -> PugError {
    let pass = match node {
        Node::Filter(_) => "filter",
        _ => "link",
    };
    PugError::at_node(
        ErrorCode::UnprocessedNode,
        format!(
            "A {} node is not supported by the code generator. Run the {pass} pass on this tree first.",
            node.kind_name()
        ),
        node.loc(),
    )
}

#[cfg(test)]
mod tests;
