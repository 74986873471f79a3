#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use pug_diagnostic::ErrorCode;
use pug_ir::{Block, Filter, Node, SourceLoc};
use pug_lexer::{lex, LexerOptions};
use pug_parse::{parse, ParseOptions};

use crate::runtime::Helper;
use crate::{generate, CodeGenOptions, Indent};

const OPEN: &str = "function template(locals) {var pug_html = \"\", pug_mixins = {}, pug_interp;";
const CLOSE: &str = ";return pug_html;}";

fn parse_src(src: &str, filename: Option<&str>) -> Block {
    let mut lexer_options = LexerOptions::default();
    let mut parse_options = ParseOptions {
        src: Some(Arc::from(src)),
        ..ParseOptions::default()
    };
    if let Some(filename) = filename {
        lexer_options = lexer_options.with_filename(filename);
        parse_options.filename = Some(Arc::from(filename));
    }
    let tokens = lex(src, &lexer_options).unwrap_or_else(|err| panic!("{src:?}:\n{err}"));
    parse(tokens, &parse_options).unwrap_or_else(|err| panic!("{src:?}:\n{err}"))
}

fn quiet() -> CodeGenOptions {
    CodeGenOptions {
        compile_debug: false,
        ..CodeGenOptions::default()
    }
}

fn compile_with(src: &str, options: &CodeGenOptions) -> String {
    generate(&parse_src(src, None), options).unwrap_or_else(|err| panic!("{src:?}:\n{err}"))
}

/// `js` with the markup escapes in string literals decoded, for reading.
fn readable(js: &str) -> String {
    js.replace("\\u003C", "<")
        .replace("\\u003E", ">")
        .replace("\\u002F", "/")
}

/// The statements inside the locals wrapper, without debug instrumentation.
fn body(src: &str) -> String {
    body_with(src, &quiet())
}

fn body_with(src: &str, options: &CodeGenOptions) -> String {
    let js = compile_with(src, options);
    let inner = js
        .strip_prefix(OPEN)
        .and_then(|rest| rest.strip_suffix(CLOSE))
        .and_then(|rest| rest.strip_prefix("with (locals || {}) {"))
        .and_then(|rest| rest.strip_suffix('}'))
        .unwrap_or_else(|| panic!("unexpected wrapper: {js}"));
    readable(inner)
}

#[test]
fn static_markup_is_one_statement() {
    assert_eq!(
        body("div\n  p Hello"),
        r#"pug_html = pug_html + "<div><p>Hello</p></div>";"#
    );
}

#[test]
fn conditionals() {
    assert_eq!(
        body("if x\n  p Yes\nelse\n  p No"),
        [
            "if (x) {",
            r#"pug_html = pug_html + "<p>Yes</p>";"#,
            "}",
            "else {",
            r#"pug_html = pug_html + "<p>No</p>";"#,
            "}",
        ]
        .join("\n")
    );
}

#[test]
fn buffered_code_joins_the_concatenation() {
    assert_eq!(
        body("p= name"),
        r#"pug_html = pug_html + "<p>" + (pug.escape(null == (pug_interp = name) ? "" : pug_interp)) + "</p>";"#
    );
}

#[test]
fn constant_code_is_written_as_text() {
    assert_eq!(body("p= 1 + 2"), r#"pug_html = pug_html + "<p>3</p>";"#);
    assert_eq!(body("p= null"), r#"pug_html = pug_html + "<p></p>";"#);
    assert_eq!(
        body("p a #{'&'} b"),
        r#"pug_html = pug_html + "<p>a &amp; b</p>";"#
    );
}

#[test]
fn constant_code_is_escaped_unless_raw() {
    assert_eq!(body("p= '<b>'"), r#"pug_html = pug_html + "<p>&lt;b&gt;</p>";"#);
    assert_eq!(body("p!= '<b>'"), r#"pug_html = pug_html + "<p><b></p>";"#);
}

#[test]
fn folded_code_needs_no_runtime() {
    let options = CodeGenOptions {
        inline_runtime_functions: true,
        ..quiet()
    };
    let js = compile_with("p= 'x' + 1", &options);
    assert!(js.starts_with(OPEN), "{js}");
    assert!(!js.contains("pug_escape"), "{js}");
}

#[test]
fn constant_attributes_fold_into_text() {
    assert_eq!(
        body("a(href='/x' class=['a', 'b'])"),
        r#"pug_html = pug_html + "<a class=\"a b\" href=\"/x\"></a>";"#
    );
}

#[test]
fn dynamic_attributes_call_the_runtime() {
    assert_eq!(
        body("a(href=url)"),
        r#"pug_html = pug_html + "<a" + (pug.attr("href", url, true, false)) + "></a>";"#
    );
}

#[test]
fn attribute_blocks_merge() {
    assert_eq!(
        body("div&attributes(extra)"),
        r#"pug_html = pug_html + "<div" + (pug.attrs(extra, false)) + "></div>";"#
    );
    assert_eq!(
        body("div(id='a')&attributes(extra)"),
        r#"pug_html = pug_html + "<div" + (pug.attrs(pug.merge([{"id":"a"},extra]), false)) + "></div>";"#
    );
}

#[test]
fn html5_doctype_is_terse() {
    assert_eq!(
        body("doctype html\ninput(checked)"),
        r#"pug_html = pug_html + "<!DOCTYPE html><input checked>";"#
    );
    assert_eq!(
        body("input(checked)"),
        r#"pug_html = pug_html + "<input checked=\"checked\"/>";"#
    );
}

#[test]
fn xml_doctype_has_no_void_elements() {
    assert_eq!(
        body("doctype xml\nbr"),
        r#"pug_html = pug_html + "<?xml version=\"1.0\" encoding=\"utf-8\" ?><br></br>";"#
    );
}

#[test]
fn custom_doctypes() {
    assert_eq!(
        body("doctype foo bar"),
        r#"pug_html = pug_html + "<!DOCTYPE foo bar>";"#
    );
}

#[test]
fn leading_html_tag_writes_the_configured_doctype() {
    let options = CodeGenOptions {
        doctype: Some("html".to_string()),
        ..quiet()
    };
    assert_eq!(
        body_with("html", &options),
        r#"pug_html = pug_html + "<!DOCTYPE html><html></html>";"#
    );
    assert_eq!(
        body("html"),
        r#"pug_html = pug_html + "<html></html>";"#
    );
}

#[test]
fn explicit_self_closing() {
    assert_eq!(
        body("foo/"),
        r#"pug_html = pug_html + "<foo/>";"#
    );
}

#[test]
fn void_element_with_content_is_an_error() {
    let err = generate(&parse_src("img text", None), &quiet()).unwrap_err();
    assert_eq!(err.code, ErrorCode::SelfClosingContent);
    assert_eq!(
        err.message,
        "img is a self closing element: <img/> but contains nested content."
    );
    assert_eq!(err.line, 1);
}

#[test]
fn each_loops_over_arrays_and_objects() {
    let item = r#"pug_html = pug_html + "<p>x</p>";"#;
    assert_eq!(
        body("each v in list\n  p x"),
        [
            "// iterate list\n;(function(){\n  var $$obj = list;\n  if ('number' == typeof $$obj.length) {",
            "      for (var pug_index0 = 0, $$l = $$obj.length; pug_index0 < $$l; pug_index0++) {\n        var v = $$obj[pug_index0];",
            item,
            "      }",
            "  } else {\n    var $$l = 0;\n    for (var pug_index0 in $$obj) {\n      $$l++;\n      var v = $$obj[pug_index0];",
            item,
            "    }",
            "  }\n}).call(this);\n",
        ]
        .join("\n")
    );
}

#[test]
fn each_with_key_and_alternate() {
    let js = body("each v, k in obj\n  p x\nelse\n  p none");
    assert!(js.contains("for (var k = 0, $$l = $$obj.length; k < $$l; k++)"), "{js}");
    assert!(js.contains("    if ($$obj.length) {"), "{js}");
    assert!(js.contains("    if ($$l === 0) {"), "{js}");
    assert_eq!(js.matches("none").count(), 2);
}

#[test]
fn case_statements() {
    assert_eq!(
        body("case x\n  when 1\n    p one\n  default\n    p other"),
        [
            "switch (x){",
            "case 1:",
            r#"pug_html = pug_html + "<p>one</p>";"#,
            "  break;",
            "default:",
            r#"pug_html = pug_html + "<p>other</p>";"#,
            "  break;",
            "}",
        ]
        .join("\n")
    );
}

#[test]
fn unused_mixins_are_blanked() {
    assert_eq!(
        body("mixin foo\n  p x\np y"),
        "\n\n\n\npug_html = pug_html + \"<p>y</p>\";"
    );
}

#[test]
fn only_called_mixins_are_kept() {
    let js = body("mixin used\n  p a\nmixin unused\n  p b\n+used");
    assert!(js.contains(r#"pug_mixins["used"] = pug_interp = function("#), "{js}");
    assert!(!js.contains(r#"pug_mixins["unused"]"#), "{js}");
    assert!(!js.contains("<p>b</p>"), "{js}");
}

#[test]
fn dynamic_mixin_calls_keep_every_mixin() {
    let js = body("mixin a\n  p a\nmixin b\n  p b\n+#{'a'}");
    assert!(js.contains(r#"pug_mixins["a"] = pug_interp = function("#), "{js}");
    assert!(js.contains(r#"pug_mixins["b"] = pug_interp = function("#), "{js}");
}

#[test]
fn mixin_rest_parameters() {
    assert_eq!(
        body("mixin foo(a, ...rest)\n  p= a\n+foo(1, 2)"),
        [
            r#"pug_mixins["foo"] = pug_interp = function(a){"#,
            "var block = (this && this.block), attributes = (this && this.attributes) || {};",
            "var rest = [];",
            "for (pug_interp = 1; pug_interp < arguments.length; pug_interp++) {",
            "  rest.push(arguments[pug_interp]);",
            "}",
            r#"pug_html = pug_html + "<p>" + (pug.escape(null == (pug_interp = a) ? "" : pug_interp)) + "</p>";"#,
            "};",
            r#"pug_mixins["foo"](1, 2);"#,
        ]
        .join("\n")
    );
}

#[test]
fn mixin_calls_pass_block_and_attributes() {
    assert_eq!(
        body("+box(class='x')\n  p y"),
        [
            r#"pug_mixins["box"].call({"#,
            "block: function(){",
            r#"pug_html = pug_html + "<p>y</p>";"#,
            "},",
            r#"attributes: {"class":"x"}"#,
            "});",
        ]
        .join("\n")
    );
}

#[test]
fn buffered_comments_only() {
    assert_eq!(
        body("// hi\n//- hidden\np"),
        r#"pug_html = pug_html + "<!-- hi--><p></p>";"#
    );
}

#[test]
fn pretty_output_indents_nested_tags() {
    let options = CodeGenOptions {
        pretty: Some(Indent::default()),
        ..quiet()
    };
    assert_eq!(
        body_with("div\n  p a\n  p b", &options),
        [
            "var pug_indent = [];",
            r#"pug_html = pug_html + "\n<div>\n  <p>a</p>\n  <p>b</p>\n</div>";"#,
        ]
        .join("\n")
    );
}

#[test]
fn indent_units_must_be_whitespace() {
    assert_eq!(Indent::new("\t").map(|i| i.as_str().to_string()), Some("\t".to_string()));
    assert_eq!(Indent::new(""), None);
    assert_eq!(Indent::new(" x"), None);
}

#[test]
fn inlined_runtime_precedes_the_function() {
    let options = CodeGenOptions {
        inline_runtime_functions: true,
        ..quiet()
    };
    let js = compile_with("p= x", &options);
    let helpers = format!("{}\n{}", Helper::Escape.source(), Helper::MatchHtml.source());
    assert!(js.starts_with(&format!("{helpers}{OPEN}")), "{js}");
    assert!(js.contains("pug_escape(null == (pug_interp = x)"), "{js}");
}

#[test]
fn debug_instrumentation_tracks_lines() {
    let js = compile_with("p Hi", &CodeGenOptions::default());
    assert!(
        js.starts_with(&format!(
            "{OPEN}var pug_debug_filename, pug_debug_line;try {{with (locals || {{}}) {{;pug_debug_line = 1;\n"
        )),
        "{js}"
    );
    assert!(
        js.ends_with(&format!(
            "}}}} catch (err) {{pug.rethrow(err, pug_debug_filename, pug_debug_line);}}{CLOSE}"
        )),
        "{js}"
    );
}

#[test]
fn debug_sources_are_embedded() {
    let options = CodeGenOptions {
        inline_runtime_functions: true,
        include_sources: Some(vec![("a.pug".to_string(), "p Hi".to_string())]),
        ..CodeGenOptions::default()
    };
    let js = generate(&parse_src("p Hi", Some("a.pug")), &options).unwrap();
    assert!(js.starts_with(Helper::Rethrow.source()), "{js}");
    assert!(
        js.contains(r#";pug_debug_line = 1;pug_debug_filename = "a.pug";"#),
        "{js}"
    );
    assert!(
        js.contains("var pug_debug_sources = {\"a.pug\":\"p Hi\"};\nwith (locals || {}) {"),
        "{js}"
    );
    assert!(
        js.contains(
            "pug_rethrow(err, pug_debug_filename, pug_debug_line, pug_debug_sources[pug_debug_filename]);"
        ),
        "{js}"
    );
}

#[test]
fn self_locals_and_template_name() {
    let options = CodeGenOptions {
        self_locals: true,
        template_name: "render".to_string(),
        ..quiet()
    };
    assert_eq!(
        readable(&compile_with("p= self.x", &options)),
        r#"function render(locals) {var pug_html = "", pug_mixins = {}, pug_interp;var self = locals || {};pug_html = pug_html + "<p>" + (pug.escape(null == (pug_interp = self.x) ? "" : pug_interp)) + "</p>";;return pug_html;}"#
    );
}

#[test]
fn filters_must_be_applied_first() {
    let filter = Node::Filter(Filter {
        name: "markdown".to_string(),
        attrs: Vec::new(),
        block: Block::default(),
        loc: SourceLoc::new(3, 1, None),
    });
    let ast = Block::with_nodes(vec![filter], SourceLoc::new(1, 1, None));
    let err = generate(&ast, &quiet()).unwrap_err();
    assert_eq!(err.code, ErrorCode::UnprocessedNode);
    assert_eq!(err.line, 3);
    assert!(err.message.contains("filter pass"), "{}", err.message);
}
