#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::runtime::native::runtime_object;
use pretty_assertions::assert_eq;
use pug_eval::{ConstantEvaluator, Constants};
use pug_ir::{AttrValue, SourceLoc};

struct Context {
    evaluator: ConstantEvaluator,
}

impl AttrContext for Context {
    fn runtime(&mut self, helper: Helper) -> String {
        format!("pug.{}", helper.name())
    }

    fn constant(&mut self, src: &str) -> Option<Value> {
        self.evaluator.evaluate(src).cloned()
    }
}

fn attr(name: &str, src: &str, must_escape: bool) -> Attribute {
    Attribute {
        name: name.to_string(),
        val: AttrValue::Expr(src.to_string()),
        must_escape,
        loc: SourceLoc::default(),
    }
}

fn compile(attrs: &[Attribute], terse: bool, format: AttrFormat) -> String {
    let mut constants = Constants::new();
    constants.insert("pug", Value::Object(runtime_object()));
    let mut cx = Context {
        evaluator: ConstantEvaluator::with_constants(constants),
    };
    compile_attrs(attrs, terse, format, &mut cx)
}

#[test]
fn constant_attributes_render_to_one_literal() {
    let attrs = [attr("href", "'/a'", true), attr("title", "'x & y'", true)];
    assert_eq!(
        compile(&attrs, true, AttrFormat::Html),
        r#"" href=\"\u002Fa\" title=\"x &amp; y\"""#
    );
}

#[test]
fn empty_list() {
    assert_eq!(compile(&[], true, AttrFormat::Html), r#""""#);
    assert_eq!(compile(&[], true, AttrFormat::Object), "{}");
}

#[test]
fn boolean_attributes_follow_terse_mode() {
    let checked = Attribute {
        val: AttrValue::True,
        ..attr("checked", "", true)
    };
    assert_eq!(compile(&[checked.clone()], true, AttrFormat::Html), r#"" checked""#);
    assert_eq!(
        compile(&[checked], false, AttrFormat::Html),
        r#"" checked=\"checked\"""#
    );
}

#[test]
fn dynamic_values_call_attr() {
    let attrs = [attr("id", "'a'", true), attr("href", "url", true), attr("alt", "alt", false)];
    assert_eq!(
        compile(&attrs, true, AttrFormat::Html),
        r#"" id=\"a\""+pug.attr("href", url, true, true)+pug.attr("alt", alt, false, true)"#
    );
}

#[test]
fn classes_combine_and_come_first() {
    let attrs = [
        attr("id", "'x'", true),
        attr("class", "'a'", true),
        attr("class", "['b', 'c']", true),
    ];
    assert_eq!(
        compile(&attrs, true, AttrFormat::Html),
        r#"" class=\"a b c\" id=\"x\"""#
    );
}

#[test]
fn dynamic_classes_escape_constants_early() {
    let attrs = [attr("class", "'<a>'", true), attr("class", "extra", true)];
    assert_eq!(
        compile(&attrs, true, AttrFormat::Html),
        r#"pug.attr("class", pug.classes(["&lt;a&gt;",extra], [false,true]), false, true)"#
    );
}

#[test]
fn styles_fold_objects() {
    let attrs = [attr("style", "{color: 'red'}", true)];
    assert_eq!(
        compile(&attrs, true, AttrFormat::Html),
        r#"" style=\"color:red;\"""#
    );
    let attrs = [attr("style", "s", true)];
    assert_eq!(
        compile(&attrs, true, AttrFormat::Html),
        r#"pug.attr("style", pug.style(s), true, true)"#
    );
}

#[test]
fn object_format() {
    let attrs = [attr("class", "'a'", true), attr("href", "'<x>'", true), attr("n", "n", true)];
    assert_eq!(
        compile(&attrs, true, AttrFormat::Object),
        r#"{"class":"a","href":"&lt;x&gt;","n":pug.escape(n)}"#
    );
}
