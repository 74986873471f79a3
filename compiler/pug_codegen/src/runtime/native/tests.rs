#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn s(text: &str) -> Value {
    Value::string(text)
}

fn obj(entries: &[(&str, Value)]) -> Value {
    Value::Object(entries.iter().map(|(k, v)| (*k, v.clone())).collect())
}

#[test]
fn escape_leaves_clean_values_alone() {
    assert_eq!(escape(&Value::Number(3.0)), Some(Value::Number(3.0)));
    assert_eq!(escape(&s("a < \"b\" & c")), Some(s("a &lt; &quot;b&quot; &amp; c")));
    assert_eq!(escape(&Value::Array(vec![s("<"), s(">")])), Some(s("&lt;,&gt;")));
}

#[test]
fn style_from_strings_and_objects() {
    assert_eq!(style(&Value::Null).unwrap(), "");
    assert_eq!(style(&s("color:red")).unwrap(), "color:red");
    let value = obj(&[("color", s("red")), ("width", Value::Number(10.0))]);
    assert_eq!(style(&value).unwrap(), "color:red;width:10;");
}

#[test]
fn classes_from_each_shape() {
    let nested = Value::Array(vec![
        s("a"),
        Value::Null,
        Value::Array(vec![s("b"), s("c")]),
        obj(&[("d", Value::Bool(true)), ("e", Value::Bool(false))]),
    ]);
    assert_eq!(classes(&nested, &Value::Undefined), Some(s("a b c d")));
    assert_eq!(classes(&Value::Bool(false), &Value::Undefined), Some(s("")));
    assert_eq!(classes(&Value::Number(5.0), &Value::Undefined), Some(Value::Number(5.0)));
}

#[test]
fn classes_escape_selected_items() {
    let list = Value::Array(vec![s("<a>"), s("<b>")]);
    let escaping = Value::Array(vec![Value::Bool(false), Value::Bool(true)]);
    assert_eq!(classes(&list, &escaping), Some(s("<a> &lt;b&gt;")));
}

#[test]
fn attr_rendering() {
    assert_eq!(attr("href", &s("/a?b&c"), true, true).unwrap(), " href=\"/a?b&amp;c\"");
    assert_eq!(attr("checked", &Value::Bool(true), false, true).unwrap(), " checked");
    assert_eq!(
        attr("checked", &Value::Bool(true), false, false).unwrap(),
        " checked=\"checked\""
    );
    assert_eq!(attr("x", &Value::Bool(false), true, true).unwrap(), "");
    assert_eq!(attr("x", &Value::Null, true, true).unwrap(), "");
    assert_eq!(attr("class", &s(""), true, true).unwrap(), "");
    assert_eq!(attr("data-n", &Value::Number(0.0), true, true).unwrap(), " data-n=\"0\"");
    assert_eq!(
        attr("data-o", &obj(&[("k", s("it's"))]), false, true).unwrap(),
        " data-o='{\"k\":\"it&#39;s\"}'"
    );
    assert_eq!(
        attr("data-o", &obj(&[("k", s("v"))]), true, true).unwrap(),
        " data-o=\"{&quot;k&quot;:&quot;v&quot;}\""
    );
}

#[test]
fn attrs_put_class_first() {
    let value = obj(&[
        ("id", s("x")),
        ("class", Value::Array(vec![s("a"), s("b")])),
        ("style", obj(&[("color", s("red"))])),
        ("hidden", Value::Bool(true)),
    ]);
    assert_eq!(
        attrs(&value, true).unwrap(),
        " class=\"a b\" id=\"x\" style=\"color:red;\" hidden"
    );
}

#[test]
fn merge_accumulates_classes_and_styles() {
    let a = obj(&[("class", s("a")), ("style", s("color:red")), ("id", s("x"))]);
    let b = obj(&[("class", Value::Array(vec![s("b")])), ("style", s("width:1px")), ("id", s("y"))]);
    assert_eq!(
        merge(&a, &b),
        Some(obj(&[
            ("class", Value::Array(vec![s("a"), s("b")])),
            ("style", s("color:red;width:1px;")),
            ("id", s("y")),
        ]))
    );
}

#[test]
fn natives_fold_through_the_runtime_object() {
    let pug = runtime_object();
    let Some(Value::Function(merge)) = pug.get("merge") else {
        panic!("merge missing");
    };
    let list = Value::Array(vec![obj(&[("a", s("1"))]), obj(&[("b", s("2"))])]);
    assert_eq!(
        merge.call(&[list]),
        Some(obj(&[("a", s("1")), ("b", s("2"))]))
    );
    let Some(Value::Function(rethrow)) = pug.get("rethrow") else {
        panic!("rethrow missing");
    };
    assert_eq!(rethrow.call(&[]), None);
    assert_eq!(pug.len(), Helper::PUBLIC.len());
}
