#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::value::Object;
use crate::NativeFunction;
use pretty_assertions::assert_eq;

fn s(text: &str) -> Value {
    Value::string(text)
}

fn num(n: f64) -> Value {
    Value::Number(n)
}

fn strings(items: &[&str]) -> Value {
    Value::Array(items.iter().map(|item| s(item)).collect())
}

fn re(pattern: &str, flags: &str) -> Value {
    Value::Regex(RegExp::new(pattern, flags))
}

fn call(receiver: &str, name: &str, args: &[Value]) -> Option<Value> {
    call_method(&s(receiver), name, args)
}

#[test]
fn split_on_strings() {
    assert_eq!(call("a,b,,c", "split", &[s(",")]), Some(strings(&["a", "b", "", "c"])));
    assert_eq!(call("a,b,c", "split", &[s(","), num(2.0)]), Some(strings(&["a", "b"])));
    assert_eq!(call("abc", "split", &[s("")]), Some(strings(&["a", "b", "c"])));
    assert_eq!(call("abc", "split", &[]), Some(strings(&["abc"])));
    assert_eq!(call("abc", "split", &[s(","), num(0.0)]), Some(strings(&[])));
}

#[test]
fn split_on_patterns() {
    assert_eq!(call("a1b22c", "split", &[re(r"\d+", "")]), Some(strings(&["a", "b", "c"])));
    assert_eq!(
        call("a1b2c", "split", &[re(r"(\d)", "")]),
        Some(strings(&["a", "1", "b", "2", "c"]))
    );
    assert_eq!(call("ab", "split", &[re("", "")]), Some(strings(&["a", "b"])));
    assert_eq!(call("", "split", &[re("x", "")]), Some(strings(&[""])));
    assert_eq!(call("a1b2c", "split", &[re(r"\d", ""), num(2.0)]), Some(strings(&["a", "b"])));
}

#[test]
fn substrings() {
    assert_eq!(call("hello", "substr", &[num(1.0), num(3.0)]), Some(s("ell")));
    assert_eq!(call("hello", "substr", &[num(-3.0)]), Some(s("llo")));
    assert_eq!(call("Hello", "slice", &[num(-3.0), num(-1.0)]), Some(s("ll")));
    assert_eq!(call("hello", "substring", &[num(4.0), num(1.0)]), Some(s("ell")));
    assert_eq!(call("abc", "charAt", &[num(1.0)]), Some(s("b")));
    assert_eq!(call("abc", "charAt", &[num(7.0)]), Some(s("")));
    assert!(matches!(
        call("abc", "charCodeAt", &[num(5.0)]),
        Some(Value::Number(n)) if n.is_nan()
    ));
    assert_eq!(call("abc", "charCodeAt", &[]), Some(num(97.0)));
}

#[test]
fn searching() {
    assert_eq!(call("canal", "lastIndexOf", &[s("a")]), Some(num(3.0)));
    assert_eq!(call("canal", "lastIndexOf", &[s("a"), num(2.0)]), Some(num(1.0)));
    assert_eq!(call("canal", "lastIndexOf", &[s("x")]), Some(num(-1.0)));
    assert_eq!(call("canal", "indexOf", &[s("a"), num(2.0)]), Some(num(3.0)));
    assert_eq!(call("abc", "search", &[re("c", "")]), Some(num(2.0)));
    assert_eq!(call("abc", "includes", &[s("bc")]), Some(Value::Bool(true)));
    assert_eq!(call("abc", "startsWith", &[s("b"), num(1.0)]), Some(Value::Bool(true)));
    assert_eq!(call("abc", "endsWith", &[s("b"), num(2.0)]), Some(Value::Bool(true)));
    // A pattern where a string is expected throws at run time.
    assert_eq!(call("abc", "includes", &[re("b", "")]), None);
}

#[test]
fn search_reports_utf16_offsets() {
    assert_eq!(call("\u{e9}\u{1f600}x", "search", &[re("x", "")]), Some(num(3.0)));
    assert_eq!(call("abc", "search", &[re("z", "")]), Some(num(-1.0)));
}

#[test]
fn matching() {
    assert_eq!(call("a1b2", "match", &[re(r"\d", "g")]), Some(strings(&["1", "2"])));
    assert_eq!(call("a1", "match", &[re(r"(\d)", "")]), Some(strings(&["1", "1"])));
    assert_eq!(call("ab", "match", &[re(r"\d", "g")]), Some(Value::Null));
    assert_eq!(
        call_method(&re("a+", ""), "test", &[s("caat")]),
        Some(Value::Bool(true))
    );
    assert_eq!(
        call_method(&re("(x)?a", ""), "exec", &[s("a")]),
        Some(Value::Array(vec![s("a"), Value::Undefined]))
    );
}

#[test]
fn replacing() {
    assert_eq!(call("abc", "replace", &[s("b"), s("[$&]")]), Some(s("a[b]c")));
    assert_eq!(call("aaa", "replace", &[re("a", "g"), s("b")]), Some(s("bbb")));
    assert_eq!(call("aaa", "replace", &[re("a", ""), s("b")]), Some(s("baa")));
    assert_eq!(
        call("John Smith", "replace", &[re(r"(\w+)\s(\w+)", ""), s("$2, $1")]),
        Some(s("Smith, John"))
    );
    assert_eq!(call("abc", "replace", &[s("b"), s("$`$'")]), Some(s("aacc")));
    assert_eq!(call("abc", "replace", &[s("x"), s("y")]), Some(s("abc")));
}

#[test]
fn padding_and_repetition() {
    assert_eq!(call("5", "padStart", &[num(3.0), s("0")]), Some(s("005")));
    assert_eq!(call("ab", "padEnd", &[num(5.0), s("xy")]), Some(s("abxyx")));
    assert_eq!(call("abc", "padStart", &[num(2.0)]), Some(s("abc")));
    assert_eq!(call("ab", "repeat", &[num(3.0)]), Some(s("ababab")));
    assert_eq!(call("a", "repeat", &[num(-1.0)]), None);
    assert_eq!(call("ab", "repeat", &[num(1e9)]), None);
}

#[test]
fn case_and_whitespace() {
    assert_eq!(call("Ab", "toUpperCase", &[]), Some(s("AB")));
    assert_eq!(call("Ab", "toLowerCase", &[]), Some(s("ab")));
    assert_eq!(call("  hi \n", "trim", &[]), Some(s("hi")));
    assert_eq!(call("abc", "normalize", &[]), Some(s("abc")));
    assert_eq!(call("e\u{301}", "normalize", &[]), None);
    assert_eq!(call("abc", "normalize", &[s("XYZ")]), None);
}

#[test]
fn number_and_boolean_methods() {
    assert_eq!(call_method(&num(1.005), "toFixed", &[num(2.0)]), Some(s("1.00")));
    assert_eq!(call_method(&num(255.0), "toString", &[num(16.0)]), Some(s("ff")));
    assert_eq!(call_method(&num(12.5), "toString", &[num(2.0)]), None);
    assert_eq!(call_method(&num(1234.5), "toPrecision", &[num(2.0)]), Some(s("1.2e+3")));
    assert_eq!(call_method(&Value::Bool(true), "toString", &[]), Some(s("true")));
    assert_eq!(call_method(&Value::Bool(true), "valueOf", &[]), None);
}

#[test]
fn unknown_methods_are_not_called() {
    assert_eq!(call("abc", "constructor", &[]), None);
    assert_eq!(call("abc", "localeCompare", &[s("b")]), None);
    assert_eq!(call_method(&Value::Null, "toString", &[]), None);
}

#[test]
fn function_properties() {
    let double = NativeFunction::new("double", |args| {
        Some(Value::Number(args.first()?.to_number()? * 2.0))
    });
    let mut obj = Object::new();
    obj.insert("double", Value::Function(double));
    obj.insert("_hidden", Value::Function(NativeFunction::new("h", |_| Some(Value::Null))));
    obj.insert("plain", num(1.0));
    let obj = Value::Object(obj);
    assert_eq!(call_method(&obj, "double", &[num(4.0)]), Some(num(8.0)));
    assert_eq!(call_method(&obj, "_hidden", &[]), None);
    assert_eq!(call_method(&obj, "plain", &[]), None);
}
