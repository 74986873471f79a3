//! Native versions of the runtime helpers, for constant folding.
//!
//! Each function mirrors the script helper of the same name over
//! [`Value`]s. `None` means the call would not behave the same at render
//! time (or would throw), so the caller must not fold it.

use pug_eval::{NativeFunction, Object, Value};

use super::Helper;

/// The `pug` object visible to folded expressions.
///
/// `rethrow` is present so that references resolve, but never folds.
pub fn runtime_object() -> Object {
    Helper::PUBLIC
        .into_iter()
        .map(|helper| (helper.name(), Value::Function(native(helper))))
        .collect()
}

fn native(helper: Helper) -> NativeFunction {
    let name = helper.name();
    match helper {
        Helper::Merge => NativeFunction::new(name, |args| match args {
            [] => None,
            [list] => merge_all(list),
            [a, b, ..] => merge(a, b),
        }),
        Helper::Classes => NativeFunction::new(name, |args| {
            classes(arg(args, 0), arg(args, 1))
        }),
        Helper::Style => NativeFunction::new(name, |args| style(arg(args, 0)).map(Value::String)),
        Helper::Attr => NativeFunction::new(name, |args| {
            let key = arg(args, 0).to_js_string()?;
            attr(&key, arg(args, 1), arg(args, 2).is_truthy(), arg(args, 3).is_truthy())
                .map(Value::String)
        }),
        Helper::Attrs => NativeFunction::new(name, |args| {
            attrs(arg(args, 0), arg(args, 1).is_truthy()).map(Value::String)
        }),
        Helper::Escape => NativeFunction::new(name, |args| escape(arg(args, 0))),
        _ => NativeFunction::new(name, |_| None),
    }
}

fn arg(args: &[Value], i: usize) -> &Value {
    args.get(i).unwrap_or(&Value::Undefined)
}

/// HTML-escape `"`, `&`, `<` and `>`.
pub fn escape_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len() + 8);
    for c in html.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// `escape`: the value itself when its string form needs no escaping.
pub fn escape(value: &Value) -> Option<Value> {
    let html = value.to_js_string()?;
    if html.contains(['"', '&', '<', '>']) {
        Some(Value::String(escape_html(&html)))
    } else {
        Some(value.clone())
    }
}

/// `style`: objects become `key:value;` pairs, anything else its string.
pub fn style(value: &Value) -> Option<String> {
    if !value.is_truthy() {
        return Some(String::new());
    }
    if value.type_of() != "object" {
        return value.to_js_string();
    }
    let mut out = String::new();
    for (key, val) in value.own_entries() {
        out.push_str(&key);
        out.push(':');
        out.push_str(&val.to_js_string()?);
        out.push(';');
    }
    Some(out)
}

/// `classes`: a space-separated class list from an array (recursively),
/// the truthy keys of an object, or any other value as is.
///
/// For arrays, `escaping` may be an array of flags selecting which items
/// are HTML-escaped.
pub fn classes(value: &Value, escaping: &Value) -> Option<Value> {
    match value {
        Value::Array(items) => classes_array(items, escaping).map(Value::String),
        other if other.is_truthy() && other.type_of() == "object" => {
            let names: Vec<String> = other
                .own_entries()
                .into_iter()
                .filter(|(key, val)| !key.is_empty() && val.is_truthy())
                .map(|(key, _)| key)
                .collect();
            Some(Value::String(names.join(" ")))
        }
        other if other.is_truthy() => Some(other.clone()),
        _ => Some(Value::string("")),
    }
}

fn classes_array(items: &[Value], escaping: &Value) -> Option<String> {
    let flags = match escaping {
        Value::Array(flags) => Some(flags),
        _ => None,
    };
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        let mut class = classes(item, &Value::Undefined)?;
        if !class.is_truthy() {
            continue;
        }
        if flags.and_then(|flags| flags.get(i)).is_some_and(Value::is_truthy) {
            class = escape(&class)?;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&class.to_js_string()?);
    }
    Some(out)
}

/// `attr`: one rendered attribute, with its leading space, or nothing.
pub fn attr(key: &str, value: &Value, escaped: bool, terse: bool) -> Option<String> {
    match value {
        Value::Bool(false) | Value::Null | Value::Undefined => return Some(String::new()),
        Value::Bool(true) => {
            return Some(if terse {
                format!(" {key}")
            } else {
                format!(" {key}=\"{key}\"")
            });
        }
        other if !other.is_truthy() && (key == "class" || key == "style") => {
            return Some(String::new());
        }
        Value::Object(obj) if matches!(obj.get("toJSON"), Some(Value::Function(_))) => {
            return None;
        }
        _ => {}
    }
    let text = match value {
        Value::String(s) => s.clone(),
        other => {
            let json = other.to_json()?;
            if !escaped && json.contains('"') {
                return Some(format!(" {key}='{}'", json.replace('\'', "&#39;")));
            }
            json
        }
    };
    let text = if escaped { escape_html(&text) } else { text };
    Some(format!(" {key}=\"{text}\""))
}

/// `attrs`: every own property rendered with [`attr`], unescaped, with the
/// class attribute first.
pub fn attrs(obj: &Value, terse: bool) -> Option<String> {
    let mut out = String::new();
    for (key, val) in obj.own_entries() {
        match key.as_str() {
            "class" => {
                let class = classes(&val, &Value::Undefined)?;
                out.insert_str(0, &attr(&key, &class, false, terse)?);
            }
            "style" => {
                let style = Value::String(style(&val)?);
                out.push_str(&attr(&key, &style, false, terse)?);
            }
            _ => out.push_str(&attr(&key, &val, false, terse)?),
        }
    }
    Some(out)
}

/// `merge(a, b)`: copy `b`'s properties onto `a`. Class values accumulate
/// into an array and style values are concatenated.
pub fn merge(a: &Value, b: &Value) -> Option<Value> {
    let Value::Object(a) = a else {
        return None;
    };
    let mut merged = a.clone();
    for (key, val) in b.own_entries() {
        match key.as_str() {
            "class" => {
                let mut list = match merged.get("class") {
                    Some(Value::Array(items)) => items.clone(),
                    Some(existing) if existing.is_truthy() => vec![existing.clone()],
                    _ => Vec::new(),
                };
                match val {
                    Value::Array(items) => list.extend(items),
                    other if other.is_truthy() => list.push(other),
                    _ => {}
                }
                merged.insert(key, Value::Array(list));
            }
            "style" => {
                let before = style(merged.get("style").unwrap_or(&Value::Undefined))?;
                let after = style(&val)?;
                merged.insert(key, Value::String(terminated(before) + &terminated(after)));
            }
            _ => merged.insert(key, val),
        }
    }
    Some(Value::Object(merged))
}

/// `merge([a, b, ...])`.
fn merge_all(list: &Value) -> Option<Value> {
    let Value::Array(items) = list else {
        return None;
    };
    let mut iter = items.iter();
    let mut merged = iter.next().cloned().unwrap_or(Value::Undefined);
    for item in iter {
        merged = merge(&merged, item)?;
    }
    Some(merged)
}

fn terminated(mut style: String) -> String {
    if !style.is_empty() && !style.ends_with(';') {
        style.push(';');
    }
    style
}

#[cfg(test)]
mod tests;
