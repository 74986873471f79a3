//! Script literals that are safe to embed anywhere, including inside an
//! HTML `<script>` element.

use pug_eval::Value;

/// A string literal for `s`.
pub fn stringify_str(s: &str) -> String {
    make_safe(&serde_json::Value::String(s.to_string()).to_string())
}

/// A literal for `value`; `undefined` when it has no JSON form.
pub fn stringify(value: &Value) -> String {
    value
        .to_json()
        .map_or_else(|| "undefined".to_string(), |json| make_safe(&json))
}

/// The contents of the string literal for `s`, without the quotes.
pub fn stringify_inner(s: &str) -> String {
    let literal = stringify_str(s);
    literal[1..literal.len() - 1].to_string()
}

/// Escape characters JSON allows but HTML or older script parsers do not.
fn make_safe(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            '<' => out.push_str("\\u003C"),
            '>' => out.push_str("\\u003E"),
            '/' => out.push_str("\\u002F"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests;
