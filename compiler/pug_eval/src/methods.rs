//! Method calls allowed during folding.
//!
//! Only side-effect-free built-ins are callable: formatting methods on
//! booleans and numbers, the string methods below, `test`/`exec` on
//! regular expressions, and functions stored as own properties of
//! constant objects.

use regex::{Captures, Regex};

use crate::number::{self, to_integer};
use crate::regexp::RegExp;
use crate::value::{len_number, Value};

/// Upper bound on a string built by `repeat`/`padStart`/`padEnd`, in
/// UTF-16 units. Longer results are left for run time.
const MAX_BUILT_STRING: usize = 1 << 20;

/// Call `object[name](...args)`, or `None` when the call is not allowed
/// or cannot be folded.
pub fn call_method(object: &Value, name: &str, args: &[Value]) -> Option<Value> {
    match object {
        Value::Bool(b) => match name {
            "toString" => Some(Value::String(b.to_string())),
            _ => None,
        },
        Value::Number(n) => number_method(*n, name, args),
        Value::String(s) => string_method(s, name, args),
        Value::Regex(re) => match name {
            "test" => Some(Value::Bool(re.compile()?.is_match(&arg_string(args, 0)?))),
            "exec" => Some(exec(re, &arg_string(args, 0)?)?),
            _ => None,
        },
        other if !name.starts_with('_') && other.has_own(name) => match other.get_own(name)? {
            Value::Function(f) => f.call(args),
            _ => None,
        },
        _ => None,
    }
}

fn arg(args: &[Value], i: usize) -> &Value {
    args.get(i).unwrap_or(&Value::Undefined)
}

fn arg_string(args: &[Value], i: usize) -> Option<String> {
    arg(args, i).to_js_string()
}

/// `ToIntegerOrInfinity(args[i])`, or `default` when the argument is
/// `undefined`.
fn arg_integer(args: &[Value], i: usize, default: f64) -> Option<f64> {
    match arg(args, i) {
        Value::Undefined => Some(default),
        value => Some(to_integer(value.to_number()?)),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn arg_digits(args: &[Value], i: usize) -> Option<Option<i32>> {
    match arg(args, i) {
        Value::Undefined => Some(None),
        value => {
            let n = to_integer(value.to_number()?);
            Some(Some(n.clamp(-1.0, 1000.0) as i32))
        }
    }
}

fn number_method(n: f64, name: &str, args: &[Value]) -> Option<Value> {
    let text = match name {
        "toFixed" => number::to_fixed(n, arg_digits(args, 0)?.unwrap_or(0))?,
        "toExponential" => number::to_exponential(n, arg_digits(args, 0)?)?,
        "toPrecision" => number::to_precision(n, arg_digits(args, 0)?)?,
        "toString" => match arg_digits(args, 0)? {
            None => number::to_string(n),
            Some(radix) => number::to_radix_string(n, u32::try_from(radix).ok()?)?,
        },
        _ => return None,
    };
    Some(Value::String(text))
}

/// Clamp a relative index (negative counts from the end) into `0..=len`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn relative(index: f64, len: usize) -> usize {
    let len_f = len_number(len);
    let i = if index < 0.0 {
        (len_f + index).max(0.0)
    } else {
        index.min(len_f)
    };
    i as usize
}

/// Clamp an absolute index into `0..=len`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp(index: f64, len: usize) -> usize {
    index.clamp(0.0, len_number(len)) as usize
}

fn from_units(units: &[u16]) -> Value {
    Value::String(String::from_utf16_lossy(units))
}

fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return (from <= haystack.len()).then_some(from);
    }
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

fn index_value(i: Option<usize>) -> Value {
    Value::Number(i.map_or(-1.0, len_number))
}

/// A string argument that must not be a regular expression.
fn search_string(args: &[Value]) -> Option<Vec<u16>> {
    match arg(args, 0) {
        Value::Regex(_) => None,
        value => Some(value.to_js_string()?.encode_utf16().collect()),
    }
}

/// The regular expression a `match`/`search` argument stands for.
fn to_regexp(value: &Value) -> Option<RegExp> {
    match value {
        Value::Regex(re) => Some(re.clone()),
        Value::Undefined => Some(RegExp::new("", "")),
        other => Some(RegExp::new(other.to_js_string()?, "")),
    }
}

fn string_method(s: &str, name: &str, args: &[Value]) -> Option<Value> {
    let units: Vec<u16> = s.encode_utf16().collect();
    let len = units.len();
    Some(match name {
        "charAt" => {
            let i = to_integer(arg(args, 0).to_number()?);
            if i < 0.0 || i >= len_number(len) {
                Value::string("")
            } else {
                from_units(&units[clamp(i, len)..=clamp(i, len)])
            }
        }
        "charCodeAt" => {
            let i = to_integer(arg(args, 0).to_number()?);
            if i < 0.0 || i >= len_number(len) {
                Value::Number(f64::NAN)
            } else {
                Value::Number(f64::from(units[clamp(i, len)]))
            }
        }
        "codePointAt" => {
            let i = to_integer(arg(args, 0).to_number()?);
            if i < 0.0 || i >= len_number(len) {
                Value::Undefined
            } else {
                let at = clamp(i, len);
                let code = char::decode_utf16(units[at..].iter().copied())
                    .next()
                    .map_or(u32::from(units[at]), |c| c.map_or(u32::from(units[at]), u32::from));
                Value::Number(f64::from(code))
            }
        }
        "concat" => {
            let mut out = s.to_string();
            for value in args {
                out.push_str(&value.to_js_string()?);
            }
            Value::String(out)
        }
        "endsWith" => {
            let needle = search_string(args)?;
            let end = clamp(arg_integer(args, 1, len_number(len))?, len);
            Value::Bool(end >= needle.len() && units[end - needle.len()..end] == needle[..])
        }
        "startsWith" => {
            let needle = search_string(args)?;
            let start = clamp(arg_integer(args, 1, 0.0)?, len);
            Value::Bool(units[start..].starts_with(&needle))
        }
        "includes" => {
            let needle = search_string(args)?;
            let start = clamp(arg_integer(args, 1, 0.0)?, len);
            Value::Bool(find_units(&units, &needle, start).is_some())
        }
        "indexOf" => {
            let needle: Vec<u16> = arg_string(args, 0)?.encode_utf16().collect();
            let start = clamp(arg_integer(args, 1, 0.0)?, len);
            index_value(find_units(&units, &needle, start))
        }
        "lastIndexOf" => {
            let needle: Vec<u16> = arg_string(args, 0)?.encode_utf16().collect();
            let position = match arg(args, 1).to_number()? {
                n if n.is_nan() => f64::INFINITY,
                n => to_integer(n),
            };
            let start = clamp(position, len);
            let last = (0..=start.min(len.saturating_sub(needle.len())))
                .rev()
                .find(|&i| i + needle.len() <= len && units[i..i + needle.len()] == needle[..]);
            index_value(last)
        }
        "match" => {
            let re = to_regexp(arg(args, 0))?;
            let compiled = re.compile()?;
            if re.is_global() {
                let all: Vec<Value> = compiled
                    .find_iter(s)
                    .map(|m| Value::string(m.as_str()))
                    .collect();
                if all.is_empty() {
                    Value::Null
                } else {
                    Value::Array(all)
                }
            } else {
                exec_compiled(&compiled, s)
            }
        }
        "normalize" => {
            let form = match arg(args, 0) {
                Value::Undefined => "NFC".to_string(),
                value => value.to_js_string()?,
            };
            if !matches!(form.as_str(), "NFC" | "NFD" | "NFKC" | "NFKD") || !s.is_ascii() {
                return None;
            }
            Value::string(s)
        }
        "padStart" | "padEnd" => {
            let target = clamp(to_integer(arg(args, 0).to_number()?), usize::MAX);
            let fill: Vec<u16> = match arg(args, 1) {
                Value::Undefined => vec![u16::from(b' ')],
                value => value.to_js_string()?.encode_utf16().collect(),
            };
            if target <= len || fill.is_empty() {
                return Some(Value::string(s));
            }
            if target > MAX_BUILT_STRING {
                return None;
            }
            let pad: Vec<u16> = fill.iter().copied().cycle().take(target - len).collect();
            if name == "padStart" {
                from_units(&[pad, units].concat())
            } else {
                from_units(&[units, pad].concat())
            }
        }
        "repeat" => {
            let count = to_integer(arg(args, 0).to_number()?);
            if count < 0.0 || count.is_infinite() {
                return None;
            }
            let count = clamp(count, usize::MAX);
            if len.saturating_mul(count) > MAX_BUILT_STRING {
                return None;
            }
            Value::String(s.repeat(count))
        }
        "replace" => replace(s, arg(args, 0), arg(args, 1))?,
        "search" => {
            let compiled = to_regexp(arg(args, 0))?.compile()?;
            Value::Number(compiled.find(s).map_or(-1.0, |m| utf16_offset(s, m.start())))
        }
        "slice" => {
            let start = relative(arg_integer(args, 0, 0.0)?, len);
            let end = relative(arg_integer(args, 1, len_number(len))?, len);
            from_units(&units[start..end.max(start)])
        }
        "substring" => {
            let a = clamp(arg_integer(args, 0, 0.0)?, len);
            let b = clamp(arg_integer(args, 1, len_number(len))?, len);
            from_units(&units[a.min(b)..a.max(b)])
        }
        "substr" => {
            let start = relative(arg_integer(args, 0, 0.0)?, len);
            let count = clamp(arg_integer(args, 1, len_number(len))?, len - start);
            from_units(&units[start..start + count])
        }
        "split" => split(s, arg(args, 0), arg(args, 1))?,
        "toLowerCase" => Value::String(s.to_lowercase()),
        "toUpperCase" => Value::String(s.to_uppercase()),
        "trim" => Value::string(s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')),
        _ => return None,
    })
}

fn utf16_offset(s: &str, byte: usize) -> f64 {
    len_number(s[..byte].encode_utf16().count())
}

fn exec(re: &RegExp, s: &str) -> Option<Value> {
    Some(exec_compiled(&re.compile()?, s))
}

/// The match array of a non-global `exec`: the match, then each group
/// (`undefined` for groups that did not participate), or `null`.
fn exec_compiled(re: &Regex, s: &str) -> Value {
    match re.captures(s) {
        Some(caps) => Value::Array(
            caps.iter()
                .map(|m| m.map_or(Value::Undefined, |m| Value::string(m.as_str())))
                .collect(),
        ),
        None => Value::Null,
    }
}

fn replace(s: &str, pattern: &Value, replacement: &Value) -> Option<Value> {
    if matches!(replacement, Value::Function(_)) {
        return None;
    }
    let replacement = replacement.to_js_string()?;
    let Value::Regex(re) = pattern else {
        let needle = pattern.to_js_string()?;
        let Some(at) = s.find(&needle) else {
            return Some(Value::string(s));
        };
        let mut out = s[..at].to_string();
        out.push_str(&expand(&replacement, s, at, &needle, &[]));
        out.push_str(&s[at + needle.len()..]);
        return Some(Value::String(out));
    };
    let compiled = re.compile()?;
    let mut out = String::new();
    let mut last = 0;
    for caps in compiled.captures_iter(s) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&s[last..whole.start()]);
        out.push_str(&expand(&replacement, s, whole.start(), whole.as_str(), &groups(&caps)));
        last = whole.end();
        if !re.is_global() {
            break;
        }
    }
    out.push_str(&s[last..]);
    Some(Value::String(out))
}

fn groups<'h>(caps: &Captures<'h>) -> Vec<Option<&'h str>> {
    caps.iter().skip(1).map(|m| m.map(|m| m.as_str())).collect()
}

/// Expand `$$`, `$&`, `` $` ``, `$'` and `$n` in a replacement string.
fn expand(replacement: &str, s: &str, at: usize, matched: &str, groups: &[Option<&str>]) -> String {
    let mut out = String::new();
    let mut chars = replacement.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().map(|&(_, next)| next) {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some('&') => {
                chars.next();
                out.push_str(matched);
            }
            Some('`') => {
                chars.next();
                out.push_str(&s[..at]);
            }
            Some('\'') => {
                chars.next();
                out.push_str(&s[at + matched.len()..]);
            }
            Some(d) if d.is_ascii_digit() => {
                let (_, first) = chars.next().unwrap_or((0, d));
                let mut n = first.to_digit(10).unwrap_or(0) as usize;
                if let Some(&(_, second)) = chars.peek() {
                    if let Some(two) = second.to_digit(10).map(|d| n * 10 + d as usize) {
                        if (1..=groups.len()).contains(&two) {
                            chars.next();
                            n = two;
                        }
                    }
                }
                match n.checked_sub(1).and_then(|i| groups.get(i)) {
                    Some(group) => out.push_str(group.unwrap_or("")),
                    None => {
                        out.push('$');
                        out.push(first);
                    }
                }
            }
            _ => out.push('$'),
        }
    }
    out
}

fn split(s: &str, separator: &Value, limit: &Value) -> Option<Value> {
    let limit = match limit {
        Value::Undefined => usize::MAX,
        value => usize::try_from(number::to_uint32(value.to_number()?)).ok()?,
    };
    let mut parts: Vec<Value> = Vec::new();
    if limit == 0 {
        return Some(Value::Array(parts));
    }
    match separator {
        Value::Undefined => parts.push(Value::string(s)),
        Value::Regex(re) => {
            let compiled = re.compile()?;
            if s.is_empty() {
                if !compiled.is_match(s) {
                    parts.push(Value::string(s));
                }
                return Some(Value::Array(parts));
            }
            let (mut p, mut q) = (0, 0);
            while q < s.len() {
                let Some(caps) = compiled.captures_at(s, q) else {
                    break;
                };
                let Some(whole) = caps.get(0) else {
                    break;
                };
                if whole.start() >= s.len() {
                    break;
                }
                if whole.end() == p {
                    q = next_char(s, whole.start());
                    continue;
                }
                parts.push(Value::string(&s[p..whole.start()]));
                if parts.len() == limit {
                    return Some(Value::Array(parts));
                }
                for group in groups(&caps) {
                    parts.push(group.map_or(Value::Undefined, Value::string));
                    if parts.len() == limit {
                        return Some(Value::Array(parts));
                    }
                }
                p = whole.end();
                q = p;
            }
            parts.push(Value::string(&s[p..]));
        }
        other => {
            let sep = other.to_js_string()?;
            if sep.is_empty() {
                parts.extend(s.encode_utf16().map(|unit| from_units(&[unit])));
            } else {
                parts.extend(s.split(sep.as_str()).map(Value::string));
            }
        }
    }
    parts.truncate(limit);
    Some(Value::Array(parts))
}

fn next_char(s: &str, at: usize) -> usize {
    s[at..].chars().next().map_or(s.len(), |c| at + c.len_utf8())
}

#[cfg(test)]
mod tests;
