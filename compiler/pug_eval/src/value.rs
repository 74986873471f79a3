//! Compile-time values and the script coercions over them.

use std::fmt;
use std::sync::Arc;

use crate::number;
use crate::regexp::RegExp;

/// A value known at compile time.
///
/// Arrays and objects are plain trees: there is no object identity, so
/// identity-sensitive operations (`===` between two objects) do not fold.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Object),
    Regex(RegExp),
    /// Insertion-ordered members of a `Set` supplied as a constant.
    Set(Vec<Value>),
    /// Insertion-ordered entries of a `Map` supplied as a constant.
    Map(Vec<(Value, Value)>),
    Function(NativeFunction),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// `ToBoolean`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_)
            | Value::Object(_)
            | Value::Regex(_)
            | Value::Set(_)
            | Value::Map(_)
            | Value::Function(_) => true,
        }
    }

    /// The `typeof` operator.
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Null
            | Value::Array(_)
            | Value::Object(_)
            | Value::Regex(_)
            | Value::Set(_)
            | Value::Map(_) => "object",
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_)
        )
    }

    /// `ToPrimitive` with the default hint.
    ///
    /// `None` when the conversion would run code that is not modelled, as
    /// for the source text of a native function.
    pub fn to_primitive(&self) -> Option<Value> {
        Some(match self {
            Value::Array(items) => Value::String(join(items)?),
            Value::Object(_) => Value::string("[object Object]"),
            Value::Regex(re) => Value::String(re.to_string()),
            Value::Set(_) => Value::string("[object Set]"),
            Value::Map(_) => Value::string("[object Map]"),
            Value::Function(_) => return None,
            primitive => primitive.clone(),
        })
    }

    /// `ToString`.
    pub fn to_js_string(&self) -> Option<String> {
        Some(match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number::to_string(*n),
            Value::String(s) => s.clone(),
            other => return other.to_primitive()?.to_js_string(),
        })
    }

    /// `ToNumber`.
    pub fn to_number(&self) -> Option<f64> {
        Some(match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => number::parse(s),
            other => return other.to_primitive()?.to_number(),
        })
    }

    /// Whether `key` is an own property, as `hasOwnProperty` sees it.
    pub fn has_own(&self, key: &str) -> bool {
        match self {
            Value::String(s) => key == "length" || index(key).is_some_and(|i| i < utf16_len(s)),
            Value::Array(items) => key == "length" || index(key).is_some_and(|i| i < items.len()),
            Value::Object(obj) => obj.contains_key(key),
            _ => false,
        }
    }

    /// The value of own property `key`, if there is one.
    pub fn get_own(&self, key: &str) -> Option<Value> {
        match self {
            Value::String(s) => {
                if key == "length" {
                    return Some(Value::Number(len_number(utf16_len(s))));
                }
                let units: Vec<u16> = s.encode_utf16().collect();
                let unit = *units.get(index(key)?)?;
                Some(Value::String(String::from_utf16_lossy(&[unit])))
            }
            Value::Array(items) => {
                if key == "length" {
                    return Some(Value::Number(len_number(items.len())));
                }
                items.get(index(key)?).cloned()
            }
            Value::Object(obj) => obj.get(key).cloned(),
            _ => None,
        }
    }

    /// Own enumerable properties, in the order `Object.assign` copies them.
    pub fn own_entries(&self) -> Vec<(String, Value)> {
        match self {
            Value::String(s) => s
                .encode_utf16()
                .enumerate()
                .map(|(i, unit)| (i.to_string(), Value::String(String::from_utf16_lossy(&[unit]))))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item.clone()))
                .collect(),
            Value::Object(obj) => obj.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
            _ => Vec::new(),
        }
    }

    /// Items produced by iterating the value, for spreads. `None` for
    /// values that are not iterable.
    pub fn spread(&self) -> Option<Vec<Value>> {
        match self {
            Value::String(s) => Some(s.chars().map(|c| Value::String(c.to_string())).collect()),
            Value::Array(items) | Value::Set(items) => Some(items.clone()),
            Value::Map(entries) => Some(
                entries
                    .iter()
                    .map(|(k, v)| Value::Array(vec![k.clone(), v.clone()]))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// `JSON.stringify`. `None` where the result is `undefined`.
    pub fn to_json(&self) -> Option<String> {
        let mut out = String::new();
        self.write_json(&mut out).then_some(out)
    }

    fn write_json(&self, out: &mut String) -> bool {
        match self {
            Value::Undefined | Value::Function(_) => return false,
            Value::Null => out.push_str("null"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) if n.is_finite() => out.push_str(&number::to_string(*n)),
            Value::Number(_) => out.push_str("null"),
            Value::String(s) => out.push_str(&quote(s)),
            Value::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    if !item.write_json(out) {
                        out.push_str("null");
                    }
                }
                out.push(']');
            }
            Value::Object(obj) => {
                out.push('{');
                let mut first = true;
                for (key, value) in obj.iter() {
                    let mut member = String::new();
                    if !value.write_json(&mut member) {
                        continue;
                    }
                    if !first {
                        out.push(',');
                    }
                    first = false;
                    out.push_str(&quote(key));
                    out.push(':');
                    out.push_str(&member);
                }
                out.push('}');
            }
            Value::Regex(_) | Value::Set(_) | Value::Map(_) => out.push_str("{}"),
        }
        true
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

/// A JSON string literal.
pub(crate) fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// `Array.prototype.join` with the default separator.
fn join(items: &[Value]) -> Option<String> {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if !matches!(item, Value::Undefined | Value::Null) {
            out.push_str(&item.to_js_string()?);
        }
    }
    Some(out)
}

/// A canonical array index: `"0"`, `"12"`, but not `"01"` or `"-1"`.
fn index(key: &str) -> Option<usize> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

pub(crate) fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn len_number(len: usize) -> f64 {
    len as f64
}

/// An ordered property map with script key ordering: integer keys first
/// in ascending order, then string keys in insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Object {
    entries: Vec<(String, Value)>,
}

impl Object {
    pub fn new() -> Self {
        Object::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set `key`, keeping its position if it already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
            return;
        }
        let at = match index(&key) {
            Some(i) => self
                .entries
                .iter()
                .position(|(k, _)| index(k).map_or(true, |j| j > i))
                .unwrap_or(self.entries.len()),
            None => self.entries.len(),
        };
        self.entries.insert(at, (key, value));
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let at = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(at).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut obj = Object::new();
        for (key, value) in iter {
            obj.insert(key, value);
        }
        obj
    }
}

type NativeFn = dyn Fn(&[Value]) -> Option<Value> + Send + Sync;

/// A host function callable from folded expressions.
///
/// Returning `None` means the call cannot be folded. Equality is identity
/// of the shared closure.
#[derive(Clone)]
pub struct NativeFunction {
    name: &'static str,
    call: Arc<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: &'static str,
        call: impl Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        NativeFunction {
            name,
            call: Arc::new(call),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, args: &[Value]) -> Option<Value> {
        (self.call)(args)
    }
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.call, &other.call)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function: {}]", self.name)
    }
}
