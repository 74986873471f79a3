//! Unary and binary operators.

use std::cmp::Ordering;

use pug_js::{BinaryOp, UnaryOp};

use crate::number::{to_int32, to_uint32};
use crate::value::Value;

/// Object members reachable through the prototype of every plain object.
const OBJECT_PROTOTYPE: &[&str] = &[
    "constructor",
    "hasOwnProperty",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "toLocaleString",
    "toString",
    "valueOf",
    "__proto__",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
];

pub fn unary(op: UnaryOp, arg: &Value) -> Option<Value> {
    Some(match op {
        UnaryOp::Neg => Value::Number(-arg.to_number()?),
        UnaryOp::Plus => Value::Number(arg.to_number()?),
        UnaryOp::Not => Value::Bool(!arg.is_truthy()),
        UnaryOp::BitNot => Value::Number(f64::from(!to_int32(arg.to_number()?))),
        UnaryOp::TypeOf => Value::string(arg.type_of()),
        UnaryOp::Void => Value::Undefined,
        UnaryOp::Delete | UnaryOp::Await => return None,
    })
}

pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Option<Value> {
    let numeric = |f: fn(f64, f64) -> f64| -> Option<Value> {
        Some(Value::Number(f(left.to_number()?, right.to_number()?)))
    };
    let bitwise = |f: fn(i32, i32) -> i32| -> Option<Value> {
        let l = to_int32(left.to_number()?);
        let r = to_int32(right.to_number()?);
        Some(Value::Number(f64::from(f(l, r))))
    };
    // Shift counts are taken modulo 32.
    let shift = |f: fn(i32, u32) -> i32| -> Option<Value> {
        let l = to_int32(left.to_number()?);
        let r = to_uint32(right.to_number()?) & 31;
        Some(Value::Number(f64::from(f(l, r))))
    };
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => numeric(|l, r| l - r),
        BinaryOp::Mul => numeric(|l, r| l * r),
        BinaryOp::Div => numeric(|l, r| l / r),
        BinaryOp::Rem => numeric(|l, r| l % r),
        BinaryOp::Exp => numeric(power),
        BinaryOp::BitAnd => bitwise(|l, r| l & r),
        BinaryOp::BitOr => bitwise(|l, r| l | r),
        BinaryOp::BitXor => bitwise(|l, r| l ^ r),
        BinaryOp::Shl => shift(i32::wrapping_shl),
        BinaryOp::Shr => shift(i32::wrapping_shr),
        BinaryOp::UShr => {
            let l = to_uint32(left.to_number()?);
            let r = to_uint32(right.to_number()?) & 31;
            Some(Value::Number(f64::from(l >> r)))
        }
        BinaryOp::Eq => loose_equals(left, right).map(Value::Bool),
        BinaryOp::NotEq => loose_equals(left, right).map(|eq| Value::Bool(!eq)),
        BinaryOp::StrictEq => strict_equals(left, right).map(Value::Bool),
        BinaryOp::StrictNotEq => strict_equals(left, right).map(|eq| Value::Bool(!eq)),
        BinaryOp::Lt => relational(left, right, |o| o == Ordering::Less),
        BinaryOp::Gt => relational(left, right, |o| o == Ordering::Greater),
        BinaryOp::LtEq => relational(left, right, |o| o != Ordering::Greater),
        BinaryOp::GtEq => relational(left, right, |o| o != Ordering::Less),
        BinaryOp::In => contains(right, left),
        BinaryOp::InstanceOf => None,
    }
}

/// `+`: concatenation when either primitive is a string.
fn add(left: &Value, right: &Value) -> Option<Value> {
    let l = left.to_primitive()?;
    let r = right.to_primitive()?;
    if matches!(l, Value::String(_)) || matches!(r, Value::String(_)) {
        let mut s = l.to_js_string()?;
        s.push_str(&r.to_js_string()?);
        return Some(Value::String(s));
    }
    Some(Value::Number(l.to_number()? + r.to_number()?))
}

/// `Math.pow`, which differs from `powf` on `1 ** NaN` and `1 ** ±∞`.
fn power(base: f64, exp: f64) -> f64 {
    if exp.is_nan() || (base.abs() == 1.0 && exp.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exp)
}

/// `<`, `>`, `<=` and `>=`. Strings compare by UTF-16 code units; any
/// `NaN` makes every comparison false.
fn relational(left: &Value, right: &Value, test: fn(Ordering) -> bool) -> Option<Value> {
    let l = left.to_primitive()?;
    let r = right.to_primitive()?;
    let ordering = match (&l, &r) {
        (Value::String(a), Value::String(b)) => Some(a.encode_utf16().cmp(b.encode_utf16())),
        _ => l.to_number()?.partial_cmp(&r.to_number()?),
    };
    Some(Value::Bool(ordering.is_some_and(test)))
}

/// `===`. Two distinct object values cannot be told apart without
/// identity, so those comparisons do not fold.
pub fn strict_equals(left: &Value, right: &Value) -> Option<bool> {
    Some(match (left, right) {
        (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(*a, *b),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Function(a), Value::Function(b)) => a == b,
        (a, b) if a.is_primitive() || b.is_primitive() => false,
        _ => return None,
    })
}

/// `==`.
pub fn loose_equals(left: &Value, right: &Value) -> Option<bool> {
    match (left, right) {
        (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => Some(true),
        (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => Some(false),
        (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
            Some(numbers_equal(left.to_number()?, right.to_number()?))
        }
        (Value::Bool(b), other) | (other, Value::Bool(b)) => {
            loose_equals(&Value::Number(f64::from(u8::from(*b))), other)
        }
        (a, b) if a.is_primitive() != b.is_primitive() => {
            let (primitive, object) = if a.is_primitive() { (a, b) } else { (b, a) };
            loose_equals(primitive, &object.to_primitive()?)
        }
        _ => strict_equals(left, right),
    }
}

#[allow(clippy::float_cmp)]
fn numbers_equal(a: f64, b: f64) -> bool {
    a == b
}

/// `key in object`. Only own properties and the plain-object prototype
/// are known; anything else does not fold.
fn contains(object: &Value, key: &Value) -> Option<Value> {
    if !matches!(object, Value::Object(_) | Value::Array(_)) {
        return None;
    }
    let key = key.to_js_string()?;
    if object.has_own(&key) {
        return Some(Value::Bool(true));
    }
    match object {
        Value::Object(_) if OBJECT_PROTOTYPE.contains(&key.as_str()) => None,
        Value::Object(_) => Some(Value::Bool(false)),
        _ => None,
    }
}
