//! Compile-time constant folding for Pug template expressions.
//!
//! The code generator asks whether an expression can be evaluated while
//! compiling; when it can, the value is written straight into the output
//! instead of generating code to compute it at render time. The filter
//! pass uses the same evaluator for filter options, which must be known at
//! compile time.
//!
//! Folding covers a side-effect-free subset of the expression language:
//!
//! - literals, template literals, array and object literals with spread;
//! - unary, binary, logical, conditional and sequence operators;
//! - member access on own properties (names starting with `_` excluded);
//! - side-effect-free built-in methods and calls to
//!   [`NativeFunction`]s found in the constant table;
//! - identifiers bound in the constant table.
//!
//! Anything else, including source that does not parse, is simply not
//! constant: the evaluator answers `None` and the caller falls back to
//! run-time evaluation.

mod methods;
mod number;
mod ops;
mod regexp;
mod value;

use pug_js::{
    parse_expression, Argument, ArrayElement, Expr, LogicalOp, MemberProperty, Property,
    PropertyKey,
};
use pug_stack::ensure_sufficient_stack;
use tracing::trace;

pub use regexp::RegExp;
pub use value::{NativeFunction, Object, Value};

/// Named constants visible to folded expressions.
pub type Constants = Object;

/// The last query and its answer.
struct Memo {
    src: String,
    result: Option<Value>,
}

/// Folds expression source text to values under one fixed constant table.
///
/// Holds a single-entry memo: the code generator tests an expression for
/// constancy and then asks for its value, and the second query is answered
/// from the memo. The table never changes after construction, so the memo
/// is keyed by source text alone. Both live as long as the evaluator, which
/// is one code generation or filter pass.
#[derive(Default)]
pub struct ConstantEvaluator {
    constants: Constants,
    memo: Option<Memo>,
}

impl ConstantEvaluator {
    /// An evaluator with no named constants.
    pub fn new() -> Self {
        ConstantEvaluator::default()
    }

    pub fn with_constants(constants: Constants) -> Self {
        ConstantEvaluator {
            constants,
            memo: None,
        }
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    /// The value of `src`, or `None` if it is not constant.
    pub fn evaluate(&mut self, src: &str) -> Option<&Value> {
        let hit = self.memo.as_ref().is_some_and(|memo| memo.src == src);
        if !hit {
            let result = match parse_expression(src) {
                Ok(expr) => fold(&expr, &self.constants),
                Err(err) => {
                    trace!(src, %err, "not an expression");
                    None
                }
            };
            self.memo = Some(Memo {
                src: src.to_string(),
                result,
            });
        }
        self.memo.as_ref().and_then(|memo| memo.result.as_ref())
    }

    pub fn is_constant(&mut self, src: &str) -> bool {
        self.evaluate(src).is_some()
    }
}

/// Fold a parsed expression.
pub fn fold(expr: &Expr, constants: &Constants) -> Option<Value> {
    Folder { constants }.fold(expr)
}

struct Folder<'a> {
    constants: &'a Constants,
}

impl Folder<'_> {
    fn fold(&self, expr: &Expr) -> Option<Value> {
        ensure_sufficient_stack(|| self.fold_inner(expr))
    }

    fn fold_inner(&self, expr: &Expr) -> Option<Value> {
        match expr {
            Expr::Number(n) => Some(Value::Number(*n)),
            Expr::String(s) => Some(Value::string(s.as_str())),
            Expr::Bool(b) => Some(Value::Bool(*b)),
            Expr::Null => Some(Value::Null),
            Expr::Regex { pattern, flags } => {
                Some(Value::Regex(RegExp::new(pattern.as_str(), flags.as_str())))
            }
            Expr::Template { quasis, exprs } => {
                let mut out = String::new();
                for (i, quasi) in quasis.iter().enumerate() {
                    out.push_str(quasi);
                    if let Some(expr) = exprs.get(i) {
                        out.push_str(&self.fold(expr)?.to_js_string()?);
                    }
                }
                Some(Value::String(out))
            }
            Expr::Ident(name) => self.constants.get(name).cloned(),
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    match element {
                        ArrayElement::Expr(expr) => items.push(self.fold(expr)?),
                        ArrayElement::Spread(expr) => items.extend(self.fold(expr)?.spread()?),
                        ArrayElement::Hole => return None,
                    }
                }
                Some(Value::Array(items))
            }
            Expr::Object(properties) => self.object(properties),
            Expr::Unary { op, arg } => ops::unary(*op, &self.fold(arg)?),
            Expr::Binary { op, left, right } => {
                let left = self.fold(left)?;
                let right = self.fold(right)?;
                ops::binary(*op, &left, &right)
            }
            // Both operands are folded, but only the selected one is the value.
            Expr::Logical { op, left, right } => {
                let left = self.fold(left)?;
                let right = self.fold(right)?;
                match op {
                    LogicalOp::And => Some(if left.is_truthy() { right } else { left }),
                    LogicalOp::Or => Some(if left.is_truthy() { left } else { right }),
                    LogicalOp::Nullish => None,
                }
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.fold(test)?.is_truthy() {
                    self.fold(consequent)
                } else {
                    self.fold(alternate)
                }
            }
            Expr::Sequence(exprs) => {
                let mut last = None;
                for expr in exprs {
                    last = Some(self.fold(expr)?);
                }
                last
            }
            Expr::Member {
                object,
                property,
                optional: false,
            } => {
                let (object, name) = self.member(object, property)?;
                if name.starts_with('_') {
                    return None;
                }
                object.get_own(&name)
            }
            Expr::Call {
                callee,
                args,
                optional: false,
            } => {
                let args = self.arguments(args)?;
                match &**callee {
                    Expr::Member {
                        object,
                        property,
                        optional: false,
                    } => {
                        let (object, name) = self.member(object, property)?;
                        methods::call_method(&object, &name, &args)
                    }
                    Expr::Member { .. } => None,
                    callee => match self.fold(callee)? {
                        Value::Function(f) => f.call(&args),
                        _ => None,
                    },
                }
            }
            Expr::Paren(inner) => self.fold(inner),
            Expr::This
            | Expr::Member { .. }
            | Expr::Call { .. }
            | Expr::Assign { .. }
            | Expr::Opaque(_) => None,
        }
    }

    /// The object and property name of a member expression. The object
    /// must be truthy.
    fn member(&self, object: &Expr, property: &MemberProperty) -> Option<(Value, String)> {
        let object = self.fold(object)?;
        if !object.is_truthy() {
            return None;
        }
        let name = match property {
            MemberProperty::Ident(name) => name.clone(),
            MemberProperty::Computed(expr) => self.fold(expr)?.to_js_string()?,
            MemberProperty::Private(_) => return None,
        };
        Some((object, name))
    }

    fn arguments(&self, args: &[Argument]) -> Option<Vec<Value>> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Argument::Expr(expr) => values.push(self.fold(expr)?),
                Argument::Spread(expr) => values.extend(self.fold(expr)?.spread()?),
            }
        }
        Some(values)
    }

    /// Object literals. Shorthand properties, methods, numeric keys and
    /// keys that are empty or start with `_` are not constant.
    fn object(&self, properties: &[Property]) -> Option<Value> {
        let mut obj = Object::new();
        for property in properties {
            match property {
                Property::Init { key, value } => {
                    let key = match key {
                        PropertyKey::Ident(name) | PropertyKey::String(name) => {
                            Value::string(name.as_str())
                        }
                        PropertyKey::Computed(expr) => self.fold(expr)?,
                        PropertyKey::Number(_) => return None,
                    };
                    if !key.is_truthy() {
                        return None;
                    }
                    let key = key.to_js_string()?;
                    if key.starts_with('_') {
                        return None;
                    }
                    obj.insert(key, self.fold(value)?);
                }
                Property::Spread(expr) => {
                    let source = self.fold(expr)?;
                    if !source.is_truthy() {
                        return None;
                    }
                    for (key, value) in source.own_entries() {
                        obj.insert(key, value);
                    }
                }
                Property::Shorthand(_) | Property::CoverInit { .. } | Property::Method => {
                    return None;
                }
            }
        }
        Some(Value::Object(obj))
    }
}
