// ABOUTME: Runtime value types for the Scheme interpreter

//! The Scheme value universe: atoms, mutable cons pairs, procedures and
//! promises, plus the structural/identity equality relations primitives
//! are built from.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::env::Environment;
use crate::error::SchemeError;

/// A primitive implemented without access to the calling environment.
pub type PlainFn = fn(&[Value]) -> Result<Value, SchemeError>;
/// A primitive that needs the calling environment (`eval`, `apply`, `load`).
pub type EnvFn = fn(&[Value], &Environment) -> Result<Value, SchemeError>;

#[derive(Clone, Copy, Debug)]
pub enum PrimitiveFn {
    Plain(PlainFn),
    WithEnv(EnvFn),
}

#[derive(Debug)]
pub struct PrimitiveProcedure {
    pub name: &'static str,
    pub func: PrimitiveFn,
}

#[derive(Debug)]
pub struct PairCell {
    pub first: Value,
    pub rest: Value,
}

#[derive(Debug)]
pub struct LambdaProcedure {
    pub params: Value,
    pub body: Value,
    pub env: Environment,
}

#[derive(Debug)]
pub struct DynamicLambdaProcedure {
    pub params: Value,
    pub body: Value,
}

#[derive(Debug)]
pub struct MacroProcedure {
    pub params: Value,
    pub body: Value,
    pub env: Environment,
}

/// A delayed expression and the environment it was delayed in. `force`
/// re-evaluates `expr` every time; this implementation does not memoize
/// (see the Design Decisions on `force`).
#[derive(Debug)]
pub struct PromiseCell {
    pub expr: Value,
    pub env: Environment,
}

#[derive(Clone, Debug)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(Rc<str>),
    Symbol(Rc<str>),
    EmptyList,
    Unspecified,
    Pair(Rc<RefCell<PairCell>>),
    Primitive(Rc<PrimitiveProcedure>),
    Lambda(Rc<LambdaProcedure>),
    DynamicLambda(Rc<DynamicLambdaProcedure>),
    Macro(Rc<MacroProcedure>),
    Promise(Rc<RefCell<PromiseCell>>),
}

impl Value {
    pub fn symbol(name: impl AsRef<str>) -> Value {
        Value::Symbol(Rc::from(name.as_ref().to_lowercase()))
    }

    pub fn string(s: impl AsRef<str>) -> Value {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn cons(first: Value, rest: Value) -> Value {
        Value::Pair(Rc::new(RefCell::new(PairCell { first, rest })))
    }

    /// Builds a proper list from `items`.
    pub fn list(items: Vec<Value>) -> Value {
        let mut result = Value::EmptyList;
        for item in items.into_iter().rev() {
            result = Value::cons(item, result);
        }
        result
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false))
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Value::Pair(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::EmptyList)
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Value::Symbol(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Real(_))
    }

    pub fn is_procedure(&self) -> bool {
        matches!(
            self,
            Value::Primitive(_) | Value::Lambda(_) | Value::DynamicLambda(_) | Value::Macro(_)
        )
    }

    pub fn is_promise(&self) -> bool {
        matches!(self, Value::Promise(_))
    }

    /// A well-formed scheme list: a Pair chain terminated by EmptyList.
    /// Assumes no cycles, per the spec.
    pub fn is_list(&self) -> bool {
        let mut cur = self.clone();
        loop {
            match cur {
                Value::EmptyList => return true,
                Value::Pair(cell) => cur = cell.borrow().rest.clone(),
                _ => return false,
            }
        }
    }

    /// A valid cdr for `set-cdr!`: a Pair, EmptyList, or a Promise (stream tail).
    pub fn is_valid_cdr(&self) -> bool {
        matches!(self, Value::Pair(_) | Value::EmptyList | Value::Promise(_))
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn car(&self) -> Option<Value> {
        match self {
            Value::Pair(cell) => Some(cell.borrow().first.clone()),
            _ => None,
        }
    }

    pub fn cdr(&self) -> Option<Value> {
        match self {
            Value::Pair(cell) => Some(cell.borrow().rest.clone()),
            _ => None,
        }
    }

    /// Flattens a proper scheme list into a Rust vector. Errors if `self`
    /// is not a proper list.
    pub fn to_vec(&self) -> Result<Vec<Value>, SchemeError> {
        let mut out = Vec::new();
        let mut cur = self.clone();
        loop {
            match cur {
                Value::EmptyList => return Ok(out),
                Value::Pair(cell) => {
                    let c = cell.borrow();
                    out.push(c.first.clone());
                    cur = c.rest.clone();
                }
                other => {
                    return Err(SchemeError::Custom(format!("ill-formed list: {}", other)))
                }
            }
        }
    }

    /// Length of a proper list. Errors on improper lists, matching the
    /// original's `__len__`.
    pub fn list_len(&self) -> Result<usize, SchemeError> {
        let mut n = 0usize;
        let mut cur = self.clone();
        loop {
            match cur {
                Value::EmptyList => return Ok(n),
                Value::Pair(cell) => {
                    n += 1;
                    cur = cell.borrow().rest.clone();
                }
                _ => {
                    return Err(SchemeError::Custom(
                        "length attempted on improper list".to_string(),
                    ))
                }
            }
        }
    }

    /// A short description of the runtime type, used in type-error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::EmptyList => "empty-list",
            Value::Unspecified => "unspecified",
            Value::Pair(_) => "pair",
            Value::Primitive(_) => "primitive-procedure",
            Value::Lambda(_) => "lambda-procedure",
            Value::DynamicLambda(_) => "dlambda-procedure",
            Value::Macro(_) => "macro-procedure",
            Value::Promise(_) => "promise",
        }
    }

    /// Render in `display` form: strings without their quotes, recursively.
    pub fn display_string(&self) -> String {
        let mut s = String::new();
        self.write(&mut s, false)
            .expect("writing to String cannot fail");
        s
    }

    /// Render in `print`/read-syntax form: strings with their quotes.
    pub fn print_string(&self) -> String {
        let mut s = String::new();
        self.write(&mut s, true)
            .expect("writing to String cannot fail");
        s
    }

    fn write(&self, out: &mut impl fmt::Write, quoted: bool) -> fmt::Result {
        match self {
            Value::Boolean(true) => write!(out, "#t"),
            Value::Boolean(false) => write!(out, "#f"),
            Value::Integer(n) => write!(out, "{}", n),
            Value::Real(r) => write_real(out, *r),
            Value::String(s) => {
                if quoted {
                    write!(out, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
                } else {
                    write!(out, "{}", s)
                }
            }
            Value::Symbol(s) => write!(out, "{}", s),
            Value::EmptyList => write!(out, "()"),
            Value::Unspecified => write!(out, "undefined"),
            Value::Pair(cell) => {
                write!(out, "(")?;
                let c = cell.borrow();
                c.first.write(out, quoted)?;
                let mut rest = c.rest.clone();
                loop {
                    match rest {
                        Value::EmptyList => break,
                        Value::Pair(next) => {
                            let n = next.borrow();
                            write!(out, " ")?;
                            n.first.write(out, quoted)?;
                            rest = n.rest.clone();
                        }
                        other => {
                            write!(out, " . ")?;
                            other.write(out, quoted)?;
                            break;
                        }
                    }
                }
                write!(out, ")")
            }
            Value::Primitive(p) => write!(out, "#[primitive {}]", p.name),
            Value::Lambda(_) => write!(out, "#[lambda]"),
            Value::DynamicLambda(_) => write!(out, "#[dlambda]"),
            Value::Macro(_) => write!(out, "#[macro]"),
            Value::Promise(_) => write!(out, "#[promise]"),
        }
    }
}

fn write_real(out: &mut impl fmt::Write, r: f64) -> fmt::Result {
    let s = format!("{}", r);
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("nan") {
        write!(out, "{}", s)
    } else {
        write!(out, "{}.0", s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write(f, true)
    }
}

/// Normalizes an arithmetic `f64` result to `Integer` when it is exactly
/// integral and representable as `i64`, otherwise keeps it as `Real`.
pub fn normalize_number(x: f64) -> Value {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < i64::MAX as f64 {
        Value::Integer(x as i64)
    } else {
        Value::Real(x)
    }
}

/// `eq?`: identity on non-symbol compound values, name-equality on symbols.
pub fn eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::Boolean(x), Value::Boolean(y)) => x == y,
        (Value::Integer(x), Value::Integer(y)) => x == y,
        (Value::Real(x), Value::Real(y)) => x == y,
        (Value::EmptyList, Value::EmptyList) => true,
        (Value::Unspecified, Value::Unspecified) => true,
        (Value::Pair(x), Value::Pair(y)) => Rc::ptr_eq(x, y),
        (Value::String(x), Value::String(y)) => Rc::ptr_eq(x, y),
        (Value::Primitive(x), Value::Primitive(y)) => Rc::ptr_eq(x, y),
        (Value::Lambda(x), Value::Lambda(y)) => Rc::ptr_eq(x, y),
        (Value::DynamicLambda(x), Value::DynamicLambda(y)) => Rc::ptr_eq(x, y),
        (Value::Macro(x), Value::Macro(y)) => Rc::ptr_eq(x, y),
        (Value::Promise(x), Value::Promise(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

/// `eqv?`: numeric/symbol value equality, identity otherwise.
pub fn eqv(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(_) | Value::Real(_), Value::Integer(_) | Value::Real(_)) => {
            a.as_number() == b.as_number()
        }
        _ => eq(a, b),
    }
}

/// `equal?`: deep structural equality.
pub fn equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(_) | Value::Real(_), Value::Integer(_) | Value::Real(_)) => {
            a.as_number() == b.as_number()
        }
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::Pair(x), Value::Pair(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            equal(&x.first, &y.first) && equal(&x.rest, &y.rest)
        }
        _ => eqv(a, b),
    }
}
