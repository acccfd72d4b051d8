//! Arithmetic primitives: `+ - * / abs expt modulo quotient remainder` and the
//! transcendental functions, all operating on the `Integer`/`Real` split and
//! normalizing exact results back to `Integer` via `value::normalize_number`.

use crate::env::Environment;
use crate::error::{self, SchemeError};
use crate::value::{normalize_number, Value};

fn number_at(args: &[Value], fname: &str, i: usize) -> Result<f64, SchemeError> {
    args[i]
        .as_number()
        .ok_or_else(|| SchemeError::type_error(fname, "number", args[i].print_string(), i))
}

pub fn add(args: &[Value]) -> Result<Value, SchemeError> {
    let mut sum = 0.0;
    for (i, _) in args.iter().enumerate() {
        sum += number_at(args, "+", i)?;
    }
    Ok(normalize_number(sum))
}

pub fn sub(args: &[Value]) -> Result<Value, SchemeError> {
    if args.is_empty() {
        return Err(SchemeError::arity_error("-", error::ARITY_AT_LEAST_ONE, 0));
    }
    let first = number_at(args, "-", 0)?;
    if args.len() == 1 {
        return Ok(normalize_number(-first));
    }
    let mut result = first;
    for i in 1..args.len() {
        result -= number_at(args, "-", i)?;
    }
    Ok(normalize_number(result))
}

pub fn mul(args: &[Value]) -> Result<Value, SchemeError> {
    let mut product = 1.0;
    for (i, _) in args.iter().enumerate() {
        product *= number_at(args, "*", i)?;
    }
    Ok(normalize_number(product))
}

pub fn div(args: &[Value]) -> Result<Value, SchemeError> {
    if args.is_empty() {
        return Err(SchemeError::arity_error("/", error::ARITY_AT_LEAST_ONE, 0));
    }
    let first = number_at(args, "/", 0)?;
    if args.len() == 1 {
        if first == 0.0 {
            return Err(SchemeError::DivisionByZero);
        }
        return Ok(normalize_number(1.0 / first));
    }
    let mut result = first;
    for i in 1..args.len() {
        let n = number_at(args, "/", i)?;
        if n == 0.0 {
            return Err(SchemeError::DivisionByZero);
        }
        result /= n;
    }
    Ok(normalize_number(result))
}

pub fn abs(args: &[Value]) -> Result<Value, SchemeError> {
    expect_arity(args, "abs", 1)?;
    Ok(normalize_number(number_at(args, "abs", 0)?.abs()))
}

pub fn expt(args: &[Value]) -> Result<Value, SchemeError> {
    expect_arity(args, "expt", 2)?;
    let base = number_at(args, "expt", 0)?;
    let exp = number_at(args, "expt", 1)?;
    Ok(normalize_number(base.powf(exp)))
}

pub fn modulo(args: &[Value]) -> Result<Value, SchemeError> {
    expect_arity(args, "modulo", 2)?;
    let a = number_at(args, "modulo", 0)?;
    let b = number_at(args, "modulo", 1)?;
    if b == 0.0 {
        return Err(SchemeError::DivisionByZero);
    }
    Ok(normalize_number(a.rem_euclid(b)))
}

pub fn quotient(args: &[Value]) -> Result<Value, SchemeError> {
    expect_arity(args, "quotient", 2)?;
    let a = number_at(args, "quotient", 0)?;
    let b = number_at(args, "quotient", 1)?;
    if b == 0.0 {
        return Err(SchemeError::DivisionByZero);
    }
    Ok(normalize_number((a / b).trunc()))
}

pub fn remainder(args: &[Value]) -> Result<Value, SchemeError> {
    expect_arity(args, "remainder", 2)?;
    let a = number_at(args, "remainder", 0)?;
    let b = number_at(args, "remainder", 1)?;
    if b == 0.0 {
        return Err(SchemeError::DivisionByZero);
    }
    Ok(normalize_number(a % b))
}

fn expect_arity(args: &[Value], name: &'static str, n: usize) -> Result<(), SchemeError> {
    if args.len() != n {
        return Err(SchemeError::arity_error(
            name,
            if n == 1 { error::ARITY_ONE } else { error::ARITY_TWO },
            args.len(),
        ));
    }
    Ok(())
}

macro_rules! unary_fn {
    ($name:ident, $fname:literal, $f:expr) => {
        pub fn $name(args: &[Value]) -> Result<Value, SchemeError> {
            expect_arity(args, $fname, 1)?;
            let x = number_at(args, $fname, 0)?;
            let f: fn(f64) -> f64 = $f;
            Ok(normalize_number(f(x)))
        }
    };
}

unary_fn!(acos, "acos", f64::acos);
unary_fn!(asin, "asin", f64::asin);
unary_fn!(atan, "atan", f64::atan);
unary_fn!(cos, "cos", f64::cos);
unary_fn!(sin, "sin", f64::sin);
unary_fn!(tan, "tan", f64::tan);
unary_fn!(cosh, "cosh", f64::cosh);
unary_fn!(sinh, "sinh", f64::sinh);
unary_fn!(tanh, "tanh", f64::tanh);
unary_fn!(ceil, "ceil", f64::ceil);
unary_fn!(floor, "floor", f64::floor);
unary_fn!(ln, "log", f64::ln);
unary_fn!(log10, "log10", f64::log10);
unary_fn!(log2, "log2", f64::log2);
unary_fn!(sqrt, "sqrt", f64::sqrt);
unary_fn!(trunc, "trunc", f64::trunc);

pub fn atan2(args: &[Value]) -> Result<Value, SchemeError> {
    expect_arity(args, "atan2", 2)?;
    let y = number_at(args, "atan2", 0)?;
    let x = number_at(args, "atan2", 1)?;
    Ok(normalize_number(y.atan2(x)))
}

pub fn register(env: &Environment) {
    crate::builtins::define_plain(env, "+", add);
    crate::builtins::define_plain(env, "-", sub);
    crate::builtins::define_plain(env, "*", mul);
    crate::builtins::define_plain(env, "/", div);
    crate::builtins::define_plain(env, "abs", abs);
    crate::builtins::define_plain(env, "expt", expt);
    crate::builtins::define_plain(env, "modulo", modulo);
    crate::builtins::define_plain(env, "quotient", quotient);
    crate::builtins::define_plain(env, "remainder", remainder);
    crate::builtins::define_plain(env, "acos", acos);
    crate::builtins::define_plain(env, "asin", asin);
    crate::builtins::define_plain(env, "atan", atan);
    crate::builtins::define_plain(env, "atan2", atan2);
    crate::builtins::define_plain(env, "cos", cos);
    crate::builtins::define_plain(env, "sin", sin);
    crate::builtins::define_plain(env, "tan", tan);
    crate::builtins::define_plain(env, "cosh", cosh);
    crate::builtins::define_plain(env, "sinh", sinh);
    crate::builtins::define_plain(env, "tanh", tanh);
    crate::builtins::define_plain(env, "ceil", ceil);
    crate::builtins::define_plain(env, "floor", floor);
    crate::builtins::define_plain(env, "log", ln);
    crate::builtins::define_plain(env, "log10", log10);
    crate::builtins::define_plain(env, "log2", log2);
    crate::builtins::define_plain(env, "sqrt", sqrt);
    crate::builtins::define_plain(env, "trunc", trunc);
}
