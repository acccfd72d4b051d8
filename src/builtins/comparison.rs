//! Comparisons and the three equality relations: `= < > <= >= eq? equal? eqv? not`.

use crate::env::Environment;
use crate::error::{self, SchemeError};
use crate::value::{eq, equal, eqv, Value};

fn numbers(args: &[Value], fname: &str) -> Result<Vec<f64>, SchemeError> {
    if args.len() < 2 {
        return Err(SchemeError::arity_error(fname, error::ARITY_AT_LEAST_ONE, args.len()));
    }
    args.iter()
        .enumerate()
        .map(|(i, a)| a.as_number().ok_or_else(|| SchemeError::type_error(fname, "number", a.print_string(), i)))
        .collect()
}

fn chain(args: &[Value], fname: &str, cmp: impl Fn(f64, f64) -> bool) -> Result<Value, SchemeError> {
    let ns = numbers(args, fname)?;
    Ok(Value::Boolean(ns.windows(2).all(|w| cmp(w[0], w[1]))))
}

pub fn num_eq(args: &[Value]) -> Result<Value, SchemeError> {
    chain(args, "=", |a, b| a == b)
}

pub fn lt(args: &[Value]) -> Result<Value, SchemeError> {
    chain(args, "<", |a, b| a < b)
}

pub fn gt(args: &[Value]) -> Result<Value, SchemeError> {
    chain(args, ">", |a, b| a > b)
}

pub fn le(args: &[Value]) -> Result<Value, SchemeError> {
    chain(args, "<=", |a, b| a <= b)
}

pub fn ge(args: &[Value]) -> Result<Value, SchemeError> {
    chain(args, ">=", |a, b| a >= b)
}

pub fn is_eq(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 2 {
        return Err(SchemeError::arity_error("eq?", error::ARITY_TWO, args.len()));
    }
    Ok(Value::Boolean(eq(&args[0], &args[1])))
}

pub fn is_eqv(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 2 {
        return Err(SchemeError::arity_error("eqv?", error::ARITY_TWO, args.len()));
    }
    Ok(Value::Boolean(eqv(&args[0], &args[1])))
}

pub fn is_equal(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 2 {
        return Err(SchemeError::arity_error("equal?", error::ARITY_TWO, args.len()));
    }
    Ok(Value::Boolean(equal(&args[0], &args[1])))
}

pub fn not(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("not", error::ARITY_ONE, args.len()));
    }
    Ok(Value::Boolean(!args[0].is_truthy()))
}

pub fn register(env: &Environment) {
    crate::builtins::define_plain(env, "=", num_eq);
    crate::builtins::define_plain(env, "<", lt);
    crate::builtins::define_plain(env, ">", gt);
    crate::builtins::define_plain(env, "<=", le);
    crate::builtins::define_plain(env, ">=", ge);
    crate::builtins::define_plain(env, "eq?", is_eq);
    crate::builtins::define_plain(env, "eqv?", is_eqv);
    crate::builtins::define_plain(env, "equal?", is_equal);
    crate::builtins::define_plain(env, "not", not);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_less_than() {
        let v = lt(&[Value::Integer(1), Value::Integer(2), Value::Integer(3)]).unwrap();
        assert!(matches!(v, Value::Boolean(true)));
    }

    #[test]
    fn eq_is_identity_equal_is_structural() {
        let a = Value::list(vec![Value::Integer(1)]);
        let b = Value::list(vec![Value::Integer(1)]);
        assert!(matches!(is_eq(&[a.clone(), b.clone()]), Ok(Value::Boolean(false))));
        assert!(matches!(is_equal(&[a, b]), Ok(Value::Boolean(true))));
    }

    #[test]
    fn eqv_compares_numbers_across_integer_and_real() {
        let v = is_eqv(&[Value::Integer(2), Value::Real(2.0)]).unwrap();
        assert!(matches!(v, Value::Boolean(true)));
    }

    #[test]
    fn not_negates_truthiness() {
        assert!(matches!(not(&[Value::Boolean(false)]), Ok(Value::Boolean(true))));
        assert!(matches!(not(&[Value::Integer(0)]), Ok(Value::Boolean(false))));
    }
}
