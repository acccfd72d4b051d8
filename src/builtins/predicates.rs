//! Type predicates: `atom? boolean? integer? list? number? null? pair?
//! procedure? promise? string? symbol? even? odd? zero? scheme-valid-cdr?`.

use crate::env::Environment;
use crate::error::{self, SchemeError};
use crate::value::Value;

fn one<'a>(args: &'a [Value], fname: &'static str) -> Result<&'a Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error(fname, error::ARITY_ONE, args.len()));
    }
    Ok(&args[0])
}

pub fn is_atom(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "atom?")?;
    Ok(Value::Boolean(!v.is_pair()))
}

pub fn is_boolean(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "boolean?")?;
    Ok(Value::Boolean(matches!(v, Value::Boolean(_))))
}

pub fn is_integer(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "integer?")?;
    Ok(Value::Boolean(matches!(v, Value::Integer(_))))
}

pub fn is_list(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "list?")?;
    Ok(Value::Boolean(v.is_list()))
}

pub fn is_number(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "number?")?;
    Ok(Value::Boolean(v.is_number()))
}

pub fn is_null(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "null?")?;
    Ok(Value::Boolean(v.is_null()))
}

pub fn is_pair(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "pair?")?;
    Ok(Value::Boolean(v.is_pair()))
}

pub fn is_procedure(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "procedure?")?;
    Ok(Value::Boolean(v.is_procedure()))
}

pub fn is_promise(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "promise?")?;
    Ok(Value::Boolean(v.is_promise()))
}

pub fn is_string(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "string?")?;
    Ok(Value::Boolean(matches!(v, Value::String(_))))
}

pub fn is_symbol(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "symbol?")?;
    Ok(Value::Boolean(v.is_symbol()))
}

pub fn is_even(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "even?")?;
    let n = v.as_number().ok_or_else(|| SchemeError::type_error("even?", "number", v.print_string(), 0))?;
    Ok(Value::Boolean(n.rem_euclid(2.0) == 0.0))
}

pub fn is_odd(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "odd?")?;
    let n = v.as_number().ok_or_else(|| SchemeError::type_error("odd?", "number", v.print_string(), 0))?;
    Ok(Value::Boolean(n.rem_euclid(2.0) != 0.0))
}

pub fn is_zero(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "zero?")?;
    let n = v.as_number().ok_or_else(|| SchemeError::type_error("zero?", "number", v.print_string(), 0))?;
    Ok(Value::Boolean(n == 0.0))
}

pub fn is_valid_cdr(args: &[Value]) -> Result<Value, SchemeError> {
    let v = one(args, "scheme-valid-cdr?")?;
    Ok(Value::Boolean(v.is_valid_cdr()))
}

pub fn register(env: &Environment) {
    crate::builtins::define_plain(env, "atom?", is_atom);
    crate::builtins::define_plain(env, "boolean?", is_boolean);
    crate::builtins::define_plain(env, "integer?", is_integer);
    crate::builtins::define_plain(env, "list?", is_list);
    crate::builtins::define_plain(env, "number?", is_number);
    crate::builtins::define_plain(env, "null?", is_null);
    crate::builtins::define_plain(env, "pair?", is_pair);
    crate::builtins::define_plain(env, "procedure?", is_procedure);
    crate::builtins::define_plain(env, "promise?", is_promise);
    crate::builtins::define_plain(env, "string?", is_string);
    crate::builtins::define_plain(env, "symbol?", is_symbol);
    crate::builtins::define_plain(env, "even?", is_even);
    crate::builtins::define_plain(env, "odd?", is_odd);
    crate::builtins::define_plain(env, "zero?", is_zero);
    crate::builtins::define_plain(env, "scheme-valid-cdr?", is_valid_cdr);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_predicate_true_for_empty_list() {
        assert!(matches!(is_list(&[Value::EmptyList]), Ok(Value::Boolean(true))));
    }

    #[test]
    fn pair_predicate_false_for_empty_list() {
        assert!(matches!(is_pair(&[Value::EmptyList]), Ok(Value::Boolean(false))));
    }

    #[test]
    fn even_and_odd() {
        assert!(matches!(is_even(&[Value::Integer(4)]), Ok(Value::Boolean(true))));
        assert!(matches!(is_odd(&[Value::Integer(4)]), Ok(Value::Boolean(false))));
    }

    #[test]
    fn atom_is_true_for_non_pairs() {
        assert!(matches!(is_atom(&[Value::Integer(1)]), Ok(Value::Boolean(true))));
        let p = Value::cons(Value::Integer(1), Value::EmptyList);
        assert!(matches!(is_atom(&[p]), Ok(Value::Boolean(false))));
    }
}
