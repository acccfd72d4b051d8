//! Pair and list operations: `car cdr cons append length list set-car! set-cdr!`.

use crate::env::Environment;
use crate::error::{self, SchemeError};
use crate::value::Value;

fn pair_at<'a>(args: &'a [Value], fname: &'static str, i: usize) -> Result<&'a Value, SchemeError> {
    if !args[i].is_pair() {
        return Err(SchemeError::type_error(fname, "pair", args[i].print_string(), i));
    }
    Ok(&args[i])
}

pub fn car(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("car", error::ARITY_ONE, args.len()));
    }
    pair_at(args, "car", 0)?.car().ok_or_else(|| SchemeError::runtime_error("car", "unreachable"))
}

pub fn cdr(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("cdr", error::ARITY_ONE, args.len()));
    }
    pair_at(args, "cdr", 0)?.cdr().ok_or_else(|| SchemeError::runtime_error("cdr", "unreachable"))
}

pub fn cons(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 2 {
        return Err(SchemeError::arity_error("cons", error::ARITY_TWO, args.len()));
    }
    Ok(Value::cons(args[0].clone(), args[1].clone()))
}

pub fn list(args: &[Value]) -> Result<Value, SchemeError> {
    Ok(Value::list(args.to_vec()))
}

pub fn append(args: &[Value]) -> Result<Value, SchemeError> {
    if args.is_empty() {
        return Ok(Value::EmptyList);
    }
    let mut items = Vec::new();
    for (i, a) in args[..args.len() - 1].iter().enumerate() {
        items.extend(a.to_vec().map_err(|_| {
            SchemeError::type_error("append", "proper list", a.print_string(), i)
        })?);
    }
    let mut result = args[args.len() - 1].clone();
    for item in items.into_iter().rev() {
        result = Value::cons(item, result);
    }
    Ok(result)
}

pub fn length(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("length", error::ARITY_ONE, args.len()));
    }
    Ok(Value::Integer(args[0].list_len()? as i64))
}

pub fn set_car(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 2 {
        return Err(SchemeError::arity_error("set-car!", error::ARITY_TWO, args.len()));
    }
    match &args[0] {
        Value::Pair(cell) => {
            cell.borrow_mut().first = args[1].clone();
            Ok(Value::Unspecified)
        }
        other => Err(SchemeError::type_error("set-car!", "pair", other.print_string(), 0)),
    }
}

pub fn set_cdr(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 2 {
        return Err(SchemeError::arity_error("set-cdr!", error::ARITY_TWO, args.len()));
    }
    if !args[1].is_valid_cdr() {
        return Err(SchemeError::type_error("set-cdr!", "pair, empty-list, or promise", args[1].print_string(), 1));
    }
    match &args[0] {
        Value::Pair(cell) => {
            cell.borrow_mut().rest = args[1].clone();
            Ok(Value::Unspecified)
        }
        other => Err(SchemeError::type_error("set-cdr!", "pair", other.print_string(), 0)),
    }
}

pub fn register(env: &Environment) {
    crate::builtins::define_plain(env, "car", car);
    crate::builtins::define_plain(env, "cdr", cdr);
    crate::builtins::define_plain(env, "cons", cons);
    crate::builtins::define_plain(env, "list", list);
    crate::builtins::define_plain(env, "append", append);
    crate::builtins::define_plain(env, "length", length);
    crate::builtins::define_plain(env, "set-car!", set_car);
    crate::builtins::define_plain(env, "set-cdr!", set_cdr);
}
