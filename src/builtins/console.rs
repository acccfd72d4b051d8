//! Output primitives: `display displayln newline print print-then-return`.
//!
//! `display` omits a string's surrounding quotes; `print` uses read syntax.

use crate::env::Environment;
use crate::error::{self, SchemeError};
use crate::value::Value;

pub fn display(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("display", error::ARITY_ONE, args.len()));
    }
    print!("{}", args[0].display_string());
    Ok(Value::Unspecified)
}

pub fn displayln(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("displayln", error::ARITY_ONE, args.len()));
    }
    println!("{}", args[0].display_string());
    Ok(Value::Unspecified)
}

pub fn newline(args: &[Value]) -> Result<Value, SchemeError> {
    if !args.is_empty() {
        return Err(SchemeError::arity_error("newline", "0", args.len()));
    }
    println!();
    Ok(Value::Unspecified)
}

pub fn print(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("print", error::ARITY_ONE, args.len()));
    }
    println!("{}", args[0].print_string());
    Ok(Value::Unspecified)
}

/// Like `print`, but returns the value instead of Unspecified -- useful for
/// tracing an expression's value inline without disturbing its result.
pub fn print_then_return(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("print-then-return", error::ARITY_ONE, args.len()));
    }
    println!("{}", args[0].print_string());
    Ok(args[0].clone())
}

pub fn register(env: &Environment) {
    crate::builtins::define_plain(env, "display", display);
    crate::builtins::define_plain(env, "displayln", displayln);
    crate::builtins::define_plain(env, "newline", newline);
    crate::builtins::define_plain(env, "print", print);
    crate::builtins::define_plain(env, "print-then-return", print_then_return);
}
