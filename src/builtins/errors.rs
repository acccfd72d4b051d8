//! `error` and `exit`: the two primitives that leave normal evaluation.

use crate::env::Environment;
use crate::error::SchemeError;
use crate::value::Value;

/// Raises a `SchemeError::Custom` built from the printed form of every
/// argument, space-separated -- there is no catchable error value in this
/// interpreter, only host-level `Result` propagation.
pub fn error(args: &[Value]) -> Result<Value, SchemeError> {
    let message = args
        .iter()
        .map(|a| a.display_string())
        .collect::<Vec<_>>()
        .join(" ");
    Err(SchemeError::Custom(message))
}

pub fn exit(args: &[Value]) -> Result<Value, SchemeError> {
    let code = match args {
        [] => 0,
        [Value::Integer(n)] => *n as i32,
        [other] => {
            return Err(SchemeError::type_error("exit", "integer", other.print_string(), 0))
        }
        _ => return Err(SchemeError::arity_error("exit", "0-1", args.len())),
    };
    std::process::exit(code);
}

pub fn register(env: &Environment) {
    crate::builtins::define_plain(env, "error", error);
    crate::builtins::define_plain(env, "exit", exit);
    crate::builtins::define_plain(env, "quit", exit);
}
