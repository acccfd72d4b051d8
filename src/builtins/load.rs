//! `load` and `load-all`: read one or all `.scm` files from the sandboxed
//! filesystem and evaluate each form they contain, in order.

use crate::env::Environment;
use crate::error::SchemeError;
use crate::parser::Parser;
use crate::sandbox::Sandbox;
use crate::value::Value;

/// Evaluates every top-level form in `src`, in order, returning the value
/// of the last one (`Unspecified` for an empty file).
pub fn eval_source(src: &str, env: &Environment) -> Result<Value, SchemeError> {
    let mut lines = src.lines().map(|l| l.to_string());
    let mut next_line = move || lines.next();
    let mut parser = Parser::new();
    let mut last = Value::Unspecified;
    loop {
        match parser.parse(&mut next_line) {
            Ok(expr) => last = crate::eval::eval(expr, env.clone())?,
            Err(SchemeError::EndOfInput) => return Ok(last),
            Err(e) => return Err(e),
        }
    }
}

fn resolve_name(sandbox: &Sandbox, name: &str) -> Result<String, SchemeError> {
    if sandbox.file_exists(name) {
        return Ok(name.to_string());
    }
    let with_ext = format!("{}.scm", name);
    if sandbox.file_exists(&with_ext) {
        return Ok(with_ext);
    }
    Err(SchemeError::Custom(format!("load: no such file: {}", name)))
}

pub fn load(args: &[Value], env: &Environment) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("load", "1", args.len()));
    }
    let name = args[0]
        .as_symbol()
        .or(match &args[0] {
            Value::String(s) => Some(s.as_ref()),
            _ => None,
        })
        .ok_or_else(|| SchemeError::type_error("load", "symbol or string", args[0].print_string(), 0))?
        .to_string();

    crate::builtins::with_sandbox(|sandbox| {
        let resolved = resolve_name(sandbox, &name)?;
        let src = sandbox
            .read_file(&resolved)
            .map_err(|e| SchemeError::Custom(format!("load: {}", e)))?;
        eval_source(&src, env)
    })
}

pub fn load_all(args: &[Value], env: &Environment) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("load-all", "1", args.len()));
    }
    let dir = args[0]
        .as_symbol()
        .or(match &args[0] {
            Value::String(s) => Some(s.as_ref()),
            _ => None,
        })
        .ok_or_else(|| SchemeError::type_error("load-all", "symbol or string", args[0].print_string(), 0))?
        .to_string();

    crate::builtins::with_sandbox(|sandbox| {
        let files = sandbox
            .list_scm_files(&dir)
            .map_err(|e| SchemeError::Custom(format!("load-all: {}", e)))?;
        let mut last = Value::Unspecified;
        for file in files {
            let path = if dir == "." { file } else { format!("{}/{}", dir, file) };
            let src = sandbox
                .read_file(&path)
                .map_err(|e| SchemeError::Custom(format!("load-all: {}", e)))?;
            last = eval_source(&src, env)?;
        }
        Ok(last)
    })
}

pub fn register(env: &Environment) {
    crate::builtins::define_env(env, "load", load);
    crate::builtins::define_env(env, "load-all", load_all);
}
