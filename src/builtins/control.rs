//! Higher-order list operations and the two primitives that reach back into
//! the evaluator: `map filter reduce eval apply`.

use crate::env::Environment;
use crate::error::{self, SchemeError};
use crate::eval;
use crate::value::Value;

fn proc_at<'a>(args: &'a [Value], fname: &'static str, i: usize) -> Result<&'a Value, SchemeError> {
    if !args[i].is_procedure() {
        return Err(SchemeError::type_error(fname, "procedure", args[i].print_string(), i));
    }
    Ok(&args[i])
}

pub fn map(args: &[Value], env: &Environment) -> Result<Value, SchemeError> {
    if args.len() != 2 {
        return Err(SchemeError::arity_error("map", error::ARITY_TWO, args.len()));
    }
    let f = proc_at(args, "map", 0)?.clone();
    let items = args[1].to_vec().map_err(|_| {
        SchemeError::type_error("map", "proper list", args[1].print_string(), 1)
    })?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(eval::apply(f.clone(), vec![item], env)?);
    }
    Ok(Value::list(out))
}

pub fn filter(args: &[Value], env: &Environment) -> Result<Value, SchemeError> {
    if args.len() != 2 {
        return Err(SchemeError::arity_error("filter", error::ARITY_TWO, args.len()));
    }
    let f = proc_at(args, "filter", 0)?.clone();
    let items = args[1].to_vec().map_err(|_| {
        SchemeError::type_error("filter", "proper list", args[1].print_string(), 1)
    })?;
    let mut out = Vec::new();
    for item in items {
        if eval::apply(f.clone(), vec![item.clone()], env)?.is_truthy() {
            out.push(item);
        }
    }
    Ok(Value::list(out))
}

pub fn reduce(args: &[Value], env: &Environment) -> Result<Value, SchemeError> {
    if args.len() != 3 {
        return Err(SchemeError::arity_error("reduce", "3", args.len()));
    }
    let f = proc_at(args, "reduce", 0)?.clone();
    let init = args[1].clone();
    let items = args[2].to_vec().map_err(|_| {
        SchemeError::type_error("reduce", "proper list", args[2].print_string(), 2)
    })?;
    let mut acc = init;
    for item in items {
        acc = eval::apply(f.clone(), vec![acc, item], env)?;
    }
    Ok(acc)
}

pub fn scheme_eval(args: &[Value], env: &Environment) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("eval", error::ARITY_ONE, args.len()));
    }
    eval::eval(args[0].clone(), env.clone())
}

pub fn scheme_apply(args: &[Value], env: &Environment) -> Result<Value, SchemeError> {
    if args.len() < 2 {
        return Err(SchemeError::arity_error("apply", "at least 2", args.len()));
    }
    let f = proc_at(args, "apply", 0)?.clone();
    let mut call_args = args[1..args.len() - 1].to_vec();
    let last = args.last().unwrap();
    call_args.extend(last.to_vec().map_err(|_| {
        SchemeError::type_error("apply", "proper list", last.print_string(), args.len() - 1)
    })?);
    eval::apply(f, call_args, env)
}

pub fn register(env: &Environment) {
    crate::builtins::define_env(env, "map", map);
    crate::builtins::define_env(env, "filter", filter);
    crate::builtins::define_env(env, "reduce", reduce);
    crate::builtins::define_env(env, "eval", scheme_eval);
    crate::builtins::define_env(env, "apply", scheme_apply);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_all() -> Environment {
        let env = Environment::new();
        crate::builtins::register_all(&env);
        env
    }

    #[test]
    fn map_doubles_every_element() {
        let env = env_with_all();
        env.define("double", crate::eval::eval(
            parse("(lambda (x) (* x 2))"),
            env.clone(),
        ).unwrap());
        let list = Value::list(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        let v = map(&[env.lookup("double").unwrap(), list], &env).unwrap();
        assert_eq!(v.print_string(), "(2 4 6)");
    }

    #[test]
    fn filter_keeps_matching_elements() {
        let env = env_with_all();
        let is_even = env.lookup("even?").unwrap();
        let list = Value::list(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3), Value::Integer(4)]);
        let v = filter(&[is_even, list], &env).unwrap();
        assert_eq!(v.print_string(), "(2 4)");
    }

    #[test]
    fn reduce_sums_a_list() {
        let env = env_with_all();
        let plus = env.lookup("+").unwrap();
        let list = Value::list(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        let v = reduce(&[plus, Value::Integer(0), list], &env).unwrap();
        assert!(matches!(v, Value::Integer(6)));
    }

    #[test]
    fn apply_spreads_the_final_list_argument() {
        let env = env_with_all();
        let plus = env.lookup("+").unwrap();
        let list = Value::list(vec![Value::Integer(2), Value::Integer(3)]);
        let v = scheme_apply(&[plus, Value::Integer(1), list], &env).unwrap();
        assert!(matches!(v, Value::Integer(6)));
    }

    #[test]
    fn eval_reduces_a_quoted_expression() {
        let env = env_with_all();
        let v = scheme_eval(&[parse("(+ 1 2)")], &env).unwrap();
        assert!(matches!(v, Value::Integer(3)));
    }

    fn parse(src: &str) -> Value {
        let mut lines = vec![src.to_string()].into_iter();
        let mut next = move || lines.next();
        crate::parser::Parser::new().parse(&mut next).unwrap()
    }
}
