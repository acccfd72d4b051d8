//! Stream operations built on `cons-stream` pairs (an eager car, a promise
//! cdr) and `force`, which resolves any promise.
//!
//! `force` never memoizes: each call re-evaluates the promise's expression
//! in its captured environment, so an infinite stream stays infinite but a
//! promise with side effects runs them every time it is forced.

use crate::env::Environment;
use crate::error::{self, SchemeError};
use crate::eval;
use crate::value::Value;

pub fn force(args: &[Value], env: &Environment) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("force", error::ARITY_ONE, args.len()));
    }
    match &args[0] {
        Value::Promise(cell) => {
            let c = cell.borrow();
            eval::eval(c.expr.clone(), c.env.clone())
        }
        other => Ok(other.clone()),
    }
}

fn stream_pair_at<'a>(args: &'a [Value], fname: &'static str) -> Result<&'a Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error(fname, error::ARITY_ONE, args.len()));
    }
    if !args[0].is_pair() {
        return Err(SchemeError::type_error(fname, "stream pair", args[0].print_string(), 0));
    }
    Ok(&args[0])
}

pub fn stream_car(args: &[Value]) -> Result<Value, SchemeError> {
    Ok(stream_pair_at(args, "stream-car")?.car().unwrap())
}

pub fn stream_cdr(args: &[Value], env: &Environment) -> Result<Value, SchemeError> {
    let tail = stream_pair_at(args, "stream-cdr")?.cdr().unwrap();
    force(&[tail], env)
}

pub fn is_stream_null(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("stream-null?", error::ARITY_ONE, args.len()));
    }
    Ok(Value::Boolean(args[0].is_null()))
}

pub fn is_stream_pair(args: &[Value]) -> Result<Value, SchemeError> {
    if args.len() != 1 {
        return Err(SchemeError::arity_error("stream-pair?", error::ARITY_ONE, args.len()));
    }
    Ok(Value::Boolean(args[0].is_pair()))
}

pub fn stream_map(args: &[Value], env: &Environment) -> Result<Value, SchemeError> {
    if args.len() != 2 {
        return Err(SchemeError::arity_error("stream-map", error::ARITY_TWO, args.len()));
    }
    let f = args[0].clone();
    if !f.is_procedure() {
        return Err(SchemeError::type_error("stream-map", "procedure", f.print_string(), 0));
    }
    if args[1].is_null() {
        return Ok(Value::EmptyList);
    }
    let head = stream_car(&[args[1].clone()])?;
    let tail = args[1].cdr().unwrap();
    let mapped_head = eval::apply(f.clone(), vec![head], env)?;
    let deferred_env = env.extend(
        &Value::list(vec![Value::symbol("__stream_map_proc"), Value::symbol("__stream_map_tail")]),
        &[f, tail],
    )?;
    let expr = Value::list(vec![
        Value::symbol("stream-map"),
        Value::symbol("__stream_map_proc"),
        Value::list(vec![Value::symbol("force"), Value::symbol("__stream_map_tail")]),
    ]);
    Ok(Value::cons(
        mapped_head,
        Value::Promise(std::rc::Rc::new(std::cell::RefCell::new(crate::value::PromiseCell {
            expr,
            env: deferred_env,
        }))),
    ))
}

pub fn stream_filter(args: &[Value], env: &Environment) -> Result<Value, SchemeError> {
    if args.len() != 2 {
        return Err(SchemeError::arity_error("stream-filter", error::ARITY_TWO, args.len()));
    }
    let f = args[0].clone();
    if !f.is_procedure() {
        return Err(SchemeError::type_error("stream-filter", "procedure", f.print_string(), 0));
    }
    let mut cur = args[1].clone();
    loop {
        if cur.is_null() {
            return Ok(Value::EmptyList);
        }
        let head = stream_car(&[cur.clone()])?;
        if eval::apply(f.clone(), vec![head.clone()], env)?.is_truthy() {
            let tail = cur.cdr().unwrap();
            let deferred_env = env.extend(
                &Value::list(vec![
                    Value::symbol("__stream_filter_proc"),
                    Value::symbol("__stream_filter_tail"),
                ]),
                &[f, tail],
            )?;
            let expr = Value::list(vec![
                Value::symbol("stream-filter"),
                Value::symbol("__stream_filter_proc"),
                Value::list(vec![Value::symbol("force"), Value::symbol("__stream_filter_tail")]),
            ]);
            return Ok(Value::cons(
                head,
                Value::Promise(std::rc::Rc::new(std::cell::RefCell::new(crate::value::PromiseCell {
                    expr,
                    env: deferred_env,
                }))),
            ));
        }
        cur = stream_cdr(&[cur], env)?;
    }
}

pub fn stream_reduce(args: &[Value], env: &Environment) -> Result<Value, SchemeError> {
    if args.len() != 3 {
        return Err(SchemeError::arity_error("stream-reduce", "3", args.len()));
    }
    let f = args[0].clone();
    if !f.is_procedure() {
        return Err(SchemeError::type_error("stream-reduce", "procedure", f.print_string(), 0));
    }
    let mut acc = args[1].clone();
    let mut cur = args[2].clone();
    while !cur.is_null() {
        let head = stream_car(&[cur.clone()])?;
        acc = eval::apply(f.clone(), vec![acc, head], env)?;
        cur = stream_cdr(&[cur], env)?;
    }
    Ok(acc)
}

pub fn register(env: &Environment) {
    crate::builtins::define_env(env, "force", force);
    crate::builtins::define_plain(env, "stream-car", stream_car);
    crate::builtins::define_env(env, "stream-cdr", stream_cdr);
    crate::builtins::define_plain(env, "stream-null?", is_stream_null);
    crate::builtins::define_plain(env, "stream-pair?", is_stream_pair);
    crate::builtins::define_env(env, "stream-map", stream_map);
    crate::builtins::define_env(env, "stream-filter", stream_filter);
    crate::builtins::define_env(env, "stream-reduce", stream_reduce);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_all() -> Environment {
        let e = Environment::new();
        crate::builtins::register_all(&e);
        e
    }

    fn eval_str(src: &str, env: &Environment) -> Value {
        let mut lines = vec![src.to_string()].into_iter();
        let mut next = move || lines.next();
        let expr = crate::parser::Parser::new().parse(&mut next).unwrap();
        eval::eval(expr, env.clone()).unwrap()
    }

    #[test]
    fn stream_car_and_cdr_force_the_tail() {
        let env = env_with_all();
        eval_str("(define ones (cons-stream 1 ones))", &env);
        let ones = env.lookup("ones").unwrap();
        assert!(matches!(stream_car(&[ones.clone()]), Ok(Value::Integer(1))));
        let tail = stream_cdr(&[ones], &env).unwrap();
        assert!(matches!(stream_car(&[tail]), Ok(Value::Integer(1))));
    }

    #[test]
    fn stream_map_transforms_lazily() {
        let env = env_with_all();
        eval_str("(define (ints-from n) (cons-stream n (ints-from (+ n 1))))", &env);
        eval_str("(define nats (ints-from 0))", &env);
        eval_str("(define doubled (stream-map (lambda (x) (* x 2)) nats))", &env);
        let doubled = env.lookup("doubled").unwrap();
        assert!(matches!(stream_car(&[doubled.clone()]), Ok(Value::Integer(0))));
        let tail = stream_cdr(&[doubled], &env).unwrap();
        assert!(matches!(stream_car(&[tail]), Ok(Value::Integer(2))));
    }

    #[test]
    fn force_is_not_memoized() {
        let env = env_with_all();
        eval_str("(define counter 0)", &env);
        eval_str("(define p (delay (begin (set! counter (+ counter 1)) counter)))", &env);
        let p = env.lookup("p").unwrap();
        let a = force(&[p.clone()], &env).unwrap();
        let b = force(&[p], &env).unwrap();
        assert!(matches!(a, Value::Integer(1)));
        assert!(matches!(b, Value::Integer(2)));
    }
}
