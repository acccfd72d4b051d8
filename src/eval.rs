// ABOUTME: Evaluator module reducing expressions against an environment

//! The evaluator: reduces an expression against an environment to a value.
//!
//! Tail positions do not grow the Rust call stack. Every place a special
//! form's *last* action is "evaluate this expression in this environment"
//! returns a `Trampoline::Tail` instead of recursing, and the public
//! `eval`/`apply` entry points loop until a `Trampoline::Done` appears.
//! Everything else (operator/argument positions, `if`'s predicate, `let`'s
//! initializers, all but the last expression of a body) goes back through
//! `eval`, which is where real stack depth is spent and where the
//! recursion-limit counter below is charged.

use std::cell::Cell;
use std::rc::Rc;

use crate::env::Environment;
use crate::error::{self, SchemeError};
use crate::value::{LambdaProcedure, MacroProcedure, PrimitiveFn, PromiseCell, Value};

const MAX_DEPTH: usize = 10_000;

thread_local! {
    static DEPTH: Cell<usize> = Cell::new(0);
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Result<DepthGuard, SchemeError> {
        DEPTH.with(|d| {
            let cur = d.get();
            if cur >= MAX_DEPTH {
                return Err(SchemeError::RecursionLimit);
            }
            d.set(cur + 1);
            Ok(DepthGuard)
        })
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get() - 1));
    }
}

/// Internal one-shot continuation, never exposed to user-visible values.
enum Trampoline {
    Done(Value),
    Tail(Value, Environment),
}

/// Evaluates `expr` in `env`, running the trampoline to completion.
pub fn eval(expr: Value, env: Environment) -> Result<Value, SchemeError> {
    let _guard = DepthGuard::enter()?;
    let mut tramp = step(expr, env)?;
    loop {
        match tramp {
            Trampoline::Done(v) => return Ok(v),
            Trampoline::Tail(e, en) => tramp = step(e, en)?,
        }
    }
}

/// Applies `proc` to `args`, running the trampoline to completion. `env` is
/// the calling environment, used by `needs_env` primitives and `dlambda`.
pub fn apply(proc: Value, args: Vec<Value>, env: &Environment) -> Result<Value, SchemeError> {
    let _guard = DepthGuard::enter()?;
    let mut tramp = apply_step(proc, args, env)?;
    loop {
        match tramp {
            Trampoline::Done(v) => return Ok(v),
            Trampoline::Tail(e, en) => tramp = step(e, en)?,
        }
    }
}

fn step(expr: Value, env: Environment) -> Result<Trampoline, SchemeError> {
    match expr {
        Value::Symbol(ref name) => Ok(Trampoline::Done(env.lookup(name)?)),
        Value::Pair(ref cell) => {
            let (head, rest) = {
                let c = cell.borrow();
                (c.first.clone(), c.rest.clone())
            };
            if let Some(name) = head.as_symbol() {
                match name {
                    "quote" => return eval_quote(rest),
                    "if" => return eval_if(rest, env),
                    "cond" => return eval_cond(rest, env),
                    "and" => return eval_and(rest.to_vec()?, env),
                    "or" => return eval_or(rest.to_vec()?, env),
                    "begin" => return eval_begin(rest, env),
                    "let" => return eval_let(rest, env),
                    "lambda" => return eval_lambda(rest, env),
                    "dlambda" => return eval_dlambda(rest, env),
                    "define" => return eval_define(rest, env),
                    "set!" => return eval_set(rest, env),
                    "quasiquote" => return eval_quasiquote_form(rest, env),
                    "unquote" => {
                        return Err(SchemeError::runtime_error(
                            "unquote",
                            "not valid outside quasiquote",
                        ))
                    }
                    "define-macro" => return eval_define_macro(rest, env),
                    "delay" => return eval_delay(rest, env),
                    "cons-stream" => return eval_cons_stream(rest, env),
                    _ => {}
                }
            }
            let op = eval(head, env.clone())?;
            if let Value::Macro(m) = &op {
                let operands = rest.to_vec()?;
                let macro_env = m.env.extend(&m.params, &operands)?;
                let body = m.body.to_vec()?;
                let mut expanded = Value::Unspecified;
                for e in &body {
                    expanded = eval(e.clone(), macro_env.clone())?;
                }
                return Ok(Trampoline::Tail(expanded, env));
            }
            let args = rest
                .to_vec()?
                .into_iter()
                .map(|a| eval(a, env.clone()))
                .collect::<Result<Vec<_>, _>>()?;
            apply_step(op, args, &env)
        }
        // Self-evaluating atoms: booleans, numbers, strings, EmptyList,
        // Unspecified, and any procedure/promise value passed through verbatim.
        other => Ok(Trampoline::Done(other)),
    }
}

fn apply_step(proc: Value, args: Vec<Value>, call_env: &Environment) -> Result<Trampoline, SchemeError> {
    match proc {
        Value::Primitive(p) => {
            let result = match p.func {
                PrimitiveFn::Plain(f) => f(&args)?,
                PrimitiveFn::WithEnv(f) => f(&args, call_env)?,
            };
            Ok(Trampoline::Done(result))
        }
        Value::Lambda(l) => {
            let new_env = l.env.extend(&l.params, &args)?;
            eval_body_tail(&l.body.to_vec()?, new_env)
        }
        Value::DynamicLambda(d) => {
            let new_env = call_env.extend(&d.params, &args)?;
            eval_body_tail(&d.body.to_vec()?, new_env)
        }
        other => Err(SchemeError::NotCallable(other.type_name(), other.print_string())),
    }
}

fn eval_body_tail(body: &[Value], env: Environment) -> Result<Trampoline, SchemeError> {
    if body.is_empty() {
        return Err(SchemeError::runtime_error("body", "expected at least one expression"));
    }
    for e in &body[..body.len() - 1] {
        eval(e.clone(), env.clone())?;
    }
    Ok(Trampoline::Tail(body[body.len() - 1].clone(), env))
}

fn eval_quote(rest: Value) -> Result<Trampoline, SchemeError> {
    let parts = rest.to_vec()?;
    if parts.len() != 1 {
        return Err(SchemeError::arity_error("quote", error::ARITY_ONE, parts.len()));
    }
    Ok(Trampoline::Done(parts[0].clone()))
}

fn eval_if(rest: Value, env: Environment) -> Result<Trampoline, SchemeError> {
    let parts = rest.to_vec()?;
    match parts.len() {
        2 => {
            let pred = eval(parts[0].clone(), env.clone())?;
            if pred.is_truthy() {
                Ok(Trampoline::Tail(parts[1].clone(), env))
            } else {
                Ok(Trampoline::Done(Value::Boolean(false)))
            }
        }
        3 => {
            let pred = eval(parts[0].clone(), env.clone())?;
            if pred.is_truthy() {
                Ok(Trampoline::Tail(parts[1].clone(), env))
            } else {
                Ok(Trampoline::Tail(parts[2].clone(), env))
            }
        }
        n => Err(SchemeError::arity_error("if", error::ARITY_TWO_OR_THREE, n)),
    }
}

fn eval_cond(rest: Value, env: Environment) -> Result<Trampoline, SchemeError> {
    let clauses = rest.to_vec()?;
    for (i, clause) in clauses.iter().enumerate() {
        let parts = clause.to_vec()?;
        if parts.is_empty() {
            return Err(SchemeError::runtime_error("cond", "empty clause"));
        }
        let is_else = parts[0].as_symbol() == Some("else");
        if is_else {
            if i != clauses.len() - 1 {
                return Err(SchemeError::runtime_error("cond", "else must be the last clause"));
            }
            return eval_body_tail(&parts[1..], env);
        }
        let test = eval(parts[0].clone(), env.clone())?;
        if test.is_truthy() {
            if parts.len() == 1 {
                return Ok(Trampoline::Done(test));
            }
            return eval_body_tail(&parts[1..], env);
        }
    }
    Ok(Trampoline::Done(Value::Unspecified))
}

fn eval_and(rest: Vec<Value>, env: Environment) -> Result<Trampoline, SchemeError> {
    if rest.is_empty() {
        return Ok(Trampoline::Done(Value::Boolean(true)));
    }
    for e in &rest[..rest.len() - 1] {
        let v = eval(e.clone(), env.clone())?;
        if !v.is_truthy() {
            return Ok(Trampoline::Done(Value::Boolean(false)));
        }
    }
    Ok(Trampoline::Tail(rest[rest.len() - 1].clone(), env))
}

fn eval_or(rest: Vec<Value>, env: Environment) -> Result<Trampoline, SchemeError> {
    if rest.is_empty() {
        return Ok(Trampoline::Done(Value::Boolean(false)));
    }
    for e in &rest[..rest.len() - 1] {
        let v = eval(e.clone(), env.clone())?;
        if v.is_truthy() {
            return Ok(Trampoline::Done(v));
        }
    }
    Ok(Trampoline::Tail(rest[rest.len() - 1].clone(), env))
}

fn eval_begin(rest: Value, env: Environment) -> Result<Trampoline, SchemeError> {
    let parts = rest.to_vec()?;
    if parts.is_empty() {
        return Err(SchemeError::arity_error("begin", error::ARITY_AT_LEAST_ONE, 0));
    }
    eval_body_tail(&parts, env)
}

fn eval_let(rest: Value, env: Environment) -> Result<Trampoline, SchemeError> {
    let parts = rest.to_vec()?;
    if parts.is_empty() {
        return Err(SchemeError::runtime_error("let", "expected bindings and a body"));
    }
    let bindings = parts[0].to_vec()?;
    let mut names = Vec::with_capacity(bindings.len());
    let mut values = Vec::with_capacity(bindings.len());
    for binding in &bindings {
        let pair = binding.to_vec()?;
        if pair.len() != 2 {
            return Err(SchemeError::runtime_error("let", "binding must be (name value)"));
        }
        let name = pair[0]
            .as_symbol()
            .ok_or_else(|| SchemeError::runtime_error("let", "binding name must be a symbol"))?
            .to_string();
        // Initializers see the outer environment, not sibling bindings.
        let value = eval(pair[1].clone(), env.clone())?;
        names.push(name);
        values.push(value);
    }
    let params = Value::list(names.into_iter().map(Value::symbol).collect());
    crate::env::validate_distinct_params("let", &params)?;
    let new_env = env.extend(&params, &values)?;
    eval_body_tail(&parts[1..], new_env)
}

fn eval_lambda(rest: Value, env: Environment) -> Result<Trampoline, SchemeError> {
    let parts = rest.to_vec()?;
    if parts.len() < 2 {
        return Err(SchemeError::runtime_error("lambda", "expected parameters and a body"));
    }
    let params = parts[0].clone();
    crate::env::validate_distinct_params("lambda", &params)?;
    let body = Value::list(parts[1..].to_vec());
    Ok(Trampoline::Done(Value::Lambda(Rc::new(LambdaProcedure {
        params,
        body,
        env,
    }))))
}

fn eval_dlambda(rest: Value, _env: Environment) -> Result<Trampoline, SchemeError> {
    let parts = rest.to_vec()?;
    if parts.len() < 2 {
        return Err(SchemeError::runtime_error("dlambda", "expected parameters and a body"));
    }
    let params = parts[0].clone();
    crate::env::validate_distinct_params("dlambda", &params)?;
    let body = Value::list(parts[1..].to_vec());
    Ok(Trampoline::Done(Value::DynamicLambda(Rc::new(
        crate::value::DynamicLambdaProcedure { params, body },
    ))))
}

fn eval_define(rest: Value, env: Environment) -> Result<Trampoline, SchemeError> {
    let parts = rest.to_vec()?;
    if parts.is_empty() {
        return Err(SchemeError::runtime_error("define", "expected a name and a value"));
    }
    match &parts[0] {
        Value::Symbol(name) => {
            if parts.len() != 2 {
                return Err(SchemeError::arity_error("define", error::ARITY_TWO, parts.len()));
            }
            let value = eval(parts[1].clone(), env.clone())?;
            env.define(name.as_ref(), value);
            Ok(Trampoline::Done(Value::symbol(name.as_ref())))
        }
        Value::Pair(cell) => {
            let (head, params) = {
                let c = cell.borrow();
                (c.first.clone(), c.rest.clone())
            };
            let name = head
                .as_symbol()
                .ok_or_else(|| SchemeError::runtime_error("define", "function name must be a symbol"))?
                .to_string();
            if parts.len() < 2 {
                return Err(SchemeError::runtime_error("define", "function definition needs a body"));
            }
            let body = Value::list(parts[1..].to_vec());
            let lambda = Value::Lambda(Rc::new(LambdaProcedure {
                params,
                body,
                env: env.clone(),
            }));
            env.define(&name, lambda);
            Ok(Trampoline::Done(Value::symbol(name)))
        }
        other => Err(SchemeError::runtime_error(
            "define",
            format!("expected a symbol or a parameter list, got {}", other),
        )),
    }
}

fn eval_set(rest: Value, env: Environment) -> Result<Trampoline, SchemeError> {
    let parts = rest.to_vec()?;
    if parts.len() != 2 {
        return Err(SchemeError::arity_error("set!", error::ARITY_TWO, parts.len()));
    }
    let name = parts[0]
        .as_symbol()
        .ok_or_else(|| SchemeError::runtime_error("set!", "target must be a symbol"))?;
    let value = eval(parts[1].clone(), env.clone())?;
    env.set(name, value)?;
    Ok(Trampoline::Done(Value::Unspecified))
}

fn eval_define_macro(rest: Value, env: Environment) -> Result<Trampoline, SchemeError> {
    let parts = rest.to_vec()?;
    if parts.is_empty() {
        return Err(SchemeError::runtime_error("define-macro", "expected (name params...) and a body"));
    }
    let cell = match &parts[0] {
        Value::Pair(cell) => cell.clone(),
        other => {
            return Err(SchemeError::runtime_error(
                "define-macro",
                format!("expected (name . params), got {}", other),
            ))
        }
    };
    let (head, params) = {
        let c = cell.borrow();
        (c.first.clone(), c.rest.clone())
    };
    let name = head
        .as_symbol()
        .ok_or_else(|| SchemeError::runtime_error("define-macro", "macro name must be a symbol"))?
        .to_string();
    if parts.len() < 2 {
        return Err(SchemeError::runtime_error("define-macro", "macro definition needs a body"));
    }
    let body = Value::list(parts[1..].to_vec());
    env.define(
        &name,
        Value::Macro(Rc::new(MacroProcedure {
            params,
            body,
            env: env.clone(),
        })),
    );
    Ok(Trampoline::Done(Value::symbol(name)))
}

fn eval_delay(rest: Value, env: Environment) -> Result<Trampoline, SchemeError> {
    let parts = rest.to_vec()?;
    if parts.len() != 1 {
        return Err(SchemeError::arity_error("delay", error::ARITY_ONE, parts.len()));
    }
    Ok(Trampoline::Done(make_promise(parts[0].clone(), env)))
}

fn eval_cons_stream(rest: Value, env: Environment) -> Result<Trampoline, SchemeError> {
    let parts = rest.to_vec()?;
    if parts.len() != 2 {
        return Err(SchemeError::arity_error("cons-stream", error::ARITY_TWO, parts.len()));
    }
    let head = eval(parts[0].clone(), env.clone())?;
    let tail = make_promise(parts[1].clone(), env);
    Ok(Trampoline::Done(Value::cons(head, tail)))
}

fn make_promise(expr: Value, env: Environment) -> Value {
    Value::Promise(Rc::new(std::cell::RefCell::new(PromiseCell { expr, env })))
}

fn eval_quasiquote_form(rest: Value, env: Environment) -> Result<Trampoline, SchemeError> {
    let parts = rest.to_vec()?;
    if parts.len() != 1 {
        return Err(SchemeError::arity_error("quasiquote", error::ARITY_ONE, parts.len()));
    }
    Ok(Trampoline::Done(eval_quasiquote(parts[0].clone(), 1, env)?))
}

/// Walks a quasiquote template, honoring nested quasiquote/unquote depth and
/// splicing `unquote-splicing` cells into the surrounding list at depth 1.
fn eval_quasiquote(template: Value, depth: usize, env: Environment) -> Result<Value, SchemeError> {
    let cell = match &template {
        Value::Pair(cell) => cell.clone(),
        _ => return Ok(template),
    };
    let (first, list_rest) = {
        let c = cell.borrow();
        (c.first.clone(), c.rest.clone())
    };
    if let Some(sym) = first.as_symbol() {
        if sym == "unquote" {
            let args = list_rest.to_vec()?;
            if args.len() != 1 {
                return Err(SchemeError::runtime_error("unquote", "expected exactly one argument"));
            }
            return if depth == 1 {
                eval(args[0].clone(), env)
            } else {
                let inner = eval_quasiquote(args[0].clone(), depth - 1, env)?;
                Ok(Value::list(vec![Value::symbol("unquote"), inner]))
            };
        }
        if sym == "quasiquote" {
            let args = list_rest.to_vec()?;
            if args.len() != 1 {
                return Err(SchemeError::runtime_error("quasiquote", "expected exactly one argument"));
            }
            let inner = eval_quasiquote(args[0].clone(), depth + 1, env)?;
            return Ok(Value::list(vec![Value::symbol("quasiquote"), inner]));
        }
    }

    let mut items = Vec::new();
    let mut cur = template.clone();
    loop {
        match cur {
            Value::EmptyList => return Ok(Value::list(items)),
            Value::Pair(cell) => {
                let (elem, next) = {
                    let c = cell.borrow();
                    (c.first.clone(), c.rest.clone())
                };
                if depth == 1 {
                    if let Value::Pair(ecell) = &elem {
                        let (ehead, eargs) = {
                            let ec = ecell.borrow();
                            (ec.first.clone(), ec.rest.clone())
                        };
                        if ehead.as_symbol() == Some("unquote-splicing") {
                            let args = eargs.to_vec()?;
                            if args.len() != 1 {
                                return Err(SchemeError::runtime_error(
                                    "unquote-splicing",
                                    "expected exactly one argument",
                                ));
                            }
                            let spliced = eval(args[0].clone(), env.clone())?;
                            items.extend(spliced.to_vec()?);
                            cur = next;
                            continue;
                        }
                    }
                }
                items.push(eval_quasiquote(elem, depth, env.clone())?);
                cur = next;
            }
            other => {
                let tail = eval_quasiquote(other, depth, env.clone())?;
                let mut result = tail;
                for item in items.into_iter().rev() {
                    result = Value::cons(item, result);
                }
                return Ok(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn eval_str(src: &str, env: &Environment) -> Value {
        let mut lines = vec![src.to_string()].into_iter();
        let mut next = move || lines.next();
        let expr = Parser::new().parse(&mut next).unwrap();
        eval(expr, env.clone()).unwrap()
    }

    fn new_env_with_arith() -> Environment {
        let env = Environment::new();
        crate::builtins::register_all(&env);
        env
    }

    #[test]
    fn self_evaluating_atoms() {
        let env = Environment::new();
        assert!(matches!(eval(Value::Integer(42), env.clone()), Ok(Value::Integer(42))));
        assert!(matches!(eval(Value::Boolean(true), env), Ok(Value::Boolean(true))));
    }

    #[test]
    fn unbound_symbol_errors() {
        let env = Environment::new();
        assert!(eval(Value::symbol("nope"), env).is_err());
    }

    #[test]
    fn quote_returns_argument_unevaluated() {
        let env = Environment::new();
        let v = eval_str("(quote (a b c))", &env);
        assert_eq!(v.print_string(), "(a b c)");
    }

    #[test]
    fn if_picks_the_right_branch() {
        let env = Environment::new();
        assert!(matches!(eval_str("(if #t 1 2)", &env), Value::Integer(1)));
        assert!(matches!(eval_str("(if #f 1 2)", &env), Value::Integer(2)));
        assert!(matches!(eval_str("(if #f 1)", &env), Value::Boolean(false)));
    }

    #[test]
    fn and_or_short_circuit() {
        let env = new_env_with_arith();
        env.define("hit", Value::Boolean(false));
        eval_str("(and #f (set! hit #t))", &env);
        assert!(matches!(env.lookup("hit"), Ok(Value::Boolean(false))));
        eval_str("(or #t (set! hit #t))", &env);
        assert!(matches!(env.lookup("hit"), Ok(Value::Boolean(false))));
    }

    #[test]
    fn begin_returns_last_value() {
        let env = Environment::new();
        let v = eval_str("(begin 1 2 3)", &env);
        assert!(matches!(v, Value::Integer(3)));
    }

    #[test]
    fn let_shadows_without_mutating_outer() {
        let env = Environment::new();
        env.define("x", Value::Integer(100));
        let v = eval_str("(let ((x 10)) x)", &env);
        assert!(matches!(v, Value::Integer(10)));
        assert!(matches!(env.lookup("x"), Ok(Value::Integer(100))));
    }

    #[test]
    fn let_initializers_see_outer_env_not_siblings() {
        let env = Environment::new();
        env.define("x", Value::Integer(1));
        let v = eval_str("(let ((x 2) (y x)) y)", &env);
        assert!(matches!(v, Value::Integer(1)));
    }

    #[test]
    fn define_variable_and_function() {
        let env = new_env_with_arith();
        eval_str("(define x 5)", &env);
        assert!(matches!(env.lookup("x"), Ok(Value::Integer(5))));
        eval_str("(define (double n) (* n 2))", &env);
        let v = eval_str("(double 21)", &env);
        assert!(matches!(v, Value::Integer(42)));
    }

    #[test]
    fn set_mutates_existing_binding() {
        let env = Environment::new();
        eval_str("(define x 1)", &env);
        eval_str("(set! x 2)", &env);
        assert!(matches!(env.lookup("x"), Ok(Value::Integer(2))));
    }

    #[test]
    fn set_on_unbound_is_an_error() {
        let env = Environment::new();
        let mut lines = vec!["(set! nope 1)".to_string()].into_iter();
        let mut next = move || lines.next();
        let expr = Parser::new().parse(&mut next).unwrap();
        assert!(eval(expr, env).is_err());
    }

    #[test]
    fn closures_capture_their_defining_environment() {
        let env = new_env_with_arith();
        eval_str("(define (make-adder n) (lambda (x) (+ x n)))", &env);
        eval_str("(define add3 (make-adder 3))", &env);
        // Mutating a same-named global binding must not affect the closure.
        env.define("n", Value::Integer(999));
        let v = eval_str("(add3 10)", &env);
        assert!(matches!(v, Value::Integer(13)));
    }

    #[test]
    fn lambda_rejects_a_repeated_parameter_name() {
        let env = new_env_with_arith();
        let mut lines = vec!["(lambda (x x) x)".to_string()].into_iter();
        let mut next = move || lines.next();
        let expr = Parser::new().parse(&mut next).unwrap();
        assert!(eval(expr, env).is_err());
    }

    #[test]
    fn dlambda_rejects_a_repeated_parameter_name() {
        let env = new_env_with_arith();
        let mut lines = vec!["(dlambda (x x) x)".to_string()].into_iter();
        let mut next = move || lines.next();
        let expr = Parser::new().parse(&mut next).unwrap();
        assert!(eval(expr, env).is_err());
    }

    #[test]
    fn let_rejects_a_repeated_binding_name() {
        let env = new_env_with_arith();
        let mut lines = vec!["(let ((x 1) (x 2)) x)".to_string()].into_iter();
        let mut next = move || lines.next();
        let expr = Parser::new().parse(&mut next).unwrap();
        assert!(eval(expr, env).is_err());
    }

    #[test]
    fn dlambda_sees_the_caller_environment() {
        let env = new_env_with_arith();
        eval_str("(define f (dlambda (x) (+ x n)))", &env);
        eval_str("(define (call-f) (let ((n 7)) (f 10)))", &env);
        let v = eval_str("(call-f)", &env);
        assert!(matches!(v, Value::Integer(17)));
    }

    #[test]
    fn deep_tail_recursion_does_not_overflow() {
        let env = new_env_with_arith();
        eval_str(
            "(define (loop n) (if (= n 0) 'done (loop (- n 1))))",
            &env,
        );
        let v = eval_str("(loop 200000)", &env);
        assert!(matches!(v, Value::Symbol(ref s) if &**s == "done"));
    }

    #[test]
    fn quasiquote_basic_and_unquote() {
        let env = new_env_with_arith();
        eval_str("(define x 5)", &env);
        let v = eval_str("`(1 ,(+ x 2) 4)", &env);
        assert_eq!(v.print_string(), "(1 7 4)");
    }

    #[test]
    fn quasiquote_nested_preserves_inner_structure() {
        let env = new_env_with_arith();
        let v = eval_str("`(a `(b ,(+ 1 2)))", &env);
        assert_eq!(v.print_string(), "(a (quasiquote (b (unquote (+ 1 2)))))");
    }

    #[test]
    fn quasiquote_splices_lists() {
        let env = new_env_with_arith();
        eval_str("(define xs (list 2 3))", &env);
        let v = eval_str("`(1 ,@xs 4)", &env);
        assert_eq!(v.print_string(), "(1 2 3 4)");
    }

    #[test]
    fn define_macro_when_with_rest_body() {
        let env = new_env_with_arith();
        eval_str(
            "(define-macro (when p . body) (list 'if p (cons 'begin body) 'undefined))",
            &env,
        );
        let v = eval_str("(when #t 1 2 3)", &env);
        assert!(matches!(v, Value::Integer(3)));
    }

    #[test]
    fn cons_stream_is_lazy_and_self_referential() {
        let env = new_env_with_arith();
        eval_str("(define ones (cons-stream 1 ones))", &env);
        let ones = env.lookup("ones").unwrap();
        assert!(matches!(ones.car(), Some(Value::Integer(1))));
        let promise = ones.cdr().unwrap();
        assert!(promise.is_promise());
    }

    #[test]
    fn not_callable_errors() {
        let env = Environment::new();
        let mut lines = vec!["(1 2 3)".to_string()].into_iter();
        let mut next = move || lines.next();
        let expr = Parser::new().parse(&mut next).unwrap();
        assert!(matches!(eval(expr, env), Err(SchemeError::NotCallable(_, _))));
    }

    #[test]
    fn arity_mismatch_errors() {
        let env = Environment::new();
        eval_str("(define (one-arg x) x)", &env);
        let mut lines = vec!["(one-arg 1 2)".to_string()].into_iter();
        let mut next = move || lines.next();
        let expr = Parser::new().parse(&mut next).unwrap();
        assert!(eval(expr, env).is_err());
    }
}
