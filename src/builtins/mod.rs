//! Built-in procedure registration.
//!
//! Each sub-module owns one functional area and exposes a `register(&Environment)`
//! that binds its primitives; [`register_all`] calls every category in turn.

use std::cell::RefCell;
use std::rc::Rc;

use crate::env::Environment;
use crate::error::SchemeError;
use crate::sandbox::Sandbox;
use crate::value::{EnvFn, PlainFn, PrimitiveFn, PrimitiveProcedure, Value};

pub mod arithmetic;
pub mod comparison;
pub mod console;
pub mod control;
pub mod errors;
pub mod lists;
pub mod load;
pub mod predicates;
pub mod streams;

thread_local! {
    static SANDBOX: RefCell<Option<Sandbox>> = const { RefCell::new(None) };
}

/// Installs the filesystem sandbox `load`/`load-all` read through.
pub fn set_sandbox(sandbox: Sandbox) {
    SANDBOX.with(|s| *s.borrow_mut() = Some(sandbox));
}

/// Runs `f` against the installed sandbox, or a "no sandbox configured"
/// error if none was set up (the CLI always sets one before evaluating
/// user code, so this only fires in tests that skip setup).
pub fn with_sandbox<R>(f: impl FnOnce(&Sandbox) -> Result<R, SchemeError>) -> Result<R, SchemeError> {
    SANDBOX.with(|s| match &*s.borrow() {
        Some(sandbox) => f(sandbox),
        None => Err(SchemeError::Custom("no filesystem sandbox configured".to_string())),
    })
}

pub(crate) fn define_plain(env: &Environment, name: &'static str, f: PlainFn) {
    env.define(
        name,
        Value::Primitive(Rc::new(PrimitiveProcedure {
            name,
            func: PrimitiveFn::Plain(f),
        })),
    );
}

pub(crate) fn define_env(env: &Environment, name: &'static str, f: EnvFn) {
    env.define(
        name,
        Value::Primitive(Rc::new(PrimitiveProcedure {
            name,
            func: PrimitiveFn::WithEnv(f),
        })),
    );
}

/// Registers every primitive procedure in `env`.
pub fn register_all(env: &Environment) {
    arithmetic::register(env);
    comparison::register(env);
    predicates::register(env);
    lists::register(env);
    console::register(env);
    errors::register(env);
    control::register(env);
    streams::register(env);
    load::register(env);
}
