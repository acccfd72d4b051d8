// ABOUTME: Environment module for managing variable bindings and scopes

//! The environment: a non-empty chain of frames, youngest first.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::SchemeError;
use crate::value::Value;

#[derive(Debug)]
struct Frame {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Environment>,
}

/// A cheap-to-clone handle onto a frame chain. Closures capture an
/// `Environment` by cloning this handle, which is how the global frame
/// ends up reachable from lambdas stored inside itself -- an intentional
/// `Rc` cycle tolerated for the lifetime of the process (see DESIGN.md).
#[derive(Clone, Debug)]
pub struct Environment(Rc<Frame>);

impl Environment {
    /// A fresh environment consisting of a single, empty global frame.
    pub fn new() -> Self {
        Environment(Rc::new(Frame {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        }))
    }

    fn child(&self) -> Self {
        Environment(Rc::new(Frame {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(self.clone()),
        }))
    }

    /// Binds `name` in the youngest frame, overwriting any existing
    /// binding of the same name there.
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.0.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Walks frames youngest to oldest; first match wins.
    pub fn lookup(&self, name: &str) -> Result<Value, SchemeError> {
        let mut frame = self.0.clone();
        loop {
            if let Some(v) = frame.bindings.borrow().get(name) {
                return Ok(v.clone());
            }
            match &frame.parent {
                Some(parent) => frame = parent.0.clone(),
                None => return Err(SchemeError::UnboundVariable(name.to_string())),
            }
        }
    }

    /// Mutates the first frame (youngest to oldest) that already binds
    /// `name`. Does not create a new binding.
    pub fn set(&self, name: &str, value: Value) -> Result<(), SchemeError> {
        let mut frame = self.0.clone();
        loop {
            if frame.bindings.borrow().contains_key(name) {
                frame.bindings.borrow_mut().insert(name.to_string(), value);
                return Ok(());
            }
            match &frame.parent {
                Some(parent) => frame = parent.0.clone(),
                None => return Err(SchemeError::UnboundVariable(name.to_string())),
            }
        }
    }

    /// Builds a new environment with one new frame binding `params` to
    /// `args`, in order. `params` may be a proper list of symbols, a
    /// dotted list `(a b . rest)` binding the remaining arguments to
    /// `rest` as a list, or a bare symbol binding all arguments to it.
    pub fn extend(&self, params: &Value, args: &[Value]) -> Result<Environment, SchemeError> {
        let new_env = self.child();
        let mut cursor = params.clone();
        let mut i = 0usize;
        loop {
            match cursor {
                Value::EmptyList => {
                    if i != args.len() {
                        return Err(SchemeError::Custom(format!(
                            "too many arguments supplied: expected {}, got {}",
                            i,
                            args.len()
                        )));
                    }
                    return Ok(new_env);
                }
                Value::Symbol(ref name) => {
                    new_env.define(name.as_ref(), Value::list(args[i..].to_vec()));
                    return Ok(new_env);
                }
                Value::Pair(cell) => {
                    let c = cell.borrow();
                    let name = c.first.as_symbol().ok_or_else(|| {
                        SchemeError::Custom(format!("non-symbol parameter: {}", c.first))
                    })?;
                    if i >= args.len() {
                        return Err(SchemeError::Custom(format!(
                            "too few arguments supplied: expected at least {}, got {}",
                            i + 1,
                            args.len()
                        )));
                    }
                    new_env.define(name, args[i].clone());
                    i += 1;
                    cursor = c.rest.clone();
                }
                other => {
                    return Err(SchemeError::Custom(format!(
                        "bad parameter list: {}",
                        other
                    )))
                }
            }
        }
    }
}

/// Walks a parameter list of the shape `extend` accepts (proper, dotted, or
/// a bare symbol) and errors if any symbol is bound more than once.
pub fn validate_distinct_params(fname: &'static str, params: &Value) -> Result<(), SchemeError> {
    let mut seen = std::collections::HashSet::new();
    let mut cursor = params.clone();
    loop {
        match cursor {
            Value::EmptyList => return Ok(()),
            Value::Symbol(ref name) => {
                if !seen.insert(name.to_string()) {
                    return Err(SchemeError::runtime_error(
                        fname,
                        format!("duplicate symbol: {}", name),
                    ));
                }
                return Ok(());
            }
            Value::Pair(cell) => {
                let c = cell.borrow();
                let name = c.first.as_symbol().ok_or_else(|| {
                    SchemeError::Custom(format!("non-symbol parameter: {}", c.first))
                })?;
                if !seen.insert(name.to_string()) {
                    return Err(SchemeError::runtime_error(
                        fname,
                        format!("duplicate symbol: {}", name),
                    ));
                }
                cursor = c.rest.clone();
            }
            other => return Err(SchemeError::Custom(format!("bad parameter list: {}", other))),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_and_lookup() {
        let env = Environment::new();
        env.define("x", Value::Integer(42));
        assert!(matches!(env.lookup("x"), Ok(Value::Integer(42))));
    }

    #[test]
    fn unbound_symbol_errors() {
        let env = Environment::new();
        assert!(matches!(
            env.lookup("nope"),
            Err(SchemeError::UnboundVariable(_))
        ));
    }

    #[test]
    fn child_shadows_parent() {
        let parent = Environment::new();
        parent.define("x", Value::Integer(1));
        let child = parent.extend(&Value::EmptyList, &[]).unwrap();
        child.define("x", Value::Integer(2));
        assert!(matches!(child.lookup("x"), Ok(Value::Integer(2))));
        assert!(matches!(parent.lookup("x"), Ok(Value::Integer(1))));
    }

    #[test]
    fn set_mutates_existing_binding_in_place() {
        let parent = Environment::new();
        parent.define("x", Value::Integer(1));
        let child = parent.extend(&Value::EmptyList, &[]).unwrap();
        child.set("x", Value::Integer(2)).unwrap();
        assert!(matches!(parent.lookup("x"), Ok(Value::Integer(2))));
    }

    #[test]
    fn set_on_unbound_errors() {
        let env = Environment::new();
        assert!(env.set("x", Value::Integer(1)).is_err());
    }

    #[test]
    fn extend_binds_params_to_args() {
        let env = Environment::new();
        let params = Value::list(vec![Value::symbol("a"), Value::symbol("b")]);
        let extended = env
            .extend(&params, &[Value::Integer(1), Value::Integer(2)])
            .unwrap();
        assert!(matches!(extended.lookup("a"), Ok(Value::Integer(1))));
        assert!(matches!(extended.lookup("b"), Ok(Value::Integer(2))));
    }

    #[test]
    fn extend_arity_mismatch_errors() {
        let env = Environment::new();
        let params = Value::list(vec![Value::symbol("a"), Value::symbol("b")]);
        assert!(env.extend(&params, &[Value::Integer(1)]).is_err());
        assert!(env
            .extend(
                &params,
                &[Value::Integer(1), Value::Integer(2), Value::Integer(3)]
            )
            .is_err());
    }

    #[test]
    fn extend_with_dotted_rest_param() {
        let env = Environment::new();
        let params = Value::cons(Value::symbol("a"), Value::symbol("rest"));
        let extended = env
            .extend(
                &params,
                &[Value::Integer(1), Value::Integer(2), Value::Integer(3)],
            )
            .unwrap();
        assert!(matches!(extended.lookup("a"), Ok(Value::Integer(1))));
        let rest = extended.lookup("rest").unwrap();
        assert_eq!(rest.to_vec().unwrap().len(), 2);
    }

    #[test]
    fn validate_distinct_params_accepts_unique_names() {
        let params = Value::cons(Value::symbol("a"), Value::symbol("rest"));
        assert!(validate_distinct_params("lambda", &params).is_ok());
    }

    #[test]
    fn validate_distinct_params_rejects_a_repeated_name() {
        let params = Value::list(vec![Value::symbol("x"), Value::symbol("x")]);
        let err = validate_distinct_params("lambda", &params).unwrap_err();
        assert!(matches!(err, SchemeError::RuntimeError { ref message, .. } if message.contains("x")));
    }

    #[test]
    fn extend_with_bare_symbol_captures_all_args() {
        let env = Environment::new();
        let params = Value::symbol("args");
        let extended = env
            .extend(&params, &[Value::Integer(1), Value::Integer(2)])
            .unwrap();
        let args = extended.lookup("args").unwrap();
        assert_eq!(args.to_vec().unwrap().len(), 2);
    }
}
