// ABOUTME: Error types for tokenizing, parsing and evaluating Scheme source

//! Error types raised while tokenizing, parsing and evaluating Scheme source.

use thiserror::Error;

// ===== Arity constant strings (eliminates allocations in error paths) =====
pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";
pub const ARITY_ZERO_OR_ONE: &str = "0-1";
pub const ARITY_ONE_OR_TWO: &str = "1-2";
pub const ARITY_TWO_OR_THREE: &str = "2-3";

/// Tokenizer/parser failures. Kept distinct from `SchemeError` so a caller
/// (e.g. `load`) can decide whether a syntax error aborts outright or
/// just reprompts interactively.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("String ended abruptly")]
    UnterminatedString,

    #[error("unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of file")]
    UnexpectedEof,

    #[error("expected one element after .")]
    ExpectedOneAfterDot,

    #[error("invalid token: {0}")]
    InvalidToken(String),
}

#[derive(Error, Debug, Clone)]
pub enum SchemeError {
    #[error("Unbound variable: {0}")]
    UnboundVariable(String),

    #[error("{function}: expected {expected}, got {actual} at argument {position}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
        position: usize,
    },

    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    ArityError {
        function: String,
        expected: String,
        actual: usize,
    },

    #[error("{function}: {message}")]
    RuntimeError { function: String, message: String },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("{0} is not callable: {1}")]
    NotCallable(&'static str, String),

    #[error("{0}")]
    Custom(String),

    #[error("maximum recursion depth exceeded")]
    RecursionLimit,

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Not a user-facing error: signals the input stream ran out of lines.
    #[error("end of input")]
    EndOfInput,
}

impl SchemeError {
    pub fn type_error(function: &str, expected: &str, actual: impl Into<String>, position: usize) -> Self {
        SchemeError::TypeMismatch {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.into(),
            position,
        }
    }

    pub fn arity_error(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        SchemeError::ArityError {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn runtime_error(function: &str, message: impl Into<String>) -> Self {
        SchemeError::RuntimeError {
            function: function.to_string(),
            message: message.into(),
        }
    }

    /// True for the sentinel that should never be printed as `Error: ...`.
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, SchemeError::EndOfInput)
    }
}
