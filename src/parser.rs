// ABOUTME: Parser module turning a stream of source lines into expressions

//! Consumes a lazy stream of source lines and produces one expression
//! at a time, buffering tokens across lines so a multi-line form reads
//! as a single `parse` call.

use std::collections::VecDeque;

use crate::error::{SchemeError, SyntaxError};
use crate::tokenizer::{self, Token};
use crate::value::Value;

pub struct Parser {
    buffer: VecDeque<Token>,
    /// Non-fatal tokenizer warnings (overlong tokens) accumulated since
    /// the last time the caller drained them.
    pub warnings: Vec<String>,
}

impl Parser {
    pub fn new() -> Self {
        Parser {
            buffer: VecDeque::new(),
            warnings: Vec::new(),
        }
    }

    /// True once every buffered token has been consumed: the caller
    /// should issue a fresh prompt rather than expect a continuation.
    pub fn is_buffer_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Parses one complete expression, pulling additional lines via
    /// `next_line` (returns `None` at end of input) as needed for
    /// multi-line forms.
    pub fn parse(
        &mut self,
        next_line: &mut impl FnMut() -> Option<String>,
    ) -> Result<Value, SchemeError> {
        self.expr(next_line)
    }

    fn fill(&mut self, next_line: &mut impl FnMut() -> Option<String>) -> Result<(), SchemeError> {
        while self.buffer.is_empty() {
            match next_line() {
                None => return Err(SchemeError::EndOfInput),
                Some(line) => {
                    let (tokens, warnings) = tokenizer::tokenize(&line)?;
                    self.warnings.extend(warnings);
                    self.buffer.extend(tokens);
                }
            }
        }
        Ok(())
    }

    fn expr(&mut self, next_line: &mut impl FnMut() -> Option<String>) -> Result<Value, SchemeError> {
        self.fill(next_line)?;
        let tok = self.buffer.pop_front().expect("just filled");
        match tok {
            Token::Nil => Ok(Value::EmptyList),
            Token::LParen => self.rest_list(next_line),
            Token::Quote => {
                let e = self.expr(next_line)?;
                Ok(Value::list(vec![Value::symbol("quote"), e]))
            }
            Token::Backtick => {
                let e = self.expr(next_line)?;
                Ok(Value::list(vec![Value::symbol("quasiquote"), e]))
            }
            Token::Comma => {
                let e = self.expr(next_line)?;
                Ok(Value::list(vec![Value::symbol("unquote"), e]))
            }
            Token::CommaAt => {
                let e = self.expr(next_line)?;
                Ok(Value::list(vec![Value::symbol("unquote-splicing"), e]))
            }
            Token::Boolean(b) => Ok(Value::Boolean(b)),
            Token::Integer(n) => Ok(Value::Integer(n)),
            Token::Real(r) => Ok(Value::Real(r)),
            Token::Symbol(s) => Ok(Value::symbol(s)),
            Token::Str(s) => Ok(Value::string(s)),
            Token::RParen => Err(SyntaxError::UnexpectedToken(")".to_string()).into()),
            Token::Dot => Err(SyntaxError::UnexpectedToken(".".to_string()).into()),
        }
    }

    /// Parses the remainder of a list or pair, starting just after the
    /// opening `(`. End-of-input while inside a list is a syntax error,
    /// unlike end-of-input at the top level (`expr`'s `EndOfInput`).
    fn rest_list(&mut self, next_line: &mut impl FnMut() -> Option<String>) -> Result<Value, SchemeError> {
        match self.rest_list_inner(next_line) {
            Err(SchemeError::EndOfInput) => Err(SyntaxError::UnexpectedEof.into()),
            other => other,
        }
    }

    fn rest_list_inner(
        &mut self,
        next_line: &mut impl FnMut() -> Option<String>,
    ) -> Result<Value, SchemeError> {
        self.fill(next_line)?;
        match self.buffer.front().expect("just filled") {
            Token::RParen => {
                self.buffer.pop_front();
                Ok(Value::EmptyList)
            }
            Token::Dot => {
                self.buffer.pop_front();
                let tail = self.expr(next_line)?;
                self.fill(next_line)?;
                match self.buffer.pop_front() {
                    Some(Token::RParen) => Ok(tail),
                    Some(_) => Err(SyntaxError::ExpectedOneAfterDot.into()),
                    None => Err(SyntaxError::UnexpectedEof.into()),
                }
            }
            _ => {
                let first = self.expr(next_line)?;
                let rest = self.rest_list_inner(next_line)?;
                Ok(Value::cons(first, rest))
            }
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}
