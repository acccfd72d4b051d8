// ABOUTME: Integration tests for the REPL's parser state machine

//! The REPL loop itself is exercised manually; what's testable here is the
//! parser state machine it drives the prompt from.

use tiny_scm::parser::Parser;

fn feed(parser: &mut Parser, line: &str) -> Result<tiny_scm::value::Value, tiny_scm::error::SchemeError> {
    let mut lines = std::iter::once(line.to_string());
    let mut next_line = move || lines.next();
    parser.parse(&mut next_line)
}

#[test]
fn buffer_is_empty_before_any_input_and_after_a_complete_form() {
    let mut parser = Parser::new();
    assert!(parser.is_buffer_empty());
    feed(&mut parser, "(+ 1 2)").unwrap();
    assert!(parser.is_buffer_empty());
}

#[test]
fn an_unclosed_form_leaves_the_buffer_non_empty_across_lines() {
    let mut parser = Parser::new();
    assert!(feed(&mut parser, "(+ 1").is_err());
    assert!(!parser.is_buffer_empty());
    let v = feed(&mut parser, "2)").unwrap();
    assert_eq!(v.print_string(), "(+ 1 2)");
    assert!(parser.is_buffer_empty());
}

#[test]
fn overlong_token_warnings_surface_on_the_parser() {
    let mut parser = Parser::new();
    let long_symbol = "a".repeat(2000);
    let _ = feed(&mut parser, &long_symbol);
    assert!(!parser.warnings.is_empty());
}
