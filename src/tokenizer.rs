// ABOUTME: Tokenizer module converting source text into a token stream

//! Converts one line of source text into a flat sequence of tokens.
//!
//! Tokenizing is stateless per line; cross-line buffering of tokens for
//! multi-line forms is the parser's job, not this module's.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, multispace0};
use nom::combinator::value;
use nom::multi::many0;
use nom::sequence::preceded;
use nom::IResult;
use nom::Parser;

use crate::error::SyntaxError;

const MAX_TOKEN_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    LParen,
    RParen,
    Quote,
    Backtick,
    Comma,
    CommaAt,
    Dot,
    Boolean(bool),
    Nil,
    Integer(i64),
    Real(f64),
    Symbol(String),
    Str(String),
}

/// Tokenizes `line`, returning the tokens plus any non-fatal warnings
/// (currently: overlong tokens). Comments (`;` to end of line, outside a
/// string) are stripped before tokenizing.
pub fn tokenize(line: &str) -> Result<(Vec<Token>, Vec<String>), SyntaxError> {
    let code = strip_comment(line)?;
    let mut warnings = Vec::new();
    let mut invalid = None;
    let (rest, tokens) = many0(preceded(multispace0, |i| token(i, &mut warnings, &mut invalid)))
        .parse(code.as_str())
        .map_err(|_| SyntaxError::UnexpectedToken(code.clone()))?;
    if let Some(err) = invalid {
        return Err(err);
    }
    let (rest, _) = multispace0::<_, nom::error::Error<&str>>(rest).unwrap();
    if !rest.is_empty() {
        return Err(SyntaxError::UnexpectedToken(rest.to_string()));
    }
    Ok((tokens, warnings))
}

/// Removes a `;` line comment, respecting string literals so a `;`
/// inside a string does not truncate the line.
fn strip_comment(line: &str) -> Result<String, SyntaxError> {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    let mut in_string = false;
    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ';' => break,
            _ => out.push(c),
        }
    }
    Ok(out)
}

fn token<'a>(
    input: &'a str,
    warnings: &mut Vec<String>,
    invalid: &mut Option<SyntaxError>,
) -> IResult<&'a str, Token> {
    alt((
        value(Token::LParen, alt((char('('), char('[')))),
        value(Token::RParen, alt((char(')'), char(']')))),
        value(Token::CommaAt, tag(",@")),
        value(Token::Comma, char(',')),
        value(Token::Quote, char('\'')),
        value(Token::Backtick, char('`')),
        value(Token::Dot, terminated_dot),
        string_literal,
        |i| candidate(i, warnings, invalid),
    ))
    .parse(input)
}

/// A lone `.` token: only matches when not immediately followed by more
/// symbol-class characters (otherwise it is part of a number or symbol).
fn terminated_dot(input: &str) -> IResult<&str, char> {
    let (rest, _) = char('.')(input)?;
    if rest
        .chars()
        .next()
        .map(|c| !is_delimiter_or_space(c))
        .unwrap_or(false)
    {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        )));
    }
    Ok((rest, '.'))
}

fn is_delimiter_or_space(c: char) -> bool {
    c.is_whitespace() || "()[]'`,;\"".contains(c)
}

fn string_literal(input: &str) -> IResult<&str, Token> {
    let (mut rest, _) = char('"')(input)?;
    let mut content = String::new();
    loop {
        match rest.chars().next() {
            None => {
                return Err(nom::Err::Failure(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Eof,
                )))
            }
            Some('"') => {
                rest = &rest[1..];
                break;
            }
            Some('\\') => {
                rest = &rest[1..];
                match rest.chars().next() {
                    Some('n') => {
                        content.push('\n');
                        rest = &rest[1..];
                    }
                    Some(other) => {
                        content.push(other);
                        rest = &rest[other.len_utf8()..];
                    }
                    None => {
                        return Err(nom::Err::Failure(nom::error::Error::new(
                            input,
                            nom::error::ErrorKind::Eof,
                        )))
                    }
                }
            }
            Some(c) => {
                content.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    Ok((rest, Token::Str(content)))
}

/// The symbol alphabet: letters, digits, and the punctuation Scheme allows
/// in an identifier. A candidate containing anything outside this set (a
/// stray `#`, a backslash, `|`, `{`, ...) is neither a number nor a symbol.
fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!$%&*/:<=>?@^_~+-.".contains(c)
}

/// A maximal run of non-delimiter, non-whitespace characters, classified
/// as a boolean, `nil`, integer, real, or symbol. Anything else is flagged
/// in `invalid` rather than being accepted as a symbol.
fn candidate<'a>(
    input: &'a str,
    warnings: &mut Vec<String>,
    invalid: &mut Option<SyntaxError>,
) -> IResult<&'a str, Token> {
    let (rest, raw) = take_while1(|c: char| !is_delimiter_or_space(c))(input)?;

    if raw.chars().count() > MAX_TOKEN_LENGTH {
        warnings.push(format!(
            "token exceeds {} characters: {}",
            MAX_TOKEN_LENGTH, raw
        ));
    }

    let folded = raw.to_lowercase();
    let tok = if folded == "#t" || folded == "true" {
        Token::Boolean(true)
    } else if folded == "#f" || folded == "false" {
        Token::Boolean(false)
    } else if folded == "nil" {
        Token::Nil
    } else if let Ok(n) = folded.parse::<i64>() {
        Token::Integer(n)
    } else if let Ok(r) = folded.parse::<f64>() {
        Token::Real(r)
    } else if folded.chars().all(is_symbol_char) {
        Token::Symbol(folded)
    } else {
        invalid.get_or_insert_with(|| SyntaxError::InvalidToken(raw.to_string()));
        Token::Symbol(folded)
    };
    Ok((rest, tok))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(line: &str) -> Vec<Token> {
        tokenize(line).unwrap().0
    }

    #[test]
    fn numbers_and_symbols() {
        assert_eq!(
            toks("(+ 1 2.5 foo)"),
            vec![
                Token::LParen,
                Token::Symbol("+".into()),
                Token::Integer(1),
                Token::Real(2.5),
                Token::Symbol("foo".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn booleans_and_nil() {
        assert_eq!(
            toks("#t #f TRUE false nil"),
            vec![
                Token::Boolean(true),
                Token::Boolean(false),
                Token::Boolean(true),
                Token::Boolean(false),
                Token::Nil,
            ]
        );
    }

    #[test]
    fn symbols_are_case_folded() {
        assert_eq!(toks("FooBar"), vec![Token::Symbol("foobar".into())]);
    }

    #[test]
    fn brackets_normalize_to_parens() {
        assert_eq!(
            toks("[1 2]"),
            vec![Token::LParen, Token::Integer(1), Token::Integer(2), Token::RParen]
        );
    }

    #[test]
    fn quote_backtick_comma() {
        assert_eq!(
            toks("'a `b ,c ,@d"),
            vec![
                Token::Quote,
                Token::Symbol("a".into()),
                Token::Backtick,
                Token::Symbol("b".into()),
                Token::Comma,
                Token::Symbol("c".into()),
                Token::CommaAt,
                Token::Symbol("d".into()),
            ]
        );
    }

    #[test]
    fn dotted_pair_dot() {
        assert_eq!(
            toks("(a . b)"),
            vec![
                Token::LParen,
                Token::Symbol("a".into()),
                Token::Dot,
                Token::Symbol("b".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn string_with_escapes() {
        assert_eq!(
            toks(r#""hi\nthere\"x""#),
            vec![Token::Str("hi\nthere\"x".to_string())]
        );
    }

    #[test]
    fn unterminated_string_errors() {
        assert!(tokenize("\"oops").is_err());
    }

    #[test]
    fn comment_is_discarded() {
        assert_eq!(toks("(+ 1 2) ; a comment"), toks("(+ 1 2)"));
    }

    #[test]
    fn out_of_alphabet_candidate_is_an_invalid_token() {
        assert!(matches!(tokenize("#zzz"), Err(SyntaxError::InvalidToken(_))));
        assert!(matches!(tokenize("a|b"), Err(SyntaxError::InvalidToken(_))));
    }

    #[test]
    fn overlong_token_warns_but_still_tokenizes() {
        let long = "a".repeat(60);
        let (tokens, warnings) = tokenize(&long).unwrap();
        assert_eq!(tokens, vec![Token::Symbol(long)]);
        assert_eq!(warnings.len(), 1);
    }
}
