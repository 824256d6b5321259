//! Formula tokenizer
//!
//! Splits formula text on operators and parentheses. Everything between two
//! split points becomes one operand token: a number if it reads as a decimal
//! literal, otherwise a reference. References are not checked here; a bad
//! one fails when the evaluator tries to resolve it.

use crate::error::ParseError;
use crate::operator::Operator;
use crate::token::{parse_number, Token};

/// Tokenize a formula
///
/// A single leading `=` is stripped if present. Whitespace is ignored
/// everywhere, including inside operands (`A 1` reads as `A1`).
///
/// # Example
/// ```rust
/// use gridcalc_formula::{tokenize, Operator, Token};
///
/// let tokens = tokenize("=A1 * 2").unwrap();
/// assert_eq!(
///     tokens,
///     vec![
///         Token::Reference("A1".into()),
///         Token::Operator(Operator::Multiply),
///         Token::Number(2.0),
///     ]
/// );
/// ```
pub fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let body = text.strip_prefix('=').unwrap_or(text);

    let mut tokens = Vec::new();
    let mut buffer = String::new();
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        match c {
            '+' | '-' if buffer.is_empty() && expects_operand(&tokens) => {
                // Sign of a numeric literal, e.g. "=-2" or "=3*-1"
                if next_starts_number(chars.as_str()) {
                    buffer.push(c);
                } else {
                    return Err(ParseError::InvalidCharacter(c));
                }
            }
            '+' | '-' if is_exponent_prefix(&buffer) && next_is_digit(chars.as_str()) => {
                buffer.push(c);
            }
            '+' | '-' | '*' | '/' | '(' | ')' => {
                flush(&mut buffer, &mut tokens);
                tokens.push(match c {
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    _ => match Operator::from_symbol(c) {
                        Some(op) => Token::Operator(op),
                        None => return Err(ParseError::InvalidCharacter(c)),
                    },
                });
            }
            '=' => return Err(ParseError::InvalidCharacter(c)),
            c if c.is_control() => return Err(ParseError::InvalidCharacter(c)),
            c => buffer.push(c),
        }
    }

    flush(&mut buffer, &mut tokens);

    if tokens.is_empty() {
        return Err(ParseError::EmptyFormula);
    }

    Ok(tokens)
}

fn flush(buffer: &mut String, tokens: &mut Vec<Token>) {
    if buffer.is_empty() {
        return;
    }
    let token = match parse_number(buffer) {
        Some(n) => Token::Number(n),
        None => Token::Reference(buffer.clone()),
    };
    tokens.push(token);
    buffer.clear();
}

/// True at the start of input, after an operator and after `(`
fn expects_operand(tokens: &[Token]) -> bool {
    matches!(
        tokens.last(),
        None | Some(Token::Operator(_)) | Some(Token::LeftParen)
    )
}

fn next_non_whitespace(rest: &str) -> Option<char> {
    rest.chars().find(|c| !c.is_whitespace())
}

fn next_starts_number(rest: &str) -> bool {
    next_non_whitespace(rest).map_or(false, |c| c.is_ascii_digit() || c == '.')
}

fn next_is_digit(rest: &str) -> bool {
    next_non_whitespace(rest).map_or(false, |c| c.is_ascii_digit())
}

/// A mantissa followed by `e`/`E`, waiting for a signed exponent ("1.5e")
fn is_exponent_prefix(buffer: &str) -> bool {
    match buffer.strip_suffix(|c: char| c == 'e' || c == 'E') {
        Some(mantissa) => parse_number(mantissa).is_some(),
        None => false,
    }
}
