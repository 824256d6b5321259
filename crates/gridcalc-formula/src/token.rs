//! Formula tokens

use crate::operator::Operator;
use std::fmt;

/// A lexical unit of a formula
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal
    Number(f64),
    /// Anything else that is not an operator, e.g. "A1"; validated on use
    Reference(String),
    /// One of `+ - * /`
    Operator(Operator),
    LeftParen,
    RightParen,
}

impl Token {
    /// Numbers and references
    pub fn is_operand(&self) -> bool {
        matches!(self, Token::Number(_) | Token::Reference(_))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Reference(r) => write!(f, "{}", r),
            Token::Operator(op) => write!(f, "{}", op.symbol()),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
        }
    }
}

/// Parse a plain decimal literal
///
/// Accepts an optional sign, digits with an optional fractional part (at
/// least one digit overall) and an optional exponent. Rejects everything
/// `f64::from_str` would otherwise let through, such as `inf` or `NaN`.
pub fn parse_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }

    let mut digits = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
        digits += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
            digits += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }

    if i != bytes.len() {
        return None;
    }

    s.parse().ok().filter(|n: &f64| n.is_finite())
}
