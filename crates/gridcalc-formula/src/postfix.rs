//! Shunting-yard conversion to postfix (RPN) order

use crate::error::ParseError;
use crate::operator::{Associativity, Operator};
use crate::token::Token;
use crate::tokenizer::tokenize;
use gridcalc_core::Position;
use std::fmt;

/// A formula in postfix order, ready for evaluation
///
/// Only [`to_postfix`] builds these, so every `Postfix` evaluates without
/// running out of operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Postfix {
    tokens: Vec<Token>,
}

impl Postfix {
    /// The tokens in evaluation order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Cells the formula refers to, in first-seen order, without duplicates
    ///
    /// Reference tokens that do not parse as A1 positions are skipped.
    pub fn references(&self) -> Vec<Position> {
        let mut refs: Vec<Position> = Vec::new();
        for token in &self.tokens {
            if let Token::Reference(text) = token {
                if let Ok(position) = Position::parse(text) {
                    if !refs.contains(&position) {
                        refs.push(position);
                    }
                }
            }
        }
        refs
    }
}

impl fmt::Display for Postfix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}

/// Parse formula text straight to postfix form
///
/// # Example
/// ```rust
/// use gridcalc_formula::parse_formula;
///
/// let postfix = parse_formula("=1-2+3*A1").unwrap();
/// assert_eq!(postfix.to_string(), "1 2 - 3 A1 * +");
/// ```
pub fn parse_formula(text: &str) -> Result<Postfix, ParseError> {
    to_postfix(&tokenize(text)?)
}

/// Entries on the operator stack
#[derive(Debug, Clone, Copy)]
enum StackEntry {
    /// Bottom marker, never emitted
    Base,
    LeftParen,
    Operator(Operator),
}

/// Postfix output plus a running count of values an evaluator would hold
#[derive(Default)]
struct Output {
    tokens: Vec<Token>,
    depth: usize,
}

impl Output {
    fn push_operand(&mut self, token: Token) {
        self.tokens.push(token);
        self.depth += 1;
    }

    fn push_operator(&mut self, op: Operator) -> Result<(), ParseError> {
        if self.depth < 2 {
            return Err(ParseError::MissingOperand);
        }
        self.tokens.push(Token::Operator(op));
        self.depth -= 1;
        Ok(())
    }

    fn finish(self) -> Result<Postfix, ParseError> {
        match self.depth {
            0 => Err(ParseError::EmptyFormula),
            1 => Ok(Postfix {
                tokens: self.tokens,
            }),
            _ => Err(ParseError::DanglingOperand),
        }
    }
}

/// Whether `top` must be emitted before `incoming` is pushed
///
/// Equal precedence pops for left-associative operators, so `1-2+3` runs
/// left to right.
fn pops_before(top: Operator, incoming: Operator) -> bool {
    match incoming.associativity() {
        Associativity::Left => top.precedence() >= incoming.precedence(),
    }
}

/// Convert infix tokens to postfix order
pub fn to_postfix(tokens: &[Token]) -> Result<Postfix, ParseError> {
    let mut output = Output::default();
    let mut stack = vec![StackEntry::Base];

    for token in tokens {
        match token {
            Token::Number(_) | Token::Reference(_) => output.push_operand(token.clone()),

            Token::LeftParen => stack.push(StackEntry::LeftParen),

            Token::RightParen => loop {
                match stack.pop() {
                    Some(StackEntry::Operator(op)) => output.push_operator(op)?,
                    Some(StackEntry::LeftParen) => break,
                    Some(StackEntry::Base) | None => return Err(ParseError::UnbalancedParens),
                }
            },

            Token::Operator(op) => {
                while let Some(&StackEntry::Operator(top)) = stack.last() {
                    if !pops_before(top, *op) {
                        break;
                    }
                    stack.pop();
                    output.push_operator(top)?;
                }
                stack.push(StackEntry::Operator(*op));
            }
        }
    }

    while let Some(entry) = stack.pop() {
        match entry {
            StackEntry::Operator(op) => output.push_operator(op)?,
            StackEntry::LeftParen => return Err(ParseError::UnbalancedParens),
            StackEntry::Base => break,
        }
    }

    output.finish()
}
