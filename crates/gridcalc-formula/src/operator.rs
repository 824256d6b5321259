//! Operator table
//!
//! Static metadata for the four arithmetic operators. The table is the only
//! place precedence and reducers are defined; the converter and evaluator
//! both look operators up here.

use crate::error::EvalError;

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Operator associativity
///
/// Every supported operator groups left to right. A right-associative
/// operator such as `^` would add a variant here and a strict comparison
/// in the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
}

/// Metadata for one operator
#[derive(Debug)]
pub struct OperatorSpec {
    pub operator: Operator,
    pub symbol: char,
    /// Higher binds tighter
    pub precedence: u8,
    pub associativity: Associativity,
    /// Applies `lhs OP rhs`
    pub reduce: fn(f64, f64) -> Result<f64, EvalError>,
}

static OPERATORS: [OperatorSpec; 4] = [
    OperatorSpec {
        operator: Operator::Add,
        symbol: '+',
        precedence: 1,
        associativity: Associativity::Left,
        reduce: add,
    },
    OperatorSpec {
        operator: Operator::Subtract,
        symbol: '-',
        precedence: 1,
        associativity: Associativity::Left,
        reduce: subtract,
    },
    OperatorSpec {
        operator: Operator::Multiply,
        symbol: '*',
        precedence: 2,
        associativity: Associativity::Left,
        reduce: multiply,
    },
    OperatorSpec {
        operator: Operator::Divide,
        symbol: '/',
        precedence: 2,
        associativity: Associativity::Left,
        reduce: divide,
    },
];

fn add(lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    Ok(lhs + rhs)
}

fn subtract(lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    Ok(lhs - rhs)
}

fn multiply(lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    Ok(lhs * rhs)
}

fn divide(lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    if rhs == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    Ok(lhs / rhs)
}

impl Operator {
    /// Look up an operator by its symbol
    pub fn from_symbol(c: char) -> Option<Self> {
        OPERATORS.iter().find(|s| s.symbol == c).map(|s| s.operator)
    }

    /// The table entry for this operator
    pub fn spec(self) -> &'static OperatorSpec {
        match self {
            Operator::Add => &OPERATORS[0],
            Operator::Subtract => &OPERATORS[1],
            Operator::Multiply => &OPERATORS[2],
            Operator::Divide => &OPERATORS[3],
        }
    }

    pub fn symbol(self) -> char {
        self.spec().symbol
    }

    pub fn precedence(self) -> u8 {
        self.spec().precedence
    }

    pub fn associativity(self) -> Associativity {
        self.spec().associativity
    }

    /// Apply the operator as `lhs OP rhs`
    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
        (self.spec().reduce)(lhs, rhs)
    }
}

/// All supported operators
pub fn operators() -> &'static [OperatorSpec] {
    &OPERATORS
}
