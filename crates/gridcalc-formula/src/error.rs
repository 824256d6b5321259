//! Formula error types

use gridcalc_core::{CellError, Position};
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors found while turning formula text into postfix form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A character the formula grammar has no use for
    #[error("Invalid character '{0}' in formula")]
    InvalidCharacter(char),

    /// A `)` without a `(`, or the other way round
    #[error("Unbalanced parentheses")]
    UnbalancedParens,

    /// Nothing to evaluate
    #[error("Empty formula")]
    EmptyFormula,

    /// An operator without both of its operands
    #[error("Operator is missing an operand")]
    MissingOperand,

    /// Two operands with no operator joining them
    #[error("Operand without an operator")]
    DanglingOperand,
}

/// Errors raised while evaluating a postfix sequence
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Reference does not name a cell of the grid
    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    /// Referenced cell holds text that is not a number
    #[error("Cell {0} does not contain a number")]
    NotANumber(Position),

    /// Operator reached with fewer than two operands on the stack
    #[error("Operand stack underflow")]
    StackUnderflow,

    /// Divisor was exactly zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Referenced cell is still being evaluated further up the chain
    #[error("Circular reference through {0}")]
    CircularReference(Position),

    /// Result is infinite or not a number
    #[error("Result is not a finite number")]
    NumericOverflow,

    /// A lookup stopped following a reference chain at the configured depth
    ///
    /// The grid engine resumes from the cell it stopped at and never stores
    /// this on a cell.
    #[error("Reference chain deeper than {0} cells")]
    ChainTooDeep(usize),

    /// Referenced cell is itself in error
    #[error("Cell {position} has error {error}")]
    Upstream { position: Position, error: CellError },
}

/// Any failure of a formula cell
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Formula text is malformed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Formula is well-formed but could not be evaluated
    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),
}

impl ParseError {
    /// The cell error code for this failure
    pub fn code(&self) -> CellError {
        match self {
            ParseError::InvalidCharacter(_) => CellError::InvalidCharacter,
            ParseError::UnbalancedParens => CellError::UnbalancedParens,
            ParseError::EmptyFormula => CellError::EmptyFormula,
            ParseError::MissingOperand => CellError::MissingOperand,
            ParseError::DanglingOperand => CellError::DanglingOperand,
        }
    }
}

impl EvalError {
    /// The cell error code for this failure
    ///
    /// Upstream errors report the code of the cell they came from, so every
    /// cell on a cycle shows `CircularReference`.
    pub fn code(&self) -> CellError {
        match self {
            EvalError::UnknownReference(_) => CellError::UnknownReference,
            EvalError::NotANumber(_) => CellError::NotANumber,
            EvalError::StackUnderflow => CellError::StackUnderflow,
            EvalError::DivisionByZero => CellError::DivisionByZero,
            EvalError::CircularReference(_) => CellError::CircularReference,
            EvalError::NumericOverflow => CellError::NumericOverflow,
            EvalError::ChainTooDeep(_) => CellError::ChainTooDeep,
            EvalError::Upstream { error, .. } => *error,
        }
    }
}

impl FormulaError {
    /// The cell error code for this failure
    pub fn code(&self) -> CellError {
        match self {
            FormulaError::Parse(e) => e.code(),
            FormulaError::Eval(e) => e.code(),
        }
    }
}

impl From<FormulaError> for CellError {
    fn from(e: FormulaError) -> Self {
        e.code()
    }
}
