//! Cell value types

use std::fmt;

/// The cached value of a cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Numeric value (the result of a formula)
    Number(f64),

    /// Literal text, shown exactly as typed
    Text(String),

    /// The formula failed; the code says why
    Error(CellError),
}

impl CellValue {
    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Check if the cell contains an error
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the error code if this is one
    pub fn error(&self) -> Option<CellError> {
        match self {
            CellValue::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Get the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::Number(_) => "number",
            CellValue::Text(_) => "text",
            CellValue::Error(_) => "error",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// Format a number for display
///
/// Integral values below 1e15 print without a fractional part; everything
/// else uses the shortest representation that round-trips.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        // Avoid "-0"
        format!("{}", (n as i64))
    } else {
        format!("{}", n)
    }
}

/// Why a formula cell failed
///
/// One code per failure kind the formula engine can report. Several codes
/// share a display marker; the code itself keeps the precise reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellError {
    /// A character the formula grammar has no use for
    InvalidCharacter,
    /// Parentheses do not match up
    UnbalancedParens,
    /// Nothing after the `=`
    EmptyFormula,
    /// An operator without both operands
    MissingOperand,
    /// Two operands with no operator between them
    DanglingOperand,
    /// The evaluator ran out of operands
    StackUnderflow,
    /// A reference to a cell that does not exist
    UnknownReference,
    /// A reference to a cell holding non-numeric text
    NotANumber,
    /// Division by exactly zero
    DivisionByZero,
    /// The formula depends on itself
    CircularReference,
    /// The result is not a finite number
    NumericOverflow,
    /// A lookup gave up on a reference chain that was too deep
    ChainTooDeep,
}

impl CellError {
    /// Get the display marker for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::InvalidCharacter
            | CellError::UnbalancedParens
            | CellError::EmptyFormula
            | CellError::MissingOperand
            | CellError::DanglingOperand
            | CellError::StackUnderflow => "#ERR!",
            CellError::UnknownReference => "#REF!",
            CellError::NotANumber => "#VALUE!",
            CellError::DivisionByZero => "#DIV/0!",
            CellError::CircularReference => "#CIRC!",
            CellError::NumericOverflow | CellError::ChainTooDeep => "#NUM!",
        }
    }

    /// Whether the formula text itself is malformed
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            CellError::InvalidCharacter
                | CellError::UnbalancedParens
                | CellError::EmptyFormula
                | CellError::MissingOperand
                | CellError::DanglingOperand
        )
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
