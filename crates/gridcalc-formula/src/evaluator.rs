//! Postfix evaluator
//!
//! Runs a postfix token sequence on a value stack. Cell references are
//! handed to a [`CellLookup`], which is how the grid plugs in lazy
//! evaluation of referenced cells.

use crate::error::{EvalError, FormulaResult};
use crate::postfix::parse_formula;
use crate::token::Token;
use gridcalc_core::Position;

/// Resolves cell references to numbers during evaluation
pub trait CellLookup {
    /// Numeric value of the cell at `position`
    fn resolve(&mut self, position: Position) -> Result<f64, EvalError>;
}

impl<F> CellLookup for F
where
    F: FnMut(Position) -> Result<f64, EvalError>,
{
    fn resolve(&mut self, position: Position) -> Result<f64, EvalError> {
        self(position)
    }
}

/// Lookup for formulas evaluated outside a grid
///
/// Every reference is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCells;

impl CellLookup for NoCells {
    fn resolve(&mut self, position: Position) -> Result<f64, EvalError> {
        Err(EvalError::UnknownReference(position.to_a1_string()))
    }
}

/// Evaluate a postfix token sequence
///
/// Operands are pushed; each operator pops its right operand, then its
/// left, and pushes `left OP right`. The first error aborts evaluation.
pub fn evaluate<L>(postfix: &[Token], lookup: &mut L) -> Result<f64, EvalError>
where
    L: CellLookup + ?Sized,
{
    let mut stack: Vec<f64> = Vec::with_capacity(postfix.len() / 2 + 1);

    for token in postfix {
        match token {
            Token::Number(n) => stack.push(*n),
            Token::Reference(text) => {
                let position = Position::parse(text)
                    .map_err(|_| EvalError::UnknownReference(text.clone()))?;
                let value = lookup.resolve(position)?;
                tracing::trace!(reference = %position, value, "resolved reference");
                stack.push(value);
            }
            Token::Operator(op) => {
                let rhs = stack.pop().ok_or(EvalError::StackUnderflow)?;
                let lhs = stack.pop().ok_or(EvalError::StackUnderflow)?;
                let value = op.apply(lhs, rhs)?;
                if !value.is_finite() {
                    return Err(EvalError::NumericOverflow);
                }
                stack.push(value);
            }
            // Never produced by the converter
            Token::LeftParen | Token::RightParen => return Err(EvalError::StackUnderflow),
        }
    }

    let result = match (stack.pop(), stack.is_empty()) {
        (Some(value), true) => value,
        _ => return Err(EvalError::StackUnderflow),
    };

    if !result.is_finite() {
        return Err(EvalError::NumericOverflow);
    }

    Ok(result)
}

/// Parse and evaluate formula text in one step
///
/// # Example
/// ```rust
/// use gridcalc_formula::{evaluate_formula, NoCells};
///
/// assert_eq!(evaluate_formula("=(2+3)*4", &mut NoCells), Ok(20.0));
/// ```
pub fn evaluate_formula<L>(text: &str, lookup: &mut L) -> FormulaResult<f64>
where
    L: CellLookup + ?Sized,
{
    let postfix = parse_formula(text)?;
    Ok(evaluate(postfix.tokens(), lookup)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FormulaError, ParseError};
    use crate::operator::Operator;
    use gridcalc_core::CellError;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// A handful of cells with fixed values
    struct FakeGrid {
        cells: HashMap<Position, Result<f64, EvalError>>,
        seen: Vec<Position>,
    }

    impl FakeGrid {
        fn new(cells: &[(&str, Result<f64, EvalError>)]) -> Self {
            Self {
                cells: cells
                    .iter()
                    .map(|(a1, v)| (Position::parse(a1).unwrap(), v.clone()))
                    .collect(),
                seen: Vec::new(),
            }
        }
    }

    impl CellLookup for FakeGrid {
        fn resolve(&mut self, position: Position) -> Result<f64, EvalError> {
            self.seen.push(position);
            self.cells
                .get(&position)
                .cloned()
                .unwrap_or_else(|| Err(EvalError::UnknownReference(position.to_string())))
        }
    }

    fn eval(formula: &str) -> FormulaResult<f64> {
        evaluate_formula(formula, &mut NoCells)
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval("=1-2+3"), Ok(2.0));
        assert_eq!(eval("=2+3*4"), Ok(14.0));
        assert_eq!(eval("=(2+3)*4"), Ok(20.0));
        assert_eq!(eval("=8/4/2"), Ok(1.0));
        assert_eq!(eval("=7"), Ok(7.0));
        assert_eq!(eval("=3*-1"), Ok(-3.0));
        assert_eq!(eval("=0.5+0.25"), Ok(0.75));
    }

    #[test]
    fn test_evaluate_division_by_zero() {
        assert_eq!(eval("=5/0"), Err(EvalError::DivisionByZero.into()));
        assert_eq!(eval("=5/(2-2)"), Err(EvalError::DivisionByZero.into()));
    }

    #[test]
    fn test_evaluate_overflow() {
        assert_eq!(eval("=1e308*10"), Err(EvalError::NumericOverflow.into()));
        assert_eq!(eval("=-1e308-1e308"), Err(EvalError::NumericOverflow.into()));
    }

    #[test]
    fn test_overflowed_intermediate_is_not_hidden() {
        // 1 / inf would otherwise come back as a finite 0
        assert_eq!(eval("=1/(1e308*10)"), Err(EvalError::NumericOverflow.into()));
        assert_eq!(eval("=0*(1e308+1e308)"), Err(EvalError::NumericOverflow.into()));
    }

    #[test]
    fn test_parse_errors_pass_through() {
        assert_eq!(eval("=(1+2"), Err(ParseError::UnbalancedParens.into()));
        assert_eq!(
            eval("=1 & 2"),
            Err(FormulaError::Eval(EvalError::UnknownReference("1&2".into())))
        );
    }

    #[test]
    fn test_evaluate_references() {
        let mut grid = FakeGrid::new(&[("A1", Ok(2.0)), ("B1", Ok(3.0))]);
        assert_eq!(evaluate_formula("=A1*B1+a1", &mut grid), Ok(8.0));
        assert_eq!(
            grid.seen,
            vec![
                Position::new(1, 1),
                Position::new(1, 2),
                Position::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_unknown_reference() {
        assert_eq!(
            eval("=foo+1"),
            Err(EvalError::UnknownReference("foo".into()).into())
        );
        assert_eq!(
            eval("=Z999"),
            Err(EvalError::UnknownReference("Z999".into()).into())
        );
    }

    #[test]
    fn test_lookup_errors_abort() {
        let upstream = EvalError::Upstream {
            position: Position::new(1, 1),
            error: CellError::DivisionByZero,
        };
        let mut grid = FakeGrid::new(&[("A1", Err(upstream.clone())), ("B1", Ok(1.0))]);
        assert_eq!(evaluate_formula("=B1+A1", &mut grid), Err(upstream.into()));
    }

    #[test]
    fn test_closure_lookup() {
        let mut lookup =
            |p: Position| -> Result<f64, EvalError> { Ok(f64::from(p.row * 10 + p.col)) };
        assert_eq!(evaluate_formula("=B3-A1", &mut lookup), Ok(21.0));
    }

    #[test]
    fn test_malformed_sequences_underflow() {
        let add = Token::Operator(Operator::Add);
        assert_eq!(
            evaluate(&[Token::Number(1.0), add], &mut NoCells),
            Err(EvalError::StackUnderflow)
        );
        assert_eq!(
            evaluate(&[Token::Number(1.0), Token::Number(2.0)], &mut NoCells),
            Err(EvalError::StackUnderflow)
        );
        assert_eq!(evaluate(&[], &mut NoCells), Err(EvalError::StackUnderflow));
        assert_eq!(
            evaluate(&[Token::LeftParen], &mut NoCells),
            Err(EvalError::StackUnderflow)
        );
    }
}
