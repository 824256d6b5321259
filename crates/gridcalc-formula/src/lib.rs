//! # gridcalc-formula
//!
//! Formula parser and evaluator for gridcalc.
//!
//! Formulas are plain arithmetic over numbers and A1 references:
//! `+ - * /` with the usual precedence, left associativity and parentheses.
//! This crate provides:
//! - Tokenizing (text → tokens)
//! - Conversion to postfix order with the shunting-yard algorithm
//! - Stack evaluation of postfix sequences against a [`CellLookup`]
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::Position;
//! use gridcalc_formula::{evaluate, parse_formula, EvalError};
//!
//! let postfix = parse_formula("=A1*(2+3)").unwrap();
//! assert_eq!(postfix.references(), vec![Position::new(1, 1)]);
//!
//! let mut lookup = |_: Position| -> Result<f64, EvalError> { Ok(4.0) };
//! assert_eq!(evaluate(postfix.tokens(), &mut lookup), Ok(20.0));
//! ```

pub mod error;
pub mod evaluator;
pub mod operator;
pub mod postfix;
pub mod token;
pub mod tokenizer;

pub use error::{EvalError, FormulaError, FormulaResult, ParseError};
pub use evaluator::{evaluate, evaluate_formula, CellLookup, NoCells};
pub use operator::{operators, Associativity, Operator, OperatorSpec};
pub use postfix::{parse_formula, to_postfix, Postfix};
pub use token::{parse_number, Token};
pub use tokenizer::tokenize;
