//! # gridcalc
//!
//! A spreadsheet formula engine.
//!
//! Cells hold raw text. Text starting with `=` is a formula over `+ - * /`,
//! numbers, parentheses and A1 references to other cells; anything else is
//! plain text. Formulas are evaluated lazily when read, and writing a cell
//! marks every formula that depends on it for re-evaluation.
//!
//! ## Features
//!
//! - Shunting-yard parsing with the usual precedence and left associativity
//! - Dependency tracking in both directions between cells
//! - Circular reference detection
//! - Per-cell error codes instead of panics or `Err`s for bad content
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut grid = Grid::new();
//!
//! grid.store_a1("A1", "2").unwrap();
//! grid.store_a1("A2", "3").unwrap();
//! grid.store_a1("A3", "=(A1+A2)*4").unwrap();
//! grid.store_a1("B1", "=A3/0").unwrap();
//!
//! let a3 = grid.position("A3").unwrap();
//! let b1 = grid.position("B1").unwrap();
//! assert_eq!(grid.display_value(a3), "20");
//! assert_eq!(grid.display_value(b1), "#DIV/0!");
//! assert_eq!(grid.cell_error(b1), Some(CellError::DivisionByZero));
//! ```

pub mod calculation;
pub mod prelude;

// Re-export calculation types
pub use calculation::{CalculationOptions, CalculationStats, GridCalculationExt};

// Re-export core types
pub use gridcalc_core::{
    format_number,
    // Cell types
    Cell,
    CellError,
    CellId,
    CellKind,
    CellState,
    CellValue,
    // Error types
    Error,
    // Main types
    Grid,
    GridSettings,
    Position,
    Result,

    // Constants
    MAX_CELLS,
    MAX_COLS,
    MAX_ROWS,
};

// Re-export formula types
pub use gridcalc_formula::{
    evaluate, evaluate_formula, parse_formula, parse_number, tokenize, CellLookup, EvalError,
    FormulaError, FormulaResult, NoCells, Operator, ParseError, Postfix, Token,
};
