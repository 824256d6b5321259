//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    // Calculation types
    CalculationOptions,
    CalculationStats,
    // Cell types
    CellError,
    CellState,
    CellValue,

    // Error types
    Error,
    FormulaError,

    // Main types
    Grid,
    // Extension traits
    GridCalculationExt,
    GridSettings,
    Position,
    Result,
};
