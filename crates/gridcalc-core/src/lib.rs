//! # gridcalc-core
//!
//! Core data structures for the gridcalc spreadsheet engine.
//!
//! This crate provides the fundamental types used throughout gridcalc:
//! - [`Position`] - Cell addressing in A1 notation
//! - [`Cell`] - Raw input, inferred kind, cached value and dependency edges
//! - [`CellValue`] and [`CellError`] - What a cell currently shows
//! - [`Grid`] - The fixed-size container that owns every cell
//!
//! It knows nothing about formulas; parsing and evaluation live in
//! `gridcalc-formula`, and the calculation engine that ties the two together
//! lives in `gridcalc`.
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{Grid, Position};
//!
//! let grid = Grid::new();
//! assert_eq!((grid.rows(), grid.cols()), (100, 100));
//!
//! let b3 = grid.position("b3").unwrap();
//! assert_eq!(b3, Position::new(3, 2));
//! assert!(grid.cell(b3).unwrap().value().is_empty());
//!
//! assert_eq!(Grid::column_header(27), "AA");
//! assert!(grid.position("A101").is_err());
//! //! ```

pub mod cell;
pub mod error;
pub mod grid;

// Re-exports for convenience
pub use cell::{format_number, Cell, CellError, CellId, CellKind, CellState, CellValue, Position};
pub use error::{Error, Result};
pub use grid::{Grid, GridSettings};

/// Maximum row number an address may name
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum column number an address may name (`XFD`)
pub const MAX_COLS: u32 = 16_384;

/// Maximum number of cells a grid may be built with
pub const MAX_CELLS: usize = 4_000_000;
