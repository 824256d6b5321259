//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Position`] - A cell's location (e.g., "A1")
//! - [`Cell`] - Raw input, inferred kind, cached value and dependency edges
//! - [`CellValue`] / [`CellError`] - What a cell currently shows

mod address;
mod data;
mod value;

pub use address::Position;
pub use data::{Cell, CellId, CellKind, CellState};
pub use value::{format_number, CellError, CellValue};
