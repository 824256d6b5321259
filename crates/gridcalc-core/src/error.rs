//! Error types for gridcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gridcalc-core
///
/// These cover addressing and grid construction only. Problems with cell
/// *content* (bad formulas, failed evaluation) never surface as an `Error`;
/// they are recorded on the cell itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row number out of bounds
    #[error("Row {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column letters out of bounds
    #[error("Column {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(String, u32),

    /// Position is well-formed but not part of this grid
    #[error("Cell {0} is outside the grid")]
    OutsideGrid(String),

    /// Grid dimensions are unusable
    #[error("Invalid grid size {rows}x{cols}")]
    InvalidSize { rows: u32, cols: u32 },
}
