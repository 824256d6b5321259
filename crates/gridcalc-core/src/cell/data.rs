//! The cell data holder

use super::address::Position;
use super::value::{CellError, CellValue};
use std::collections::BTreeSet;

/// Stable cell identity, assigned once when the grid is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u64);

/// What kind of content a cell holds, inferred from its raw text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    /// Literal text (possibly empty, possibly numeric-looking)
    #[default]
    Text,
    /// Text starting with `=`
    Formula,
}

impl CellKind {
    /// Infer the kind from raw input
    pub fn infer(raw: &str) -> Self {
        if raw.starts_with('=') {
            CellKind::Formula
        } else {
            CellKind::Text
        }
    }
}

/// Evaluation state of a cell
///
/// `Clean` → `Dirty` (content or a dependency changed) → `Evaluating` →
/// `Clean` or `Error`. `Error` is terminal until the cell is dirtied again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    #[default]
    Clean,
    Dirty,
    Evaluating,
    Error,
}

/// A single cell
///
/// Owns its raw input and cached value. Dependency edges are stored as
/// positions only; the [`Grid`](crate::Grid) keeps both directions in sync.
#[derive(Debug, Clone)]
pub struct Cell {
    id: CellId,
    position: Position,
    raw: String,
    kind: CellKind,
    state: CellState,
    value: CellValue,
    pub(crate) depends_on: BTreeSet<Position>,
    pub(crate) dependents: BTreeSet<Position>,
}

impl Cell {
    /// Create an empty, clean cell
    pub fn new(id: CellId, position: Position) -> Self {
        Self {
            id,
            position,
            raw: String::new(),
            kind: CellKind::Text,
            state: CellState::Clean,
            value: CellValue::Empty,
            depends_on: BTreeSet::new(),
            dependents: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// What the user typed, including a leading `=` for formulas
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn is_formula(&self) -> bool {
        self.kind == CellKind::Formula
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    /// The cached value
    ///
    /// Only meaningful while the cell is `Clean` or `Error`; a `Dirty` cell
    /// still carries its previous value.
    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// The error code if the cell is in the `Error` state
    pub fn error(&self) -> Option<CellError> {
        match self.state {
            CellState::Error => self.value.error(),
            _ => None,
        }
    }

    /// Cells this cell's formula reads
    pub fn depends_on(&self) -> impl Iterator<Item = Position> + '_ {
        self.depends_on.iter().copied()
    }

    /// Cells whose formulas read this cell
    pub fn dependents(&self) -> impl Iterator<Item = Position> + '_ {
        self.dependents.iter().copied()
    }

    /// Replace the raw content
    ///
    /// Sets the kind from the `=` prefix. Text cells become `Clean`
    /// immediately; formula cells become `Dirty` and keep their stale value
    /// until evaluated.
    ///
    /// Leaves dependency edges and dependents untouched; the calculation
    /// engine's `store` is the write path for hosts.
    #[doc(hidden)]
    pub fn set_raw(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
        self.kind = CellKind::infer(&self.raw);
        match self.kind {
            CellKind::Text => {
                self.value = if self.raw.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(self.raw.clone())
                };
                self.state = CellState::Clean;
            }
            CellKind::Formula => self.state = CellState::Dirty,
        }
    }

    /// Mark a formula cell stale; text cells are never stale
    #[doc(hidden)]
    pub fn mark_dirty(&mut self) {
        if self.kind == CellKind::Formula {
            self.state = CellState::Dirty;
        }
    }

    #[doc(hidden)]
    pub fn begin_evaluation(&mut self) {
        self.state = CellState::Evaluating;
    }

    /// Record a successful evaluation
    #[doc(hidden)]
    pub fn set_result(&mut self, n: f64) {
        self.value = CellValue::Number(n);
        self.state = CellState::Clean;
    }

    /// Record a failed evaluation
    #[doc(hidden)]
    pub fn set_error(&mut self, error: CellError) {
        self.value = CellValue::Error(error);
        self.state = CellState::Error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell() -> Cell {
        Cell::new(CellId(0), Position::new(1, 1))
    }

    #[test]
    fn test_new_cell_is_empty_and_clean() {
        let c = cell();
        assert_eq!(c.raw(), "");
        assert_eq!(c.kind(), CellKind::Text);
        assert_eq!(c.state(), CellState::Clean);
        assert!(c.value().is_empty());
    }

    #[test]
    fn test_kind_follows_prefix() {
        let mut c = cell();
        c.set_raw("hello");
        assert_eq!(c.kind(), CellKind::Text);
        assert_eq!(c.state(), CellState::Clean);
        assert_eq!(c.value(), &CellValue::Text("hello".into()));

        c.set_raw("=1+1");
        assert!(c.is_formula());
        assert_eq!(c.state(), CellState::Dirty);

        c.set_raw(" =1");
        assert_eq!(c.kind(), CellKind::Text);
    }

    #[test]
    fn test_text_cells_ignore_dirty() {
        let mut c = cell();
        c.set_raw("5");
        c.mark_dirty();
        assert_eq!(c.state(), CellState::Clean);
    }

    #[test]
    fn test_error_only_reported_in_error_state() {
        let mut c = cell();
        c.set_raw("=1/0");
        c.set_error(CellError::DivisionByZero);
        assert_eq!(c.error(), Some(CellError::DivisionByZero));

        c.mark_dirty();
        assert_eq!(c.error(), None);

        c.set_result(3.0);
        assert_eq!(c.state(), CellState::Clean);
        assert_eq!(c.value().as_number(), Some(3.0));
    }
}
