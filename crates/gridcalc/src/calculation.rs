//! Grid calculation engine
//!
//! Ties the formula evaluator to the grid: writes invalidate eagerly,
//! reads evaluate lazily, and referenced cells are brought up to date on
//! demand while a formula is being evaluated.
//!
//! # Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut grid = Grid::new();
//! grid.store_a1("A1", "10").unwrap();
//! grid.store_a1("A2", "=A1*2").unwrap();
//!
//! let a2 = grid.position("A2").unwrap();
//! assert_eq!(grid.display_value(a2), "20");
//!
//! grid.store_a1("A1", "1.5").unwrap();
//! assert_eq!(grid.display_value(a2), "3");
//! ```

use crate::{
    evaluate_formula, parse_number, Cell, CellError, CellLookup, CellState, CellValue, Error,
    EvalError, Grid, Position, Result,
};

/// Options for a full recalculation
#[derive(Debug, Clone, Default)]
pub struct CalculationOptions {
    /// Mark every formula cell dirty first, even ones with a current value
    pub force_full_calculation: bool,
}

/// Statistics from a recalculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Total number of formula cells
    pub formula_count: usize,
    /// Number of formula evaluations performed
    pub cells_calculated: usize,
    /// Formula cells left in the error state
    pub errors: usize,
    /// Formula cells whose error is a circular reference
    pub circular_references: usize,
}

/// Extension trait for Grid to add editing and calculation methods
pub trait GridCalculationExt {
    /// Replace a cell's raw content
    ///
    /// Drops the cell's outgoing dependency edges and marks it, plus every
    /// cell that reads it directly or indirectly, as dirty. Nothing is
    /// evaluated until a value is read.
    fn store(&mut self, position: Position, text: &str) -> Result<()>;

    /// [`store`](Self::store) addressed by an A1 string
    fn store_a1(&mut self, address: &str, text: &str) -> Result<()>;

    /// Store empty text in a cell
    fn clear(&mut self, position: Position) -> Result<()>;

    /// Empty every cell of the grid
    fn clear_all(&mut self);

    /// The up-to-date value of a cell, or `None` outside the grid
    fn value(&mut self, position: Position) -> Option<&CellValue>;

    /// The text a cell displays
    ///
    /// A formatted number, the raw text of a text cell, or an error marker
    /// such as `#DIV/0!`. Positions outside the grid display as empty.
    fn display_value(&mut self, position: Position) -> String;

    /// The error code of a cell, if its evaluation failed
    fn cell_error(&mut self, position: Position) -> Option<CellError>;

    /// Evaluate every dirty formula cell
    fn recalculate(&mut self) -> CalculationStats;

    /// Recalculate with custom options
    fn recalculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats;
}

impl GridCalculationExt for Grid {
    fn store(&mut self, position: Position, text: &str) -> Result<()> {
        if !self.contains(position) {
            return Err(Error::OutsideGrid(position.to_string()));
        }

        self.unlink_precedents(position);
        if let Some(cell) = self.cell_mut(position) {
            cell.set_raw(text);
        }

        let affected = self.affected_by(position);
        tracing::debug!(cell = %position, affected = affected.len(), "stored cell");

        for dependent in affected {
            if let Some(cell) = self.cell_mut(dependent) {
                cell.mark_dirty();
            }
        }

        Ok(())
    }

    fn store_a1(&mut self, address: &str, text: &str) -> Result<()> {
        let position = self.position(address)?;
        self.store(position, text)
    }

    fn clear(&mut self, position: Position) -> Result<()> {
        self.store(position, "")
    }

    fn clear_all(&mut self) {
        let occupied: Vec<Position> = self.non_empty_cells().map(Cell::position).collect();
        tracing::debug!(cells = occupied.len(), "clearing grid");

        for position in occupied {
            self.unlink_precedents(position);
            if let Some(cell) = self.cell_mut(position) {
                cell.set_raw("");
            }
        }
    }

    fn value(&mut self, position: Position) -> Option<&CellValue> {
        CalculationEngine::new(self).refresh(position);
        self.cell(position).map(Cell::value)
    }

    fn display_value(&mut self, position: Position) -> String {
        self.value(position)
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    fn cell_error(&mut self, position: Position) -> Option<CellError> {
        CalculationEngine::new(self).refresh(position);
        self.cell(position).and_then(Cell::error)
    }

    fn recalculate(&mut self) -> CalculationStats {
        self.recalculate_with_options(&CalculationOptions::default())
    }

    fn recalculate_with_options(&mut self, options: &CalculationOptions) -> CalculationStats {
        let mut engine = CalculationEngine::new(self);
        engine.calculate_all(options)
    }
}

/// The calculation engine
///
/// Borrows the grid for the duration of one read or one recalculation.
struct CalculationEngine<'g> {
    grid: &'g mut Grid,
    max_depth: usize,
    cells_calculated: usize,
    /// Roots waiting on a deeper cell, oldest first
    pending: Vec<Position>,
    /// Dirty cell met at the depth limit, to be evaluated as a new root
    blocked: Option<Position>,
}

impl<'g> CalculationEngine<'g> {
    fn new(grid: &'g mut Grid) -> Self {
        let max_depth = grid.settings().max_chain_depth;
        Self {
            grid,
            max_depth,
            cells_calculated: 0,
            pending: Vec::new(),
            blocked: None,
        }
    }

    /// Evaluate `position` if it is a dirty formula cell
    ///
    /// Recursion stops at `max_depth`. The cells on the abandoned path stay
    /// dirty, the cell that stopped it is evaluated as a root of its own, and
    /// the earlier root is retried once that cell is settled.
    fn refresh(&mut self, position: Position) {
        self.pending.push(position);

        while let Some(&root) = self.pending.last() {
            self.evaluate_cell(root, 0);

            match self.blocked.take() {
                Some(blocker) => {
                    tracing::trace!(cell = %root, waiting_on = %blocker, "deferring deep chain");
                    self.pending.push(blocker);
                }
                None => {
                    self.pending.pop();
                }
            }
        }
    }

    /// Calculate every formula cell in row-major order
    fn calculate_all(&mut self, options: &CalculationOptions) -> CalculationStats {
        let formulas: Vec<Position> = self.grid.formula_cells().map(Cell::position).collect();

        if options.force_full_calculation {
            for &position in &formulas {
                if let Some(cell) = self.grid.cell_mut(position) {
                    cell.mark_dirty();
                }
            }
        }

        for &position in &formulas {
            self.refresh(position);
        }

        let mut stats = CalculationStats {
            formula_count: formulas.len(),
            cells_calculated: self.cells_calculated,
            ..Default::default()
        };

        for cell in formulas.iter().filter_map(|&p| self.grid.cell(p)) {
            match cell.error() {
                Some(CellError::CircularReference) => {
                    stats.errors += 1;
                    stats.circular_references += 1;
                }
                Some(_) => stats.errors += 1,
                None => {}
            }
        }

        tracing::debug!(
            formulas = stats.formula_count,
            calculated = stats.cells_calculated,
            errors = stats.errors,
            "recalculated grid"
        );

        stats
    }

    /// Evaluate a dirty formula cell and cache the outcome
    ///
    /// `depth` counts the references followed to get here.
    fn evaluate_cell(&mut self, position: Position, depth: usize) {
        let formula = match self.grid.cell_mut(position) {
            Some(cell) if cell.is_formula() && cell.state() == CellState::Dirty => {
                cell.begin_evaluation();
                cell.raw().to_string()
            }
            _ => return,
        };

        // Edges are rebuilt from the references this evaluation touches
        self.grid.unlink_precedents(position);
        tracing::trace!(cell = %position, %formula, depth, "evaluating cell");

        let result = {
            let mut resolver = Resolver {
                engine: self,
                reader: position,
                depth,
            };
            evaluate_formula(&formula, &mut resolver)
        };

        let Some(cell) = self.grid.cell_mut(position) else {
            return;
        };

        // Abandoned rather than failed; the root is retried later
        if self.blocked.is_some() {
            cell.mark_dirty();
            return;
        }

        self.cells_calculated += 1;
        match result {
            Ok(n) => {
                tracing::trace!(cell = %position, value = n, "evaluated cell");
                cell.set_result(n);
            }
            Err(e) => {
                tracing::debug!(cell = %position, error = %e, "formula failed");
                cell.set_error(e.code());
            }
        }
    }

    /// Numeric value of `referenced` as read by `reader`'s formula
    fn resolve(
        &mut self,
        reader: Position,
        referenced: Position,
        depth: usize,
    ) -> std::result::Result<f64, EvalError> {
        if !self.grid.link(reader, referenced) {
            return Err(EvalError::UnknownReference(referenced.to_string()));
        }

        match self.grid.cell(referenced).map(Cell::state) {
            Some(CellState::Evaluating) => {
                tracing::debug!(cell = %reader, through = %referenced, "circular reference");
                return Err(EvalError::CircularReference(referenced));
            }
            Some(CellState::Dirty) => {
                // A pending root is waiting on this evaluation
                if self.pending.contains(&referenced) {
                    tracing::debug!(cell = %reader, through = %referenced, "circular reference");
                    return Err(EvalError::CircularReference(referenced));
                }
                if depth >= self.max_depth {
                    self.blocked = Some(referenced);
                    return Err(EvalError::ChainTooDeep(self.max_depth));
                }
                self.evaluate_cell(referenced, depth + 1);
                if self.blocked.is_some() {
                    return Err(EvalError::ChainTooDeep(self.max_depth));
                }
            }
            _ => {}
        }

        let cell = self
            .grid
            .cell(referenced)
            .ok_or_else(|| EvalError::UnknownReference(referenced.to_string()))?;

        match cell.value() {
            CellValue::Number(n) => Ok(*n),
            CellValue::Empty => Ok(0.0),
            CellValue::Text(text) => {
                parse_number(text.trim()).ok_or(EvalError::NotANumber(referenced))
            }
            CellValue::Error(error) => Err(EvalError::Upstream {
                position: referenced,
                error: *error,
            }),
        }
    }
}

/// Resolves references for one formula cell during its evaluation
struct Resolver<'e, 'g> {
    engine: &'e mut CalculationEngine<'g>,
    reader: Position,
    depth: usize,
}

impl CellLookup for Resolver<'_, '_> {
    fn resolve(&mut self, position: Position) -> std::result::Result<f64, EvalError> {
        self.engine.resolve(self.reader, position, self.depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridSettings;
    use pretty_assertions::assert_eq;

    fn pos(a1: &str) -> Position {
        Position::parse(a1).unwrap()
    }

    fn grid_with(cells: &[(&str, &str)]) -> Grid {
        let mut grid = Grid::new();
        for (a1, text) in cells {
            grid.store_a1(a1, text).unwrap();
        }
        grid
    }

    #[test]
    fn test_simple_calculation() {
        let mut grid = grid_with(&[("A1", "10"), ("A2", "20"), ("A3", "=A1+A2")]);

        let stats = grid.recalculate();

        assert_eq!(stats.formula_count, 1);
        assert_eq!(stats.cells_calculated, 1);
        assert_eq!(stats.errors, 0);
        assert_eq!(grid.value(pos("A3")), Some(&CellValue::Number(30.0)));
    }

    #[test]
    fn test_chain_calculation() {
        let mut grid = grid_with(&[
            ("A1", "5"),
            ("A2", "=A1*2"),
            ("A3", "=A2+10"),
            ("A4", "=A3*A1"),
        ]);

        // Reading the end of the chain pulls everything before it
        assert_eq!(grid.display_value(pos("A4")), "100");
        assert_eq!(grid.cell(pos("A2")).unwrap().state(), CellState::Clean);
        assert_eq!(grid.cell(pos("A3")).unwrap().value(), &CellValue::Number(20.0));

        let stats = grid.recalculate();
        assert_eq!(stats.formula_count, 3);
        assert_eq!(stats.cells_calculated, 0);
    }

    #[test]
    fn test_force_full_calculation() {
        let mut grid = grid_with(&[("A1", "5"), ("A2", "=A1*2"), ("A3", "=A2+1")]);
        grid.recalculate();

        let options = CalculationOptions {
            force_full_calculation: true,
        };
        let stats = grid.recalculate_with_options(&options);
        assert_eq!(stats.cells_calculated, 2);
        assert_eq!(grid.display_value(pos("A3")), "11");
    }

    #[test]
    fn test_write_invalidates_transitively() {
        let mut grid = grid_with(&[("A1", "1"), ("B1", "=A1+1"), ("C1", "=B1*10")]);
        assert_eq!(grid.display_value(pos("C1")), "20");

        grid.store(pos("A1"), "4").unwrap();
        assert_eq!(grid.cell(pos("B1")).unwrap().state(), CellState::Dirty);
        assert_eq!(grid.cell(pos("C1")).unwrap().state(), CellState::Dirty);
        assert_eq!(grid.display_value(pos("C1")), "50");
    }

    #[test]
    fn test_edges_follow_formula() {
        let mut grid = grid_with(&[("A1", "1"), ("A2", "2"), ("B1", "=A1+A1+A2")]);
        grid.recalculate();

        assert_eq!(grid.precedents(pos("B1")), vec![pos("A1"), pos("A2")]);
        assert_eq!(grid.dependents(pos("A1")), vec![pos("B1")]);

        grid.store_a1("B1", "=A2*3").unwrap();
        assert!(grid.precedents(pos("B1")).is_empty());
        assert!(grid.dependents(pos("A1")).is_empty());

        assert_eq!(grid.display_value(pos("B1")), "6");
        assert_eq!(grid.precedents(pos("B1")), vec![pos("A2")]);
    }

    #[test]
    fn test_edges_recorded_on_failure() {
        let mut grid = grid_with(&[("A1", "hello"), ("B1", "=A1*2")]);
        assert_eq!(grid.cell_error(pos("B1")), Some(CellError::NotANumber));
        assert_eq!(grid.dependents(pos("A1")), vec![pos("B1")]);

        grid.store_a1("A1", " 21 ").unwrap();
        assert_eq!(grid.display_value(pos("B1")), "42");
    }

    #[test]
    fn test_blank_reads_as_zero() {
        let mut grid = grid_with(&[("A1", "=B1+1")]);
        assert_eq!(grid.display_value(pos("A1")), "1");
    }

    #[test]
    fn test_upstream_error_code() {
        let mut grid = grid_with(&[("A1", "=1/0"), ("A2", "=A1+1")]);
        assert_eq!(grid.cell_error(pos("A2")), Some(CellError::DivisionByZero));
        assert_eq!(grid.display_value(pos("A2")), "#DIV/0!");
    }

    #[test]
    fn test_circular_reference_detection() {
        let mut grid = grid_with(&[("A1", "=B1"), ("B1", "=A1")]);

        let stats = grid.recalculate();

        assert_eq!(stats.circular_references, 2);
        assert_eq!(stats.errors, 2);
        assert_eq!(grid.display_value(pos("A1")), "#CIRC!");
        assert_eq!(grid.display_value(pos("B1")), "#CIRC!");
    }

    #[test]
    fn test_breaking_a_cycle() {
        let mut grid = grid_with(&[("A1", "=B1+1"), ("B1", "=A1")]);
        assert_eq!(grid.cell_error(pos("A1")), Some(CellError::CircularReference));

        grid.store_a1("B1", "7").unwrap();
        assert_eq!(grid.display_value(pos("A1")), "8");
    }

    /// Store `A1`="1" and then `=<previous>+1` down the given cells
    fn store_chain(grid: &mut Grid, cells: &[Position]) {
        grid.store(cells[0], "1").unwrap();
        for pair in cells.windows(2) {
            grid.store(pair[1], &format!("={}+1", pair[0])).unwrap();
        }
    }

    #[test]
    fn test_deep_chain_read_from_far_end() {
        let settings = GridSettings::default().with_max_chain_depth(3);
        let mut grid = Grid::with_settings(settings).unwrap();
        let cells: Vec<Position> = (1..=6).map(|row| Position::new(row, 1)).collect();
        store_chain(&mut grid, &cells);

        assert_eq!(grid.display_value(pos("A6")), "6");
        assert_eq!(grid.display_value(pos("A3")), "3");
        for &position in &cells {
            assert_eq!(grid.cell_error(position), None, "{}", position);
            assert_eq!(grid.cell(position).unwrap().state(), CellState::Clean);
        }

        let stats = grid.recalculate();
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.cells_calculated, 0);
    }

    #[test]
    fn test_deep_chain_recalculates_after_write() {
        let settings = GridSettings::default().with_max_chain_depth(2);
        let mut grid = Grid::with_settings(settings).unwrap();
        let cells: Vec<Position> = (1..=10).map(|row| Position::new(row, 2)).collect();
        store_chain(&mut grid, &cells);
        assert_eq!(grid.display_value(pos("B10")), "10");

        grid.store_a1("B1", "=100").unwrap();
        assert_eq!(grid.display_value(pos("B10")), "109");
        assert_eq!(grid.display_value(pos("B5")), "104");
    }

    #[test]
    fn test_chain_longer_than_a_column() {
        // Runs down A, then B, then C on the default grid
        let mut grid = Grid::new();
        let cells: Vec<Position> = (0..300)
            .map(|i| Position::new(i % 100 + 1, i / 100 + 1))
            .collect();
        store_chain(&mut grid, &cells);

        assert_eq!(grid.display_value(pos("C100")), "300");
        assert_eq!(grid.display_value(pos("B50")), "150");
    }

    #[test]
    fn test_very_long_chain() {
        let settings = GridSettings::default().with_rows(10_000).with_cols(1);
        let mut grid = Grid::with_settings(settings).unwrap();
        let cells: Vec<Position> = (1..=10_000).map(|row| Position::new(row, 1)).collect();
        store_chain(&mut grid, &cells);

        assert_eq!(grid.display_value(pos("A10000")), "10000");
    }

    #[test]
    fn test_cycle_longer_than_depth_limit() {
        let settings = GridSettings::default().with_max_chain_depth(3);
        let mut grid = Grid::with_settings(settings).unwrap();
        for row in 1..10 {
            grid.store(Position::new(row, 1), &format!("=A{}", row + 1))
                .unwrap();
        }
        grid.store_a1("A10", "=A1").unwrap();

        assert_eq!(grid.display_value(pos("A1")), "#CIRC!");

        let stats = grid.recalculate();
        assert_eq!(stats.formula_count, 10);
        assert_eq!(stats.circular_references, 10);
    }

    #[test]
    fn test_deep_chain_into_error() {
        let settings = GridSettings::default().with_max_chain_depth(1);
        let mut grid = Grid::with_settings(settings).unwrap();
        grid.store_a1("A1", "=1/0").unwrap();
        for row in 2..=5 {
            grid.store(Position::new(row, 1), &format!("=A{}*2", row - 1))
                .unwrap();
        }

        assert_eq!(grid.cell_error(pos("A5")), Some(CellError::DivisionByZero));
        assert_eq!(grid.cell_error(pos("A2")), Some(CellError::DivisionByZero));
    }

    #[test]
    fn test_out_of_grid() {
        let mut grid = Grid::new();
        assert_eq!(
            grid.store(Position::new(101, 1), "1"),
            Err(Error::OutsideGrid("A101".into()))
        );
        assert!(grid.store_a1("A0", "1").is_err());
        assert_eq!(grid.display_value(Position::new(1, 200)), "");
        assert_eq!(grid.value(Position::new(1, 200)), None);
    }

    #[test]
    fn test_clear() {
        let mut grid = grid_with(&[("A1", "3"), ("B1", "=A1*A1")]);
        assert_eq!(grid.display_value(pos("B1")), "9");

        grid.clear(pos("A1")).unwrap();
        assert_eq!(grid.display_value(pos("B1")), "0");

        grid.clear_all();
        assert_eq!(grid.non_empty_cells().count(), 0);
        assert!(grid.dependents(pos("A1")).is_empty());
        assert_eq!(grid.display_value(pos("B1")), "");
    }
}
