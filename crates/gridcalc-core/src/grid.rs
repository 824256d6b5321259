//! Grid type - owns every cell and the dependency edges between them

use ahash::AHashMap;

use crate::cell::{Cell, CellId, Position};
use crate::error::{Error, Result};
use crate::{MAX_CELLS, MAX_COLS, MAX_ROWS};

/// A fixed-size grid of cells
///
/// All cells are created up front when the grid is built and live as long as
/// the grid does; only their content and cached values change. The
/// dependency graph is held implicitly by each cell's `depends_on` and
/// `dependents` sets, and the grid is the only thing that edits them so the
/// two directions always agree.
#[derive(Debug)]
pub struct Grid {
    cells: AHashMap<Position, Cell>,
    settings: GridSettings,
}

impl Grid {
    /// Create a grid with default settings (100 x 100)
    pub fn new() -> Self {
        Self::build(GridSettings::default())
    }

    /// Create a grid with the given settings
    pub fn with_settings(settings: GridSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    fn build(settings: GridSettings) -> Self {
        let mut cells = AHashMap::with_capacity(settings.cell_count());
        let mut next_id = 0u64;

        for row in 1..=settings.rows {
            for col in 1..=settings.cols {
                let position = Position::new(row, col);
                cells.insert(position, Cell::new(CellId(next_id), position));
                next_id += 1;
            }
        }

        Self { cells, settings }
    }

    /// Get grid settings
    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    /// Number of rows
    pub fn rows(&self) -> u32 {
        self.settings.rows
    }

    /// Number of columns
    pub fn cols(&self) -> u32 {
        self.settings.cols
    }

    /// Check whether a position lies inside the grid
    pub fn contains(&self, position: Position) -> bool {
        self.cells.contains_key(&position)
    }

    // === Cell Access ===

    /// Get a cell by position
    pub fn cell(&self, position: Position) -> Option<&Cell> {
        self.cells.get(&position)
    }

    /// Get a mutable cell by position
    pub fn cell_mut(&mut self, position: Position) -> Option<&mut Cell> {
        self.cells.get_mut(&position)
    }

    /// Parse an A1 address and check that it lies inside this grid
    pub fn position(&self, address: &str) -> Result<Position> {
        let position = Position::parse(address)?;
        if !self.contains(position) {
            return Err(Error::OutsideGrid(position.to_string()));
        }
        Ok(position)
    }

    /// Get a cell by address string (e.g., "A1")
    pub fn cell_a1(&self, address: &str) -> Result<&Cell> {
        let position = self.position(address)?;
        self.cell(position)
            .ok_or_else(|| Error::OutsideGrid(position.to_string()))
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let cols = self.settings.cols;
        (1..=self.settings.rows)
            .flat_map(move |row| (1..=cols).map(move |col| Position::new(row, col)))
    }

    /// All cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.positions().filter_map(move |p| self.cells.get(&p))
    }

    /// Cells holding any content, in row-major order
    pub fn non_empty_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells().filter(|c| !c.raw().is_empty())
    }

    /// Formula cells, in row-major order
    pub fn formula_cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells().filter(|c| c.is_formula())
    }

    // === Headers ===

    /// Label of a column header (1 = "A", 27 = "AA")
    pub fn column_header(col: u32) -> String {
        Position::column_to_letters(col)
    }

    /// Label of a row header
    pub fn row_header(row: u32) -> String {
        row.to_string()
    }

    // === Dependency edges ===

    /// Record that `reader`'s formula reads `referenced`
    ///
    /// Updates both cells. Returns false if either position is outside the
    /// grid, in which case nothing is recorded.
    pub fn link(&mut self, reader: Position, referenced: Position) -> bool {
        if !self.contains(reader) || !self.contains(referenced) {
            return false;
        }
        if let Some(cell) = self.cells.get_mut(&reader) {
            cell.depends_on.insert(referenced);
        }
        if let Some(cell) = self.cells.get_mut(&referenced) {
            cell.dependents.insert(reader);
        }
        true
    }

    /// Remove every outgoing edge of `reader`
    ///
    /// The old formula's references no longer apply; incoming edges (cells
    /// that read `reader`) are left alone.
    pub fn unlink_precedents(&mut self, reader: Position) {
        let precedents = match self.cells.get_mut(&reader) {
            Some(cell) => std::mem::take(&mut cell.depends_on),
            None => return,
        };

        for precedent in precedents {
            if let Some(cell) = self.cells.get_mut(&precedent) {
                cell.dependents.remove(&reader);
            }
        }
    }

    /// Cells that `position` reads
    pub fn precedents(&self, position: Position) -> Vec<Position> {
        self.cell(position)
            .map(|c| c.depends_on().collect())
            .unwrap_or_default()
    }

    /// Cells that read `position`
    pub fn dependents(&self, position: Position) -> Vec<Position> {
        self.cell(position)
            .map(|c| c.dependents().collect())
            .unwrap_or_default()
    }

    /// Every cell that must be treated as stale when `position` changes
    ///
    /// Walks `dependents` transitively (depth-first, each cell once) and
    /// returns the reachable cells, not including `position` itself unless it
    /// sits on a cycle.
    pub fn affected_by(&self, position: Position) -> Vec<Position> {
        let mut result = Vec::new();
        let mut visited = ahash::AHashSet::new();
        let mut stack: Vec<Position> = self.dependents(position);

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            result.push(current);
            if let Some(cell) = self.cells.get(&current) {
                stack.extend(cell.dependents().filter(|p| !visited.contains(p)));
            }
        }

        result
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

/// Grid configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GridSettings {
    /// Number of rows
    pub rows: u32,
    /// Number of columns
    pub cols: u32,
    /// How many formula cells deep evaluation recurses before it resumes
    /// the chain from the cell it stopped at
    pub max_chain_depth: usize,
}

impl GridSettings {
    /// Set the number of rows
    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = rows;
        self
    }

    /// Set the number of columns
    pub fn with_cols(mut self, cols: u32) -> Self {
        self.cols = cols;
        self
    }

    /// Set the recursion depth limit for reference chains
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Check that the grid can be built
    pub fn validate(&self) -> Result<()> {
        let invalid = Error::InvalidSize {
            rows: self.rows,
            cols: self.cols,
        };
        if self.rows == 0 || self.cols == 0 {
            return Err(invalid);
        }
        if self.rows > MAX_ROWS || self.cols > MAX_COLS {
            return Err(invalid);
        }
        if self.cell_count() > MAX_CELLS {
            return Err(invalid);
        }
        Ok(())
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            rows: 100,
            cols: 100,
            max_chain_depth: 256,
        }
    }
}
