use std::collections::HashMap;

/// A `[row, col]` position inside one navigation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A logical vertical zone of the grid with its own navigation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    Header,
    #[default]
    Content,
    Aggregate,
}

/// Direction of a single step inside a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
    Left,
    Right,
}

impl Step {
    fn delta(self) -> (isize, isize) {
        match self {
            Step::Up => (-1, 0),
            Step::Down => (1, 0),
            Step::Left => (0, -1),
            Step::Right => (0, 1),
        }
    }
}

/// Occupancy grid over one region.
///
/// A cell is occupied (focusable) when it belongs to an existing row and a
/// visible column. `current` is either `None` (the "no position" sentinel) or
/// an occupied cell; every mutating method preserves that.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavigationMatrix {
    cells: Vec<Vec<bool>>,
    current: Option<Cell>,
    placeholder: bool,
}

impl NavigationMatrix {
    /// Build a matrix from explicit occupancy rows.
    pub fn new(cells: Vec<Vec<bool>>) -> Self {
        Self {
            cells,
            current: None,
            placeholder: false,
        }
    }

    /// Build a matrix of `row_count` rows sharing the same column visibility.
    pub fn build(visible: &[bool], row_count: usize) -> Self {
        Self::new(vec![visible.to_vec(); row_count])
    }

    /// The single logical cell of an empty-record row.
    pub fn placeholder() -> Self {
        Self {
            cells: vec![vec![true]],
            current: None,
            placeholder: true,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn column_count(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Last valid row index, `None` when the matrix has no rows.
    pub fn rows(&self) -> Option<usize> {
        self.row_count().checked_sub(1)
    }

    /// Last valid column index, `None` when the matrix has no columns.
    pub fn columns(&self) -> Option<usize> {
        self.column_count().checked_sub(1)
    }

    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// True when no cell is focusable.
    pub fn is_empty(&self) -> bool {
        !self.cells.iter().flatten().any(|occupied| *occupied)
    }

    pub fn current(&self) -> Option<Cell> {
        self.current
    }

    /// Set `current` if the target is occupied. Returns whether it was set.
    pub fn select(&mut self, row: usize, col: usize) -> bool {
        if self.is_occupied(row, col) {
            self.current = Some(Cell::new(row, col));
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Scan row-major from `from` (inclusive) for the nearest occupied cell.
    ///
    /// Returns `None` when the scan runs off the matrix edge; it never wraps.
    pub fn find_cell_index(&self, from: Cell, forward: bool) -> Option<Cell> {
        let width = self.column_count();
        let total = self.row_count() * width;
        if total == 0 {
            return None;
        }
        let start = from.row * width + from.col.min(width - 1);
        if start >= total {
            return if forward { None } else { self.last_cell() };
        }
        let found = if forward {
            (start..total).find(|i| self.is_occupied(i / width, i % width))
        } else {
            (0..=start).rev().find(|i| self.is_occupied(i / width, i % width))
        };
        log::trace!(
            "[matrix] find_cell_index from={:?} forward={} -> {:?}",
            from,
            forward,
            found.map(|i| (i / width, i % width))
        );
        found.map(|i| Cell::new(i / width, i % width))
    }

    /// The occupied cell after `from` in reading order.
    pub fn next_in_reading_order(&self, from: Cell) -> Option<Cell> {
        let width = self.column_count();
        if width == 0 {
            return None;
        }
        let (row, col) = if from.col + 1 >= width {
            (from.row + 1, 0)
        } else {
            (from.row, from.col + 1)
        };
        if row >= self.row_count() {
            return None;
        }
        self.find_cell_index(Cell::new(row, col), true)
    }

    /// The occupied cell before `from` in reading order.
    pub fn previous_in_reading_order(&self, from: Cell) -> Option<Cell> {
        let width = self.column_count();
        if width == 0 {
            return None;
        }
        let (row, col) = match (from.row, from.col) {
            (0, 0) => return None,
            (row, 0) => (row - 1, width - 1),
            (row, col) => (row, col.min(width) - 1),
        };
        self.find_cell_index(Cell::new(row, col), false)
    }

    /// Move one cell from `from` in `step` direction, skipping unfocusable cells
    /// along the axis of travel. `None` at the matrix edge.
    pub fn step_from(&self, from: Cell, step: Step) -> Option<Cell> {
        let (dr, dc) = step.delta();
        let rows = self.row_count() as isize;
        let cols = self.column_count() as isize;
        let mut row = from.row as isize + dr;
        let mut col = from.col as isize + dc;
        while row >= 0 && col >= 0 && row < rows && col < cols {
            if self.is_occupied(row as usize, col as usize) {
                return Some(Cell::new(row as usize, col as usize));
            }
            row += dr;
            col += dc;
        }
        None
    }

    fn step_current(&mut self, step: Step) -> Option<Cell> {
        let next = self.step_from(self.current?, step)?;
        self.current = Some(next);
        Some(next)
    }

    pub fn up(&mut self) -> Option<Cell> {
        self.step_current(Step::Up)
    }

    pub fn down(&mut self) -> Option<Cell> {
        self.step_current(Step::Down)
    }

    pub fn left(&mut self) -> Option<Cell> {
        self.step_current(Step::Left)
    }

    pub fn right(&mut self) -> Option<Cell> {
        self.step_current(Step::Right)
    }

    pub fn first_in_row(&self, row: usize) -> Option<Cell> {
        let cols = self.cells.get(row)?;
        cols.iter().position(|c| *c).map(|col| Cell::new(row, col))
    }

    pub fn last_in_row(&self, row: usize) -> Option<Cell> {
        let cols = self.cells.get(row)?;
        cols.iter().rposition(|c| *c).map(|col| Cell::new(row, col))
    }

    pub fn first_cell(&self) -> Option<Cell> {
        self.find_cell_index(Cell::new(0, 0), true)
    }

    pub fn last_cell(&self) -> Option<Cell> {
        let last_row = self.rows()?;
        let last_col = self.columns()?;
        self.find_cell_index(Cell::new(last_row, last_col), false)
    }

    /// The occupied cell in `row` closest to `col`, preferring the left side on ties.
    pub fn nearest_in_row(&self, row: usize, col: usize) -> Option<Cell> {
        if self.is_occupied(row, col) {
            return Some(Cell::new(row, col));
        }
        let cols = self.cells.get(row)?;
        cols.iter()
            .enumerate()
            .filter(|(_, occupied)| **occupied)
            .min_by_key(|(c, _)| (c.abs_diff(col), *c > col))
            .map(|(c, _)| Cell::new(row, c))
    }

    pub fn home(&mut self) -> Option<Cell> {
        let cell = self.first_in_row(self.current?.row)?;
        self.current = Some(cell);
        Some(cell)
    }

    pub fn end(&mut self) -> Option<Cell> {
        let cell = self.last_in_row(self.current?.row)?;
        self.current = Some(cell);
        Some(cell)
    }

    pub fn ctrl_home(&mut self) -> Option<Cell> {
        let cell = self.first_cell()?;
        self.current = Some(cell);
        Some(cell)
    }

    pub fn ctrl_end(&mut self) -> Option<Cell> {
        let cell = self.last_cell()?;
        self.current = Some(cell);
        Some(cell)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MatrixKey {
    region: Region,
    visible: Vec<bool>,
    rows: usize,
}

/// Memoized matrix construction keyed by `(region, column visibility, row count)`.
///
/// Holds at most one matrix per region: a miss evicts the region's previous
/// entry. Built matrices carry no `current` position; callers reselect after
/// a rebuild.
#[derive(Debug, Default)]
pub struct MatrixCache {
    entries: HashMap<MatrixKey, NavigationMatrix>,
}

impl MatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the matrix for these inputs, building it on first use.
    ///
    /// A content region with zero rows yields the placeholder matrix.
    pub fn get(&mut self, region: Region, visible: &[bool], rows: usize) -> NavigationMatrix {
        let key = MatrixKey {
            region,
            visible: visible.to_vec(),
            rows,
        };
        if let Some(matrix) = self.entries.get(&key) {
            return matrix.clone();
        }
        self.entries.retain(|k, _| k.region != region);
        log::debug!(
            "[matrix] building {:?} matrix rows={} columns={}",
            region,
            rows,
            visible.len()
        );
        let matrix = if region == Region::Content && rows == 0 {
            NavigationMatrix::placeholder()
        } else {
            NavigationMatrix::build(visible, rows)
        };
        self.entries.insert(key, matrix.clone());
        matrix
    }

    /// Drop every memoized matrix.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
