use super::{Position, cell::Cell};

/// Row-major grid of [`Cell`]s with a fixed shape.
///
/// Lookups and edits outside `[0, width) x [0, height)` are no-ops rather than
/// errors: solver output can reference a grid that has since been replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Box<[Cell]>,
    width: u16,
    height: u16,
}

impl Grid {
    /// Create a grid where every cell is a wall (`is_wall = true`) or open.
    pub fn new(width: u16, height: u16, is_wall: bool) -> Self {
        let cells = (0..height)
            .flat_map(|z| (0..width).map(move |x| Cell::new(x, z, is_wall)))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Grid {
            cells,
            width,
            height,
        }
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.z < self.height
    }

    pub fn is_boundary(&self, pos: Position) -> bool {
        pos.x == 0 || pos.z == 0 || pos.x == self.width - 1 || pos.z == self.height - 1
    }

    fn ravel_index(&self, pos: Position) -> Option<usize> {
        // Overflow-safe since width and height are u16 (assuming usize is at least 32 bits)
        self.contains(pos)
            .then(|| pos.z as usize * self.width as usize + pos.x as usize)
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.ravel_index(pos).map(|idx| &self.cells[idx])
    }

    fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.ravel_index(pos).map(|idx| &mut self.cells[idx])
    }

    /// In bounds and not a wall.
    pub fn is_open(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(|cell| !cell.is_wall)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Rows from `z = 0` downwards.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    pub fn set_wall(&mut self, pos: Position, is_wall: bool) {
        if let Some(cell) = self.cell_mut(pos) {
            cell.is_wall = is_wall;
        }
    }

    /// Move the start marker to `pos` and open it. Out-of-bounds positions are ignored.
    pub fn set_start(&mut self, pos: Position) {
        if !self.contains(pos) {
            return;
        }
        self.cells.iter_mut().for_each(|cell| cell.is_start = false);
        if let Some(cell) = self.cell_mut(pos) {
            cell.is_start = true;
            cell.is_wall = false;
        }
    }

    /// Move the end marker to `pos` and open it. Out-of-bounds positions are ignored.
    pub fn set_end(&mut self, pos: Position) {
        if !self.contains(pos) {
            return;
        }
        self.cells.iter_mut().for_each(|cell| cell.is_end = false);
        if let Some(cell) = self.cell_mut(pos) {
            cell.is_end = true;
            cell.is_wall = false;
        }
    }

    /// Get the in-bounds cardinal neighbors of a cell, in N, S, W, E order.
    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        let Position { x, z } = pos;
        // When x or z is 0, wrapping_sub yields u16::MAX, which the bounds check filters out.
        // saturating_add clamps to u16::MAX for the same reason.
        [
            Position::new(x, z.wrapping_sub(1)),
            Position::new(x, z.saturating_add(1)),
            Position::new(x.wrapping_sub(1), z),
            Position::new(x.saturating_add(1), z),
        ]
        .into_iter()
        .filter(move |&p| self.contains(pos) && self.contains(p))
    }

    /// Get the cardinal neighbors a walker can step onto.
    pub fn open_neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        self.neighbors(pos).filter(move |&p| self.is_open(p))
    }

    /// A new snapshot whose `is_path` flags are set exactly on `cells`.
    pub fn with_path(&self, cells: &[Position]) -> Grid {
        let mut grid = self.clone();
        grid.cells.iter_mut().for_each(|cell| cell.is_path = false);
        for &pos in cells {
            if let Some(cell) = grid.cell_mut(pos) {
                cell.is_path = true;
            }
        }
        grid
    }

    /// A new snapshot whose `is_visited` flags are set exactly on `cells`.
    pub fn with_visited(&self, cells: &[Position]) -> Grid {
        let mut grid = self.clone();
        grid.cells.iter_mut().for_each(|cell| cell.is_visited = false);
        for &pos in cells {
            if let Some(cell) = grid.cell_mut(pos) {
                cell.is_visited = true;
            }
        }
        grid
    }

    /// A new snapshot with both overlays cleared.
    pub fn without_overlays(&self) -> Grid {
        self.with_path(&[]).with_visited(&[])
    }
}
