pub mod cell;
mod grid;

pub use cell::Cell;
pub use grid::Grid;

/// A lightweight grid coordinate. `z` grows downwards, row by row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: u16,
    pub z: u16,
}

impl Position {
    pub const fn new(x: u16, z: u16) -> Self {
        Position { x, z }
    }

    pub fn manhattan_distance(&self, other: Position) -> usize {
        self.x.abs_diff(other.x) as usize + self.z.abs_diff(other.z) as usize
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    #[error(
        "maze dimensions must be odd and at least {min}, got {width}x{height}",
        min = Maze::MIN_DIMENSION
    )]
    InvalidDimensions { width: u16, height: u16 },
}

/// A generated maze: the grid plus its start and end positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Maze {
    pub grid: Grid,
    pub start: Position,
    pub end: Position,
}

impl Maze {
    /// Smallest width or height a maze may have.
    pub const MIN_DIMENSION: u16 = 11;

    /// Passages and walls alternate, so both dimensions must be odd.
    pub fn check_dimensions(width: u16, height: u16) -> Result<(), MazeError> {
        let valid = |n: u16| n >= Maze::MIN_DIMENSION && n % 2 == 1;
        if valid(width) && valid(height) {
            Ok(())
        } else {
            Err(MazeError::InvalidDimensions { width, height })
        }
    }

    /// Default start position: the top-left interior cell.
    pub fn default_start() -> Position {
        Position::new(1, 1)
    }

    /// Default end position: the bottom-right interior cell.
    pub fn default_end(width: u16, height: u16) -> Position {
        Position::new(width.saturating_sub(2), height.saturating_sub(2))
    }

    pub fn width(&self) -> u16 {
        self.grid.width()
    }

    pub fn height(&self) -> u16 {
        self.grid.height()
    }
}
