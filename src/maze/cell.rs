use crossterm::style::{Color, StyledContent, Stylize};

use std::fmt;

use crate::maze::Position;

/// A single square of the maze grid.
///
/// `is_wall`, `is_start` and `is_end` describe the maze itself. `is_path` and
/// `is_visited` are display overlays recomputed from the solver output; nothing
/// reads them back when solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: u16,
    pub z: u16,
    pub is_wall: bool,
    pub is_start: bool,
    pub is_end: bool,
    pub is_path: bool,
    pub is_visited: bool,
}

impl Cell {
    /// The width of each cell when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;

    pub fn new(x: u16, z: u16, is_wall: bool) -> Self {
        Cell {
            x,
            z,
            is_wall,
            is_start: false,
            is_end: false,
            is_path: false,
            is_visited: false,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.z)
    }

    /// Glyph drawn for the agent while it walks the path.
    pub fn agent_glyph() -> StyledContent<&'static str> {
        "🟡".with(Color::Yellow)
    }

    fn glyph(&self) -> StyledContent<&'static str> {
        // Start and end win over overlays so they stay visible during playback
        if self.is_start {
            "🟩".with(Color::Green)
        } else if self.is_end {
            "🟥".with(Color::Red)
        } else if self.is_wall {
            "⬜".with(Color::White)
        } else if self.is_path {
            "🟨".with(Color::Yellow)
        } else if self.is_visited {
            "* ".with(Color::Blue)
        } else {
            "  ".with(Color::Reset)
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled_symbol = self.glyph();

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                Cell::CELL_WIDTH as usize,
                "Each cell must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}
