use crate::{
    generators::force_open_endpoints,
    maze::{Grid, Maze, Position},
};

/// A hand-authored maze: its dimensions and the interior walls to punch in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetLayout {
    pub name: &'static str,
    pub width: u16,
    pub height: u16,
    /// `(x, z)` wall coordinates. Entries outside the grid are skipped.
    pub walls: &'static [(u16, u16)],
}

/// The fixed preset catalog. Indices wrap modulo its length.
#[rustfmt::skip]
pub const PRESETS: [PresetLayout; 3] = [
    PresetLayout {
        name: "Switchback Columns",
        width: 15,
        height: 15,
        walls: &[
            (3, 1), (3, 2), (3, 3), (3, 4), (3, 5), (3, 6), (3, 7), (3, 8), (3, 9), (3, 10),
            (7, 4), (7, 5), (7, 6), (7, 7), (7, 8), (7, 9), (7, 10), (7, 11), (7, 12), (7, 13),
            (11, 1), (11, 2), (11, 3), (11, 4), (11, 5), (11, 6), (11, 7), (11, 8), (11, 9),
            (11, 10), (5, 6), (9, 8),
        ],
    },
    PresetLayout {
        name: "Switchback Rows",
        width: 15,
        height: 15,
        walls: &[
            (1, 3), (2, 3), (3, 3), (4, 3), (5, 3), (6, 3), (7, 3), (8, 3), (9, 3), (10, 3),
            (4, 7), (5, 7), (6, 7), (7, 7), (8, 7), (9, 7), (10, 7), (11, 7), (12, 7), (13, 7),
            (1, 11), (2, 11), (3, 11), (4, 11), (5, 11), (6, 11), (7, 11), (8, 11), (9, 11),
            (10, 11), (6, 5), (8, 9),
        ],
    },
    PresetLayout {
        name: "Small Detour",
        width: 11,
        height: 11,
        walls: &[
            (5, 1), (5, 2), (5, 3), (5, 4), (5, 5), (5, 6), (5, 7), (2, 3), (3, 3), (7, 5),
            (8, 5), (9, 5), (3, 6), (3, 7), (3, 8), (3, 9),
        ],
    },
];

/// Load the preset at `index`, wrapping modulo the catalog size.
pub fn load_preset(index: usize) -> Maze {
    let layout = &PRESETS[index % PRESETS.len()];
    tracing::debug!("[generator] loading preset {} ({})", index, layout.name);
    load_layout(layout)
}

/// Build a maze from a layout: solid boundary ring, open interior, then the
/// layout's walls, then the same start/end carve-outs as the random generator.
pub fn load_layout(layout: &PresetLayout) -> Maze {
    let mut grid = Grid::new(layout.width, layout.height, false);
    for z in 0..layout.height {
        for x in 0..layout.width {
            let pos = Position::new(x, z);
            if grid.is_boundary(pos) {
                grid.set_wall(pos, true);
            }
        }
    }

    for &(x, z) in layout.walls {
        let pos = Position::new(x, z);
        if !grid.contains(pos) {
            tracing::debug!("[generator] skipping out-of-range preset wall {}", pos);
            continue;
        }
        grid.set_wall(pos, true);
    }

    force_open_endpoints(grid)
}
