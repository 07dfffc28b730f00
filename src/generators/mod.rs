use rand::{SeedableRng, rngs::StdRng};

pub mod preset;
mod recur_backtrack;

pub use preset::{PRESETS, PresetLayout, load_layout, load_preset};
pub use recur_backtrack::recursive_backtrack;

use crate::maze::{Grid, Maze, MazeError, Position};

/// Get a random number generator, optionally seeded for reproducibility.
pub fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Where a session's maze comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
    /// Randomized recursive backtracker at the given dimensions.
    RecurBacktrack { width: u16, height: u16 },
    /// Hand-authored layout from [`PRESETS`], wrapping modulo the catalog size.
    Preset(usize),
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generator::RecurBacktrack { width, height } => {
                write!(f, "Recursive Backtracker ({}x{})", width, height)
            }
            Generator::Preset(index) => {
                write!(f, "Preset: {}", PRESETS[index % PRESETS.len()].name)
            }
        }
    }
}

pub fn generate_maze(generator: Generator, seed: Option<u64>) -> Result<Maze, MazeError> {
    match generator {
        Generator::RecurBacktrack { width, height } => recursive_backtrack(width, height, seed),
        Generator::Preset(index) => Ok(load_preset(index)),
    }
}

/// Open the start (1, 1) and end (width-2, height-2) cells and mark them.
///
/// If both the north and west neighbors of the end are walls, the north one is
/// opened so the end never sits behind an uncarved wall. This does not prove the
/// end is reachable from the start.
fn force_open_endpoints(mut grid: Grid) -> Maze {
    let start = Maze::default_start();
    let end = Maze::default_end(grid.width(), grid.height());
    grid.set_start(start);
    grid.set_end(end);

    let north = Position::new(end.x, end.z.saturating_sub(1));
    let west = Position::new(end.x.saturating_sub(1), end.z);
    let is_wall = |grid: &Grid, pos: Position| grid.cell(pos).is_some_and(|c| c.is_wall);
    if is_wall(&grid, north) && is_wall(&grid, west) {
        tracing::debug!("[generator] end {} was enclosed, opening {}", end, north);
        grid.set_wall(north, false);
    }

    Maze { grid, start, end }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_open_endpoints_on_solid_grid() {
        let maze = force_open_endpoints(Grid::new(11, 11, true));
        assert_eq!(maze.start, Position::new(1, 1));
        assert_eq!(maze.end, Position::new(9, 9));
        assert!(maze.grid.is_open(maze.start));
        assert!(maze.grid.is_open(maze.end));
        assert!(maze.grid.is_open(Position::new(9, 8)));
        assert!(!maze.grid.is_open(Position::new(8, 9)));
    }

    #[test]
    fn test_force_open_keeps_existing_opening() {
        let mut grid = Grid::new(11, 11, true);
        grid.set_wall(Position::new(8, 9), false);
        let maze = force_open_endpoints(grid);
        assert!(!maze.grid.is_open(Position::new(9, 8)));
    }

    #[test]
    fn test_generate_maze_dispatch() {
        let maze = generate_maze(
            Generator::RecurBacktrack {
                width: 15,
                height: 15,
            },
            Some(3),
        )
        .unwrap();
        assert_eq!((maze.width(), maze.height()), (15, 15));

        let preset = generate_maze(Generator::Preset(PRESETS.len()), None).unwrap();
        assert_eq!(preset, load_preset(0));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let generator = Generator::RecurBacktrack {
            width: 21,
            height: 21,
        };
        assert_eq!(
            generate_maze(generator, Some(7)).unwrap(),
            generate_maze(generator, Some(7)).unwrap()
        );
    }
}
