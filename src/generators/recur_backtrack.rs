use crate::{
    generators::{force_open_endpoints, get_rng},
    maze::{Grid, Maze, MazeError, Position},
};
use rand::{Rng, seq::SliceRandom};

/// Offsets to the candidate cells two steps away: north, south, west, east.
const DIRECTIONS: [(i32, i32); 4] = [(0, -2), (0, 2), (-2, 0), (2, 0)];

/// One level of the carve: a cell and the shuffled directions left to try from it.
struct Frame {
    cell: Position,
    directions: [(i32, i32); 4],
    next: usize,
}

impl Frame {
    fn new(cell: Position, rng: &mut impl Rng) -> Self {
        let mut directions = DIRECTIONS;
        directions.shuffle(rng);
        Frame {
            cell,
            directions,
            next: 0,
        }
    }
}

/// Generate a maze with the randomized recursive backtracker.
///
/// Starts from an all-wall grid and carves passages from (1, 1). Both dimensions
/// must be odd and at least [`Maze::MIN_DIMENSION`].
pub fn recursive_backtrack(width: u16, height: u16, seed: Option<u64>) -> Result<Maze, MazeError> {
    Maze::check_dimensions(width, height)?;

    let mut rng = get_rng(seed);
    let mut grid = Grid::new(width, height, true);
    carve(&mut grid, Maze::default_start(), &mut rng);

    tracing::debug!(
        "[generator] carved {}x{} maze, {} open cells",
        width,
        height,
        grid.cells().filter(|c| !c.is_wall).count()
    );
    Ok(force_open_endpoints(grid))
}

/// The interior cell two steps from `cell` in direction `(dx, dz)`, if any.
fn interior_target(grid: &Grid, cell: Position, (dx, dz): (i32, i32)) -> Option<Position> {
    let x = cell.x as i32 + dx;
    let z = cell.z as i32 + dz;
    let in_interior = |n: i32, dimension: u16| n >= 1 && n <= dimension as i32 - 2;
    (in_interior(x, grid.width()) && in_interior(z, grid.height()))
        .then(|| Position::new(x as u16, z as u16))
}

/// Depth-first carve with an explicit stack instead of recursion.
///
/// Each frame keeps its own shuffled direction list, so cells are visited in the
/// same order the recursive formulation would visit them.
fn carve(grid: &mut Grid, start: Position, rng: &mut impl Rng) {
    grid.set_wall(start, false);
    let mut stack = vec![Frame::new(start, rng)];

    while let Some(frame) = stack.last_mut() {
        let Some(&direction) = frame.directions.get(frame.next) else {
            // Every direction tried, backtrack
            stack.pop();
            continue;
        };
        frame.next += 1;
        let cell = frame.cell;

        let Some(target) = interior_target(grid, cell, direction) else {
            continue;
        };
        if !grid.cell(target).is_some_and(|c| c.is_wall) {
            continue;
        }

        // Knock down the wall in between, then continue carving from the target
        let between = Position::new(
            (cell.x as i32 + direction.0 / 2) as u16,
            (cell.z as i32 + direction.1 / 2) as u16,
        );
        grid.set_wall(between, false);
        grid.set_wall(target, false);
        stack.push(Frame::new(target, rng));
    }
}
