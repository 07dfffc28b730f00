use std::{collections::HashMap, time::Instant};

mod astar;
mod bfs;
mod dfs;
mod dijkstra;
mod ids;

use crate::maze::{Grid, Maze, Position};
use astar::solve_astar;
use bfs::solve_bfs;
use dfs::solve_dfs;
use dijkstra::solve_dijkstra;
use ids::solve_ids;

/// Search algorithms a session can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    AStar,
    Bfs,
    Dfs,
    /// Uniform-cost search
    Ucs,
    /// Iterative deepening depth-first search
    Ids,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::AStar,
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::Ucs,
        Algorithm::Ids,
    ];
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::AStar => write!(f, "A* Search"),
            Algorithm::Bfs => write!(f, "Breadth-First Search (BFS)"),
            Algorithm::Dfs => write!(f, "Depth-First Search (DFS)"),
            Algorithm::Ucs => write!(f, "Uniform-Cost Search (UCS)"),
            Algorithm::Ids => write!(f, "Iterative Deepening Search (IDS)"),
        }
    }
}

/// Numbers reported by a solve, stored as-is by the session.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Stats {
    pub solve_time_ms: f64,
    pub nodes_explored: usize,
    pub path_length: usize,
}

/// What a solver hands back: the route, the exploration order and its stats.
///
/// `path` runs from start to end inclusive and is empty when the end is unreachable.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SolveResult {
    pub path: Vec<Position>,
    pub visited: Vec<Position>,
    pub stats: Stats,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error("{which} position {pos} is outside the {width}x{height} grid")]
    OutOfBounds {
        which: &'static str,
        pos: Position,
        width: u16,
        height: u16,
    },
    #[error("{which} position {pos} is a wall")]
    Blocked { which: &'static str, pos: Position },
    #[error("{algorithm} failed: {reason}")]
    Failed { algorithm: Algorithm, reason: String },
}

/// Anything that can run a search over a grid.
///
/// Implementations must be deterministic for identical inputs and must return an
/// empty path, not an error, when no route exists.
pub trait Solve {
    fn solve(
        &self,
        algorithm: Algorithm,
        grid: &Grid,
        start: Position,
        end: Position,
    ) -> Result<SolveResult, SolveError>;
}

/// Path and exploration order produced by one search routine.
#[derive(Debug, Default)]
struct Trace {
    path: Vec<Position>,
    visited: Vec<Position>,
}

/// The built-in solvers: 4-neighbor moves over open cells, unit cost per step.
#[derive(Debug, Default, Clone, Copy)]
pub struct GridSolver;

impl GridSolver {
    fn check_endpoint(grid: &Grid, which: &'static str, pos: Position) -> Result<(), SolveError> {
        match grid.cell(pos) {
            None => Err(SolveError::OutOfBounds {
                which,
                pos,
                width: grid.width(),
                height: grid.height(),
            }),
            Some(cell) if cell.is_wall => Err(SolveError::Blocked { which, pos }),
            Some(_) => Ok(()),
        }
    }
}

impl Solve for GridSolver {
    fn solve(
        &self,
        algorithm: Algorithm,
        grid: &Grid,
        start: Position,
        end: Position,
    ) -> Result<SolveResult, SolveError> {
        GridSolver::check_endpoint(grid, "start", start)?;
        GridSolver::check_endpoint(grid, "end", end)?;

        let started = Instant::now();
        let trace = match algorithm {
            Algorithm::AStar => solve_astar(grid, start, end),
            Algorithm::Bfs => solve_bfs(grid, start, end),
            Algorithm::Dfs => solve_dfs(grid, start, end),
            Algorithm::Ucs => solve_dijkstra(grid, start, end),
            Algorithm::Ids => solve_ids(grid, start, end),
        };
        let stats = Stats {
            solve_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            nodes_explored: trace.visited.len(),
            path_length: trace.path.len(),
        };
        tracing::debug!(
            "[solver] {} explored {} cells, path length {}",
            algorithm,
            stats.nodes_explored,
            stats.path_length
        );

        Ok(SolveResult {
            path: trace.path,
            visited: trace.visited,
            stats,
        })
    }
}

/// Solve a maze between its own start and end with the built-in solvers.
pub fn solve_maze(maze: &Maze, algorithm: Algorithm) -> Result<SolveResult, SolveError> {
    GridSolver.solve(algorithm, &maze.grid, maze.start, maze.end)
}

/// Walk the parent links back from `end` and return the route start-first.
fn reconstruct_path(parents: &HashMap<Position, Position>, start: Position, end: Position) -> Vec<Position> {
    let mut path = vec![end];
    let mut current = end;
    while current != start {
        match parents.get(&current) {
            Some(&parent) => {
                path.push(parent);
                current = parent;
            }
            // Broken chain, nothing sensible to return
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}
