use std::collections::HashMap;

use super::{Trace, reconstruct_path};
use crate::maze::{Grid, Position};

/// Iterative deepening: depth-limited DFS with the limit raised by one each round.
///
/// `visited` accumulates every expansion across all rounds, so cells near the
/// start appear many times. Stops once a round finishes without hitting the limit.
pub fn solve_ids(grid: &Grid, start: Position, end: Position) -> Trace {
    let mut visited = Vec::new();
    let max_depth = grid.cells().filter(|c| !c.is_wall).count();

    for limit in 0..=max_depth {
        let round = depth_limited(grid, start, end, limit, &mut visited);
        match round {
            Round::Found(parents) => {
                return Trace {
                    path: reconstruct_path(&parents, start, end),
                    visited,
                };
            }
            Round::CutOff => continue,
            Round::Exhausted => break,
        }
    }

    Trace {
        path: Vec::new(),
        visited,
    }
}

enum Round {
    Found(HashMap<Position, Position>),
    /// Some cell sat at the depth limit with unexplored neighbors.
    CutOff,
    /// Everything reachable was expanded within the limit.
    Exhausted,
}

fn depth_limited(
    grid: &Grid,
    start: Position,
    end: Position,
    limit: usize,
    visited: &mut Vec<Position>,
) -> Round {
    let mut stack = vec![(start, 0usize)];
    // Shallowest depth each cell has been reached at in this round
    let mut depths = HashMap::from([(start, 0usize)]);
    let mut parents = HashMap::new();
    let mut cut_off = false;

    while let Some((current, depth)) = stack.pop() {
        if depths.get(&current).is_some_and(|&best| best < depth) {
            continue;
        }
        visited.push(current);
        if current == end {
            return Round::Found(parents);
        }
        if depth == limit {
            cut_off |= grid
                .open_neighbors(current)
                .any(|n| !depths.contains_key(&n));
            continue;
        }

        let next_depth = depth + 1;
        let neighbors = grid.open_neighbors(current).collect::<Vec<_>>();
        for &neighbor in neighbors.iter().rev() {
            let is_shallower = depths.get(&neighbor).is_none_or(|&d| next_depth < d);
            if is_shallower {
                depths.insert(neighbor, next_depth);
                parents.insert(neighbor, current);
                stack.push((neighbor, next_depth));
            }
        }
    }

    if cut_off { Round::CutOff } else { Round::Exhausted }
}
