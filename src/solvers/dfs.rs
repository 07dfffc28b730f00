use std::collections::{HashMap, HashSet};

use super::{Trace, reconstruct_path};
use crate::maze::{Grid, Position};

pub fn solve_dfs(grid: &Grid, start: Position, end: Position) -> Trace {
    let mut stack = vec![start];
    let mut expanded = HashSet::new();
    let mut parents = HashMap::new();
    let mut visited = Vec::new();

    while let Some(current) = stack.pop() {
        if !expanded.insert(current) {
            continue;
        }
        visited.push(current);
        if current == end {
            return Trace {
                path: reconstruct_path(&parents, start, end),
                visited,
            };
        }

        let neighbors = grid
            .open_neighbors(current)
            .filter(|n| !expanded.contains(n))
            .collect::<Vec<_>>();
        // Push in reverse so the first neighbor (north) is explored first
        for &neighbor in neighbors.iter().rev() {
            parents.insert(neighbor, current);
            stack.push(neighbor);
        }
    }

    Trace {
        path: Vec::new(),
        visited,
    }
}
