use std::collections::{HashMap, HashSet, VecDeque};

use super::{Trace, reconstruct_path};
use crate::maze::{Grid, Position};

pub fn solve_bfs(grid: &Grid, start: Position, end: Position) -> Trace {
    let mut queue = VecDeque::from([start]);
    let mut seen = HashSet::from([start]);
    let mut parents = HashMap::new();
    let mut visited = Vec::new();

    while let Some(current) = queue.pop_front() {
        visited.push(current);
        if current == end {
            return Trace {
                path: reconstruct_path(&parents, start, end),
                visited,
            };
        }

        for neighbor in grid.open_neighbors(current) {
            // Mark on enqueue so each cell enters the queue once
            if seen.insert(neighbor) {
                parents.insert(neighbor, current);
                queue.push_back(neighbor);
            }
        }
    }

    Trace {
        path: Vec::new(),
        visited,
    }
}
