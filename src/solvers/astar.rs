use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet},
};

use super::{Trace, reconstruct_path};
use crate::maze::{Grid, Position};

/// A* with the Manhattan distance heuristic, which is admissible for 4-neighbor unit moves.
pub fn solve_astar(grid: &Grid, start: Position, end: Position) -> Trace {
    let heuristic = |pos: Position| pos.manhattan_distance(end);

    // Ordered by (f, h, insertion order): prefer cells closer to the goal on ties
    let mut open = BinaryHeap::from([Reverse((heuristic(start), heuristic(start), 0usize, start))]);
    let mut costs = HashMap::from([(start, 0usize)]);
    let mut closed = HashSet::new();
    let mut parents = HashMap::new();
    let mut visited = Vec::new();
    let mut sequence = 0usize;

    while let Some(Reverse((_, _, _, current))) = open.pop() {
        if !closed.insert(current) {
            continue;
        }
        visited.push(current);
        if current == end {
            return Trace {
                path: reconstruct_path(&parents, start, end),
                visited,
            };
        }

        let Some(&cost) = costs.get(&current) else {
            continue;
        };
        let new_cost = cost + 1;
        for neighbor in grid.open_neighbors(current) {
            if closed.contains(&neighbor) {
                continue;
            }
            let is_cheaper = costs
                .get(&neighbor)
                .is_none_or(|&existing_cost| new_cost < existing_cost);
            if is_cheaper {
                costs.insert(neighbor, new_cost);
                parents.insert(neighbor, current);
                sequence += 1;
                let h = heuristic(neighbor);
                open.push(Reverse((new_cost + h, h, sequence, neighbor)));
            }
        }
    }

    Trace {
        path: Vec::new(),
        visited,
    }
}
