use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap},
};

use super::{Trace, reconstruct_path};
use crate::maze::{Grid, Position};

/// Uniform-cost search. Every step costs 1, ties break on insertion order.
pub fn solve_dijkstra(grid: &Grid, start: Position, end: Position) -> Trace {
    // Using Reverse to turn the max-heap into a min-heap
    let mut pq = BinaryHeap::from([Reverse((0usize, 0usize, start))]);
    let mut costs = HashMap::from([(start, 0usize)]);
    let mut parents = HashMap::new();
    let mut visited = Vec::new();
    let mut sequence = 0usize;

    while let Some(Reverse((cost, _, current))) = pq.pop() {
        // Skip stale queue entries superseded by a cheaper route
        if costs.get(&current).is_some_and(|&best| cost > best) {
            continue;
        }
        visited.push(current);
        if current == end {
            return Trace {
                path: reconstruct_path(&parents, start, end),
                visited,
            };
        }

        let new_cost = cost + 1;
        for neighbor in grid.open_neighbors(current) {
            let is_cheaper = costs
                .get(&neighbor)
                .is_none_or(|&existing_cost| new_cost < existing_cost);
            if is_cheaper {
                costs.insert(neighbor, new_cost);
                parents.insert(neighbor, current);
                sequence += 1;
                pq.push(Reverse((new_cost, sequence, neighbor)));
            }
        }
    }

    Trace {
        path: Vec::new(),
        visited,
    }
}
