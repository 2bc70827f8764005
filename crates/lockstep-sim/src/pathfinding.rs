//! A* pathfinding over [`GridMap`], with deterministic `(x, y)`
//! lexicographic tie-breaking so that two peers exploring the same frontier
//! in the same order always pick the same successor (spec.md §4.4).

use std::collections::{BinaryHeap, HashMap};

use lockstep_ecs::components::{GridCell, GridMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    cost: i64,
    cell: GridCell,
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reversed for a min-heap; tie-break on (x, y) so the frontier order
        // never depends on `HashMap`/insertion order.
        other.cost.cmp(&self.cost).then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(a: GridCell, b: GridCell) -> i64 {
    ((a.0 - b.0).abs() + (a.1 - b.1).abs()) as i64
}

/// Four-connected neighbours of `cell`, in the grid's canonical
/// lexicographic order.
fn neighbours(cell: GridCell) -> [GridCell; 4] {
    [(cell.0 - 1, cell.1), (cell.0 + 1, cell.1), (cell.0, cell.1 - 1), (cell.0, cell.1 + 1)]
}

/// Shortest walkable path from `start` to `goal`, inclusive of both ends.
/// Returns `None` if `goal` is unreachable from `start`.
pub fn find_path(grid: &GridMap, start: GridCell, goal: GridCell) -> Option<Vec<GridCell>> {
    if !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let mut open = BinaryHeap::new();
    open.push(Node { cost: heuristic(start, goal), cell: start });

    let mut came_from: HashMap<GridCell, GridCell> = HashMap::new();
    let mut g_score: HashMap<GridCell, i64> = HashMap::new();
    g_score.insert(start, 0);

    while let Some(Node { cell: current, .. }) = open.pop() {
        if current == goal {
            return Some(reconstruct_path(&came_from, current));
        }
        let current_g = *g_score.get(&current).unwrap_or(&i64::MAX);
        for next in neighbours(current) {
            if !grid.is_walkable(next) {
                continue;
            }
            let tentative_g = current_g + 1;
            if tentative_g < *g_score.get(&next).unwrap_or(&i64::MAX) {
                came_from.insert(next, current);
                g_score.insert(next, tentative_g);
                open.push(Node { cost: tentative_g + heuristic(next, goal), cell: next });
            }
        }
    }
    None
}

fn reconstruct_path(came_from: &HashMap<GridCell, GridCell>, mut current: GridCell) -> Vec<GridCell> {
    let mut path = vec![current];
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
