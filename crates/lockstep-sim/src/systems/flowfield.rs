//! Optional grid flow field toward player positions (spec.md §4.3 step 10).
//!
//! A no-op unless [`lockstep_ecs::world::World::flow_field`] is `Some` --
//! per the System failure semantics, a missing optional singleton makes
//! the System a no-op rather than an error. When present, a multi-source
//! breadth-first flood fill from every player's grid cell recomputes a
//! per-cell gradient pointing toward the nearest player, recomputed only
//! when `update_cooldown` reaches zero.

use std::collections::VecDeque;

use lockstep_ecs::components::GridCell;
use lockstep_ecs::world::World;
use lockstep_fixed::FixVec2;

use crate::input::FrameData;
use crate::pipeline::System;

pub struct FlowFieldSystem {
    pub recompute_interval_ticks: u32,
}

impl System for FlowFieldSystem {
    fn name(&self) -> &'static str {
        "FlowFieldSystem"
    }

    fn execute(&mut self, world: &mut World, _inputs: &[FrameData]) {
        let Some(field) = world.flow_field.as_mut() else { return };

        if field.update_cooldown > 0 {
            field.update_cooldown -= 1;
            return;
        }
        field.update_cooldown = self.recompute_interval_ticks;

        let sources: Vec<GridCell> =
            world.players.iter().filter_map(|(e, _)| world.transforms.get(e).map(|t| world.grid_map.world_to_cell(t.position))).collect();

        let (width, height) = (world.grid_map.width, world.grid_map.height);
        let gradient = compute_gradient(&world.grid_map, width, height, &sources);

        let field = world.flow_field.as_mut().expect("checked Some above");
        field.width = width;
        field.height = height;
        field.gradient_field = gradient;
    }
}

/// Multi-source BFS distance field over the walkable grid, converted into a
/// unit gradient per cell pointing toward the neighbour with the smallest
/// distance-to-source. Unreachable cells get a zero gradient.
fn compute_gradient(
    grid: &lockstep_ecs::components::GridMap,
    width: i32,
    height: i32,
    sources: &[GridCell],
) -> Vec<FixVec2> {
    let w = width.max(0) as usize;
    let h = height.max(0) as usize;
    let mut distance = vec![i32::MAX; w * h];
    let mut queue = VecDeque::new();

    let idx = |x: i32, y: i32| -> Option<usize> {
        if x < 0 || y < 0 || x >= width || y >= height {
            None
        } else {
            Some((y as usize) * w + x as usize)
        }
    };

    for &cell in sources {
        if !grid.is_walkable(cell) {
            continue;
        }
        if let Some(i) = idx(cell.0, cell.1) {
            if distance[i] == i32::MAX {
                distance[i] = 0;
                queue.push_back(cell);
            }
        }
    }

    while let Some((x, y)) = queue.pop_front() {
        let here = idx(x, y).expect("queued cell is always in bounds");
        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if !grid.is_walkable((nx, ny)) {
                continue;
            }
            let Some(ni) = idx(nx, ny) else { continue };
            if distance[ni] == i32::MAX {
                distance[ni] = distance[here] + 1;
                queue.push_back((nx, ny));
            }
        }
    }

    let mut gradient = vec![FixVec2::ZERO; w * h];
    for y in 0..height {
        for x in 0..width {
            let here = idx(x, y).unwrap();
            if distance[here] == i32::MAX {
                continue;
            }
            let mut best_delta: Option<(i32, i32)> = None;
            let mut best_dist = distance[here];
            for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
                let Some(ni) = idx(nx, ny) else { continue };
                if distance[ni] < best_dist {
                    best_dist = distance[ni];
                    best_delta = Some((nx - x, ny - y));
                }
            }
            if let Some((dx, dy)) = best_delta {
                gradient[here] = FixVec2::new(lockstep_fixed::Fix64::from_int(dx), lockstep_fixed::Fix64::from_int(dy)).normalize();
            }
        }
    }
    gradient
}
