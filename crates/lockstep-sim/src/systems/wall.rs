//! Wall activation: a placed wall starts life as a trigger (non-solid) so
//! its own placer can walk away from the cell they just stood in, and is
//! flipped solid once they clear its expanded AABB (spec.md §4.3 step 13).

use lockstep_ecs::entity::EntityId;
use lockstep_ecs::world::World;
use lockstep_fixed::{Fix64, FixVec2};

use crate::input::FrameData;
use crate::pipeline::System;

/// Flips a [`lockstep_ecs::components::WallPlacement`]-marked wall solid
/// once its placer's centre has left the wall's AABB expanded by `margin`
/// on every side. A placer that has despawned (or lost its `Transform2D`)
/// is treated as already clear.
pub struct WallPlacementSystem {
    pub margin: Fix64,
}

impl System for WallPlacementSystem {
    fn name(&self) -> &'static str {
        "WallPlacementSystem"
    }

    fn execute(&mut self, world: &mut World, _inputs: &[FrameData]) {
        let pending: Vec<(EntityId, EntityId)> =
            world.wall_placements.iter().map(|(e, p)| (e, p.placer_entity_id)).collect();

        for (wall, placer) in pending {
            let Some(wall_pos) = world.transforms.get(wall).map(|t| t.position) else { continue };
            let Some(shape) = world.shapes.get(wall) else { continue };
            let half = shape.half_extents() + FixVec2::new(self.margin, self.margin);

            let placer_clear = match world.transforms.get(placer) {
                Some(placer_transform) => {
                    let delta = placer_transform.position - wall_pos;
                    delta.x.abs() > half.x || delta.y.abs() > half.y
                }
                None => true,
            };

            if placer_clear {
                world.wall_placements.remove(wall);
                if let Some(body) = world.bodies.get_mut(wall) {
                    body.is_trigger = false;
                }
            }
        }
    }
}
