//! Hit-stun decay and death teardown (spec.md §4.3 steps 3-4).

use lockstep_ecs::components::{DeathReason, Explosion};
use lockstep_ecs::entity::EntityId;
use lockstep_ecs::world::World;
use lockstep_fixed::Fix64;

use crate::input::FrameData;
use crate::pipeline::System;

/// Decrements every [`lockstep_ecs::components::Stiff`] timer; removes the
/// component once it reaches zero, releasing the entity to act again.
pub struct StiffSystem;

impl System for StiffSystem {
    fn name(&self) -> &'static str {
        "StiffSystem"
    }

    fn execute(&mut self, world: &mut World, _inputs: &[FrameData]) {
        let expired: Vec<EntityId> = world
            .stiffs
            .iter_mut()
            .filter_map(|(entity, stiff)| {
                stiff.timer = stiff.timer.saturating_sub(1);
                (stiff.timer == 0).then_some(entity)
            })
            .collect();
        for entity in expired {
            world.stiffs.remove(entity);
        }
    }
}

/// Tears down every entity carrying a [`lockstep_ecs::components::Death`]
/// marker: barrels chain into an [`Explosion`], everything else is simply
/// despawned.
pub struct DeathSystem {
    pub barrel_explosion_radius: Fix64,
    pub barrel_explosion_damage: i32,
    pub barrel_explosion_lifetime_frames: u32,
}

impl System for DeathSystem {
    fn name(&self) -> &'static str {
        "DeathSystem"
    }

    fn execute(&mut self, world: &mut World, _inputs: &[FrameData]) {
        let dead: Vec<(EntityId, DeathReason)> = world.deaths.iter().map(|(e, d)| (e, d.reason)).collect();
        for (entity, reason) in dead {
            let is_barrel = world.barrels.contains(entity);
            let is_wall = world.walls.contains(entity);
            let position = world.transforms.get(entity).map(|t| t.position);

            if is_wall {
                if let Some(position) = position {
                    world.grid_map.obstacles.remove(&world.grid_map.world_to_cell(position));
                }
            }

            world.despawn(entity);

            if is_barrel && reason != DeathReason::Environment {
                if let Some(position) = position {
                    let explosion = world.spawn();
                    world.explosions.set(
                        explosion,
                        Explosion {
                            position,
                            radius: self.barrel_explosion_radius,
                            damage: self.barrel_explosion_damage,
                            current_frame: 0,
                            lifetime_frames: self.barrel_explosion_lifetime_frames,
                        },
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_ecs::components::{Death, GridMap, Stiff};
    use std::collections::BTreeSet;

    fn world_with_grid() -> World {
        World::new(GridMap { width: 8, height: 8, cell_size: Fix64::ONE, obstacles: BTreeSet::new() })
    }

    #[test]
    fn stiff_expires_and_is_removed() {
        let mut world = world_with_grid();
        let e = world.spawn();
        world.stiffs.set(e, Stiff { timer: 1 });
        let mut sys = StiffSystem;
        sys.execute(&mut world, &[]);
        assert!(!world.stiffs.contains(e));
    }

    #[test]
    fn stiff_decrements_without_removal_while_positive() {
        let mut world = world_with_grid();
        let e = world.spawn();
        world.stiffs.set(e, Stiff { timer: 3 });
        let mut sys = StiffSystem;
        sys.execute(&mut world, &[]);
        assert_eq!(world.stiffs.get(e).unwrap().timer, 2);
    }

    #[test]
    fn death_despawns_entity() {
        let mut world = world_with_grid();
        let e = world.spawn();
        world.deaths.set(e, Death { reason: DeathReason::Bullet });
        let mut sys = DeathSystem { barrel_explosion_radius: Fix64::ONE, barrel_explosion_damage: 10, barrel_explosion_lifetime_frames: 1 };
        sys.execute(&mut world, &[]);
        assert!(!world.is_live(e));
    }

    #[test]
    fn wall_death_clears_grid_obstacle() {
        let mut world = world_with_grid();
        let e = world.spawn();
        world.walls.set(e, lockstep_ecs::components::Wall);
        world.transforms.set(e, lockstep_ecs::components::Transform2D { position: lockstep_fixed::FixVec2::ZERO });
        world.grid_map.obstacles.insert((0, 0));
        world.deaths.set(e, Death { reason: DeathReason::Environment });
        let mut sys = DeathSystem { barrel_explosion_radius: Fix64::ONE, barrel_explosion_damage: 10, barrel_explosion_lifetime_frames: 1 };
        sys.execute(&mut world, &[]);
        assert!(!world.grid_map.obstacles.contains(&(0, 0)));
    }

    #[test]
    fn barrel_death_chains_into_explosion() {
        let mut world = world_with_grid();
        let e = world.spawn();
        world.barrels.set(e, lockstep_ecs::components::Barrel);
        world.transforms.set(e, lockstep_ecs::components::Transform2D { position: lockstep_fixed::FixVec2::ZERO });
        world.deaths.set(e, Death { reason: DeathReason::Bullet });
        let mut sys = DeathSystem { barrel_explosion_radius: Fix64::ONE, barrel_explosion_damage: 10, barrel_explosion_lifetime_frames: 1 };
        sys.execute(&mut world, &[]);
        assert_eq!(world.explosions.len(), 1);
    }
}
