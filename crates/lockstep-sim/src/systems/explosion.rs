//! Explosion lifetime and area damage (spec.md §4.3 step 14).
//!
//! An [`lockstep_ecs::components::Explosion`] is a timed marker, not a
//! physics body: it does not appear in `PhysicsBody`/`CollisionShape`
//! stores, so it never participates in broadphase/narrowphase. It simply
//! counts its own frames and, on expiry, queries the physics system's
//! circle region directly.

use lockstep_ecs::components::{Death, DeathReason};
use lockstep_ecs::entity::EntityId;
use lockstep_ecs::world::World;
use lockstep_fixed::FixVec2;

use crate::input::FrameData;
use crate::physics::query_circle;
use crate::pipeline::System;

pub struct ExplosionSystem {
    pub damage_layer_mask: u32,
}

impl System for ExplosionSystem {
    fn name(&self) -> &'static str {
        "ExplosionSystem"
    }

    fn execute(&mut self, world: &mut World, _inputs: &[FrameData]) {
        let ticking: Vec<(EntityId, FixVec2, lockstep_fixed::Fix64, i32, bool)> = world
            .explosions
            .iter_mut()
            .map(|(entity, explosion)| {
                explosion.current_frame += 1;
                let expired = explosion.current_frame >= explosion.lifetime_frames;
                (entity, explosion.position, explosion.radius, explosion.damage, expired)
            })
            .collect();

        for (entity, position, radius, damage, expired) in ticking {
            if !expired {
                continue;
            }
            let victims = query_circle(world, position, radius, self.damage_layer_mask);
            for victim in victims {
                if let Some(hp) = world.hps.get_mut(victim) {
                    hp.current -= damage;
                    if hp.is_dead() && !world.deaths.contains(victim) {
                        world.deaths.set(victim, Death { reason: DeathReason::Explosion });
                    }
                }
            }
            world.despawn(entity);
        }
    }
}
