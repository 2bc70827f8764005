//! Resolves bullet impacts against the collision bags left by the previous
//! tick's [`crate::physics::PhysicsSystem`] run (spec.md §4.3 step 8).

use lockstep_ecs::components::{Death, DeathReason, PlayerState, Stiff, Velocity};
use lockstep_ecs::entity::EntityId;
use lockstep_ecs::world::World;
use lockstep_fixed::{Fix64, FixVec2};

use crate::input::FrameData;
use crate::pipeline::System;

/// Scales the bullet's own velocity into the knockback impulse applied to
/// whatever it hits, and locks the victim out of acting for a fixed number
/// of ticks (spec.md §4.3 step 8: "apply knockback via a bullet-velocity
/// impulse"). A player victim also enters [`PlayerState::Stunned`], which
/// [`crate::systems::player::PlayerMoveSystem`] and
/// [`crate::systems::player::PlayerCooldownSystem`] already read.
pub struct BulletCheckSystem {
    pub knockback_scale: Fix64,
    pub hit_stun_ticks: u32,
}

impl System for BulletCheckSystem {
    fn name(&self) -> &'static str {
        "BulletCheckSystem"
    }

    fn execute(&mut self, world: &mut World, _inputs: &[FrameData]) {
        let bullets: Vec<(EntityId, EntityId, i32, FixVec2)> = world
            .bullets
            .iter()
            .map(|(e, b)| (e, b.owner_entity_id, b.damage, world.velocities.get(e).map(|v| v.v).unwrap_or(FixVec2::ZERO)))
            .collect();

        let mut spent: Vec<EntityId> = Vec::new();
        for (bullet, owner, damage, bullet_velocity) in bullets {
            let Some(hits) = world.collisions.get(bullet) else { continue };
            let victim = hits.iter().find(|&other| other != owner);
            let Some(victim) = victim else { continue };

            if let Some(hp) = world.hps.get_mut(victim) {
                hp.current -= damage;
                if hp.is_dead() && !world.deaths.contains(victim) {
                    world.deaths.set(victim, Death { reason: DeathReason::Bullet });
                }
            }

            let impulse = bullet_velocity.scale(self.knockback_scale);
            let current_velocity = world.velocities.get(victim).map(|v| v.v).unwrap_or(FixVec2::ZERO);
            world.velocities.set(victim, Velocity { v: current_velocity + impulse });

            if self.hit_stun_ticks > 0 {
                world.stiffs.set(victim, Stiff { timer: self.hit_stun_ticks });
            }
            if let Some(player) = world.players.get_mut(victim) {
                player.hit_stun_timer = self.hit_stun_ticks;
                player.state = PlayerState::Stunned;
            }

            spent.push(bullet);
        }

        for bullet in spent {
            world.despawn(bullet);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_ecs::components::{Bullet, Collision, GridMap, HP};
    use std::collections::BTreeSet;

    fn world_with_grid() -> World {
        World::new(GridMap { width: 8, height: 8, cell_size: lockstep_fixed::Fix64::ONE, obstacles: BTreeSet::new() })
    }

    #[test]
    fn bullet_damages_victim_and_is_consumed() {
        let mut world = world_with_grid();
        let owner = world.spawn();
        let victim = world.spawn();
        world.hps.set(victim, HP { current: 10, max: 10 });
        let bullet = world.spawn();
        world.bullets.set(bullet, Bullet { owner_entity_id: owner, damage: 4 });
        let mut collision = Collision::new();
        collision.insert(victim);
        world.collisions.set(bullet, collision);

        let mut sys = BulletCheckSystem { knockback_scale: Fix64::ZERO, hit_stun_ticks: 0 };
        sys.execute(&mut world, &[]);

        assert_eq!(world.hps.get(victim).unwrap().current, 6);
        assert!(!world.is_live(bullet));
    }

    #[test]
    fn bullet_ignores_its_own_owner() {
        let mut world = world_with_grid();
        let owner = world.spawn();
        let bullet = world.spawn();
        world.bullets.set(bullet, Bullet { owner_entity_id: owner, damage: 4 });
        let mut collision = Collision::new();
        collision.insert(owner);
        world.collisions.set(bullet, collision);

        let mut sys = BulletCheckSystem { knockback_scale: Fix64::ZERO, hit_stun_ticks: 0 };
        sys.execute(&mut world, &[]);

        assert!(world.is_live(bullet));
    }

    #[test]
    fn lethal_hit_marks_death() {
        let mut world = world_with_grid();
        let owner = world.spawn();
        let victim = world.spawn();
        world.hps.set(victim, HP { current: 2, max: 10 });
        let bullet = world.spawn();
        world.bullets.set(bullet, Bullet { owner_entity_id: owner, damage: 10 });
        let mut collision = Collision::new();
        collision.insert(victim);
        world.collisions.set(bullet, collision);

        let mut sys = BulletCheckSystem { knockback_scale: Fix64::ZERO, hit_stun_ticks: 0 };
        sys.execute(&mut world, &[]);

        assert!(world.deaths.contains(victim));
    }

    #[test]
    fn hit_applies_knockback_and_stun() {
        let mut world = world_with_grid();
        let owner = world.spawn();
        let victim = world.spawn();
        world.hps.set(victim, HP { current: 10, max: 10 });
        world.players.set(
            victim,
            lockstep_ecs::components::Player {
                player_id: 1,
                current_mode_index: 0,
                mode_count: 3,
                bullet_cooldown: 0,
                wall_cooldown: 0,
                barrel_cooldown: 0,
                hit_stun_timer: 0,
                state: PlayerState::Normal,
            },
        );
        let bullet = world.spawn();
        world.bullets.set(bullet, Bullet { owner_entity_id: owner, damage: 4 });
        world.velocities.set(bullet, Velocity { v: FixVec2::new(Fix64::from_int(10), Fix64::ZERO) });
        let mut collision = Collision::new();
        collision.insert(victim);
        world.collisions.set(bullet, collision);

        let mut sys = BulletCheckSystem { knockback_scale: Fix64::from_ratio(1, 2), hit_stun_ticks: 12 };
        sys.execute(&mut world, &[]);

        assert_eq!(world.velocities.get(victim).unwrap().v, FixVec2::new(Fix64::from_int(5), Fix64::ZERO));
        assert_eq!(world.stiffs.get(victim).unwrap().timer, 12);
        assert_eq!(world.players.get(victim).unwrap().hit_stun_timer, 12);
        assert_eq!(world.players.get(victim).unwrap().state, PlayerState::Stunned);
    }
}
