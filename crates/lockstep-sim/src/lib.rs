//! lockstep-sim -- the ordered System pipeline that drives one tick of the
//! deterministic simulation (spec.md §4.3/§4.4), built on [`lockstep_ecs`]
//! and [`lockstep_fixed`].
//!
//! [`pipeline::Pipeline`] holds a fixed, ordered `Vec<Box<dyn System>>`
//! registered once at construction and run top-to-bottom every tick.
//! [`build_default_pipeline`] wires the fourteen canonical Systems in the
//! exact order spec.md §4.3 lists them; callers that need a different
//! subset (e.g. a unit test exercising one System in isolation) build a
//! [`pipeline::Pipeline`] directly and `push` only what they need.
//!
//! # Quick Start
//!
//! ```
//! use lockstep_ecs::prelude::*;
//! use lockstep_sim::{build_default_pipeline, SimConfig};
//! use std::collections::BTreeSet;
//!
//! let grid = GridMap { width: 32, height: 32, cell_size: lockstep_fixed::Fix64::ONE, obstacles: BTreeSet::new() };
//! let mut world = World::new(grid);
//! let mut pipeline = build_default_pipeline(SimConfig::default());
//! pipeline.run_tick(&mut world, &[]);
//! assert_eq!(pipeline.tick_count(), 1);
//! ```

#![deny(unsafe_code)]

pub mod error;
pub mod input;
pub mod pathfinding;
pub mod physics;
pub mod pipeline;
pub mod systems;

pub use error::SimError;
pub use pipeline::{Pipeline, System, TickDiagnostics};

use lockstep_fixed::{Fix64, FixVec2};

use physics::PhysicsConfig;
use systems::bullet::BulletCheckSystem;
use systems::explosion::ExplosionSystem;
use systems::flowfield::FlowFieldSystem;
use systems::player::{
    PlayerCooldownSystem, PlayerMoveSystem, PlayerPlaceBarrelSystem, PlayerPlaceWallSystem,
    PlayerShootSystem, PlayerToggleSystem,
};
use systems::state::{DeathSystem, StiffSystem};
use systems::wall::WallPlacementSystem;
use systems::zombie::{ZombieAISystem, ZombieSpawn, ZombieSpawnSystem};

/// Every tunable the canonical pipeline needs, gathered in one place so a
/// host only has one struct to configure (and one place to diff against
/// spec.md when a balance value changes). Per-entity tunables (a
/// particular player's cooldown, a particular zombie's HP) live on
/// components instead; this only holds the simulation-wide constants that
/// apply uniformly to every entity of a kind.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub player_move_speed: Fix64,
    pub bullet_speed: Fix64,
    pub bullet_radius: Fix64,
    pub bullet_damage: i32,
    pub bullet_cooldown_ticks: u32,
    pub bullet_knockback_scale: Fix64,
    pub bullet_hit_stun_ticks: u32,
    pub wall_half_extents: FixVec2,
    pub wall_cooldown_ticks: u32,
    pub wall_activation_margin: Fix64,
    pub barrel_half_extents: FixVec2,
    pub barrel_cooldown_ticks: u32,
    pub barrel_hp: i32,
    pub barrel_explosion_radius: Fix64,
    pub barrel_explosion_damage: i32,
    pub barrel_explosion_lifetime_frames: u32,
    pub explosion_damage_layer_mask: u32,
    pub zombie_roster: Vec<ZombieSpawn>,
    pub zombie_repath_interval_ticks: u32,
    pub zombie_waypoint_arrive_radius: Fix64,
    pub flow_field_recompute_interval_ticks: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            physics: PhysicsConfig::default(),
            player_move_speed: Fix64::from_int(5),
            bullet_speed: Fix64::from_int(20),
            bullet_radius: Fix64::from_ratio(1, 4),
            bullet_damage: 10,
            bullet_cooldown_ticks: 15,
            bullet_knockback_scale: Fix64::from_ratio(1, 2),
            bullet_hit_stun_ticks: 10,
            wall_half_extents: FixVec2::new(Fix64::HALF, Fix64::HALF),
            wall_cooldown_ticks: 60,
            wall_activation_margin: Fix64::from_ratio(1, 4),
            barrel_half_extents: FixVec2::new(Fix64::HALF, Fix64::HALF),
            barrel_cooldown_ticks: 90,
            barrel_hp: 1,
            barrel_explosion_radius: Fix64::from_int(2),
            barrel_explosion_damage: 10,
            barrel_explosion_lifetime_frames: 15,
            explosion_damage_layer_mask: lockstep_ecs::components::LAYER_DEFAULT,
            zombie_roster: Vec::new(),
            zombie_repath_interval_ticks: 30,
            zombie_waypoint_arrive_radius: Fix64::from_ratio(1, 4),
            flow_field_recompute_interval_ticks: 30,
        }
    }
}

/// Build the fourteen-System pipeline in the exact order spec.md §4.3
/// lists (`PlayerToggleSystem` through `ExplosionSystem`). The bullet
/// cooldown ordering subtlety noted in spec.md §9 falls out naturally from
/// this order: `PlayerCooldownSystem` (position 2) always runs before
/// `PlayerShootSystem` (position 6) within the same tick.
pub fn build_default_pipeline(config: SimConfig) -> Pipeline {
    let mut pipeline = Pipeline::new();
    pipeline
        .push(Box::new(PlayerToggleSystem))
        .push(Box::new(PlayerCooldownSystem))
        .push(Box::new(StiffSystem))
        .push(Box::new(DeathSystem {
            barrel_explosion_radius: config.barrel_explosion_radius,
            barrel_explosion_damage: config.barrel_explosion_damage,
            barrel_explosion_lifetime_frames: config.barrel_explosion_lifetime_frames,
        }))
        .push(Box::new(PlayerMoveSystem { move_speed: config.player_move_speed }))
        .push(Box::new(PlayerShootSystem {
            bullet_speed: config.bullet_speed,
            bullet_radius: config.bullet_radius,
            bullet_damage: config.bullet_damage,
            cooldown_ticks: config.bullet_cooldown_ticks,
        }))
        .push(Box::new(PlayerPlaceWallSystem {
            half_extents: config.wall_half_extents,
            cooldown_ticks: config.wall_cooldown_ticks,
        }))
        .push(Box::new(PlayerPlaceBarrelSystem {
            half_extents: config.barrel_half_extents,
            cooldown_ticks: config.barrel_cooldown_ticks,
            barrel_hp: config.barrel_hp,
        }))
        .push(Box::new(BulletCheckSystem {
            knockback_scale: config.bullet_knockback_scale,
            hit_stun_ticks: config.bullet_hit_stun_ticks,
        }))
        .push(Box::new(physics::PhysicsSystem::new(config.physics)))
        .push(Box::new(FlowFieldSystem { recompute_interval_ticks: config.flow_field_recompute_interval_ticks }))
        .push(Box::new(ZombieSpawnSystem { roster: config.zombie_roster }))
        .push(Box::new(ZombieAISystem {
            repath_interval_ticks: config.zombie_repath_interval_ticks,
            waypoint_arrive_radius: config.zombie_waypoint_arrive_radius,
        }))
        .push(Box::new(WallPlacementSystem { margin: config.wall_activation_margin }))
        .push(Box::new(ExplosionSystem { damage_layer_mask: config.explosion_damage_layer_mask }));
    pipeline
}

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::input::{Direction, FrameData, PlayerInput};
    pub use crate::pipeline::{Pipeline, System, TickDiagnostics};
    pub use crate::{build_default_pipeline, SimConfig};
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_ecs::components::GridMap;
    use std::collections::BTreeSet;

    #[test]
    fn default_pipeline_has_fourteen_systems_in_spec_order() {
        let pipeline = build_default_pipeline(SimConfig::default());
        assert_eq!(
            pipeline.system_names(),
            vec![
                "PlayerToggleSystem",
                "PlayerCooldownSystem",
                "StiffSystem",
                "DeathSystem",
                "PlayerMoveSystem",
                "PlayerShootSystem",
                "PlayerPlaceWallSystem",
                "PlayerPlaceBarrelSystem",
                "BulletCheckSystem",
                "PhysicsSystem",
                "FlowFieldSystem",
                "ZombieSpawnSystem",
                "ZombieAISystem",
                "WallPlacementSystem",
                "ExplosionSystem",
            ]
        );
    }

    #[test]
    fn default_pipeline_runs_an_empty_world_without_panicking() {
        let grid = GridMap { width: 16, height: 16, cell_size: Fix64::ONE, obstacles: BTreeSet::new() };
        let mut world = lockstep_ecs::world::World::new(grid);
        let mut pipeline = build_default_pipeline(SimConfig::default());
        for _ in 0..5 {
            pipeline.run_tick(&mut world, &[]);
        }
        assert_eq!(pipeline.tick_count(), 5);
    }
}
