//! Player input handling: mode toggling, cooldown decay, movement, and the
//! three placement actions (shoot, wall, barrel) -- spec.md §4.3 steps 1, 2,
//! 5, 6, 7.

use lockstep_ecs::components::{
    Barrel, Bullet, CollisionShape, LayerMask, PhysicsBody, PlayerState, Transform2D, Velocity,
    Wall, WallPlacement, LAYER_DEFAULT,
};
use lockstep_ecs::world::World;
use lockstep_fixed::Fix64;

use crate::input::{Direction, FrameData};
use crate::pipeline::System;

fn find_player_entity(world: &World, player_id: u8) -> Option<lockstep_ecs::entity::EntityId> {
    world.players.iter().find(|(_, p)| p.player_id == player_id).map(|(e, _)| e)
}

/// Rotates a player's mode index on an `is_toggle` input edge.
pub struct PlayerToggleSystem;

impl System for PlayerToggleSystem {
    fn name(&self) -> &'static str {
        "PlayerToggleSystem"
    }

    fn execute(&mut self, world: &mut World, inputs: &[FrameData]) {
        for frame in inputs {
            for input in frame {
                if !input.is_toggle {
                    continue;
                }
                if let Some(entity) = find_player_entity(world, input.player_id) {
                    if let Some(player) = world.players.get_mut(entity) {
                        player.toggle_mode();
                    }
                }
            }
        }
    }
}

/// Decrements every per-player timer by one tick, floor at zero. Runs
/// before [`PlayerShootSystem`] in the same tick so a cooldown expiring
/// this tick is already usable this tick.
pub struct PlayerCooldownSystem;

impl System for PlayerCooldownSystem {
    fn name(&self) -> &'static str {
        "PlayerCooldownSystem"
    }

    fn execute(&mut self, world: &mut World, _inputs: &[FrameData]) {
        for (_, player) in world.players.iter_mut() {
            player.bullet_cooldown = player.bullet_cooldown.saturating_sub(1);
            player.wall_cooldown = player.wall_cooldown.saturating_sub(1);
            player.barrel_cooldown = player.barrel_cooldown.saturating_sub(1);
            player.hit_stun_timer = player.hit_stun_timer.saturating_sub(1);
            if player.hit_stun_timer == 0 && player.state == PlayerState::Stunned {
                player.state = PlayerState::Normal;
            }
        }
    }
}

/// Translates directional input into velocity. A stunned player, or one
/// still carrying a [`lockstep_ecs::components::Stiff`] lockout, is skipped
/// entirely (World invariant: stunned players do not act).
pub struct PlayerMoveSystem {
    pub move_speed: Fix64,
}

impl System for PlayerMoveSystem {
    fn name(&self) -> &'static str {
        "PlayerMoveSystem"
    }

    fn execute(&mut self, world: &mut World, inputs: &[FrameData]) {
        for frame in inputs {
            for input in frame {
                let Some(entity) = find_player_entity(world, input.player_id) else { continue };
                let skip = world.stiffs.contains(entity)
                    || world.players.get(entity).map(|p| p.state == PlayerState::Stunned).unwrap_or(true);
                let velocity = if skip { lockstep_fixed::FixVec2::ZERO } else { input.direction.unit_vector().scale(self.move_speed) };
                world.velocities.set(entity, Velocity { v: velocity });
            }
        }
    }
}

/// Fires a bullet from a player's position toward the input's fire target,
/// if the player is in shoot mode (`current_mode_index == 0`) and its
/// bullet cooldown has expired.
pub struct PlayerShootSystem {
    pub bullet_speed: Fix64,
    pub bullet_radius: Fix64,
    pub bullet_damage: i32,
    pub cooldown_ticks: u32,
}

impl System for PlayerShootSystem {
    fn name(&self) -> &'static str {
        "PlayerShootSystem"
    }

    fn execute(&mut self, world: &mut World, inputs: &[FrameData]) {
        for frame in inputs {
            for input in frame {
                if !input.is_fire {
                    continue;
                }
                let Some(entity) = find_player_entity(world, input.player_id) else { continue };
                let ready = world
                    .players
                    .get(entity)
                    .map(|p| p.current_mode_index == 0 && p.bullet_cooldown == 0)
                    .unwrap_or(false);
                if !ready {
                    continue;
                }
                let Some(origin) = world.transforms.get(entity).map(|t| t.position) else { continue };
                let target = lockstep_fixed::FixVec2::new(input.fire_x, input.fire_y);
                let direction = (target - origin).normalize();

                let bullet = world.spawn();
                world.transforms.set(bullet, Transform2D { position: origin });
                world.velocities.set(bullet, Velocity { v: direction.scale(self.bullet_speed) });
                world.shapes.set(bullet, CollisionShape::Circle { radius: self.bullet_radius });
                world.bodies.set(
                    bullet,
                    PhysicsBody {
                        mass: Fix64::ONE,
                        is_static: false,
                        use_gravity: false,
                        is_trigger: true,
                        restitution: Fix64::ZERO,
                        friction: Fix64::ZERO,
                        linear_damping: Fix64::ONE,
                        layer: LAYER_DEFAULT,
                    },
                );
                world.bullets.set(bullet, Bullet { owner_entity_id: entity, damage: self.bullet_damage });

                if let Some(player) = world.players.get_mut(entity) {
                    player.bullet_cooldown = self.cooldown_ticks;
                }
            }
        }
    }
}

/// Aligns `placer`'s current position to the centre of its containing grid
/// cell, spawns a static (trigger, until activated) entity there, and wires
/// up the transient [`WallPlacement`] marker. Does not register the cell as
/// a grid obstacle -- callers that need that (walls, not barrels) do it
/// themselves, since only walls are cleared from the grid by `DeathSystem`.
fn spawn_placement(
    world: &mut World,
    placer: lockstep_ecs::entity::EntityId,
    half_extents: lockstep_fixed::FixVec2,
    layer: LayerMask,
) -> lockstep_ecs::entity::EntityId {
    let Some(raw_origin) = world.transforms.get(placer).map(|t| t.position) else { return placer };
    let cell = world.grid_map.world_to_cell(raw_origin);
    let origin = world.grid_map.cell_center(cell);
    let entity = world.spawn();
    world.transforms.set(entity, Transform2D { position: origin });
    world.shapes.set(entity, CollisionShape::Box { size: half_extents.scale(Fix64::from_int(2)) });
    world.bodies.set(
        entity,
        PhysicsBody {
            mass: Fix64::ZERO,
            is_static: true,
            use_gravity: false,
            is_trigger: true,
            restitution: Fix64::ZERO,
            friction: Fix64::ZERO,
            linear_damping: Fix64::ONE,
            layer,
        },
    );
    world.wall_placements.set(entity, WallPlacement { placer_entity_id: placer });
    entity
}

/// Places a solid wall at the player's position (spawned as a trigger until
/// [`crate::systems::wall::WallPlacementSystem`] observes the placer has
/// moved clear of it).
pub struct PlayerPlaceWallSystem {
    pub half_extents: lockstep_fixed::FixVec2,
    pub cooldown_ticks: u32,
}

impl System for PlayerPlaceWallSystem {
    fn name(&self) -> &'static str {
        "PlayerPlaceWallSystem"
    }

    fn execute(&mut self, world: &mut World, inputs: &[FrameData]) {
        for frame in inputs {
            for input in frame {
                if !input.is_fire {
                    continue;
                }
                let Some(entity) = find_player_entity(world, input.player_id) else { continue };
                let ready = world
                    .players
                    .get(entity)
                    .map(|p| p.current_mode_index == 1 && p.wall_cooldown == 0)
                    .unwrap_or(false);
                if !ready {
                    continue;
                }
                let wall = spawn_placement(world, entity, self.half_extents, LAYER_DEFAULT);
                world.walls.set(wall, Wall);
                if let Some(cell) = world.transforms.get(wall).map(|t| world.grid_map.world_to_cell(t.position)) {
                    world.grid_map.obstacles.insert(cell);
                }
                if let Some(player) = world.players.get_mut(entity) {
                    player.wall_cooldown = self.cooldown_ticks;
                }
            }
        }
    }
}

/// Places a barrel (explodes on death) at the player's position.
pub struct PlayerPlaceBarrelSystem {
    pub half_extents: lockstep_fixed::FixVec2,
    pub cooldown_ticks: u32,
    pub barrel_hp: i32,
}

impl System for PlayerPlaceBarrelSystem {
    fn name(&self) -> &'static str {
        "PlayerPlaceBarrelSystem"
    }

    fn execute(&mut self, world: &mut World, inputs: &[FrameData]) {
        for frame in inputs {
            for input in frame {
                if !input.is_fire {
                    continue;
                }
                let Some(entity) = find_player_entity(world, input.player_id) else { continue };
                let ready = world
                    .players
                    .get(entity)
                    .map(|p| p.current_mode_index == 2 && p.barrel_cooldown == 0)
                    .unwrap_or(false);
                if !ready {
                    continue;
                }
                let barrel = spawn_placement(world, entity, self.half_extents, LAYER_DEFAULT);
                world.barrels.set(barrel, Barrel);
                world.hps.set(barrel, lockstep_ecs::components::HP { current: self.barrel_hp, max: self.barrel_hp });
                if let Some(player) = world.players.get_mut(entity) {
                    player.barrel_cooldown = self.cooldown_ticks;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_ecs::components::{GridMap, ModeIndex, Player};
    use std::collections::BTreeSet;

    fn world_with_grid() -> World {
        World::new(GridMap { width: 16, height: 16, cell_size: Fix64::ONE, obstacles: BTreeSet::new() })
    }

    fn spawn_player(world: &mut World, id: u8) -> lockstep_ecs::entity::EntityId {
        let e = world.spawn();
        world.transforms.set(e, Transform2D { position: lockstep_fixed::FixVec2::ZERO });
        world.players.set(
            e,
            Player {
                player_id: id,
                current_mode_index: 0,
                mode_count: 3,
                bullet_cooldown: 0,
                wall_cooldown: 0,
                barrel_cooldown: 0,
                hit_stun_timer: 0,
                state: PlayerState::Normal,
            },
        );
        e
    }

    fn input(player_id: u8) -> crate::input::PlayerInput {
        crate::input::PlayerInput {
            player_id,
            direction: Direction::None,
            is_fire: false,
            fire_x: Fix64::ZERO,
            fire_y: Fix64::ZERO,
            is_toggle: false,
        }
    }

    #[test]
    fn toggle_advances_mode() {
        let mut world = world_with_grid();
        let e = spawn_player(&mut world, 0);
        let mut input_frame = input(0);
        input_frame.is_toggle = true;
        let mut sys = PlayerToggleSystem;
        sys.execute(&mut world, &[vec![input_frame]]);
        assert_eq!(world.players.get(e).unwrap().current_mode_index, 1 as ModeIndex);
    }

    #[test]
    fn cooldowns_decay_to_zero_not_below() {
        let mut world = world_with_grid();
        let e = spawn_player(&mut world, 0);
        world.players.get_mut(e).unwrap().bullet_cooldown = 1;
        let mut sys = PlayerCooldownSystem;
        sys.execute(&mut world, &[]);
        sys.execute(&mut world, &[]);
        assert_eq!(world.players.get(e).unwrap().bullet_cooldown, 0);
    }

    #[test]
    fn shoot_spawns_bullet_toward_target_and_sets_cooldown() {
        let mut world = world_with_grid();
        let e = spawn_player(&mut world, 0);
        let mut fire = input(0);
        fire.is_fire = true;
        fire.fire_x = Fix64::from_int(5);
        fire.fire_y = Fix64::ZERO;
        let mut sys = PlayerShootSystem {
            bullet_speed: Fix64::from_int(10),
            bullet_radius: Fix64::from_ratio(1, 4),
            bullet_damage: 10,
            cooldown_ticks: 5,
        };
        sys.execute(&mut world, &[vec![fire]]);
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.players.get(e).unwrap().bullet_cooldown, 5);
    }

    #[test]
    fn shoot_respects_cooldown() {
        let mut world = world_with_grid();
        let e = spawn_player(&mut world, 0);
        world.players.get_mut(e).unwrap().bullet_cooldown = 2;
        let mut fire = input(0);
        fire.is_fire = true;
        let mut sys = PlayerShootSystem {
            bullet_speed: Fix64::from_int(10),
            bullet_radius: Fix64::from_ratio(1, 4),
            bullet_damage: 10,
            cooldown_ticks: 5,
        };
        sys.execute(&mut world, &[vec![fire]]);
        assert_eq!(world.bullets.len(), 0);
    }

    #[test]
    fn shoot_requires_shoot_mode() {
        let mut world = world_with_grid();
        let e = spawn_player(&mut world, 0);
        world.players.get_mut(e).unwrap().current_mode_index = 1;
        let mut fire = input(0);
        fire.is_fire = true;
        let mut sys = PlayerShootSystem {
            bullet_speed: Fix64::from_int(10),
            bullet_radius: Fix64::from_ratio(1, 4),
            bullet_damage: 10,
            cooldown_ticks: 5,
        };
        sys.execute(&mut world, &[vec![fire]]);
        assert_eq!(world.bullets.len(), 0);
    }
}
