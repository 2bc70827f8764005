//! Zombie roster spawning and the per-zombie pathfinding + melee-attack
//! state machine (spec.md §4.3 steps 11-12, §4.4 "Pathfinding support").

use lockstep_ecs::components::{
    CollisionShape, GridCell, PhysicsBody, Player, Transform2D, Velocity, ZombieAI, ZombieState,
    LAYER_DEFAULT,
};
use lockstep_ecs::entity::EntityId;
use lockstep_ecs::world::World;
use lockstep_fixed::{Fix64, FixVec2};

use crate::input::FrameData;
use crate::pathfinding::find_path;
use crate::physics::query_circle;
use crate::pipeline::System;

/// One roster slot: where a zombie spawns and its starting stats. Spawned
/// verbatim, once, the first tick no zombie exists in the world.
#[derive(Debug, Clone, Copy)]
pub struct ZombieSpawn {
    pub position: FixVec2,
    pub hp: i32,
    pub move_speed: Fix64,
    pub radius: Fix64,
    pub attack_range: Fix64,
    pub attack_damage: i32,
    pub attack_windup_duration: u32,
    pub attack_cooldown_duration: u32,
}

/// Spawns the configured roster once, the first tick no `ZombieAI`-tagged
/// entity exists. Never re-tops-up mid-match; a wipe is permanent.
pub struct ZombieSpawnSystem {
    pub roster: Vec<ZombieSpawn>,
}

impl System for ZombieSpawnSystem {
    fn name(&self) -> &'static str {
        "ZombieSpawnSystem"
    }

    fn execute(&mut self, world: &mut World, _inputs: &[FrameData]) {
        if !world.zombie_ais.is_empty() {
            return;
        }
        for spawn in &self.roster {
            let entity = world.spawn();
            world.transforms.set(entity, Transform2D { position: spawn.position });
            world.velocities.set(entity, Velocity { v: FixVec2::ZERO });
            world.shapes.set(entity, CollisionShape::Circle { radius: spawn.radius });
            world.bodies.set(
                entity,
                PhysicsBody {
                    mass: Fix64::ONE,
                    is_static: false,
                    use_gravity: false,
                    is_trigger: false,
                    restitution: Fix64::ZERO,
                    friction: Fix64::ZERO,
                    linear_damping: Fix64::ONE,
                    layer: LAYER_DEFAULT,
                },
            );
            world.hps.set(entity, lockstep_ecs::components::HP { current: spawn.hp, max: spawn.hp });
            world.zombie_ais.set(
                entity,
                ZombieAI {
                    state: ZombieState::Chase,
                    target_pos: spawn.position,
                    move_speed: spawn.move_speed,
                    path: Vec::new(),
                    path_index: 0,
                    pathfinding_cooldown: 0,
                    attack_windup_timer: 0,
                    attack_windup_duration: spawn.attack_windup_duration,
                    attack_cooldown_timer: 0,
                    attack_cooldown_duration: spawn.attack_cooldown_duration,
                    attack_range: spawn.attack_range,
                    attack_damage: spawn.attack_damage,
                },
            );
        }
    }
}

/// Players sorted nearest-first by squared distance to `from`, tie-broken
/// by entity ID so two peers with identical float-free state agree on
/// order even when two players are exactly equidistant.
fn players_by_distance(world: &World, from: FixVec2) -> Vec<(EntityId, FixVec2)> {
    let mut out: Vec<(EntityId, FixVec2, Fix64)> = world
        .players
        .iter()
        .filter_map(|(e, _): (EntityId, &Player)| {
            world.transforms.get(e).map(|t| (e, t.position, (t.position - from).length_squared()))
        })
        .collect();
    out.sort_by(|a, b| a.2.cmp(&b.2).then_with(|| a.0.cmp(&b.0)));
    out.into_iter().map(|(e, p, _)| (e, p)).collect()
}

/// Re-plans `ai`'s path toward the nearest reachable player, falling back
/// through successively farther players, then to a straight line toward
/// the nearest player if none are grid-reachable at all (spec.md §4.4).
fn replan(world: &World, ai: &mut ZombieAI, from: FixVec2) {
    let candidates = players_by_distance(world, from);
    if candidates.is_empty() {
        ai.path.clear();
        ai.path_index = 0;
        return;
    }
    let start = world.grid_map.world_to_cell(from);
    for &(_, target_pos) in &candidates {
        let goal = world.grid_map.world_to_cell(target_pos);
        if let Some(path) = find_path(&world.grid_map, start, goal) {
            ai.target_pos = target_pos;
            ai.path = path;
            ai.path_index = 0;
            return;
        }
    }
    // No reachable target: walk straight at the nearest one anyway.
    ai.target_pos = candidates[0].1;
    ai.path.clear();
    ai.path_index = 0;
}

pub struct ZombieAISystem {
    pub repath_interval_ticks: u32,
    pub waypoint_arrive_radius: Fix64,
}

impl System for ZombieAISystem {
    fn name(&self) -> &'static str {
        "ZombieAISystem"
    }

    fn execute(&mut self, world: &mut World, _inputs: &[FrameData]) {
        let zombies: Vec<EntityId> = world.zombie_ais.iter().map(|(e, _)| e).collect();

        for zombie in zombies {
            let Some(position) = world.transforms.get(zombie).map(|t| t.position) else { continue };
            let Some(mut ai) = world.zombie_ais.get(zombie).cloned() else { continue };

            match ai.state {
                ZombieState::Chase => {
                    if ai.pathfinding_cooldown == 0 {
                        replan(world, &mut ai, position);
                        ai.pathfinding_cooldown = self.repath_interval_ticks;
                    } else {
                        ai.pathfinding_cooldown -= 1;
                    }

                    let waypoint = next_waypoint(world, &mut ai, position, self.waypoint_arrive_radius);
                    let to_target = ai.target_pos - position;
                    if to_target.length_squared() <= ai.attack_range.squared() {
                        ai.state = ZombieState::Windup;
                        ai.attack_windup_timer = ai.attack_windup_duration;
                        set_velocity(world, zombie, FixVec2::ZERO);
                    } else {
                        let velocity = (waypoint - position).normalize().scale(ai.move_speed);
                        set_velocity(world, zombie, velocity);
                    }
                }
                ZombieState::Windup => {
                    set_velocity(world, zombie, FixVec2::ZERO);
                    if ai.attack_windup_timer > 0 {
                        ai.attack_windup_timer -= 1;
                    }
                    if ai.attack_windup_timer == 0 {
                        ai.state = ZombieState::Strike;
                    }
                }
                ZombieState::Strike => {
                    for victim in query_circle(world, position, ai.attack_range, LAYER_DEFAULT) {
                        if victim == zombie || !world.players.contains(victim) {
                            continue;
                        }
                        if let Some(hp) = world.hps.get_mut(victim) {
                            hp.current -= ai.attack_damage;
                        }
                    }
                    ai.state = ZombieState::Cooldown;
                    ai.attack_cooldown_timer = ai.attack_cooldown_duration;
                    set_velocity(world, zombie, FixVec2::ZERO);
                }
                ZombieState::Cooldown => {
                    set_velocity(world, zombie, FixVec2::ZERO);
                    if ai.attack_cooldown_timer > 0 {
                        ai.attack_cooldown_timer -= 1;
                    }
                    if ai.attack_cooldown_timer == 0 {
                        ai.state = ZombieState::Chase;
                        ai.pathfinding_cooldown = 0;
                    }
                }
            }

            world.zombie_ais.set(zombie, ai);
        }
    }
}

fn set_velocity(world: &mut World, entity: EntityId, v: FixVec2) {
    world.velocities.set(entity, Velocity { v });
}

/// The world-space point `ai` should currently steer toward: the next path
/// waypoint, advancing `path_index` past any waypoint already reached, or
/// `target_pos` directly once the path is exhausted or empty (straight-line
/// fallback).
fn next_waypoint(world: &World, ai: &mut ZombieAI, position: FixVec2, arrive_radius: Fix64) -> FixVec2 {
    while ai.path_index < ai.path.len() {
        let waypoint = cell_world_pos(world, ai.path[ai.path_index]);
        if (waypoint - position).length_squared() <= arrive_radius.squared() {
            ai.path_index += 1;
            continue;
        }
        return waypoint;
    }
    ai.target_pos
}

fn cell_world_pos(world: &World, cell: GridCell) -> FixVec2 {
    world.grid_map.cell_center(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_ecs::components::{GridMap, PlayerState};
    use std::collections::BTreeSet;

    fn world_with_grid() -> World {
        World::new(GridMap { width: 16, height: 16, cell_size: Fix64::ONE, obstacles: BTreeSet::new() })
    }

    fn spawn_player(world: &mut World, id: u8, pos: FixVec2) -> EntityId {
        let e = world.spawn();
        world.transforms.set(e, Transform2D { position: pos });
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

    fn roster_of_one(pos: FixVec2) -> Vec<ZombieSpawn> {
        vec![ZombieSpawn {
            position: pos,
            hp: 10,
            move_speed: Fix64::ONE,
            radius: Fix64::from_ratio(1, 2),
            attack_range: Fix64::ONE,
            attack_damage: 5,
            attack_windup_duration: 2,
            attack_cooldown_duration: 2,
        }]
    }

    #[test]
    fn spawn_system_spawns_roster_exactly_once() {
        let mut world = world_with_grid();
        let mut sys = ZombieSpawnSystem { roster: roster_of_one(FixVec2::ZERO) };
        sys.execute(&mut world, &[]);
        assert_eq!(world.zombie_ais.len(), 1);
        sys.execute(&mut world, &[]);
        assert_eq!(world.zombie_ais.len(), 1);
    }

    #[test]
    fn chase_moves_toward_nearest_player() {
        let mut world = world_with_grid();
        spawn_player(&mut world, 0, FixVec2::new(Fix64::from_int(10), Fix64::ZERO));
        let mut spawn_sys = ZombieSpawnSystem { roster: roster_of_one(FixVec2::ZERO) };
        spawn_sys.execute(&mut world, &[]);
        let zombie = world.zombie_ais.iter().next().unwrap().0;

        let mut ai_sys = ZombieAISystem { repath_interval_ticks: 5, waypoint_arrive_radius: Fix64::from_ratio(1, 4) };
        ai_sys.execute(&mut world, &[]);

        let vel = world.velocities.get(zombie).unwrap().v;
        assert!(vel.x > Fix64::ZERO, "zombie should move toward the player on the +x side");
    }

    #[test]
    fn windup_then_strike_damages_player_in_range() {
        let mut world = world_with_grid();
        let player = spawn_player(&mut world, 0, FixVec2::new(Fix64::from_ratio(1, 2), Fix64::ZERO));
        let mut spawn_sys = ZombieSpawnSystem { roster: roster_of_one(FixVec2::ZERO) };
        spawn_sys.execute(&mut world, &[]);
        world.hps.set(player, lockstep_ecs::components::HP { current: 20, max: 20 });
        let zombie = world.zombie_ais.iter().next().unwrap().0;

        let mut ai_sys = ZombieAISystem { repath_interval_ticks: 5, waypoint_arrive_radius: Fix64::from_ratio(1, 4) };
        ai_sys.execute(&mut world, &[]); // Chase -> Windup (already in range)
        assert_eq!(world.zombie_ais.get(zombie).unwrap().state, ZombieState::Windup);
        ai_sys.execute(&mut world, &[]); // windup tick 1
        ai_sys.execute(&mut world, &[]); // windup tick 0 -> Strike this call's next state is Strike, runs on next
        ai_sys.execute(&mut world, &[]); // Strike -> Cooldown

        assert!(world.hps.get(player).unwrap().current < 20);
        assert_eq!(world.zombie_ais.get(zombie).unwrap().state, ZombieState::Cooldown);
    }
}
