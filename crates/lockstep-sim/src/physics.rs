//! The physics System: sub-stepped integration, grid broadphase, narrowphase
//! contact generation, impulse + friction resolution, and collision
//! recording (spec.md §4.4).

use std::collections::{HashMap, HashSet};

use lockstep_ecs::components::{CollisionShape, PhysicsBody, LAYER_DEFAULT};
use lockstep_ecs::entity::EntityId;
use lockstep_ecs::world::World;
use lockstep_fixed::{Fix64, FixVec2};

use crate::input::FrameData;
use crate::pipeline::System;

/// Tunable, instance-owned parameters for one [`PhysicsSystem`]. Per-entity
/// tunables (mass, restitution, friction, ...) live on `PhysicsBody`
/// instead -- this only holds simulation-wide constants.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsConfig {
    pub gravity: FixVec2,
    pub sub_steps: u32,
    pub iterations: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig { gravity: FixVec2::ZERO, sub_steps: 1, iterations: 1 }
    }
}

pub struct PhysicsSystem {
    config: PhysicsConfig,
}

impl PhysicsSystem {
    pub fn new(config: PhysicsConfig) -> Self {
        PhysicsSystem { config }
    }
}

impl System for PhysicsSystem {
    fn name(&self) -> &'static str {
        "PhysicsSystem"
    }

    fn execute(&mut self, world: &mut World, _inputs: &[FrameData]) {
        // Cleared once per tick, at the first sub-step only (World invariant 6).
        for (_, collision) in world.collisions.iter_mut() {
            collision.clear();
        }

        if self.config.sub_steps == 0 {
            return;
        }
        let sub_step_dt = Fix64::ONE / Fix64::from_int(self.config.sub_steps as i32);

        for _ in 0..self.config.sub_steps {
            accumulate_forces_and_integrate(world, self.config.gravity, sub_step_dt);
            for _ in 0..self.config.iterations.max(1) {
                step_broadphase_narrowphase_resolve(world);
            }
        }
    }
}

fn accumulate_forces_and_integrate(world: &mut World, gravity: FixVec2, dt: Fix64) {
    let bodies: Vec<EntityId> = world.bodies.iter().map(|(e, _)| e).collect();
    for entity in bodies {
        let Some(body) = world.bodies.get(entity).copied() else { continue };
        if body.is_static {
            continue;
        }
        let mut velocity = world.velocities.get(entity).copied().map(|v| v.v).unwrap_or(FixVec2::ZERO);
        if body.use_gravity {
            // Contract value per spec.md §4.4 step 1: `mass * g * subStepDt`.
            velocity += gravity.scale(body.mass).scale(dt);
        }
        if let Some(transform) = world.transforms.get_mut(entity) {
            transform.position += velocity.scale(dt);
        }
        velocity = velocity.scale(body.linear_damping);
        world.velocities.set(entity, lockstep_ecs::components::Velocity { v: velocity });
    }
}

/// A single narrowphase contact. `normal` points from `a` to `b`.
#[derive(Debug, Clone, Copy)]
struct Contact {
    normal: FixVec2,
    penetration: Fix64,
}

fn step_broadphase_narrowphase_resolve(world: &mut World) {
    let grid = build_broadphase_grid(world);
    let candidates: Vec<EntityId> = world.bodies.iter().map(|(e, _)| e).collect();

    let mut seen_pairs: HashSet<(u32, u32)> = HashSet::new();
    let mut pairs: Vec<(EntityId, EntityId, Contact)> = Vec::new();

    for &entity in &candidates {
        let Some(transform) = world.transforms.get(entity) else { continue };
        let Some(shape) = world.shapes.get(entity) else { continue };
        let half = shape.half_extents();
        for other in grid.query(transform.position, half) {
            if other == entity {
                continue;
            }
            let (lo, hi) = if entity.get() < other.get() { (entity, other) } else { (other, entity) };
            if !seen_pairs.insert((lo.get(), hi.get())) {
                continue;
            }
            let (Some(body_lo), Some(body_hi)) = (world.bodies.get(lo).copied(), world.bodies.get(hi).copied()) else {
                continue;
            };
            if body_lo.is_static && body_hi.is_static {
                continue;
            }
            if body_lo.layer & body_hi.layer == 0 {
                continue;
            }
            let (Some(t_lo), Some(s_lo), Some(t_hi), Some(s_hi)) = (
                world.transforms.get(lo),
                world.shapes.get(lo),
                world.transforms.get(hi),
                world.shapes.get(hi),
            ) else {
                continue;
            };
            if let Some(contact) = compute_contact(t_lo.position, s_lo, t_hi.position, s_hi) {
                pairs.push((lo, hi, contact));
            }
        }
    }

    for (a, b, contact) in pairs {
        record_collision(world, a, b);
        let trigger = world.bodies.get(a).map(|b| b.is_trigger).unwrap_or(false)
            || world.bodies.get(b).map(|b| b.is_trigger).unwrap_or(false);
        if !trigger {
            resolve_contact(world, a, b, contact);
        }
    }
}

fn record_collision(world: &mut World, a: EntityId, b: EntityId) {
    if let Some(collision) = world.collisions.get_mut(a) {
        collision.insert(b);
    } else {
        let mut collision = lockstep_ecs::components::Collision::new();
        collision.insert(b);
        world.collisions.set(a, collision);
    }
    if let Some(collision) = world.collisions.get_mut(b) {
        collision.insert(a);
    } else {
        let mut collision = lockstep_ecs::components::Collision::new();
        collision.insert(a);
        world.collisions.set(b, collision);
    }
}

fn resolve_contact(world: &mut World, a: EntityId, b: EntityId, contact: Contact) {
    let (Some(body_a), Some(body_b)) = (world.bodies.get(a).copied(), world.bodies.get(b).copied()) else { return };
    let inv_a = body_a.inverse_mass();
    let inv_b = body_b.inverse_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum == Fix64::ZERO {
        return;
    }

    if let Some(t_a) = world.transforms.get_mut(a) {
        t_a.position -= contact.normal.scale(contact.penetration).scale(inv_a / inv_sum);
    }
    if let Some(t_b) = world.transforms.get_mut(b) {
        t_b.position += contact.normal.scale(contact.penetration).scale(inv_b / inv_sum);
    }

    let vel_a = world.velocities.get(a).map(|v| v.v).unwrap_or(FixVec2::ZERO);
    let vel_b = world.velocities.get(b).map(|v| v.v).unwrap_or(FixVec2::ZERO);
    let rel_vel = vel_b - vel_a;
    let vel_along_normal = rel_vel.dot(contact.normal);
    if vel_along_normal > Fix64::ZERO {
        return; // separating
    }

    let restitution = body_a.restitution.min(body_b.restitution);
    let j = -(Fix64::ONE + restitution) * vel_along_normal / inv_sum;
    let impulse = contact.normal.scale(j);
    let new_vel_a = vel_a - impulse.scale(inv_a);
    let new_vel_b = vel_b + impulse.scale(inv_b);

    let tangent = contact.normal.perpendicular();
    let vel_t = rel_vel.dot(tangent);
    let friction = body_a.friction.min(body_b.friction);
    let max_friction = friction * j.abs();
    let jt = (-vel_t / inv_sum).clamp(-max_friction, max_friction);
    let friction_impulse = tangent.scale(jt);

    let final_vel_a = new_vel_a - friction_impulse.scale(inv_a);
    let final_vel_b = new_vel_b + friction_impulse.scale(inv_b);

    if inv_a > Fix64::ZERO {
        world.velocities.set(a, lockstep_ecs::components::Velocity { v: final_vel_a });
    }
    if inv_b > Fix64::ZERO {
        world.velocities.set(b, lockstep_ecs::components::Velocity { v: final_vel_b });
    }
}

fn compute_contact(pos_a: FixVec2, shape_a: &CollisionShape, pos_b: FixVec2, shape_b: &CollisionShape) -> Option<Contact> {
    match (shape_a, shape_b) {
        (CollisionShape::Circle { radius: ra }, CollisionShape::Circle { radius: rb }) => {
            contact_circle_circle(pos_a, *ra, pos_b, *rb)
        }
        (CollisionShape::Circle { radius: ra }, CollisionShape::Box { .. }) => {
            contact_circle_box(pos_a, *ra, pos_b, shape_b.half_extents())
        }
        (CollisionShape::Box { .. }, CollisionShape::Circle { radius: rb }) => {
            contact_circle_box(pos_b, *rb, pos_a, shape_a.half_extents()).map(|c| Contact { normal: -c.normal, penetration: c.penetration })
        }
        (CollisionShape::Box { .. }, CollisionShape::Box { .. }) => {
            contact_aabb_aabb(pos_a, shape_a.half_extents(), pos_b, shape_b.half_extents())
        }
    }
}

fn contact_circle_circle(pos_a: FixVec2, ra: Fix64, pos_b: FixVec2, rb: Fix64) -> Option<Contact> {
    let diff = pos_b - pos_a;
    let r_sum = ra + rb;
    let dist_sq = diff.length_squared();
    if dist_sq >= r_sum.squared() {
        return None;
    }
    let dist = dist_sq.sqrt();
    let normal = if dist > Fix64::ZERO { diff.scale(Fix64::ONE / dist) } else { FixVec2::new(Fix64::ONE, Fix64::ZERO) };
    Some(Contact { normal, penetration: r_sum - dist })
}

/// `pos_a`/`ra` identify the circle, `pos_b`/`half_b` the box. Returned
/// normal points from the circle (`a`) to the box (`b`).
fn contact_circle_box(pos_a: FixVec2, ra: Fix64, pos_b: FixVec2, half_b: FixVec2) -> Option<Contact> {
    let local = pos_a - pos_b;
    let clamped_x = local.x.clamp(-half_b.x, half_b.x);
    let clamped_y = local.y.clamp(-half_b.y, half_b.y);
    let inside = clamped_x == local.x && clamped_y == local.y;

    if inside {
        let overlap_x = half_b.x - local.x.abs();
        let overlap_y = half_b.y - local.y.abs();
        let (push_dir, overlap) = if overlap_x < overlap_y {
            (FixVec2::new(if local.x.is_negative() { -Fix64::ONE } else { Fix64::ONE }, Fix64::ZERO), overlap_x)
        } else {
            (FixVec2::new(Fix64::ZERO, if local.y.is_negative() { -Fix64::ONE } else { Fix64::ONE }), overlap_y)
        };
        return Some(Contact { normal: -push_dir, penetration: overlap + ra });
    }

    let closest_local = FixVec2::new(clamped_x, clamped_y);
    let diff = local - closest_local;
    let dist_sq = diff.length_squared();
    if dist_sq >= ra.squared() {
        return None;
    }
    let dist = dist_sq.sqrt();
    let outward = if dist > Fix64::ZERO { diff.scale(Fix64::ONE / dist) } else { FixVec2::new(Fix64::ONE, Fix64::ZERO) };
    Some(Contact { normal: -outward, penetration: ra - dist })
}

fn contact_aabb_aabb(pos_a: FixVec2, half_a: FixVec2, pos_b: FixVec2, half_b: FixVec2) -> Option<Contact> {
    let delta = pos_b - pos_a;
    let overlap_x = half_a.x + half_b.x - delta.x.abs();
    let overlap_y = half_a.y + half_b.y - delta.y.abs();
    if overlap_x <= Fix64::ZERO || overlap_y <= Fix64::ZERO {
        return None;
    }
    if overlap_x < overlap_y {
        let normal = FixVec2::new(if delta.x.is_negative() { -Fix64::ONE } else { Fix64::ONE }, Fix64::ZERO);
        Some(Contact { normal, penetration: overlap_x })
    } else {
        let normal = FixVec2::new(Fix64::ZERO, if delta.y.is_negative() { -Fix64::ONE } else { Fix64::ONE });
        Some(Contact { normal, penetration: overlap_y })
    }
}

/// A uniform grid broadphase rebuilt once per sub-step. Each entity is
/// inserted into every cell its AABB overlaps; queries return the union of
/// candidate entities from all cells a query AABB overlaps, in component
/// insertion order (the `World`'s `bodies` store order), deduplicated.
struct BroadphaseGrid {
    cell_size: Fix64,
    buckets: HashMap<(i32, i32), Vec<EntityId>>,
    order: HashMap<EntityId, usize>,
}

impl BroadphaseGrid {
    fn cell_of(&self, p: FixVec2) -> (i32, i32) {
        let cx = (p.x / self.cell_size).to_bits() >> lockstep_fixed::FRAC_BITS;
        let cy = (p.y / self.cell_size).to_bits() >> lockstep_fixed::FRAC_BITS;
        (cx as i32, cy as i32)
    }

    fn query(&self, center: FixVec2, half_extents: FixVec2) -> Vec<EntityId> {
        let min = self.cell_of(center - half_extents);
        let max = self.cell_of(center + half_extents);
        let mut found: Vec<EntityId> = Vec::new();
        let mut seen = HashSet::new();
        for cx in min.0..=max.0 {
            for cy in min.1..=max.1 {
                if let Some(bucket) = self.buckets.get(&(cx, cy)) {
                    for &e in bucket {
                        if seen.insert(e) {
                            found.push(e);
                        }
                    }
                }
            }
        }
        found.sort_by_key(|e| self.order.get(e).copied().unwrap_or(usize::MAX));
        found
    }
}

fn build_broadphase_grid(world: &World) -> BroadphaseGrid {
    let cell_size = if world.grid_map.cell_size > Fix64::ZERO { world.grid_map.cell_size } else { Fix64::ONE };
    let mut grid = BroadphaseGrid { cell_size, buckets: HashMap::new(), order: HashMap::new() };
    for (idx, (entity, _)) in world.bodies.iter().enumerate() {
        grid.order.insert(entity, idx);
        let (Some(transform), Some(shape)) = (world.transforms.get(entity), world.shapes.get(entity)) else { continue };
        let half = shape.half_extents();
        let min = grid.cell_of(transform.position - half);
        let max = grid.cell_of(transform.position + half);
        for cx in min.0..=max.0 {
            for cy in min.1..=max.1 {
                grid.buckets.entry((cx, cy)).or_default().push(entity);
            }
        }
    }
    grid
}

/// Every entity on `layer_mask` whose shape overlaps the query circle, in
/// insertion order, deduplicated.
pub fn query_circle(world: &World, center: FixVec2, radius: Fix64, layer_mask: u32) -> Vec<EntityId> {
    let mut result = Vec::new();
    for (entity, body) in world.bodies.iter() {
        if body.layer & layer_mask == 0 {
            continue;
        }
        let (Some(transform), Some(shape)) = (world.transforms.get(entity), world.shapes.get(entity)) else { continue };
        let overlaps = match *shape {
            CollisionShape::Circle { radius: r } => {
                contact_circle_circle(center, radius, transform.position, r).is_some()
            }
            CollisionShape::Box { .. } => {
                contact_circle_box(center, radius, transform.position, shape.half_extents()).is_some()
            }
        };
        if overlaps {
            result.push(entity);
        }
    }
    result
}

/// A rotated rectangle region query used by melee-style attacks. Box-shaped
/// targets are approximated by their bounding circle (`half_extents`
/// vector length) rather than a full rotated-polygon test, trading a small
/// amount of precision at rectangle corners for a determinism-simple,
/// float-free implementation.
pub fn query_rotated_rect(
    world: &World,
    center: FixVec2,
    half_extents: FixVec2,
    rotation: Fix64,
    layer_mask: u32,
) -> Vec<EntityId> {
    let cos_r = (-rotation).cos();
    let sin_r = (-rotation).sin();
    let mut result = Vec::new();
    for (entity, body) in world.bodies.iter() {
        if body.layer & layer_mask == 0 {
            continue;
        }
        let Some(transform) = world.transforms.get(entity) else { continue };
        let Some(shape) = world.shapes.get(entity) else { continue };
        let target_radius = match *shape {
            CollisionShape::Circle { radius } => radius,
            CollisionShape::Box { .. } => shape.half_extents().length(),
        };
        let rel = transform.position - center;
        let local = FixVec2::new(rel.x * cos_r - rel.y * sin_r, rel.x * sin_r + rel.y * cos_r);
        let clamped = FixVec2::new(local.x.clamp(-half_extents.x, half_extents.x), local.y.clamp(-half_extents.y, half_extents.y));
        let diff = local - clamped;
        if diff.length_squared() <= target_radius.squared() {
            result.push(entity);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_ecs::components::{GridMap, Velocity};
    use lockstep_ecs::world::World;
    use std::collections::BTreeSet;

    fn world_with_grid() -> World {
        World::new(GridMap { width: 32, height: 32, cell_size: Fix64::from_int(1), obstacles: BTreeSet::new() })
    }

    fn dynamic_circle(world: &mut World, pos: FixVec2, radius: Fix64) -> EntityId {
        let e = world.spawn();
        world.transforms.set(e, lockstep_ecs::components::Transform2D { position: pos });
        world.velocities.set(e, Velocity { v: FixVec2::ZERO });
        world.bodies.set(
            e,
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
        world.shapes.set(e, CollisionShape::Circle { radius });
        e
    }

    #[test]
    fn overlapping_circles_record_symmetric_collision() {
        let mut world = world_with_grid();
        let a = dynamic_circle(&mut world, FixVec2::ZERO, Fix64::ONE);
        let b = dynamic_circle(&mut world, FixVec2::new(Fix64::from_ratio(1, 2), Fix64::ZERO), Fix64::ONE);

        let mut sys = PhysicsSystem::new(PhysicsConfig { gravity: FixVec2::ZERO, sub_steps: 1, iterations: 1 });
        sys.execute(&mut world, &[]);

        assert!(world.collisions.get(a).unwrap().contains(b));
        assert!(world.collisions.get(b).unwrap().contains(a));
    }

    #[test]
    fn separated_circles_do_not_collide() {
        let mut world = world_with_grid();
        let a = dynamic_circle(&mut world, FixVec2::ZERO, Fix64::ONE);
        let b = dynamic_circle(&mut world, FixVec2::new(Fix64::from_int(10), Fix64::ZERO), Fix64::ONE);

        let mut sys = PhysicsSystem::new(PhysicsConfig::default());
        sys.execute(&mut world, &[]);

        assert!(world.collisions.get(a).map(|c| c.is_empty()).unwrap_or(true));
        assert!(world.collisions.get(b).map(|c| c.is_empty()).unwrap_or(true));
    }

    #[test]
    fn static_body_is_not_pushed() {
        let mut world = world_with_grid();
        let dyn_e = dynamic_circle(&mut world, FixVec2::new(Fix64::from_ratio(1, 2), Fix64::ZERO), Fix64::ONE);
        let static_e = dynamic_circle(&mut world, FixVec2::ZERO, Fix64::ONE);
        world.bodies.get_mut(static_e).unwrap().is_static = true;

        let mut sys = PhysicsSystem::new(PhysicsConfig::default());
        sys.execute(&mut world, &[]);

        assert_eq!(world.transforms.get(static_e).unwrap().position, FixVec2::ZERO);
        assert_ne!(world.transforms.get(dyn_e).unwrap().position.x, Fix64::from_ratio(1, 2));
    }

    #[test]
    fn trigger_records_but_does_not_separate() {
        let mut world = world_with_grid();
        let a = dynamic_circle(&mut world, FixVec2::ZERO, Fix64::ONE);
        let b = dynamic_circle(&mut world, FixVec2::new(Fix64::from_ratio(1, 2), Fix64::ZERO), Fix64::ONE);
        world.bodies.get_mut(a).unwrap().is_trigger = true;
        let pos_before = world.transforms.get(b).unwrap().position;

        let mut sys = PhysicsSystem::new(PhysicsConfig::default());
        sys.execute(&mut world, &[]);

        assert!(world.collisions.get(a).unwrap().contains(b));
        assert_eq!(world.transforms.get(b).unwrap().position, pos_before);
    }

    #[test]
    fn query_circle_finds_overlapping_entities_only() {
        let mut world = world_with_grid();
        let near = dynamic_circle(&mut world, FixVec2::new(Fix64::from_int(1), Fix64::ZERO), Fix64::from_ratio(1, 2));
        let far = dynamic_circle(&mut world, FixVec2::new(Fix64::from_int(50), Fix64::ZERO), Fix64::from_ratio(1, 2));

        let hits = query_circle(&world, FixVec2::ZERO, Fix64::from_int(2), LAYER_DEFAULT);
        assert!(hits.contains(&near));
        assert!(!hits.contains(&far));
    }
}
