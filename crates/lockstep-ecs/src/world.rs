//! [`World`] -- the aggregate of every entity and component store.
//!
//! Rather than a type-erased archetype registry keyed by `TypeId`, `World`
//! holds one concretely-typed [`ComponentStore`] per component kind. The
//! set of kinds is closed (spec.md §3/§9): gameplay code never registers a
//! new component type at runtime, so there is nothing a reflective registry
//! would buy that a plain struct field doesn't give for free, at the cost
//! of an `unsafe` raw-buffer layer the archetype approach needs.

use serde::{Deserialize, Serialize};

use crate::components::{
    Barrel, Bullet, Collision, CollisionShape, Death, Explosion, FlowField, GridMap, Player,
    PhysicsBody, Stiff, Transform2D, Velocity, Wall, WallPlacement, ZombieAI, HP,
};
use crate::entity::{EntityAllocator, EntityId};
use crate::store::{self, ComponentStore};

/// The full simulation state at one tick boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    allocator: EntityAllocator,
    /// Every live entity, in creation order. This is the canonical order
    /// for "all entities" iteration (e.g. snapshot diffing, diagnostics);
    /// individual component queries iterate their own store's order.
    entities: Vec<EntityId>,

    pub transforms: ComponentStore<Transform2D>,
    pub velocities: ComponentStore<Velocity>,
    pub bodies: ComponentStore<PhysicsBody>,
    pub shapes: ComponentStore<CollisionShape>,
    pub collisions: ComponentStore<Collision>,
    pub players: ComponentStore<Player>,
    pub hps: ComponentStore<HP>,
    pub deaths: ComponentStore<Death>,
    pub stiffs: ComponentStore<Stiff>,
    pub bullets: ComponentStore<Bullet>,
    pub walls: ComponentStore<Wall>,
    pub barrels: ComponentStore<Barrel>,
    pub wall_placements: ComponentStore<WallPlacement>,
    pub zombie_ais: ComponentStore<ZombieAI>,
    pub explosions: ComponentStore<Explosion>,

    pub grid_map: GridMap,
    pub flow_field: Option<FlowField>,
}

impl World {
    /// A fresh, empty world over the given grid.
    pub fn new(grid_map: GridMap) -> Self {
        World {
            allocator: EntityAllocator::new(),
            entities: Vec::new(),
            transforms: ComponentStore::new(),
            velocities: ComponentStore::new(),
            bodies: ComponentStore::new(),
            shapes: ComponentStore::new(),
            collisions: ComponentStore::new(),
            players: ComponentStore::new(),
            hps: ComponentStore::new(),
            deaths: ComponentStore::new(),
            stiffs: ComponentStore::new(),
            bullets: ComponentStore::new(),
            walls: ComponentStore::new(),
            barrels: ComponentStore::new(),
            wall_placements: ComponentStore::new(),
            zombie_ais: ComponentStore::new(),
            explosions: ComponentStore::new(),
            grid_map,
            flow_field: None,
        }
    }

    /// Allocate a new entity and track it as live. Carries no components
    /// until the caller `set`s some on the relevant stores.
    pub fn spawn(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        self.entities.push(id);
        id
    }

    /// Remove an entity and every component it carries. Returns `false` if
    /// the entity was not live (already despawned, or never spawned in
    /// this world).
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let Some(row) = self.entities.iter().position(|&e| e == id) else {
            return false;
        };
        self.entities.remove(row);
        self.transforms.remove(id);
        self.velocities.remove(id);
        self.bodies.remove(id);
        self.shapes.remove(id);
        self.collisions.remove(id);
        self.players.remove(id);
        self.hps.remove(id);
        self.deaths.remove(id);
        self.stiffs.remove(id);
        self.bullets.remove(id);
        self.walls.remove(id);
        self.barrels.remove(id);
        self.wall_placements.remove(id);
        self.zombie_ais.remove(id);
        self.explosions.remove(id);
        true
    }

    /// `true` if `id` is currently live (spawned, not yet despawned).
    pub fn is_live(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }

    /// Every live entity, in creation order.
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// The next ID that `spawn` would allocate. Exposed for snapshot capture.
    pub fn peek_next_entity_id(&self) -> u32 {
        self.allocator.peek_next()
    }

    /// Deep-copy the whole world. Used by the prediction controller to take
    /// an independent, mutable working copy of a confirmed state.
    pub fn clone_world(&self) -> World {
        self.clone()
    }

    /// Replace this world's state with `source`'s, by value.
    pub fn restore_from(&mut self, source: &World) {
        *self = source.clone();
    }

    /// Rebuild every component store's `EntityId -> row` index. Must be
    /// called once after deserializing a `World` from bytes (the index is
    /// `#[serde(skip)]`, so a freshly-deserialized store has an empty one).
    pub fn rebuild_indices(&mut self) {
        store::rebuild_after_deserialize(&mut self.transforms);
        store::rebuild_after_deserialize(&mut self.velocities);
        store::rebuild_after_deserialize(&mut self.bodies);
        store::rebuild_after_deserialize(&mut self.shapes);
        store::rebuild_after_deserialize(&mut self.collisions);
        store::rebuild_after_deserialize(&mut self.players);
        store::rebuild_after_deserialize(&mut self.hps);
        store::rebuild_after_deserialize(&mut self.deaths);
        store::rebuild_after_deserialize(&mut self.stiffs);
        store::rebuild_after_deserialize(&mut self.bullets);
        store::rebuild_after_deserialize(&mut self.walls);
        store::rebuild_after_deserialize(&mut self.barrels);
        store::rebuild_after_deserialize(&mut self.wall_placements);
        store::rebuild_after_deserialize(&mut self.zombie_ais);
        store::rebuild_after_deserialize(&mut self.explosions);
    }
}
