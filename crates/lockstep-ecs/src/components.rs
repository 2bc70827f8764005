//! The closed set of component kinds the core recognises (spec.md §3).
//!
//! Every type here is plain data, deep-`Clone`, and carries no reference to
//! an external runtime object -- only entity IDs and fixed-point values.

use lockstep_fixed::{Fix64, FixVec2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::entity::EntityId;

/// A 2D position in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    pub position: FixVec2,
}

/// Linear velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub v: FixVec2,
}

/// A bitset layer mask used by [`PhysicsBody::layer`] to decide whether two
/// bodies may collide (pairwise AND; non-zero result means "may collide").
pub type LayerMask = u32;

/// The default layer: collides with everything.
pub const LAYER_DEFAULT: LayerMask = u32::MAX;

/// Physical properties of a collidable entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsBody {
    pub mass: Fix64,
    pub is_static: bool,
    pub use_gravity: bool,
    pub is_trigger: bool,
    pub restitution: Fix64,
    pub friction: Fix64,
    pub linear_damping: Fix64,
    pub layer: LayerMask,
}

impl PhysicsBody {
    /// Inverse mass; static bodies have zero inverse mass regardless of
    /// their `mass` field (they absorb zero positional/impulse correction).
    pub fn inverse_mass(&self) -> Fix64 {
        if self.is_static || self.mass == Fix64::ZERO {
            Fix64::ZERO
        } else {
            Fix64::ONE / self.mass
        }
    }
}

/// Collision shape. Circle radius is a half-extent; box `size` is the full
/// extent (data-model Invariant 5). Boxes are axis-aligned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CollisionShape {
    Circle { radius: Fix64 },
    Box { size: FixVec2 },
}

impl CollisionShape {
    /// Half-extents of the shape's axis-aligned bounding box.
    pub fn half_extents(&self) -> FixVec2 {
        match *self {
            CollisionShape::Circle { radius } => FixVec2::new(radius, radius),
            CollisionShape::Box { size } => FixVec2::new(size.x / Fix64::from_int(2), size.y / Fix64::from_int(2)),
        }
    }
}

/// Maximum number of entities recorded per [`Collision`] bag (spec.md §3/§9).
pub const COLLISION_CAP: usize = 8;

/// Fixed-capacity, order-insensitive, duplicate-free bag of colliding
/// entity IDs. Overflow past [`COLLISION_CAP`] is silently dropped
/// (data-model Invariant 7 / `EcsError::OverflowingBag`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Collision {
    others: [Option<EntityId>; COLLISION_CAP],
    len: u8,
}

impl Collision {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `other`, if not already present and capacity remains.
    /// Returns `false` if the bag is full and `other` was dropped.
    pub fn insert(&mut self, other: EntityId) -> bool {
        if self.others[..self.len as usize].iter().any(|o| *o == Some(other)) {
            return true;
        }
        if (self.len as usize) >= COLLISION_CAP {
            return false;
        }
        self.others[self.len as usize] = Some(other);
        self.len += 1;
        true
    }

    pub fn contains(&self, other: EntityId) -> bool {
        self.others[..self.len as usize].iter().any(|o| *o == Some(other))
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.others[..self.len as usize].iter().filter_map(|o| *o)
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Structural multiset equality, ignoring insertion order.
    pub fn same_members_as(&self, other: &Collision) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|e| other.contains(e))
    }
}

/// Which weapon/placement mode a player is currently in.
pub type ModeIndex = u32;

/// Coarse player animation/control state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Normal,
    Stunned,
}

/// Per-player gameplay state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: u8,
    pub current_mode_index: ModeIndex,
    pub mode_count: ModeIndex,
    pub bullet_cooldown: u32,
    pub wall_cooldown: u32,
    pub barrel_cooldown: u32,
    pub hit_stun_timer: u32,
    pub state: PlayerState,
}

impl Player {
    /// Rotate to the next mode, wrapping at `mode_count`.
    pub fn toggle_mode(&mut self) {
        if self.mode_count == 0 {
            return;
        }
        self.current_mode_index = (self.current_mode_index + 1) % self.mode_count;
    }
}

/// Hit points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HP {
    pub current: i32,
    pub max: i32,
}

impl HP {
    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }
}

/// Why an entity died. A marker component: its mere presence triggers
/// `DeathSystem` teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathReason {
    Bullet,
    Explosion,
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Death {
    pub reason: DeathReason,
}

/// Knockback/hit-stun lockout: entity cannot act while `timer > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stiff {
    pub timer: u32,
}

/// A fired projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub owner_entity_id: EntityId,
    pub damage: i32,
}

/// Marker: this entity is a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wall;

/// Marker: this entity is a barrel (explodes on death).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barrel;

/// Transient marker: a wall is a trigger (non-solid) until its placer exits
/// the wall's expanded AABB, at which point `WallPlacementSystem` removes
/// this component and flips `PhysicsBody::is_trigger` to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallPlacement {
    pub placer_entity_id: EntityId,
}

/// Zombie AI state machine phase (spec.md §4.3 `ZombieAISystem`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZombieState {
    Chase,
    Windup,
    Strike,
    Cooldown,
}

/// A single A* waypoint.
pub type GridCell = (i32, i32);

/// Zombie pathfinding + melee-attack state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZombieAI {
    pub state: ZombieState,
    pub target_pos: FixVec2,
    pub move_speed: Fix64,
    pub path: Vec<GridCell>,
    pub path_index: usize,
    pub pathfinding_cooldown: u32,
    pub attack_windup_timer: u32,
    pub attack_windup_duration: u32,
    pub attack_cooldown_timer: u32,
    pub attack_cooldown_duration: u32,
    pub attack_range: Fix64,
    pub attack_damage: i32,
}

/// An expanding damage pulse, ticked by `ExplosionSystem` and applied to
/// every `HP`-bearing entity inside `radius` on expiry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub position: FixVec2,
    pub radius: Fix64,
    pub damage: i32,
    pub current_frame: u32,
    pub lifetime_frames: u32,
}

/// Singleton: the walkable grid and its registered obstacles.
///
/// `obstacles` is a `BTreeSet` (not a `HashSet`) so that iteration --
/// relevant to A* neighbour expansion and to snapshot serialization -- is
/// in the grid's canonical lexicographic `(x, y)` order, per spec.md §4.4's
/// tie-break rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMap {
    pub width: i32,
    pub height: i32,
    pub cell_size: Fix64,
    pub obstacles: BTreeSet<GridCell>,
}

impl GridMap {
    pub fn world_to_cell(&self, pos: FixVec2) -> GridCell {
        let cx = (pos.x / self.cell_size).to_bits() >> lockstep_fixed::FRAC_BITS;
        let cy = (pos.y / self.cell_size).to_bits() >> lockstep_fixed::FRAC_BITS;
        (cx as i32, cy as i32)
    }

    pub fn cell_center(&self, cell: GridCell) -> FixVec2 {
        let half = self.cell_size / Fix64::from_int(2);
        FixVec2::new(
            Fix64::from_int(cell.0) * self.cell_size + half,
            Fix64::from_int(cell.1) * self.cell_size + half,
        )
    }

    pub fn in_bounds(&self, cell: GridCell) -> bool {
        cell.0 >= 0 && cell.1 >= 0 && cell.0 < self.width && cell.1 < self.height
    }

    pub fn is_walkable(&self, cell: GridCell) -> bool {
        self.in_bounds(cell) && !self.obstacles.contains(&cell)
    }
}

/// Singleton (optional): a precomputed gradient field toward the nearest
/// player, recomputed by `FlowFieldSystem` when `update_cooldown` expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowField {
    pub width: i32,
    pub height: i32,
    /// Row-major `width * height` gradient vectors.
    pub gradient_field: Vec<FixVec2>,
    pub update_cooldown: u32,
}

impl FlowField {
    pub fn at(&self, cell: GridCell) -> Option<FixVec2> {
        if cell.0 < 0 || cell.1 < 0 || cell.0 >= self.width || cell.1 >= self.height {
            return None;
        }
        let idx = (cell.1 * self.width + cell.0) as usize;
        self.gradient_field.get(idx).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eid(n: u32) -> EntityId {
        EntityId::new(n).unwrap()
    }

    #[test]
    fn collision_bag_dedups() {
        let mut c = Collision::new();
        assert!(c.insert(eid(1)));
        assert!(c.insert(eid(1)));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn collision_bag_overflow_is_silently_dropped() {
        let mut c = Collision::new();
        for i in 1..=(COLLISION_CAP as u32 + 3) {
            c.insert(eid(i));
        }
        assert_eq!(c.len(), COLLISION_CAP);
        assert!(!c.contains(eid(COLLISION_CAP as u32 + 1)));
    }

    #[test]
    fn collision_bag_equality_is_order_insensitive() {
        let mut a = Collision::new();
        let mut b = Collision::new();
        a.insert(eid(1));
        a.insert(eid(2));
        b.insert(eid(2));
        b.insert(eid(1));
        assert!(a.same_members_as(&b));
    }

    #[test]
    fn static_body_has_zero_inverse_mass() {
        let body = PhysicsBody {
            mass: Fix64::from_int(5),
            is_static: true,
            use_gravity: false,
            is_trigger: false,
            restitution: Fix64::ZERO,
            friction: Fix64::ZERO,
            linear_damping: Fix64::ONE,
            layer: LAYER_DEFAULT,
        };
        assert_eq!(body.inverse_mass(), Fix64::ZERO);
    }

    #[test]
    fn player_toggle_wraps() {
        let mut p = Player {
            player_id: 0,
            current_mode_index: 2,
            mode_count: 3,
            bullet_cooldown: 0,
            wall_cooldown: 0,
            barrel_cooldown: 0,
            hit_stun_timer: 0,
            state: PlayerState::Normal,
        };
        p.toggle_mode();
        assert_eq!(p.current_mode_index, 0);
    }

    #[test]
    fn grid_map_cell_roundtrip() {
        let grid = GridMap { width: 10, height: 10, cell_size: Fix64::from_int(1), obstacles: BTreeSet::new() };
        let cell = (3, 4);
        let center = grid.cell_center(cell);
        assert_eq!(grid.world_to_cell(center), cell);
    }

    /// Components are `bincode`-encoded on the snapshot path, but a human-
    /// readable encoder is what a saved scenario fixture or a bug report
    /// dump would use, so the derive needs to round-trip through both.
    #[test]
    fn transform_round_trips_through_json() {
        let t = Transform2D { position: FixVec2::new(Fix64::from_int(3), Fix64::from_int(-7)) };
        let json = serde_json::to_string(&t).unwrap();
        let back: Transform2D = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
