//! lockstep-ecs -- a deterministic, insertion-ordered Entity-Component-World
//! runtime for the lockstep simulation.
//!
//! Unlike an archetype-based ECS built for an open-ended, runtime-registered
//! component set, this crate serves a single, closed set of gameplay
//! component kinds (spec'd exhaustively in [`components`]). `World` holds one
//! concretely-typed [`store::ComponentStore`] per kind rather than a
//! type-erased registry: every store, and every multi-component query built
//! on top of them, iterates in strict insertion order, which is what makes
//! two peers that apply the same input history reach bit-identical state.
//!
//! # Quick Start
//!
//! ```
//! use lockstep_ecs::prelude::*;
//! use lockstep_fixed::FixVec2;
//! use std::collections::BTreeSet;
//!
//! let grid = GridMap { width: 16, height: 16, cell_size: lockstep_fixed::Fix64::ONE, obstacles: BTreeSet::new() };
//! let mut world = World::new(grid);
//! let e = world.spawn();
//! world.transforms.set(e, Transform2D { position: FixVec2::ZERO });
//! assert!(world.transforms.get(e).is_some());
//! ```

#![deny(unsafe_code)]

pub mod components;
pub mod entity;
mod error;
pub mod snapshot;
pub mod store;
pub mod world;

pub use error::EcsError;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::components::*;
    pub use crate::entity::{EntityAllocator, EntityId};
    pub use crate::snapshot::{state_hash, WorldSnapshot};
    pub use crate::store::ComponentStore;
    pub use crate::world::World;
    pub use crate::EcsError;
}
