//! Entity identifiers and allocation.
//!
//! Unlike a generational allocator, [`EntityId`]s here are never recycled:
//! the data model's Invariant 3 (`next_entity_id` strictly monotonic, no two
//! simulation steps on identical `(S, I)` produce different IDs) and the
//! rollback controller's requirement that a restored snapshot reproduce
//! identical future IDs are both simpler to guarantee without a recycled
//! index space. An entity slot is freed from its component stores on
//! despawn, but its numeric ID is retired for good.

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// An opaque, non-zero, never-reused entity identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(NonZeroU32);

impl EntityId {
    /// Wrap a raw, non-zero ID. Returns `None` for `0`.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(EntityId)
    }

    /// The raw `u32` representation.
    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocates strictly increasing, never-recycled [`EntityId`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityAllocator {
    next: u32,
}

impl EntityAllocator {
    /// A fresh allocator; the first allocated ID is `1`.
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Allocate the next strictly-increasing [`EntityId`].
    ///
    /// # Panics
    ///
    /// Panics on exhaustion of the 32-bit ID space (2^32 - 1 entities
    /// created over the lifetime of a world). This is a
    /// [`crate::EcsError::DeterminismViolation`]-class condition in
    /// practice -- it cannot happen in any finite, bounded simulation and
    /// indicates a runaway spawn loop rather than a recoverable error.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId::new(self.next).expect("entity ID space exhausted");
        self.next = self
            .next
            .checked_add(1)
            .expect("entity ID space exhausted");
        id
    }

    /// The next ID that would be allocated. Exposed for snapshot capture.
    pub fn peek_next(&self) -> u32 {
        self.next
    }

    /// Restore allocator state from a snapshot's `next_entity_id`.
    pub fn restore(next: u32) -> Self {
        Self { next }
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
