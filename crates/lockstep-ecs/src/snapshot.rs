//! [`WorldSnapshot`] -- a capturable, restorable, content-hashed copy of a
//! [`World`], used by the prediction controller for rollback and by the
//! replay/diagnostic tooling for desync detection.
//!
//! What *is* captured: every entity, every component store, the grid and
//! flow field singletons, and the entity allocator's cursor. What is
//! deliberately *not* captured: anything derived from the above at read
//! time (there is nothing in `World` that isn't authoritative state), and
//! nothing about wall-clock time or the host machine -- a snapshot taken
//! on one peer must restore identically on another.

use serde::{Deserialize, Serialize};

use crate::error::EcsError;
use crate::world::World;

const BINCODE_CONFIG: bincode::config::Configuration = bincode::config::standard();

/// An opaque, content-addressed capture of a [`World`] at one tick boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    bytes: Vec<u8>,
    hash: [u8; 32],
}

impl WorldSnapshot {
    /// Serialize `world` and record its content hash.
    pub fn capture(world: &World) -> Result<Self, EcsError> {
        let bytes = bincode::serde::encode_to_vec(world, BINCODE_CONFIG)
            .map_err(|e| EcsError::SnapshotEncode(e.to_string()))?;
        let hash = *blake3::hash(&bytes).as_bytes();
        Ok(WorldSnapshot { bytes, hash })
    }

    /// Reconstruct the captured [`World`], with component indices rebuilt.
    pub fn restore(&self) -> Result<World, EcsError> {
        let (mut world, _): (World, usize) =
            bincode::serde::decode_from_slice(&self.bytes, BINCODE_CONFIG)
                .map_err(|e| EcsError::SnapshotDecode(e.to_string()))?;
        world.rebuild_indices();
        Ok(world)
    }

    /// The BLAKE3 content hash of the encoded state, as used for
    /// cross-peer desync diagnostics (spec.md's `state_hash` notion).
    pub fn state_hash(&self) -> [u8; 32] {
        self.hash
    }

    /// Lower-hex rendering of [`Self::state_hash`], for log lines.
    pub fn state_hash_hex(&self) -> String {
        blake3::Hash::from(self.hash).to_hex().to_string()
    }

    /// Size of the encoded snapshot in bytes, for diagnostics.
    pub fn encoded_len(&self) -> usize {
        self.bytes.len()
    }
}

/// Hash a world's state without retaining the encoded bytes. Cheaper than
/// [`WorldSnapshot::capture`] when only the hash (not a restorable copy) is
/// needed, e.g. a per-tick desync checksum broadcast alongside input.
pub fn state_hash(world: &World) -> Result<[u8; 32], EcsError> {
    let bytes = bincode::serde::encode_to_vec(world, BINCODE_CONFIG)
        .map_err(|e| EcsError::SnapshotEncode(e.to_string()))?;
    Ok(*blake3::hash(&bytes).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Transform2D, HP};
    use lockstep_fixed::{Fix64, FixVec2};
    use std::collections::BTreeSet;

    fn sample_world() -> World {
        let grid = crate::components::GridMap {
            width: 16,
            height: 16,
            cell_size: Fix64::from_int(1),
            obstacles: BTreeSet::new(),
        };
        let mut world = World::new(grid);
        let e = world.spawn();
        world.transforms.set(e, Transform2D { position: FixVec2::from_num(1.0, 2.0) });
        world.hps.set(e, HP { current: 7, max: 10 });
        world
    }

    #[test]
    fn capture_and_restore_round_trips() {
        let world = sample_world();
        let snapshot = WorldSnapshot::capture(&world).unwrap();
        let restored = snapshot.restore().unwrap();

        assert_eq!(restored.entities(), world.entities());
        for e in world.entities() {
            assert_eq!(world.transforms.get(*e), restored.transforms.get(*e));
            assert_eq!(world.hps.get(*e), restored.hps.get(*e));
        }
        assert_eq!(restored.peek_next_entity_id(), world.peek_next_entity_id());
    }

    #[test]
    fn restored_store_indices_are_usable() {
        let world = sample_world();
        let snapshot = WorldSnapshot::capture(&world).unwrap();
        let mut restored = snapshot.restore().unwrap();
        let e = restored.entities()[0];
        restored.hps.get_mut(e).unwrap().current -= 1;
        assert_eq!(restored.hps.get(e).unwrap().current, 6);
    }

    #[test]
    fn identical_worlds_hash_identically() {
        let a = sample_world();
        let b = sample_world();
        assert_eq!(state_hash(&a).unwrap(), state_hash(&b).unwrap());
    }

    #[test]
    fn divergent_worlds_hash_differently() {
        let a = sample_world();
        let mut b = sample_world();
        let e = b.entities()[0];
        b.hps.get_mut(e).unwrap().current -= 1;
        assert_ne!(state_hash(&a).unwrap(), state_hash(&b).unwrap());
    }
}
