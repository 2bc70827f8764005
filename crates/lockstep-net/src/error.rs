//! Crate-local error type.

use thiserror::Error;

/// Errors surfaced by the prediction/rollback controller. Per spec.md §7,
/// classification outcomes (`Duplicate`, `*Gap`, `*Mismatch`) are not
/// errors -- they are handled states the controller acts on directly
/// ([`crate::classification::FrameClassification`]). Only genuinely
/// exceptional conditions reach this type.
#[derive(Debug, Error)]
pub enum NetError {
    /// The state machine halted while advancing `confirmed_world`. Fatal:
    /// per spec.md §7 this is reachable only by programmer error.
    #[error("determinism violation advancing confirmed world: {0}")]
    Determinism(#[from] lockstep_sim::SimError),

    /// Hashing or (de)serializing a world for diagnostics failed.
    #[error("failed to compute world state hash: {0}")]
    Snapshot(#[from] lockstep_ecs::EcsError),
}
