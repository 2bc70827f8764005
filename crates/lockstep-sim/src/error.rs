//! Crate-local error type.

use thiserror::Error;

/// Errors surfaced by the simulation layer. Per spec.md §7, everything
/// except [`SimError::DeterminismViolation`] is handled locally by the
/// System that encountered it (skip the entity, no-op the System) and
/// never reaches this type -- `DeterminismViolation` is the one fatal
/// case, meant to halt the tick driver rather than be recovered from.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("determinism violation at tick {tick}: {detail}")]
    DeterminismViolation { tick: u64, detail: String },
}
