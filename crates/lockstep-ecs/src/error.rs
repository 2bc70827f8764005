//! Crate-local error type.

use thiserror::Error;

/// Errors surfaced by the ECS core. Gameplay `System`s generally don't
/// construct these directly -- they are produced by snapshot
/// encode/decode, which is the only fallible boundary in this crate.
#[derive(Debug, Error)]
pub enum EcsError {
    #[error("failed to encode world snapshot: {0}")]
    SnapshotEncode(String),

    #[error("failed to decode world snapshot: {0}")]
    SnapshotDecode(String),
}
