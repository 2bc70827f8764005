//! Deterministic fixed-point math for the lockstep simulation.
//!
//! Every quantity that participates in the simulation step flows through
//! [`Fix64`] (a Q32.32 signed fixed-point scalar) and [`FixVec2`] (a pair of
//! `Fix64`s). No type in this crate contains or produces an `f32`/`f64` on
//! the simulation path: `sqrt`, `sin`, `cos`, and `atan2` are all
//! table/interpolation based over the integer representation, so two
//! platforms that agree on Rust's integer semantics agree bit-for-bit.
//!
//! Division by zero and arithmetic overflow are not panics -- they are
//! defined data values ([`Fix64::MAX`]/[`Fix64::MIN`]) per the simulation's
//! determinism contract.

mod fix64;
mod tables;
mod vec2;

pub use fix64::{Fix64, FRAC_BITS};
pub use vec2::FixVec2;
