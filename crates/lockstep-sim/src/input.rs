//! Per-tick input: the only non-deterministic-looking data the pipeline
//! consumes, and even that is supplied by the host, never sampled.

use lockstep_fixed::Fix64;
use serde::{Deserialize, Serialize};

/// One of the eight movement directions, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    None,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// Unit vector for this direction; diagonals are scaled by
    /// `sqrt(2)/2` so every direction has unit length (spec.md §4.3 step 5).
    pub fn unit_vector(self) -> lockstep_fixed::FixVec2 {
        use lockstep_fixed::FixVec2;
        let diag = Fix64::from_ratio(70_710_678, 100_000_000); // sqrt(2)/2, precomputed offline
        match self {
            Direction::None => FixVec2::ZERO,
            Direction::Up => FixVec2::new(Fix64::ZERO, Fix64::ONE),
            Direction::Down => FixVec2::new(Fix64::ZERO, -Fix64::ONE),
            Direction::Left => FixVec2::new(-Fix64::ONE, Fix64::ZERO),
            Direction::Right => FixVec2::new(Fix64::ONE, Fix64::ZERO),
            Direction::UpLeft => FixVec2::new(-diag, diag),
            Direction::UpRight => FixVec2::new(diag, diag),
            Direction::DownLeft => FixVec2::new(-diag, -diag),
            Direction::DownRight => FixVec2::new(diag, -diag),
        }
    }
}

/// One player's input for a single tick.
///
/// `fire_x`/`fire_y` carry the raw `Fix64` bit pattern of the fire target
/// (spec.md §6): they are only meaningful when `is_fire` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub player_id: u8,
    pub direction: Direction,
    pub is_fire: bool,
    pub fire_x: Fix64,
    pub fire_y: Fix64,
    pub is_toggle: bool,
}

/// The ordered list of per-player inputs for one simulation tick.
pub type FrameData = Vec<PlayerInput>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_directions_are_unit_length() {
        for dir in [Direction::UpLeft, Direction::UpRight, Direction::DownLeft, Direction::DownRight] {
            let v = dir.unit_vector();
            let len = v.length().to_num();
            assert!((len - 1.0).abs() < 1e-3, "{dir:?} length={len}");
        }
    }

    #[test]
    fn none_direction_is_zero() {
        assert_eq!(Direction::None.unit_vector(), lockstep_fixed::FixVec2::ZERO);
    }

    #[test]
    fn inputs_compare_element_wise() {
        let a = PlayerInput {
            player_id: 0,
            direction: Direction::Up,
            is_fire: false,
            fire_x: Fix64::ZERO,
            fire_y: Fix64::ZERO,
            is_toggle: false,
        };
        let mut b = a;
        b.direction = Direction::Down;
        assert_ne!(a, b);
        assert_eq!(a, a);
    }
}
