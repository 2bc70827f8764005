//! [`FixVec2`] -- a 2D vector over [`Fix64`].

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::Fix64;

/// A deterministic 2D vector composed of two [`Fix64`] scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FixVec2 {
    pub x: Fix64,
    pub y: Fix64,
}

impl FixVec2 {
    pub const ZERO: FixVec2 = FixVec2 { x: Fix64::ZERO, y: Fix64::ZERO };

    pub const fn new(x: Fix64, y: Fix64) -> Self {
        FixVec2 { x, y }
    }

    /// Construction helper for tests/config loading; not on the sim path.
    pub fn from_num(x: f64, y: f64) -> Self {
        FixVec2 { x: Fix64::from_num(x), y: Fix64::from_num(y) }
    }

    pub fn dot(self, rhs: FixVec2) -> Fix64 {
        self.x * rhs.x + self.y * rhs.y
    }

    /// Squared length. Prefer this over `length()` when only a comparison
    /// is needed -- it avoids a `sqrt`.
    pub fn length_squared(self) -> Fix64 {
        self.dot(self)
    }

    pub fn length(self) -> Fix64 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction, or `(0, 0)` if this vector has
    /// zero magnitude (defined sentinel, not a panic).
    pub fn normalize(self) -> FixVec2 {
        let len = self.length();
        if len == Fix64::ZERO {
            return FixVec2::ZERO;
        }
        FixVec2 { x: self.x / len, y: self.y / len }
    }

    /// Perpendicular vector, rotated 90 degrees counter-clockwise.
    pub fn perpendicular(self) -> FixVec2 {
        FixVec2 { x: -self.y, y: self.x }
    }

    pub fn scale(self, s: Fix64) -> FixVec2 {
        FixVec2 { x: self.x * s, y: self.y * s }
    }
}

impl Add for FixVec2 {
    type Output = FixVec2;
    fn add(self, rhs: FixVec2) -> FixVec2 {
        FixVec2 { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl AddAssign for FixVec2 {
    fn add_assign(&mut self, rhs: FixVec2) {
        *self = *self + rhs;
    }
}

impl Sub for FixVec2 {
    type Output = FixVec2;
    fn sub(self, rhs: FixVec2) -> FixVec2 {
        FixVec2 { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl SubAssign for FixVec2 {
    fn sub_assign(&mut self, rhs: FixVec2) {
        *self = *self - rhs;
    }
}

impl Mul<Fix64> for FixVec2 {
    type Output = FixVec2;
    fn mul(self, rhs: Fix64) -> FixVec2 {
        self.scale(rhs)
    }
}

impl Neg for FixVec2 {
    type Output = FixVec2;
    fn neg(self) -> FixVec2 {
        FixVec2 { x: -self.x, y: -self.y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(FixVec2::ZERO.normalize(), FixVec2::ZERO);
    }

    #[test]
    fn normalize_unit_length() {
        let v = FixVec2::from_num(3.0, 4.0).normalize();
        let len = v.length().to_num();
        assert!((len - 1.0).abs() < 1e-3, "len={len}");
    }

    #[test]
    fn dot_orthogonal_is_zero() {
        let a = FixVec2::from_num(1.0, 0.0);
        let b = a.perpendicular();
        assert_eq!(a.dot(b), Fix64::ZERO);
    }

    #[test]
    fn add_sub_inverse() {
        let a = FixVec2::from_num(2.0, -3.0);
        let b = FixVec2::from_num(-1.0, 5.0);
        assert_eq!(a + b - b, a);
    }
}
