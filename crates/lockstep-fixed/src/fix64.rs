//! [`Fix64`] -- a deterministic signed fixed-point scalar.
//!
//! Backed by a Q32.32 layout (32 integer bits, 32 fractional bits) stored as
//! a raw `i64`. Every operation is defined purely in terms of integer
//! arithmetic on that raw value, so two platforms that agree on `i64`/`i128`
//! two's-complement semantics (all of them, in Rust) produce bit-identical
//! results. No operation in this module ever routes through `f32`/`f64`
//! hardware instructions.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::tables::{ATAN_UNIT_RANGE, LUT_LEN, SIN_QUARTER_WAVE};

/// Number of fractional bits in the Q32.32 layout.
pub const FRAC_BITS: u32 = 32;

/// A deterministic signed 64-bit fixed-point number (Q32.32).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fix64(i64);

impl Fix64 {
    /// The additive identity.
    pub const ZERO: Fix64 = Fix64(0);
    /// The multiplicative identity.
    pub const ONE: Fix64 = Fix64(1i64 << FRAC_BITS);
    /// One half.
    pub const HALF: Fix64 = Fix64(1i64 << (FRAC_BITS - 1));
    /// Largest finite value. Also the division-by-zero / overflow sentinel.
    pub const MAX: Fix64 = Fix64(i64::MAX);
    /// Smallest finite value.
    pub const MIN: Fix64 = Fix64(i64::MIN + 1);
    /// Ratio of a circle's circumference to its diameter, Q32.32.
    pub const PI: Fix64 = Fix64(13_493_037_705);
    /// `PI / 2`.
    pub const HALF_PI: Fix64 = Fix64(6_746_518_852);
    /// `PI * 2`.
    pub const TWO_PI: Fix64 = Fix64(26_986_075_409);

    /// Construct from a raw Q32.32 representation.
    #[inline]
    pub const fn from_bits(raw: i64) -> Self {
        Fix64(raw)
    }

    /// The raw Q32.32 representation.
    #[inline]
    pub const fn to_bits(self) -> i64 {
        self.0
    }

    /// Construct from an integer (no fractional part).
    #[inline]
    pub const fn from_int(v: i32) -> Self {
        Fix64((v as i64) << FRAC_BITS)
    }

    /// Construct from a ratio of two integers, `num / den`, evaluated in
    /// fixed point (no float path). `den == 0` yields [`Fix64::MAX`].
    pub fn from_ratio(num: i64, den: i64) -> Self {
        if den == 0 {
            return Fix64::MAX;
        }
        let scaled = (num as i128) << FRAC_BITS;
        Fix64::saturate_i128(scaled / den as i128)
    }

    /// Construction helper for tests, tools, and one-time configuration
    /// loading (e.g. parsing a gravity constant out of a config file). Not
    /// used on the per-tick simulation path.
    pub fn from_num(v: f64) -> Self {
        let scaled = v * ((1i64 << FRAC_BITS) as f64);
        if !scaled.is_finite() {
            return if v.is_sign_negative() { Fix64::MIN } else { Fix64::MAX };
        }
        if scaled >= i64::MAX as f64 {
            Fix64::MAX
        } else if scaled <= i64::MIN as f64 {
            Fix64::MIN
        } else {
            Fix64(scaled.round() as i64)
        }
    }

    /// Convert to `f64`. Diagnostic/UI use only, never on the simulation path.
    pub fn to_num(self) -> f64 {
        self.0 as f64 / ((1i64 << FRAC_BITS) as f64)
    }

    #[inline]
    fn saturate_i128(v: i128) -> Fix64 {
        if v > i64::MAX as i128 {
            Fix64::MAX
        } else if v < i64::MIN as i128 {
            Fix64::MIN
        } else {
            Fix64(v as i64)
        }
    }

    /// Saturating addition.
    pub fn saturating_add(self, rhs: Fix64) -> Fix64 {
        Fix64::saturate_i128(self.0 as i128 + rhs.0 as i128)
    }

    /// Saturating subtraction.
    pub fn saturating_sub(self, rhs: Fix64) -> Fix64 {
        Fix64::saturate_i128(self.0 as i128 - rhs.0 as i128)
    }

    /// Saturating multiplication.
    pub fn saturating_mul(self, rhs: Fix64) -> Fix64 {
        let product = (self.0 as i128) * (rhs.0 as i128);
        Fix64::saturate_i128(product >> FRAC_BITS)
    }

    /// Division. Division by zero returns [`Fix64::MAX`] (sign of the
    /// sentinel follows the dividend's sign; zero dividend also yields
    /// `MAX`), per contract. This is a defined data value, not a panic.
    pub fn saturating_div(self, rhs: Fix64) -> Fix64 {
        if rhs.0 == 0 {
            return if self.0 < 0 { Fix64::MIN } else { Fix64::MAX };
        }
        let scaled = (self.0 as i128) << FRAC_BITS;
        Fix64::saturate_i128(scaled / rhs.0 as i128)
    }

    /// Absolute value.
    pub fn abs(self) -> Fix64 {
        if self.0 == i64::MIN {
            Fix64::MAX
        } else {
            Fix64(self.0.abs())
        }
    }

    /// `true` if this value is negative.
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Minimum of two values.
    pub fn min(self, other: Fix64) -> Fix64 {
        if self.0 <= other.0 { self } else { other }
    }

    /// Maximum of two values.
    pub fn max(self, other: Fix64) -> Fix64 {
        if self.0 >= other.0 { self } else { other }
    }

    /// Clamp into `[lo, hi]`.
    pub fn clamp(self, lo: Fix64, hi: Fix64) -> Fix64 {
        self.max(lo).min(hi)
    }

    /// Deterministic integer square root via Newton's method on the raw
    /// Q32.32 bits widened to `u128`. Negative input returns `ZERO` (no
    /// complex-number sentinel is part of the contract; callers are
    /// expected to only call this on non-negative magnitudes).
    pub fn sqrt(self) -> Fix64 {
        if self.0 <= 0 {
            return Fix64::ZERO;
        }
        // value = raw / 2^32; sqrt(value) * 2^32 = sqrt(raw * 2^32) = isqrt(raw << 32).
        let widened = (self.0 as u128) << FRAC_BITS;
        Fix64(isqrt_u128(widened) as i64)
    }

    /// Squared magnitude helper used by collision code to avoid a `sqrt`.
    pub fn squared(self) -> Fix64 {
        self.saturating_mul(self)
    }

    /// Sine of an angle in radians, table/interpolation based.
    pub fn sin(self) -> Fix64 {
        sin_lookup(self)
    }

    /// Cosine of an angle in radians, table/interpolation based.
    pub fn cos(self) -> Fix64 {
        sin_lookup(Fix64::HALF_PI.saturating_sub(self))
    }

    /// Four-quadrant arctangent, table/interpolation based. Returns a value
    /// in `(-PI, PI]`. `atan2(0, 0)` returns `ZERO` (defined sentinel, not a
    /// panic).
    pub fn atan2(y: Fix64, x: Fix64) -> Fix64 {
        if x.0 == 0 && y.0 == 0 {
            return Fix64::ZERO;
        }
        let ax = x.abs();
        let ay = y.abs();
        // atan of the ratio in [0, 1], swapping arguments beyond 45 degrees
        // to stay inside the table's domain, then reconstruct by octant.
        let base = if ay.0 <= ax.0 {
            atan_lookup(ay.saturating_div(ax.max(Fix64::from_bits(1))))
        } else {
            Fix64::HALF_PI.saturating_sub(atan_lookup(ax.saturating_div(ay.max(Fix64::from_bits(1)))))
        };
        match (x.0 >= 0, y.0 >= 0) {
            (true, true) => base,
            (true, false) => -base,
            (false, true) => Fix64::PI.saturating_sub(base),
            (false, false) => base.saturating_sub(Fix64::PI),
        }
    }
}

/// Deterministic `u128` integer square root (binary search on the result,
/// no floating point, terminates in at most 64 iterations).
fn isqrt_u128(value: u128) -> u128 {
    if value == 0 {
        return 0;
    }
    let mut lo: u128 = 0;
    let mut hi: u128 = 1u128 << 64;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if mid.checked_mul(mid).map(|sq| sq <= value).unwrap_or(false) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    lo
}

/// Look up `sin(angle)` by reducing `angle` into a single quarter wave and
/// linearly interpolating [`SIN_QUARTER_WAVE`].
fn sin_lookup(angle: Fix64) -> Fix64 {
    // Reduce to [0, TWO_PI) via fixed-point modulo.
    let mut a = angle.0 % Fix64::TWO_PI.0;
    if a < 0 {
        a += Fix64::TWO_PI.0;
    }
    let (quadrant, negate) = match () {
        _ if a < Fix64::HALF_PI.0 => (0, false),
        _ if a < Fix64::PI.0 => (1, false),
        _ if a < Fix64::PI.0 + Fix64::HALF_PI.0 => (2, true),
        _ => (3, true),
    };
    let within_quadrant = match quadrant {
        0 => a,
        1 => Fix64::PI.0 - a,
        2 => a - Fix64::PI.0,
        _ => Fix64::TWO_PI.0 - a,
    };
    let magnitude = quarter_wave_lookup(Fix64(within_quadrant));
    if negate { -magnitude } else { magnitude }
}

/// Linear interpolation over [`SIN_QUARTER_WAVE`] for `angle` in `[0, HALF_PI]`.
fn quarter_wave_lookup(angle: Fix64) -> Fix64 {
    let clamped = angle.clamp(Fix64::ZERO, Fix64::HALF_PI);
    let position = clamped.saturating_mul(Fix64::from_int((LUT_LEN - 1) as i32)).saturating_div(Fix64::HALF_PI);
    lerp_table(&SIN_QUARTER_WAVE, position)
}

/// Linear interpolation over [`ATAN_UNIT_RANGE`] for `ratio` in `[0, 1]`.
fn atan_lookup(ratio: Fix64) -> Fix64 {
    let clamped = ratio.clamp(Fix64::ZERO, Fix64::ONE);
    let position = clamped.saturating_mul(Fix64::from_int((LUT_LEN - 1) as i32));
    lerp_table(&ATAN_UNIT_RANGE, position)
}

/// Shared table interpolation: `position` is a Q32.32 fractional table
/// index; interpolate between the floor and ceil entries.
fn lerp_table(table: &[i64; LUT_LEN], position: Fix64) -> Fix64 {
    let index_fixed = position.0.max(0);
    let floor_index = ((index_fixed >> FRAC_BITS) as usize).min(LUT_LEN - 1);
    let ceil_index = (floor_index + 1).min(LUT_LEN - 1);
    let frac = Fix64(index_fixed & ((1i64 << FRAC_BITS) - 1));
    let lo = Fix64(table[floor_index]);
    let hi = Fix64(table[ceil_index]);
    lo.saturating_add(hi.saturating_sub(lo).saturating_mul(frac))
}

impl Add for Fix64 {
    type Output = Fix64;
    fn add(self, rhs: Fix64) -> Fix64 {
        self.saturating_add(rhs)
    }
}

impl AddAssign for Fix64 {
    fn add_assign(&mut self, rhs: Fix64) {
        *self = *self + rhs;
    }
}

impl Sub for Fix64 {
    type Output = Fix64;
    fn sub(self, rhs: Fix64) -> Fix64 {
        self.saturating_sub(rhs)
    }
}

impl SubAssign for Fix64 {
    fn sub_assign(&mut self, rhs: Fix64) {
        *self = *self - rhs;
    }
}

impl Mul for Fix64 {
    type Output = Fix64;
    fn mul(self, rhs: Fix64) -> Fix64 {
        self.saturating_mul(rhs)
    }
}

impl Div for Fix64 {
    type Output = Fix64;
    fn div(self, rhs: Fix64) -> Fix64 {
        self.saturating_div(rhs)
    }
}

impl Neg for Fix64 {
    type Output = Fix64;
    fn neg(self) -> Fix64 {
        if self.0 == i64::MIN { Fix64::MAX } else { Fix64(-self.0) }
    }
}

impl PartialOrd for Fix64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fix64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl fmt::Debug for Fix64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fix64({})", self.to_num())
    }
}

impl fmt::Display for Fix64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.to_num())
    }
}

impl Default for Fix64 {
    fn default() -> Self {
        Fix64::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_roundtrip() {
        let a = Fix64::from_num(3.5);
        let b = Fix64::from_num(1.25);
        assert!((a + b - b - a).to_num().abs() < 1e-9);
    }

    #[test]
    fn mul_div_identity() {
        let a = Fix64::from_num(7.0);
        let b = Fix64::from_num(2.0);
        let product = a * b;
        assert!((product.to_num() - 14.0).abs() < 1e-6);
        let quotient = product / b;
        assert!((quotient.to_num() - a.to_num()).abs() < 1e-6);
    }

    #[test]
    fn div_by_zero_returns_sentinel() {
        assert_eq!(Fix64::from_num(5.0) / Fix64::ZERO, Fix64::MAX);
        assert_eq!(Fix64::from_num(-5.0) / Fix64::ZERO, Fix64::MIN);
    }

    #[test]
    fn overflow_saturates() {
        let big = Fix64::MAX;
        assert_eq!(big.saturating_add(Fix64::ONE), Fix64::MAX);
        assert_eq!(Fix64::MIN.saturating_sub(Fix64::ONE), Fix64::MIN);
    }

    #[test]
    fn sqrt_matches_float_closely() {
        for v in [0.0, 1.0, 2.0, 4.0, 9.0, 100.0, 0.25, 0.01] {
            let fixed_result = Fix64::from_num(v).sqrt().to_num();
            let float_result = v.sqrt();
            assert!(
                (fixed_result - float_result).abs() < 1e-3,
                "sqrt({v}) fixed={fixed_result} float={float_result}"
            );
        }
    }

    #[test]
    fn sin_cos_match_float_closely() {
        for deg in (0..360).step_by(15) {
            let rad = (deg as f64).to_radians();
            let fixed_angle = Fix64::from_num(rad);
            assert!((fixed_angle.sin().to_num() - rad.sin()).abs() < 1e-3, "sin({deg})");
            assert!((fixed_angle.cos().to_num() - rad.cos()).abs() < 1e-3, "cos({deg})");
        }
    }

    #[test]
    fn atan2_matches_float_closely() {
        let cases = [
            (1.0, 1.0),
            (1.0, -1.0),
            (-1.0, -1.0),
            (-1.0, 1.0),
            (0.0, 1.0),
            (1.0, 0.0),
            (0.0, -1.0),
            (-1.0, 0.0),
        ];
        for (y, x) in cases {
            let fixed_result = Fix64::atan2(Fix64::from_num(y), Fix64::from_num(x)).to_num();
            let float_result = y.atan2(x);
            assert!(
                (fixed_result - float_result).abs() < 1e-2,
                "atan2({y}, {x}) fixed={fixed_result} float={float_result}"
            );
        }
    }

    #[test]
    fn atan2_zero_zero_is_defined() {
        assert_eq!(Fix64::atan2(Fix64::ZERO, Fix64::ZERO), Fix64::ZERO);
    }

    #[test]
    fn ordering_is_total() {
        let mut values = vec![Fix64::from_num(3.0), Fix64::from_num(-1.0), Fix64::from_num(0.0)];
        values.sort();
        assert_eq!(values[0], Fix64::from_num(-1.0));
        assert_eq!(values[2], Fix64::from_num(3.0));
    }

    /// `bincode` is the on-the-wire/snapshot encoding; this checks the same
    /// derive also round-trips through a human-readable encoder, which is
    /// what a config file or an ad-hoc debug dump would use.
    #[test]
    fn round_trips_through_json() {
        let value = Fix64::from_num(-12.375);
        let json = serde_json::to_string(&value).unwrap();
        let back: Fix64 = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
