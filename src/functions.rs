//! Built-in operators and functions.
//!
//! All math goes through `libm` so results are identical on the host and on the
//! microcontroller. Domain errors are never reported: out-of-range arguments give
//! NaN or infinity exactly as `libm` does, and division by zero gives `0`.

use libm::{
    acosf, acoshf, asinf, asinhf, atan2f, atanf, atanhf, ceilf, cosf, floorf, fmodf, powf,
    roundf, sinf, sqrtf, tanf, truncf,
};

use rand::{Rng, RngCore};

use crate::Real;
use crate::types::{BinOp, Func};

/// Boolean to the language's `1.0` / `0.0`.
#[inline]
fn truth(value: bool) -> Real {
    if value { 1.0 } else { 0.0 }
}

/// Truncate toward zero into an `i32`, saturating; NaN becomes `0`.
#[inline]
fn to_int(value: Real) -> i32 {
    value as i32
}

/// Left shift; counts outside `0..32` shift everything out.
pub fn shl(lhs: Real, rhs: Real) -> Real {
    let count = to_int(rhs);
    let value = u32::try_from(count)
        .ok()
        .and_then(|count| to_int(lhs).checked_shl(count))
        .unwrap_or(0);
    value as Real
}

/// Arithmetic right shift; counts outside `0..32` leave only the sign fill.
pub fn shr(lhs: Real, rhs: Real) -> Real {
    let value = to_int(lhs);
    let count = to_int(rhs);
    let shifted = u32::try_from(count)
        .ok()
        .and_then(|count| value.checked_shr(count))
        .unwrap_or(if value < 0 { -1 } else { 0 });
    shifted as Real
}

/// Division that yields `0` instead of infinity or NaN for a zero divisor.
pub fn div(lhs: Real, rhs: Real) -> Real {
    if rhs == 0.0 { 0.0 } else { lhs / rhs }
}

/// `sqrt(a² + b²)`.
pub fn hypot(a: Real, b: Real) -> Real {
    sqrtf(a * a + b * b)
}

/// Signed fractional part: `v - trunc(v)`, so `fract(-1.25) == -0.25`.
pub fn fract(value: Real) -> Real {
    value - truncf(value)
}

impl BinOp {
    /// Apply the operator to two evaluated operands.
    pub fn apply(self, lhs: Real, rhs: Real) -> Real {
        match self {
            BinOp::Pow => powf(lhs, rhs),
            BinOp::Mod => fmodf(lhs, rhs),
            BinOp::Add => lhs + rhs,
            BinOp::Sub => lhs - rhs,
            BinOp::Mul => lhs * rhs,
            BinOp::Div => div(lhs, rhs),
            BinOp::Shl => shl(lhs, rhs),
            BinOp::Shr => shr(lhs, rhs),
            BinOp::Le => truth(lhs <= rhs),
            BinOp::Ge => truth(lhs >= rhs),
            BinOp::Lt => truth(lhs < rhs),
            BinOp::Gt => truth(lhs > rhs),
            BinOp::Eq => truth(lhs == rhs),
            BinOp::Ne => truth(lhs != rhs),
            // Only exactly 1.0 counts as true
            BinOp::Or => truth(lhs == 1.0 || rhs == 1.0),
            BinOp::And => truth(lhs == 1.0 && rhs == 1.0),
            BinOp::BitOr => (to_int(lhs) | to_int(rhs)) as Real,
            BinOp::BitAnd => (to_int(lhs) & to_int(rhs)) as Real,
            BinOp::BitXor => (to_int(lhs) ^ to_int(rhs)) as Real,
        }
    }
}

impl Func {
    /// Apply the function to its evaluated arguments.
    ///
    /// Only the first `self.arity()` values of `args` are read. `rand` and
    /// `random` draw one value in `[0, 1)` from `rng`.
    pub fn apply<R: RngCore>(self, args: [Real; 2], rng: &mut R) -> Real {
        let [a, b] = args;
        match self {
            Func::Rand | Func::Random => rng.random(),
            Func::Sin => sinf(a),
            Func::Cos => cosf(a),
            Func::Tan => tanf(a),
            Func::Asin => asinf(a),
            Func::Acos => acosf(a),
            Func::Atan => atanf(a),
            Func::Atan2 => atan2f(a, b),
            Func::Asinh => asinhf(a),
            Func::Acosh => acoshf(a),
            Func::Atanh => atanhf(a),
            Func::Floor => floorf(a),
            Func::Ceil => ceilf(a),
            Func::Round => roundf(a),
            Func::Fract => fract(a),
            Func::Trunc => truncf(a),
            Func::Hypot => hypot(a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx_eq;
    use crate::constants::PI;
    use rand::SeedableRng;
    use rand_xorshift::XorShiftRng;

    fn call(func: Func, args: [Real; 2]) -> Real {
        func.apply(args, &mut XorShiftRng::seed_from_u64(1))
    }

    #[test]
    fn test_comparisons_are_exact_booleans() {
        assert_eq!(BinOp::Lt.apply(1.0, 2.0), 1.0);
        assert_eq!(BinOp::Gt.apply(1.0, 2.0), 0.0);
        assert_eq!(BinOp::Le.apply(2.0, 2.0), 1.0);
        assert_eq!(BinOp::Ge.apply(1.0, 2.0), 0.0);
        assert_eq!(BinOp::Eq.apply(0.5, 0.5), 1.0);
        assert_eq!(BinOp::Ne.apply(0.5, 0.5), 0.0);
        assert_eq!(BinOp::Eq.apply(Real::NAN, Real::NAN), 0.0);
        assert_eq!(BinOp::Ne.apply(Real::NAN, Real::NAN), 1.0);
    }

    #[test]
    fn test_logic_requires_exact_one() {
        assert_eq!(BinOp::And.apply(1.0, 1.0), 1.0);
        assert_eq!(BinOp::And.apply(2.0, 1.0), 0.0);
        assert_eq!(BinOp::And.apply(0.999, 1.0), 0.0);
        assert_eq!(BinOp::Or.apply(0.0, 1.0), 1.0);
        assert_eq!(BinOp::Or.apply(-1.0, 5.0), 0.0);
        assert_eq!(BinOp::Or.apply(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_integer_operators_truncate_toward_zero() {
        assert_eq!(BinOp::BitOr.apply(5.9, 2.2), 7.0);
        assert_eq!(BinOp::BitAnd.apply(6.7, 3.1), 2.0);
        assert_eq!(BinOp::BitXor.apply(-1.9, 0.0), -1.0);
        assert_eq!(BinOp::Shl.apply(1.0, 4.9), 16.0);
        assert_eq!(BinOp::Shr.apply(-16.0, 2.0), -4.0);
        assert_eq!(BinOp::Shr.apply(17.5, 1.0), 8.0);
        assert_eq!(BinOp::BitOr.apply(Real::NAN, 3.0), 3.0);
    }

    #[test]
    fn test_shift_counts_out_of_range() {
        assert_eq!(shl(1.0, 32.0), 0.0);
        assert_eq!(shl(1.0, -1.0), 0.0);
        assert_eq!(shr(-8.0, 40.0), -1.0);
        assert_eq!(shr(8.0, 40.0), 0.0);
        assert_eq!(shr(8.0, -2.0), 0.0);
    }

    #[test]
    fn test_division_and_modulo() {
        assert_eq!(BinOp::Div.apply(3.0, 0.0), 0.0);
        assert_eq!(BinOp::Div.apply(-3.0, -0.0), 0.0);
        assert_eq!(BinOp::Div.apply(3.0, 2.0), 1.5);
        assert_eq!(BinOp::Mod.apply(7.5, 2.0), 1.5);
        assert_eq!(BinOp::Mod.apply(-7.5, 2.0), -1.5);
        assert!(BinOp::Mod.apply(1.0, 0.0).is_nan());
    }

    #[test]
    fn test_power() {
        assert_eq!(BinOp::Pow.apply(2.0, 10.0), 1024.0);
        assert_eq!(BinOp::Pow.apply(4.0, 0.5), 2.0);
        assert!(BinOp::Pow.apply(-8.0, 1.0 / 3.0).is_nan());
    }

    #[test]
    fn test_functions() {
        assert_approx_eq!(call(Func::Sin, [PI / 2.0, 0.0]), 1.0);
        assert_approx_eq!(call(Func::Cos, [0.0, 0.0]), 1.0);
        assert_approx_eq!(call(Func::Atan2, [1.0, 0.0]), PI / 2.0);
        assert_eq!(call(Func::Hypot, [3.0, 4.0]), 5.0);
        assert_eq!(call(Func::Floor, [-1.5, 0.0]), -2.0);
        assert_eq!(call(Func::Ceil, [-1.5, 0.0]), -1.0);
        assert_eq!(call(Func::Round, [2.5, 0.0]), 3.0);
        assert_eq!(call(Func::Round, [-2.5, 0.0]), -3.0);
        assert_eq!(call(Func::Trunc, [-2.7, 0.0]), -2.0);
        assert_eq!(call(Func::Fract, [-1.25, 0.0]), -0.25);
        assert_eq!(call(Func::Fract, [3.75, 0.0]), 0.75);
        assert!(call(Func::Asin, [2.0, 0.0]).is_nan());
        assert!(call(Func::Acosh, [0.5, 0.0]).is_nan());
        assert!(call(Func::Atanh, [1.0, 0.0]).is_infinite());
    }

    #[test]
    fn test_random_functions_draw_from_source() {
        let mut a = XorShiftRng::seed_from_u64(5);
        let mut b = XorShiftRng::seed_from_u64(5);
        let first = Func::Rand.apply([9.0, 9.0], &mut a);
        assert!((0.0..1.0).contains(&first));
        assert_eq!(first, b.random::<Real>());
        assert_eq!(Func::Random.apply([0.0, 0.0], &mut a), b.random::<Real>());
    }
}
