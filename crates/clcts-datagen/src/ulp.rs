//! ULP distance between a test value and its reference, ported from the
//! original harness's error helpers.
//!
//! The error is `(test - reference)` expressed in units of the reference's
//! least significant bit, so a tolerance of `N` ulps accepts results within
//! `N` representable steps of the reference.

/// Base-2 exponent of a finite, non-zero `f64` (the `ilogb` of libm).
fn ilogb_f64(x: f64) -> i32 {
    let bits = x.abs().to_bits();
    let raw_exp = ((bits >> 52) & 0x7ff) as i32;
    if raw_exp != 0 {
        return raw_exp - 1023;
    }
    // Subnormal: locate the highest set mantissa bit.
    let mantissa = bits & 0x000f_ffff_ffff_ffff;
    let top_bit = 63 - mantissa.leading_zeros() as i32;
    top_bit - 1074
}

/// ULP error of an `f32` result against its reference.
///
/// Matching NaNs and exactly equal values (including `-0.0` vs `0.0`)
/// report zero. Any mismatch involving an infinity reports infinity.
pub fn ulp_error_f32(test: f32, reference: f32) -> f32 {
    let t = f64::from(test);
    let r = f64::from(reference);

    if test.is_nan() && reference.is_nan() {
        return 0.0;
    }
    if t == r {
        return 0.0;
    }
    if !t.is_finite() || !r.is_finite() {
        return f32::INFINITY;
    }

    // Exponent of one ulp of the reference; subnormal references clamp to
    // the smallest representable step of f32.
    let exp = if r == 0.0 { f32::MIN_EXP - 1 } else { ilogb_f64(r) };
    let ulp_exp = (exp - 23).max(-149);
    scale_by_exp2(t - r, -ulp_exp) as f32
}

/// ULP error of an `f64` result against its reference.
pub fn ulp_error_f64(test: f64, reference: f64) -> f64 {
    if test.is_nan() && reference.is_nan() {
        return 0.0;
    }
    if test == reference {
        return 0.0;
    }
    if !test.is_finite() || !reference.is_finite() {
        return f64::INFINITY;
    }

    let exp = if reference == 0.0 { f64::MIN_EXP - 1 } else { ilogb_f64(reference) };
    let ulp_exp = (exp - 52).max(-1074);
    // The scaled difference can lose a few low bits for wide exponents;
    // the original harness accepts the same rounding.
    scale_by_exp2(test - reference, -ulp_exp)
}

/// `d * 2^e` without overflowing the intermediate scale factor.
fn scale_by_exp2(d: f64, e: i32) -> f64 {
    if e > 1023 {
        d * 2f64.powi(1023) * 2f64.powi(e - 1023)
    } else if e < -1023 {
        d * 2f64.powi(-1023) * 2f64.powi(e + 1023)
    } else {
        d * 2f64.powi(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equal_values_are_zero_ulps() {
        assert_eq!(ulp_error_f32(1.5, 1.5), 0.0);
        assert_eq!(ulp_error_f64(-2.25, -2.25), 0.0);
    }

    #[test]
    fn signed_zeros_match() {
        assert_eq!(ulp_error_f32(-0.0, 0.0), 0.0);
    }

    #[test]
    fn nan_matches_nan() {
        assert_eq!(ulp_error_f32(f32::NAN, f32::NAN), 0.0);
        assert_eq!(ulp_error_f64(f64::NAN, f64::NAN), 0.0);
    }

    #[test]
    fn one_step_is_one_ulp() {
        let next = f32::from_bits(1.0f32.to_bits() + 1);
        assert_eq!(ulp_error_f32(next, 1.0), 1.0);

        let next64 = f64::from_bits(1.0f64.to_bits() + 1);
        assert_eq!(ulp_error_f64(next64, 1.0), 1.0);
    }

    #[test]
    fn step_below_one_is_half_an_ulp() {
        // 1.0 - eps/2 is the value one representable step below 1.0, which
        // is half an ulp of 1.0 away.
        let below = f32::from_bits(1.0f32.to_bits() - 1);
        assert_eq!(ulp_error_f32(below, 1.0), -0.5);
    }

    #[test]
    fn infinity_mismatch_is_infinite() {
        assert_eq!(ulp_error_f32(f32::INFINITY, 1.0), f32::INFINITY);
        assert_eq!(ulp_error_f32(1.0, f32::INFINITY), f32::INFINITY);
    }

    #[test]
    fn matching_infinities_are_zero() {
        assert_eq!(ulp_error_f32(f32::INFINITY, f32::INFINITY), 0.0);
        assert_eq!(ulp_error_f64(f64::NEG_INFINITY, f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn subnormal_reference_uses_smallest_step() {
        let tiny = f32::from_bits(1); // smallest positive subnormal
        assert_eq!(ulp_error_f32(f32::from_bits(2), tiny), 1.0);
    }

    proptest! {
        #[test]
        fn self_comparison_is_always_zero(x in proptest::num::f32::ANY) {
            prop_assert_eq!(ulp_error_f32(x, x), 0.0);
        }

        #[test]
        fn adjacent_finite_values_are_within_one_ulp(
            bits in 0u32..0x7f7f_ffff
        ) {
            let r = f32::from_bits(bits);
            let t = f32::from_bits(bits + 1);
            prop_assume!(r.is_finite() && t.is_finite());
            let e = ulp_error_f32(t, r).abs();
            prop_assert!(e > 0.0 && e <= 1.0, "error {} for bits {:#x}", e, bits);
        }
    }
}
