// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.

/// Round half-up, i.e. `floor(x + 0.5)`.
///
/// Exposure-count and pixel-count corrections use this everywhere, matching
/// the legacy numeric convention; `f64::round` differs for negative
/// half-way values.
#[inline]
pub(crate) fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// The error function, via the Abramowitz & Stegun 7.1.26 rational
/// approximation. Maximum absolute error 1.5e-7, which is far below the
/// tolerances used anywhere flux fractions matter.
pub(crate) fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    sign * y
}

/// Is `x` within `tol` of an integer?
#[inline]
pub(crate) fn is_near_integer(x: f64, tol: f64) -> bool {
    (x - round_half_up(x)).abs() < tol
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn round_half_up_matches_legacy_convention() {
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(1.4999), 1.0);
        assert_eq!(round_half_up(1.5), 2.0);
        assert_eq!(round_half_up(2.5), 3.0);
        // Negative half-way values round up, not away from zero.
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.5), -1.0);
    }

    #[test]
    fn erf_reference_values() {
        assert_abs_diff_eq!(erf(0.0), 0.0, epsilon = 1e-7);
        assert_abs_diff_eq!(erf(0.5), 0.5204999, epsilon = 2e-7);
        assert_abs_diff_eq!(erf(1.0), 0.8427008, epsilon = 2e-7);
        assert_abs_diff_eq!(erf(2.0), 0.9953223, epsilon = 2e-7);
        assert_abs_diff_eq!(erf(-1.0), -0.8427008, epsilon = 2e-7);
        assert!(erf(5.0) > 0.999999);
    }

    #[test]
    fn near_integer() {
        assert!(is_near_integer(3.0, 1e-6));
        assert!(is_near_integer(2.9999999, 1e-6));
        assert!(!is_near_integer(2.5, 1e-6));
        assert!(!is_near_integer(3.01, 1e-6));
    }
}
