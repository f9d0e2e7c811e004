//! Natural logarithm, natural exponent and power for WAD fixed-point numbers
//!
//! ## Algorithms
//!
//! - **ln**: halve/double the argument into `[1/√2, √2)` while accumulating
//!   `±ln 2`, then evaluate `ln(y) = 2·artanh((y−1)/(y+1))` with a fixed number
//!   of odd terms. Inside the band `|z| ≤ 0.1716`, so twelve terms leave a
//!   truncation error far below one WAD unit.
//! - **exp**: split `x = k·ln 2 + r` with `r ∈ [0, ln 2)`, evaluate `e^(r/2)`
//!   with a fixed Taylor series, square it, and reapply `2^k` by shifting.
//!   Halving the working radius lets sixteen terms converge to below one unit.
//! - **pow**: `exp(y · ln(x))`, with exact fast paths and a quadratic series for
//!   bases within `NEAR_ONE_BAND` of 1.
//!
//! All functions are pure and deterministic: identical inputs always produce
//! identical outputs, which quote/swap reproducibility depends on.

use crate::error::{MathError, MathResult};
use crate::fixed::{ONE, ONE_I};

/// ln(2) in WAD
pub const LN2: i128 = 693_147_180_559_945_309;

/// √2 in WAD, upper edge of the `ln` reduction band
pub const SQRT2: i128 = 1_414_213_562_373_095_048;

/// 1/√2 in WAD, lower edge of the `ln` reduction band
pub const HALF_SQRT2: i128 = 707_106_781_186_547_524;

/// Odd artanh terms summed by `ln`
pub const LN_SERIES_TERMS: i128 = 12;

/// Taylor terms summed by `exp`
pub const EXP_SERIES_TERMS: i128 = 16;

/// Largest argument accepted by `exp`; e^46 · 10^18 still fits `i128`
pub const MAX_NATURAL_EXPONENT: i128 = 46 * ONE_I;

/// Arguments below this saturate `exp` to zero (e^-42 · 10^18 < 1)
pub const MIN_NATURAL_EXPONENT: i128 = -42 * ONE_I;

/// Bases within this distance of `ONE` use the quadratic series in `pow`
pub const NEAR_ONE_BAND: u128 = ONE / 100;

/// Natural logarithm of a positive WAD
pub fn ln(x: i128) -> MathResult<i128> {
    if x <= 0 {
        return Err(MathError::LnOfNonPositive { value: x });
    }

    let mut k: i128 = 0;
    let mut y = x;
    while y >= SQRT2 {
        y /= 2;
        k += 1;
    }
    while y < HALF_SQRT2 {
        y *= 2;
        k -= 1;
    }

    // |y - 1| < 0.42, so the scaled numerator stays far below i128::MAX
    let z = (y - ONE_I) * ONE_I / (y + ONE_I);
    let z_squared = z * z / ONE_I;

    let mut term = z;
    let mut sum = z;
    for n in 1..LN_SERIES_TERMS {
        term = term * z_squared / ONE_I;
        sum += term / (2 * n + 1);
    }

    Ok(k * LN2 + 2 * sum)
}

/// Natural exponent of a signed WAD
///
/// Saturates to zero below `MIN_NATURAL_EXPONENT` and fails with
/// `ExpOverflow` above `MAX_NATURAL_EXPONENT`.
pub fn exp(x: i128) -> MathResult<i128> {
    if x < MIN_NATURAL_EXPONENT {
        return Ok(0);
    }
    if x > MAX_NATURAL_EXPONENT {
        return Err(MathError::ExpOverflow {
            exponent: x,
            max: MAX_NATURAL_EXPONENT,
        });
    }

    let k = x.div_euclid(LN2);
    let remainder = x - k * LN2;
    let half = remainder / 2;

    let mut term = ONE_I;
    let mut sum = ONE_I;
    for n in 1..=EXP_SERIES_TERMS {
        term = term * half / ONE_I / n;
        sum += term;
    }

    let reduced = sum * sum / ONE_I;

    if k >= 0 {
        reduced
            .checked_mul(1i128 << k)
            .ok_or(MathError::ExpOverflow {
                exponent: x,
                max: MAX_NATURAL_EXPONENT,
            })
    } else {
        Ok(reduced >> (-k) as u32)
    }
}

/// `base ^ exponent` for unsigned WADs
pub fn pow(base: u128, exponent: u128) -> MathResult<u128> {
    if exponent == 0 {
        // 0^0 resolves to one
        return Ok(ONE);
    }
    if base == 0 {
        return Ok(0);
    }
    if base == ONE {
        return Ok(ONE);
    }
    if exponent == ONE {
        return Ok(base);
    }
    if exponent <= 2 * ONE && base.abs_diff(ONE) <= NEAR_ONE_BAND {
        return Ok(pow_near_one(base, exponent));
    }

    let base = i128::try_from(base).map_err(|_| MathError::overflow("pow base"))?;
    let exponent = i128::try_from(exponent).map_err(|_| MathError::overflow("pow exponent"))?;

    let log = ln(base)?;
    let scaled = log
        .checked_mul(exponent)
        .ok_or(MathError::overflow("pow exponent * ln(base)"))?
        / ONE_I;

    let result = exp(scaled)?;
    // exp never returns a negative value
    Ok(result as u128)
}

/// Second-order binomial series `1 + y·d + y(y−1)/2·d²` with `d = base − 1`
///
/// Used where `ln`/`exp` composition would cancel most significant digits.
/// For `base < 1, y ≤ 1` and for `base > 1, 1 ≤ y ≤ 2` every omitted term has
/// the same sign, so the truncation overestimates the true power.
fn pow_near_one(base: u128, exponent: u128) -> u128 {
    let d = base as i128 - ONE_I;
    let y = exponent as i128;

    let linear = y * d / ONE_I;
    let coefficient = y * (y - ONE_I) / ONE_I / 2;
    let d_squared = d * d / ONE_I;
    let quadratic = coefficient * d_squared / ONE_I;

    (ONE_I + linear + quadratic) as u128
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_f64(wad: i128) -> f64 {
        wad as f64 / ONE_I as f64
    }

    fn assert_close(actual: i128, expected: f64, relative: f64) {
        let got = to_f64(actual);
        let error = ((got - expected) / expected).abs();
        assert!(
            error <= relative,
            "got {got}, expected {expected}, relative error {error}"
        );
    }

    #[test]
    fn test_ln_exact_points() {
        assert_eq!(ln(ONE_I).unwrap(), 0);
        assert!((ln(2 * ONE_I).unwrap() - LN2).abs() <= 10);
        assert!((ln(4 * ONE_I).unwrap() - 2 * LN2).abs() <= 10);
    }

    #[test]
    fn test_ln_against_float() {
        for &x in &[0.001_f64, 0.25, 0.9, 1.05, 3.0, 10.0, 12345.678, 1e15] {
            let wad = (x * 1e18) as i128;
            assert_close(ln(wad).unwrap(), x.ln(), 1e-12);
        }
    }

    #[test]
    fn test_ln_rejects_non_positive() {
        assert_eq!(ln(0), Err(MathError::LnOfNonPositive { value: 0 }));
        assert!(ln(-5).is_err());
    }

    #[test]
    fn test_exp_against_float() {
        for &x in &[-20.0_f64, -1.0, -0.1, 0.5, 1.0, 2.5, 10.0, 40.0] {
            let wad = (x * 1e18) as i128;
            assert_close(exp(wad).unwrap(), x.exp(), 1e-12);
        }
        assert_eq!(exp(0).unwrap(), ONE_I);
    }

    #[test]
    fn test_exp_bounds() {
        assert_eq!(exp(MIN_NATURAL_EXPONENT - 1).unwrap(), 0);
        assert_eq!(exp(MIN_NATURAL_EXPONENT).unwrap(), 0);
        // e^-41 · 10^18 ≈ 1.56, still one unit
        assert_eq!(exp(-41 * ONE_I).unwrap(), 1);
        assert!(exp(MAX_NATURAL_EXPONENT).is_ok());
        assert!(matches!(
            exp(MAX_NATURAL_EXPONENT + 1),
            Err(MathError::ExpOverflow { .. })
        ));
    }

    #[test]
    fn test_pow_fast_paths() {
        assert_eq!(pow(123, 0).unwrap(), ONE);
        assert_eq!(pow(0, ONE / 2).unwrap(), 0);
        assert_eq!(pow(ONE, 7 * ONE).unwrap(), ONE);
        assert_eq!(pow(5 * ONE, ONE).unwrap(), 5 * ONE);
        assert_eq!(pow(4 * ONE, ONE / 2).unwrap(), 2 * ONE);
    }

    #[test]
    fn test_pow_near_one_overestimates() {
        let base = ONE - ONE / 200; // 0.995
        let alpha = 997 * ONE / 1000;
        let approx = pow(base, alpha).unwrap();
        let exact = 0.995f64.powf(0.997);
        assert!(approx as f64 / 1e18 >= exact - 1e-15);
        assert_close(approx as i128, exact, 1e-7);
    }

    #[test]
    fn test_pow_general() {
        assert_close(pow(2 * ONE, 3 * ONE / 2).unwrap() as i128, 2f64.powf(1.5), 1e-12);
        assert_close(pow(ONE / 3, 7 * ONE / 10).unwrap() as i128, (1.0f64 / 3.0).powf(0.7), 1e-12);
    }
}
