//! WAD fixed-point primitives
//!
//! All amounts, prices, exponents and ratios handled by the engine are unsigned
//! integers scaled by `ONE = 10^18` ("WAD"). Intermediate products are carried
//! in 256 bits so that `a * b / d` never overflows before the division.
//!
//! ## Design Principles
//!
//! - **Explicit rounding**: every division states whether it floors or ceils
//! - **No silent wrap**: results wider than 128 bits are errors
//! - **Decimal boundary**: `rust_decimal` is used only to convert human-readable
//!   values (configuration, tests, logs) into WADs and back

use crate::error::{MathError, MathResult};
use primitive_types::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// 1.0 in WAD representation
pub const ONE: u128 = 1_000_000_000_000_000_000;

/// 1.0 in signed WAD representation
pub const ONE_I: i128 = ONE as i128;

/// Number of decimal places carried by a WAD
pub const WAD_DECIMALS: u32 = 18;

/// Rounding direction for divisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Toward zero (floor for unsigned values)
    Down,
    /// Away from zero when there is a remainder (ceiling for unsigned values)
    Up,
}

/// Compute `a * b / denominator` with a 256-bit intermediate product
///
/// This is the overflow-safe scaled multiplication used wherever one operand
/// may be as large as a token balance and the other a WAD factor.
pub fn mul_div(a: u128, b: u128, denominator: u128, rounding: Rounding) -> MathResult<u128> {
    if denominator == 0 {
        return Err(MathError::division_by_zero("mul_div"));
    }

    // Both factors are below 2^128, so the product always fits 256 bits
    let product = U256::from(a) * U256::from(b);
    let (mut quotient, remainder) = product.div_mod(U256::from(denominator));
    if rounding == Rounding::Up && !remainder.is_zero() {
        quotient = quotient + U256::one();
    }

    narrow(quotient, "mul_div result")
}

/// `a * b / ONE`
#[inline]
pub fn mul_wad(a: u128, b: u128, rounding: Rounding) -> MathResult<u128> {
    mul_div(a, b, ONE, rounding)
}

/// `a * ONE / b`
#[inline]
pub fn div_wad(a: u128, b: u128, rounding: Rounding) -> MathResult<u128> {
    mul_div(a, ONE, b, rounding)
}

/// Floor of `sqrt(a * b)`, exact for any pair of `u128` inputs
///
/// The root of a value below 2^256 is below 2^128, so this never fails.
pub fn sqrt_product(a: u128, b: u128) -> u128 {
    let product = U256::from(a) * U256::from(b);
    product.integer_sqrt().low_u128()
}

/// Floor of `sqrt(x)` for a single `u128`
pub fn sqrt(x: u128) -> u128 {
    U256::from(x).integer_sqrt().low_u128()
}

fn narrow(value: U256, context: &'static str) -> MathResult<u128> {
    if value.bits() > 128 {
        return Err(MathError::overflow(context));
    }
    Ok(value.low_u128())
}

/// Convert a WAD into a `Decimal` for display or logging
pub fn to_decimal(wad: u128) -> MathResult<Decimal> {
    let signed = i128::try_from(wad).map_err(|_| MathError::overflow("WAD to Decimal"))?;
    Decimal::try_from_i128_with_scale(signed, WAD_DECIMALS)
        .map_err(|_| MathError::overflow("WAD to Decimal"))
}

/// Convert a non-negative `Decimal` (e.g. `0.997`) into a WAD, truncating
/// digits beyond the 18th decimal place
pub fn from_decimal(value: Decimal) -> MathResult<u128> {
    if value.is_sign_negative() {
        return Err(MathError::InvalidDecimal {
            value: value.to_string(),
        });
    }

    value
        .checked_mul(Decimal::from(ONE as u64))
        .and_then(|scaled| scaled.trunc().to_u128())
        .ok_or_else(|| MathError::InvalidDecimal {
            value: value.to_string(),
        })
}
