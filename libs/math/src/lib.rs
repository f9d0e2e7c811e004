//! # SwapVM Math - Fixed-Point Numerical Kernel
//!
//! ## Purpose
//!
//! Deterministic WAD (10^18) fixed-point arithmetic for swap pricing: natural
//! logarithm, natural exponent, arbitrary real powers, full-width scaled
//! multiplication and integer square roots. Every curve formula in
//! `swapvm-amm` and every numerical instruction in `swapvm` is built on these
//! functions.
//!
//! ## Integration Points
//!
//! - **Curve formulas**: `pow` drives the alpha power curve and the power /
//!   exponential density shapes
//! - **Instruction handlers**: `mul_div` for fee folding, liquidity scaling and
//!   supply-share predicates; `sqrt_product` for the liquidity invariant
//! - **Configuration and tests**: `from_decimal` / `to_decimal` bridge
//!   human-readable values
//!
//! ## Precision Profile
//!
//! - `ln`: error below a few units of 10^-18 absolute across the `i128` domain
//! - `exp`: relative error around 10^-16 before the final `2^k` shift
//! - `pow`: `exp ∘ ln` precision away from 1; within 1% of 1 a quadratic series
//!   that errs upward (in the protocol's favor for both swap directions)

pub mod error;
pub mod fixed;
pub mod log_exp;

pub use error::{MathError, MathResult};
pub use fixed::{
    div_wad, from_decimal, mul_div, mul_wad, sqrt, sqrt_product, to_decimal, Rounding, ONE,
    ONE_I, WAD_DECIMALS,
};
pub use log_exp::{exp, ln, pow, LN2, MAX_NATURAL_EXPONENT, MIN_NATURAL_EXPONENT, NEAR_ONE_BAND};

/// Common types re-exported for callers that convert configuration values
pub use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;
