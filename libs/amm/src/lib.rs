//! # SwapVM AMM Library - Swap Curve Formulas
//!
//! ## Purpose
//!
//! Pure ExactIn/ExactOut formulas for every curve a SwapVM program can select:
//! the fee-reinvesting alpha power curve, the exact constant product, a fixed
//! limit price and the density/price inventory curve. All functions are
//! stateless and work on WAD integers from `swapvm-math`.
//!
//! ## Integration Points
//!
//! - **Callers**: the swap and fee instructions in `swapvm`
//! - **Kernel**: `pow`, `ln`, `exp`, `mul_div` from `swapvm-math`
//! - **Tuning**: [`CorrectionPolicy`] and the bisection cap are supplied by
//!   the engine configuration
//!
//! ## Rounding Discipline
//!
//! - ExactIn outputs round down, ExactOut inputs round up
//! - Fees round up, spreads round toward the protocol
//! - A power-curve ExactOut answer is only returned once ExactIn of it covers
//!   the requested output; otherwise [`CurveError::NonConvergence`]

pub mod constant_product;
pub mod curve;
pub mod density;
pub mod error;
pub mod fee;
pub mod limit;
pub mod power_curve;

pub use constant_product::ConstantProduct;
pub use curve::{CurveKind, SwapCurve};
pub use density::{DensityCurve, PriceCurve, Shape, DEFAULT_MAX_BISECTION_STEPS};
pub use error::{CurveError, CurveResult};
pub use fee::{apply_spread, deduct_fee, gross_up, validate_fee_bps, Side, BPS_DENOMINATOR};
pub use limit::{LimitPrice, PairSide};
pub use power_curve::{CorrectionPolicy, PowerCurve, MAX_CORRECTION_ITERATIONS, MIN_CORRECTION_STEP};
