//! Curve formula errors

use swapvm_math::MathError;
use thiserror::Error;

/// Failures raised while solving a swap curve
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// Requested output cannot be served from the available balance
    #[error("Insufficient output: requested {amount_out}, available {balance_out}")]
    InsufficientOutput { amount_out: u128, balance_out: u128 },

    /// Input-side balance is zero, every output would be free
    #[error("Zero {side} balance: curve is undefined")]
    ZeroBalance { side: &'static str },

    /// Curve exponent outside (0, ONE]
    #[error("Invalid alpha {alpha}: must satisfy 0 < alpha <= 1e18")]
    InvalidAlpha { alpha: u128 },

    /// Fee or spread at or above the basis-point denominator
    #[error("Invalid fee {fee_bps} bps: must be below {denominator}")]
    InvalidFee { fee_bps: u32, denominator: u32 },

    /// Fixed exchange rate of zero
    #[error("Invalid price: rate must be non-zero")]
    InvalidPrice,

    /// Density curve parameters out of range
    #[error("Invalid density shape {code} with parameter {parameter}: {reason}")]
    InvalidShape {
        code: u8,
        parameter: u128,
        reason: &'static str,
    },

    /// Normalized position outside [0, ONE]
    #[error("Invalid curve position {x}: must be within [0, 1e18]")]
    InvalidPosition { x: u128 },

    /// Range bounds out of order
    #[error("Invalid range [{x0}, {x1}]: start exceeds end")]
    InvalidRange { x0: u128, x1: u128 },

    /// Density curve capacity of zero
    #[error("Invalid capacity: density curve capacity must be non-zero")]
    ZeroCapacity,

    /// ExactOut correction or ExactIn search exceeded its iteration cap
    #[error("Could not converge after {iterations} iterations (target {target}, best {best})")]
    NonConvergence {
        iterations: u32,
        target: u128,
        best: u128,
    },

    /// Underlying fixed-point failure
    #[error(transparent)]
    Math(#[from] MathError),
}

/// Result type for curve operations
pub type CurveResult<T> = std::result::Result<T, CurveError>;
