//! Errors raised by the fixed-point kernel
//!
//! Every failure mode of the kernel is a distinct variant so that callers
//! (curve formulas, instruction handlers) can surface a precise reason instead
//! of an arithmetic panic.

use thiserror::Error;

/// Fixed-point arithmetic failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MathError {
    /// Divisor was zero
    #[error("Division by zero in fixed-point arithmetic (context: {context})")]
    DivisionByZero { context: &'static str },

    /// Result does not fit the target integer width
    #[error("Arithmetic overflow (context: {context})")]
    Overflow { context: &'static str },

    /// `ln` is only defined for strictly positive inputs
    #[error("Natural log of non-positive value {value}")]
    LnOfNonPositive { value: i128 },

    /// `exp` argument above the representable range
    #[error("Natural exponent {exponent} exceeds maximum {max} (result would not fit)")]
    ExpOverflow { exponent: i128, max: i128 },

    /// Decimal input is negative or too large for a WAD
    #[error("Decimal value {value} cannot be represented as a WAD")]
    InvalidDecimal { value: String },
}

impl MathError {
    pub fn division_by_zero(context: &'static str) -> Self {
        Self::DivisionByZero { context }
    }

    pub fn overflow(context: &'static str) -> Self {
        Self::Overflow { context }
    }
}

/// Result type for kernel operations
pub type MathResult<T> = std::result::Result<T, MathError>;
