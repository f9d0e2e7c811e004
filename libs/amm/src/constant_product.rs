//! Exact constant-product (x·y = k) formulas
//!
//! Rational arithmetic only, no kernel approximation: the ExactIn result is
//! floored and the ExactOut result ceiled, so both preserve the invariant.

use crate::curve::{CurveKind, SwapCurve};
use crate::error::{CurveError, CurveResult};
use swapvm_math::{div_wad, mul_div, Rounding};

/// Constant-product curve without fee
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantProduct;

impl ConstantProduct {
    /// `amount_out = balance_out · amount_in / (balance_in + amount_in)`
    pub fn output_for_input(
        balance_in: u128,
        balance_out: u128,
        amount_in: u128,
    ) -> CurveResult<u128> {
        if amount_in == 0 {
            return Ok(0);
        }
        if balance_in == 0 {
            return Err(CurveError::ZeroBalance { side: "input" });
        }

        let denominator = balance_in
            .checked_add(amount_in)
            .ok_or(swapvm_math::MathError::overflow("balance_in + amount_in"))?;
        Ok(mul_div(amount_in, balance_out, denominator, Rounding::Down)?)
    }

    /// `amount_in = balance_in · amount_out / (balance_out − amount_out)`
    pub fn input_for_output(
        balance_in: u128,
        balance_out: u128,
        amount_out: u128,
    ) -> CurveResult<u128> {
        if amount_out == 0 {
            return Ok(0);
        }
        if amount_out >= balance_out {
            return Err(CurveError::InsufficientOutput {
                amount_out,
                balance_out,
            });
        }
        if balance_in == 0 {
            return Err(CurveError::ZeroBalance { side: "input" });
        }

        Ok(mul_div(
            amount_out,
            balance_in,
            balance_out - amount_out,
            Rounding::Up,
        )?)
    }
}

impl SwapCurve for ConstantProduct {
    fn kind(&self) -> CurveKind {
        CurveKind::ConstantProduct
    }

    fn exact_in(&self, balance_in: u128, balance_out: u128, amount_in: u128) -> CurveResult<u128> {
        Self::output_for_input(balance_in, balance_out, amount_in)
    }

    fn exact_out(
        &self,
        balance_in: u128,
        balance_out: u128,
        amount_out: u128,
    ) -> CurveResult<u128> {
        Self::input_for_output(balance_in, balance_out, amount_out)
    }

    fn spot_price(&self, balance_in: u128, balance_out: u128) -> CurveResult<u128> {
        Ok(div_wad(balance_in, balance_out, Rounding::Up)?)
    }
}
