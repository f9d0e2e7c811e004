//! Fixed-rate limit price
//!
//! The rate is the price of the lower-address token expressed in the
//! greater-address token (WAD). Which way it applies depends on which side of
//! the pair the taker sells.

use crate::error::{CurveError, CurveResult};
use swapvm_math::{mul_div, Rounding, ONE};

/// Direction of a trade relative to the pair's address ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    /// Taker sells the lower-address token
    SellLower,
    /// Taker sells the greater-address token
    SellGreater,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPrice {
    lower_price: u128,
}

impl LimitPrice {
    pub fn new(lower_price: u128) -> CurveResult<Self> {
        if lower_price == 0 {
            return Err(CurveError::InvalidPrice);
        }
        Ok(Self { lower_price })
    }

    pub fn lower_price(&self) -> u128 {
        self.lower_price
    }

    /// Output for `amount_in`, floored, capped by `balance_out`
    pub fn exact_in(&self, side: PairSide, balance_out: u128, amount_in: u128) -> CurveResult<u128> {
        let amount_out = match side {
            PairSide::SellLower => mul_div(amount_in, self.lower_price, ONE, Rounding::Down)?,
            PairSide::SellGreater => mul_div(amount_in, ONE, self.lower_price, Rounding::Down)?,
        };
        ensure_available(amount_out, balance_out)?;
        Ok(amount_out)
    }

    /// Input for `amount_out`, ceiled
    pub fn exact_out(
        &self,
        side: PairSide,
        balance_out: u128,
        amount_out: u128,
    ) -> CurveResult<u128> {
        ensure_available(amount_out, balance_out)?;
        let amount_in = match side {
            PairSide::SellLower => mul_div(amount_out, ONE, self.lower_price, Rounding::Up)?,
            PairSide::SellGreater => mul_div(amount_out, self.lower_price, ONE, Rounding::Up)?,
        };
        Ok(amount_in)
    }
}

fn ensure_available(amount_out: u128, balance_out: u128) -> CurveResult<()> {
    if amount_out > balance_out {
        return Err(CurveError::InsufficientOutput {
            amount_out,
            balance_out,
        });
    }
    Ok(())
}
