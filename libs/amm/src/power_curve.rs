//! Alpha power curve: constant product with the fee reinvested in the exponent
//!
//! The curve keeps `balance_in^alpha · balance_out` constant, with `alpha ≤ 1`
//! (`alpha = 1 − fee rate`). Solving for the swap amounts gives
//!
//! ```text
//! ExactIn : amount_out = balance_out · (1 − (balance_in / (balance_in + amount_in))^alpha)
//! ExactOut: amount_in  = balance_in  · ((balance_out / (balance_out − amount_out))^(1/alpha) − 1)
//! ```
//!
//! Both powers come from the `ln`/`exp` kernel, which is an approximation. An
//! ExactOut answer is therefore only returned once feeding it back through
//! ExactIn yields at least the requested output; otherwise it is nudged upward
//! by a bounded correction loop.

use crate::constant_product::ConstantProduct;
use crate::curve::{CurveKind, SwapCurve};
use crate::error::{CurveError, CurveResult};
use serde::{Deserialize, Serialize};
use swapvm_math::{div_wad, mul_div, pow, MathError, Rounding, ONE};
use tracing::trace;

/// Default cap on ExactOut correction rounds
pub const MAX_CORRECTION_ITERATIONS: u32 = 32;

/// Default smallest increment added per correction round
pub const MIN_CORRECTION_STEP: u128 = 1;

/// Relative safety margin added to kernel powers (1e-14)
const POW_MARGIN_DIVISOR: u128 = 100_000_000_000_000;

/// Tuning for the ExactOut self-consistency loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionPolicy {
    pub max_iterations: u32,
    pub min_step: u128,
}

impl Default for CorrectionPolicy {
    fn default() -> Self {
        Self {
            max_iterations: MAX_CORRECTION_ITERATIONS,
            min_step: MIN_CORRECTION_STEP,
        }
    }
}

/// Power curve with exponent `alpha` in WAD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerCurve {
    alpha: u128,
    policy: CorrectionPolicy,
}

impl PowerCurve {
    pub fn new(alpha: u128) -> CurveResult<Self> {
        Self::with_policy(alpha, CorrectionPolicy::default())
    }

    pub fn with_policy(alpha: u128, policy: CorrectionPolicy) -> CurveResult<Self> {
        if alpha == 0 || alpha > ONE {
            return Err(CurveError::InvalidAlpha { alpha });
        }
        Ok(Self { alpha, policy })
    }

    pub fn alpha(&self) -> u128 {
        self.alpha
    }

    pub fn policy(&self) -> &CorrectionPolicy {
        &self.policy
    }

    /// Kernel power padded upward by a relative margin
    fn pow_up(base: u128, exponent: u128) -> CurveResult<u128> {
        let raw = pow(base, exponent)?;
        let margin = raw / POW_MARGIN_DIVISOR + 1;
        Ok(raw
            .checked_add(margin)
            .ok_or(MathError::overflow("power curve margin"))?)
    }

    fn output_for_input(
        &self,
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
        if self.alpha == ONE {
            return ConstantProduct::output_for_input(balance_in, balance_out, amount_in);
        }

        let denominator = balance_in
            .checked_add(amount_in)
            .ok_or(MathError::overflow("balance_in + amount_in"))?;
        let ratio = mul_div(balance_in, ONE, denominator, Rounding::Up)?;
        let retained = Self::pow_up(ratio, self.alpha)?.min(ONE);

        Ok(mul_div(balance_out, ONE - retained, ONE, Rounding::Down)?)
    }

    fn input_for_output(
        &self,
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
        if self.alpha == ONE {
            return ConstantProduct::input_for_output(balance_in, balance_out, amount_out);
        }

        let ratio = mul_div(balance_out, ONE, balance_out - amount_out, Rounding::Up)?;
        let inverse_alpha = mul_div(ONE, ONE, self.alpha, Rounding::Up)?;
        let growth = Self::pow_up(ratio, inverse_alpha)?.saturating_sub(ONE);
        let candidate = mul_div(balance_in, growth, ONE, Rounding::Up)?;

        self.correct(balance_in, balance_out, amount_out, candidate)
    }

    /// Raise `candidate` until ExactIn of it covers `amount_out`
    ///
    /// Each round adds the shortfall scaled by the observed input/output
    /// rate (a secant step), never less than `min_step`. While the candidate
    /// still produces nothing it is at least doubled.
    fn correct(
        &self,
        balance_in: u128,
        balance_out: u128,
        amount_out: u128,
        candidate: u128,
    ) -> CurveResult<u128> {
        let mut amount_in = candidate;
        let mut best = 0;

        for iteration in 0..=self.policy.max_iterations {
            let produced = self.output_for_input(balance_in, balance_out, amount_in)?;
            if produced >= amount_out {
                if iteration > 0 {
                    trace!(iteration, amount_in, amount_out, "ExactOut corrected");
                }
                return Ok(amount_in);
            }
            best = produced;

            let shortfall = amount_out - produced;
            let step = if produced > 0 {
                mul_div(shortfall, amount_in, produced, Rounding::Up)?
            } else {
                mul_div(shortfall, balance_in, balance_out, Rounding::Up)?.max(amount_in)
            };

            amount_in = amount_in
                .checked_add(step.max(self.policy.min_step))
                .ok_or(MathError::overflow("ExactOut correction"))?;
        }

        Err(CurveError::NonConvergence {
            iterations: self.policy.max_iterations,
            target: amount_out,
            best,
        })
    }
}

impl SwapCurve for PowerCurve {
    fn kind(&self) -> CurveKind {
        CurveKind::PowerCurve
    }

    fn exact_in(&self, balance_in: u128, balance_out: u128, amount_in: u128) -> CurveResult<u128> {
        self.output_for_input(balance_in, balance_out, amount_in)
    }

    fn exact_out(
        &self,
        balance_in: u128,
        balance_out: u128,
        amount_out: u128,
    ) -> CurveResult<u128> {
        self.input_for_output(balance_in, balance_out, amount_out)
    }

    /// `balance_in / (alpha · balance_out)`: the marginal input per output
    fn spot_price(&self, balance_in: u128, balance_out: u128) -> CurveResult<u128> {
        let price = div_wad(balance_in, balance_out, Rounding::Up)?;
        Ok(div_wad(price, self.alpha, Rounding::Up)?)
    }
}
