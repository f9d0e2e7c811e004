//! Unified curve interface used by the swap instructions

use crate::error::CurveResult;

/// Family of the curve, for logging and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    ConstantProduct,
    PowerCurve,
    Density,
}

/// A swap curve solvable in both directions
///
/// Prices are expressed as WAD amounts of the input token per unit of the
/// output token.
pub trait SwapCurve {
    fn kind(&self) -> CurveKind;

    /// Output for a fixed input, rounded down
    fn exact_in(&self, balance_in: u128, balance_out: u128, amount_in: u128) -> CurveResult<u128>;

    /// Input for a fixed output, rounded up
    fn exact_out(&self, balance_in: u128, balance_out: u128, amount_out: u128)
        -> CurveResult<u128>;

    /// Marginal price at the current balances
    fn spot_price(&self, balance_in: u128, balance_out: u128) -> CurveResult<u128>;
}
