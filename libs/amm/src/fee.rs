//! Basis-point fee and spread arithmetic
//!
//! Fees are deducted from the taker's input before an ExactIn curve solve and
//! folded back into the input after an ExactOut solve. The denominator
//! `BPS_DENOMINATOR - fee_bps` is only formed after `fee_bps` has been checked,
//! so a 100% fee is a typed error rather than a division fault.

use crate::error::{CurveError, CurveResult};
use swapvm_math::{mul_div, Rounding};

/// 100% in basis points
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Which side of the trade an amount belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Amount the taker pays; rounded up
    TakerPays,
    /// Amount the taker receives; rounded down
    TakerReceives,
}

/// Reject fees or spreads of 100% or more
pub fn validate_fee_bps(fee_bps: u32) -> CurveResult<()> {
    if fee_bps >= BPS_DENOMINATOR {
        return Err(CurveError::InvalidFee {
            fee_bps,
            denominator: BPS_DENOMINATOR,
        });
    }
    Ok(())
}

/// Split `amount` into `(net, fee)` with the fee rounded up
pub fn deduct_fee(amount: u128, fee_bps: u32) -> CurveResult<(u128, u128)> {
    validate_fee_bps(fee_bps)?;
    let fee = mul_div(amount, fee_bps as u128, BPS_DENOMINATOR as u128, Rounding::Up)?;
    Ok((amount - fee, fee))
}

/// Smallest gross amount whose net after `fee_bps` covers `net`
pub fn gross_up(net: u128, fee_bps: u32) -> CurveResult<u128> {
    validate_fee_bps(fee_bps)?;
    let denominator = (BPS_DENOMINATOR - fee_bps) as u128;
    Ok(mul_div(
        net,
        BPS_DENOMINATOR as u128,
        denominator,
        Rounding::Up,
    )?)
}

/// Widen `amount` by `spread_bps` in the protocol's favor
///
/// Amounts the taker pays grow and round up; amounts the taker receives
/// shrink and round down.
pub fn apply_spread(amount: u128, spread_bps: u32, side: Side) -> CurveResult<u128> {
    validate_fee_bps(spread_bps)?;
    let bps = BPS_DENOMINATOR as u128;
    let spread = spread_bps as u128;
    let result = match side {
        Side::TakerPays => mul_div(amount, bps + spread, bps, Rounding::Up)?,
        Side::TakerReceives => mul_div(amount, bps - spread, bps, Rounding::Down)?,
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deduct_fee_rounds_up() {
        // 0.3% of 1001 is 3.003, charged as 4
        assert_eq!(deduct_fee(1001, 30).unwrap(), (997, 4));
        assert_eq!(deduct_fee(1000, 30).unwrap(), (997, 3));
        assert_eq!(deduct_fee(0, 30).unwrap(), (0, 0));
    }

    #[test]
    fn test_gross_up_covers_net() {
        let gross = gross_up(997, 30).unwrap();
        assert_eq!(gross, 1000);
        let (net, _) = deduct_fee(gross, 30).unwrap();
        assert!(net >= 997);
    }

    #[test]
    fn test_full_fee_rejected() {
        assert_eq!(
            gross_up(100, BPS_DENOMINATOR),
            Err(CurveError::InvalidFee {
                fee_bps: BPS_DENOMINATOR,
                denominator: BPS_DENOMINATOR
            })
        );
        // One bps below 100% is finite
        assert_eq!(gross_up(100, BPS_DENOMINATOR - 1).unwrap(), 1_000_000);
    }

    #[test]
    fn test_spread_direction() {
        assert_eq!(apply_spread(1000, 50, Side::TakerPays).unwrap(), 1005);
        assert_eq!(apply_spread(1000, 50, Side::TakerReceives).unwrap(), 995);
        assert_eq!(apply_spread(1, 1, Side::TakerPays).unwrap(), 2);
        assert_eq!(apply_spread(1, 1, Side::TakerReceives).unwrap(), 0);
    }
}
