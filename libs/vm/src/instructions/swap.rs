//! Swap instructions
//!
//! Each prices the trade from the running balances, writes the computed side
//! into the context and records its pc as the swap point. A walk may contain
//! at most one executed swap.

use crate::context::ExecutionContext;
use crate::error::VmResult;
use crate::table::Instruction;
use swapvm_amm::{DensityCurve, LimitPrice, PowerCurve, PriceCurve, Shape, SwapCurve};
use swapvm_codec::ArgsReader;
use swapvm_math::ONE;

/// Price with `curve`, then record the swap point
fn price_with(ctx: &mut ExecutionContext<'_>, curve: &dyn SwapCurve) -> VmResult<()> {
    ctx.ensure_no_swap()?;
    let (balance_in, balance_out) = ctx.balances()?;
    if ctx.exact_in {
        let amount_in = ctx.amount_in;
        let amount_out = curve.exact_in(balance_in, balance_out, amount_in)?;
        ctx.record_swap(amount_in, amount_out)
    } else {
        let amount_out = ctx.amount_out;
        let amount_in = curve.exact_out(balance_in, balance_out, amount_out)?;
        ctx.record_swap(amount_in, amount_out)
    }
}

/// Alpha power curve; empty args mean alpha = 1 (plain constant product)
pub struct ConstantProductSwap;

impl ConstantProductSwap {
    fn alpha(args: &[u8]) -> VmResult<u128> {
        if args.is_empty() {
            return Ok(ONE);
        }
        let mut reader = ArgsReader::new(args);
        let alpha = reader.read_u64("alpha")?;
        reader.finish()?;
        Ok(u128::from(alpha))
    }
}

impl Instruction for ConstantProductSwap {
    fn name(&self) -> &'static str {
        "ConstantProductSwap"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        PowerCurve::new(Self::alpha(args)?)?;
        Ok(())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let curve = PowerCurve::with_policy(Self::alpha(args)?, ctx.env().correction)?;
        price_with(ctx, &curve)
    }
}

/// Fixed rate: price of the lower-address token in the greater one
pub struct LimitSwap;

impl LimitSwap {
    fn parse(args: &[u8]) -> VmResult<LimitPrice> {
        let mut reader = ArgsReader::new(args);
        let price = reader.read_u128("token_lt_price")?;
        reader.finish()?;
        Ok(LimitPrice::new(price)?)
    }
}

impl Instruction for LimitSwap {
    fn name(&self) -> &'static str {
        "LimitSwap"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        Self::parse(args).map(|_| ())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let limit = Self::parse(args)?;
        ctx.ensure_no_swap()?;
        let (_, balance_out) = ctx.balances()?;
        let side = ctx.pair_side();
        if ctx.exact_in {
            let amount_in = ctx.amount_in;
            let amount_out = limit.exact_in(side, balance_out, amount_in)?;
            ctx.record_swap(amount_in, amount_out)
        } else {
            let amount_out = ctx.amount_out;
            let amount_in = limit.exact_out(side, balance_out, amount_out)?;
            ctx.record_swap(amount_in, amount_out)
        }
    }
}

/// Density/price curve over the order's remaining capacity
pub struct DensitySwap;

impl DensitySwap {
    fn parse(args: &[u8]) -> VmResult<DensityCurve> {
        let mut reader = ArgsReader::new(args);
        let base_price = reader.read_u128("base_price")?;
        let amplitude = reader.read_u64("amplitude")?;
        let capacity = reader.read_u128("capacity")?;
        let spread_bps = reader.read_u16("spread_bps")?;
        let shape = reader.read_u8("shape")?;
        let shape_param = reader.read_u64("shape_param")?;
        reader.finish()?;

        let shape = Shape::from_code(shape, u128::from(shape_param))?;
        let price = PriceCurve::new(base_price, u128::from(amplitude), shape)?;
        Ok(DensityCurve::new(price, capacity, u32::from(spread_bps))?)
    }
}

impl Instruction for DensitySwap {
    fn name(&self) -> &'static str {
        "DensitySwap"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        Self::parse(args).map(|_| ())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let curve = Self::parse(args)?.with_max_bisection_steps(ctx.env().max_bisection_steps);
        price_with(ctx, &curve)
    }
}
