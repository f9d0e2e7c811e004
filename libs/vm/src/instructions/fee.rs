//! Fee instructions
//!
//! Fees wrap the rest of the program. An input fee shrinks the amount the
//! swap curve sees (ExactIn) or grosses up the input it computed (ExactOut).
//! An output fee is taken from the curve's output (ExactIn) or added to the
//! output the curve must produce (ExactOut). Fee amounts round up.

use crate::context::ExecutionContext;
use crate::error::{VmError, VmResult};
use crate::table::Instruction;
use swapvm_amm::{deduct_fee, gross_up, validate_fee_bps};
use swapvm_codec::{Address, ArgsReader};
use tracing::trace;

fn parse_fee_bps(args: &[u8]) -> VmResult<u32> {
    let mut reader = ArgsReader::new(args);
    let fee_bps = u32::from(reader.read_u16("fee_bps")?);
    reader.finish()?;
    validate_fee_bps(fee_bps)?;
    Ok(fee_bps)
}

fn charge_input(ctx: &mut ExecutionContext<'_>, fee_bps: u32) -> VmResult<()> {
    if ctx.exact_in {
        let gross = ctx.amount_in;
        let (net, fee) = deduct_fee(gross, fee_bps)?;
        trace!(pc = ctx.pc(), fee_bps, fee, "input fee");
        ctx.amount_in = net;
        ctx.run_remaining()?;
        ctx.amount_in = gross;
    } else {
        ctx.run_remaining()?;
        let net = ctx.amount_in;
        ctx.amount_in = gross_up(net, fee_bps)?;
        trace!(pc = ctx.pc(), fee_bps, fee = ctx.amount_in - net, "input fee");
    }
    Ok(())
}

fn charge_output(ctx: &mut ExecutionContext<'_>, fee_bps: u32) -> VmResult<()> {
    if ctx.exact_in {
        ctx.run_remaining()?;
        let (net, fee) = deduct_fee(ctx.amount_out, fee_bps)?;
        trace!(pc = ctx.pc(), fee_bps, fee, "output fee");
        ctx.amount_out = net;
    } else {
        let net = ctx.amount_out;
        let gross = gross_up(net, fee_bps)?;
        trace!(pc = ctx.pc(), fee_bps, fee = gross - net, "output fee");
        ctx.amount_out = gross;
        ctx.run_remaining()?;
        ctx.amount_out = net;
    }
    Ok(())
}

/// Flat fee in basis points charged on the input amount
pub struct FlatFeeAmountIn;

impl Instruction for FlatFeeAmountIn {
    fn name(&self) -> &'static str {
        "FlatFeeAmountIn"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        parse_fee_bps(args).map(|_| ())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let fee_bps = parse_fee_bps(args)?;
        charge_input(ctx, fee_bps)
    }
}

/// Flat fee in basis points charged on the output amount
pub struct FlatFeeAmountOut;

impl Instruction for FlatFeeAmountOut {
    fn name(&self) -> &'static str {
        "FlatFeeAmountOut"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        parse_fee_bps(args).map(|_| ())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let fee_bps = parse_fee_bps(args)?;
        charge_output(ctx, fee_bps)
    }
}

/// Input fee quoted by an external provider at execution time
pub struct DynamicFeeAmountIn;

impl DynamicFeeAmountIn {
    fn parse(args: &[u8]) -> VmResult<Address> {
        let mut reader = ArgsReader::new(args);
        let provider = reader.read_address("provider")?;
        reader.finish()?;
        Ok(provider)
    }
}

impl Instruction for DynamicFeeAmountIn {
    fn name(&self) -> &'static str {
        "DynamicFeeAmountIn"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        Self::parse(args).map(|_| ())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let provider = Self::parse(args)?;
        let query = ctx.fee_query();
        let fee_bps = ctx
            .env()
            .fee_provider
            .fee_bps(&provider, &query)
            .map_err(|err| VmError::external(provider, err.reason))?;
        validate_fee_bps(fee_bps)?;
        trace!(pc = ctx.pc(), %provider, fee_bps, "provider fee");
        charge_input(ctx, fee_bps)
    }
}
