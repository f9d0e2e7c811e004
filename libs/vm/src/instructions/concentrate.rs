//! Concentrated liquidity
//!
//! Adds virtual reserves to both balances so the curve trades as if the order
//! held more liquidity. The first trade adds the encoded deltas as-is. Later
//! trades scale them by `scale / initial_liquidity`, where `scale` is
//! `sqrt(virtual_in * virtual_out)` persisted after the previous trade.

use crate::context::ExecutionContext;
use crate::error::{VmError, VmResult};
use crate::state::Slot;
use crate::table::Instruction;
use swapvm_codec::ArgsReader;
use swapvm_math::{mul_div, sqrt_product, MathError, Rounding};
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcentrateArgs {
    pub delta_lt: u128,
    pub delta_gt: u128,
    pub initial_liquidity: u128,
}

impl ConcentrateArgs {
    pub fn parse(args: &[u8]) -> VmResult<Self> {
        let mut reader = ArgsReader::new(args);
        let delta_lt = reader.read_u128("delta_lt")?;
        let delta_gt = reader.read_u128("delta_gt")?;
        let initial_liquidity = reader.read_u128("initial_liquidity")?;
        reader.finish()?;
        if initial_liquidity == 0 {
            return Err(VmError::ZeroInitialLiquidity);
        }
        Ok(Self {
            delta_lt,
            delta_gt,
            initial_liquidity,
        })
    }

    /// Delta for one side under the current scale
    pub fn scaled(&self, delta: u128, scale: Slot<u128>) -> VmResult<u128> {
        match scale {
            Slot::Uninitialized => Ok(delta),
            Slot::Initialized(scale) => {
                Ok(mul_div(delta, scale, self.initial_liquidity, Rounding::Down)?)
            }
        }
    }
}

pub struct Concentrate;

impl Instruction for Concentrate {
    fn name(&self) -> &'static str {
        "Concentrate"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        ConcentrateArgs::parse(args).map(|_| ())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let params = ConcentrateArgs::parse(args)?;
        let (delta_in, delta_out) = if ctx.token_in < ctx.token_out {
            (params.delta_lt, params.delta_gt)
        } else {
            (params.delta_gt, params.delta_lt)
        };

        let scale = ctx.state().scale_slot();
        let (balance_in, balance_out) = ctx.balances()?;
        let virtual_in = balance_in
            .checked_add(params.scaled(delta_in, scale)?)
            .ok_or(MathError::overflow("virtual balance in"))?;
        let virtual_out = balance_out
            .checked_add(params.scaled(delta_out, scale)?)
            .ok_or(MathError::overflow("virtual balance out"))?;
        trace!(pc = ctx.pc(), virtual_in, virtual_out, "virtual liquidity");
        ctx.set_balances(virtual_in, virtual_out);

        ctx.run_remaining()?;

        let after_in = virtual_in
            .checked_add(ctx.amount_in)
            .ok_or(MathError::overflow("virtual balance in after swap"))?;
        let after_out = virtual_out
            .checked_sub(ctx.amount_out)
            .ok_or(MathError::overflow("virtual balance out after swap"))?;
        ctx.state_mut()
            .set_liquidity_scale(sqrt_product(after_in, after_out));
        Ok(())
    }
}
