//! Time-decaying balance offsets
//!
//! After a trade the order remembers what it just received and paid out, and
//! those amounts fade linearly over `period` seconds. While they last, a trade
//! in the opposite direction sees the balances from before the earlier trade:
//! the input side gets back what was recently paid out of it and the output
//! side loses what was recently received into it, clamped at zero.

use crate::context::ExecutionContext;
use crate::error::{VmError, VmResult};
use crate::state::{clamp_balance, Direction};
use crate::table::Instruction;
use swapvm_codec::ArgsReader;
use swapvm_math::MathError;
use tracing::trace;

pub struct Decay;

impl Decay {
    fn parse(args: &[u8]) -> VmResult<u16> {
        let mut reader = ArgsReader::new(args);
        let period = reader.read_u16("period")?;
        reader.finish()?;
        if period == 0 {
            return Err(VmError::ZeroDecayPeriod);
        }
        Ok(period)
    }
}

impl Instruction for Decay {
    fn name(&self) -> &'static str {
        "Decay"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        Self::parse(args).map(|_| ())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let period = Self::parse(args)?;
        let now = ctx.env().clock.now();
        let (token_in, token_out) = (ctx.token_in, ctx.token_out);

        let restored_in = ctx.state().decay_offset(&token_in, Direction::Out, now)?;
        let received_out = ctx.state().decay_offset(&token_out, Direction::In, now)?;
        let (balance_in, balance_out) = ctx.balances()?;
        let adjusted_in = balance_in
            .checked_add(restored_in)
            .ok_or(MathError::overflow("decayed balance in"))?;
        let adjusted_out = clamp_balance(balance_out, received_out);
        trace!(pc = ctx.pc(), restored_in, received_out, "decay offsets applied");
        ctx.set_balances(adjusted_in, adjusted_out);

        ctx.run_remaining()?;

        let (amount_in, amount_out) = (ctx.amount_in, ctx.amount_out);
        let state = ctx.state_mut();
        state.add_decay(token_in, Direction::In, amount_in, now, period)?;
        state.add_decay(token_out, Direction::Out, amount_out, now, period)?;
        Ok(())
    }
}
