//! Balance instructions
//!
//! Both share the layout `n: u8` followed by `n` entries of
//! `(token: [u8; 20], amount: u128)`. `StaticBalances` prices every swap from
//! the encoded amounts. `DynamicBalances` seeds the order's tracked balances
//! from them on first use and then prices from, and updates, the tracked
//! values.

use crate::context::ExecutionContext;
use crate::error::{VmError, VmResult};
use crate::table::Instruction;
use swapvm_codec::{Address, ArgsReader};
use tracing::debug;

/// Parsed balance entries, at most 7 per instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceEntries(Vec<(Address, u128)>);

impl BalanceEntries {
    pub fn parse(args: &[u8]) -> VmResult<Self> {
        let mut reader = ArgsReader::new(args);
        let count = reader.read_u8("count")?;
        let mut entries: Vec<(Address, u128)> = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let token = reader.read_address("token")?;
            let amount = reader.read_u128("amount")?;
            if entries.iter().any(|(seen, _)| *seen == token) {
                return Err(VmError::DuplicateBalance { token });
            }
            entries.push((token, amount));
        }
        reader.finish()?;
        Ok(Self(entries))
    }

    pub fn get(&self, token: &Address) -> VmResult<u128> {
        self.0
            .iter()
            .find(|(candidate, _)| candidate == token)
            .map(|(_, amount)| *amount)
            .ok_or(VmError::TokenNotInBalances { token: *token })
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Address, u128)> {
        self.0.iter()
    }
}

pub struct StaticBalances;

impl Instruction for StaticBalances {
    fn name(&self) -> &'static str {
        "StaticBalances"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        BalanceEntries::parse(args).map(|_| ())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let entries = BalanceEntries::parse(args)?;
        let balance_in = entries.get(&ctx.token_in)?;
        let balance_out = entries.get(&ctx.token_out)?;
        ctx.set_balances(balance_in, balance_out);
        Ok(())
    }
}

pub struct DynamicBalances;

impl Instruction for DynamicBalances {
    fn name(&self) -> &'static str {
        "DynamicBalances"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        BalanceEntries::parse(args).map(|_| ())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let entries = BalanceEntries::parse(args)?;
        for (token, amount) in entries.iter() {
            if ctx.state_mut().init_balance(*token, *amount) {
                debug!(order = %ctx.order.hash, %token, amount, "tracked balance initialized");
            }
        }

        let (token_in, token_out) = (ctx.token_in, ctx.token_out);
        let balance_in = ctx.state().balance(&token_in)?;
        let balance_out = ctx.state().balance(&token_out)?;
        ctx.set_balances(balance_in, balance_out);

        ctx.run_remaining()?;

        let (amount_in, amount_out) = (ctx.amount_in, ctx.amount_out);
        ctx.state_mut().credit(&token_in, amount_in)?;
        ctx.state_mut().debit(&token_out, amount_out)?;
        Ok(())
    }
}
