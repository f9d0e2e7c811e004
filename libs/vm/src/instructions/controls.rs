//! Control instructions: predicates, forward jumps, salt

use crate::context::{check_jump, ExecutionContext};
use crate::error::{VmError, VmResult};
use crate::table::Instruction;
use swapvm_codec::{Address, ArgsReader};
use swapvm_math::{mul_div, Rounding, ONE};

/// Fails once the clock passes `deadline`
pub struct Deadline;

impl Deadline {
    fn parse(args: &[u8]) -> VmResult<u64> {
        let mut reader = ArgsReader::new(args);
        let deadline = reader.read_u64("deadline")?;
        reader.finish()?;
        Ok(deadline)
    }
}

impl Instruction for Deadline {
    fn name(&self) -> &'static str {
        "Deadline"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        Self::parse(args).map(|_| ())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let deadline = Self::parse(args)?;
        let now = ctx.env().clock.now();
        if now > deadline {
            return Err(VmError::DeadlineExpired { deadline, now });
        }
        Ok(())
    }
}

fn parse_token_amount(args: &[u8]) -> VmResult<(Address, u128)> {
    let mut reader = ArgsReader::new(args);
    let token = reader.read_address("token")?;
    let min = reader.read_u128("min")?;
    reader.finish()?;
    Ok((token, min))
}

/// Taker must hold at least `min` of `token`
pub struct OnlyTakerBalanceGte;

impl Instruction for OnlyTakerBalanceGte {
    fn name(&self) -> &'static str {
        "OnlyTakerBalanceGte"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        parse_token_amount(args).map(|_| ())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let (token, min) = parse_token_amount(args)?;
        let balance = ctx
            .env()
            .ledger
            .balance_of(&token, &ctx.taker)
            .map_err(|err| VmError::external(token, err.reason))?;
        if balance < min {
            return Err(VmError::TakerBalanceTooLow {
                token,
                balance,
                min,
            });
        }
        Ok(())
    }
}

/// Taker must hold at least `min_share` (WAD) of `token`'s total supply
pub struct OnlyTakerSupplyShareGte;

impl OnlyTakerSupplyShareGte {
    fn parse(args: &[u8]) -> VmResult<(Address, u64)> {
        let mut reader = ArgsReader::new(args);
        let token = reader.read_address("token")?;
        let min_share = reader.read_u64("min_share")?;
        reader.finish()?;
        if u128::from(min_share) > ONE {
            return Err(VmError::InvalidMinShare { min_share });
        }
        Ok((token, min_share))
    }
}

impl Instruction for OnlyTakerSupplyShareGte {
    fn name(&self) -> &'static str {
        "OnlyTakerSupplyShareGte"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        Self::parse(args).map(|_| ())
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let (token, min_share) = Self::parse(args)?;
        let ledger = ctx.env().ledger;
        let balance = ledger
            .balance_of(&token, &ctx.taker)
            .map_err(|err| VmError::external(token, err.reason))?;
        let supply = ledger
            .total_supply(&token)
            .map_err(|err| VmError::external(token, err.reason))?;

        let share = if supply == 0 {
            0
        } else {
            mul_div(balance, ONE, supply, Rounding::Down)?
        };
        if share < u128::from(min_share) {
            return Err(VmError::TakerShareTooLow {
                token,
                share,
                min_share,
            });
        }
        Ok(())
    }
}

/// Unconditional forward jump
pub struct Jump;

impl Jump {
    fn parse(args: &[u8]) -> VmResult<usize> {
        let mut reader = ArgsReader::new(args);
        let target = reader.read_u16("target")?;
        reader.finish()?;
        Ok(usize::from(target))
    }
}

impl Instruction for Jump {
    fn name(&self) -> &'static str {
        "Jump"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        Self::parse(args).map(|_| ())
    }

    fn validate_at(&self, pc: usize, program: &[u8], args: &[u8]) -> VmResult<()> {
        check_jump(program, pc, Self::parse(args)?)
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let target = Self::parse(args)?;
        ctx.jump_to(target)
    }
}

/// Forward jump taken when the swap sells `token`
pub struct JumpIfTokenIn;

impl JumpIfTokenIn {
    fn parse(args: &[u8]) -> VmResult<(Address, usize)> {
        let mut reader = ArgsReader::new(args);
        let token = reader.read_address("token")?;
        let target = reader.read_u16("target")?;
        reader.finish()?;
        Ok((token, usize::from(target)))
    }
}

impl Instruction for JumpIfTokenIn {
    fn name(&self) -> &'static str {
        "JumpIfTokenIn"
    }

    fn validate(&self, args: &[u8]) -> VmResult<()> {
        Self::parse(args).map(|_| ())
    }

    fn validate_at(&self, pc: usize, program: &[u8], args: &[u8]) -> VmResult<()> {
        let (_, target) = Self::parse(args)?;
        check_jump(program, pc, target)
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()> {
        let (token, target) = Self::parse(args)?;
        if ctx.token_in == token {
            ctx.jump_to(target)?;
        }
        Ok(())
    }
}

/// Arbitrary bytes that only change the order hash
pub struct Salt;

impl Instruction for Salt {
    fn name(&self) -> &'static str {
        "Salt"
    }

    fn validate(&self, _args: &[u8]) -> VmResult<()> {
        Ok(())
    }

    fn execute(&self, _ctx: &mut ExecutionContext<'_>, _args: &[u8]) -> VmResult<()> {
        Ok(())
    }
}
