//! # Execution Context - Per-Walk Mutable State
//!
//! ## Purpose
//!
//! One [`ExecutionContext`] exists per quote, swap or probe. It carries the
//! swap being priced (tokens, requested amount and its role), the running
//! balances handlers hand to each other, the amounts computed so far and the
//! program counter. Handlers receive it mutably and nothing else; persistent
//! writes go to the scratch [`OrderState`] it borrows.
//!
//! ## Continuations
//!
//! Wrapper instructions (balances, decay, concentrate, fees) call
//! [`ExecutionContext::run_remaining`] to execute the rest of the program and
//! then adjust amounts or state with the results. The nested walk uses the
//! same framing checks as the top-level one and leaves the program counter at
//! the end of the program so the enclosing loop exits.

use crate::clock::Clock;
use crate::error::{VmError, VmResult};
use crate::interpreter;
use crate::order::{OrderHash, Quote, SwapRequest};
use crate::providers::{FeeProvider, FeeQuery, TokenLedger};
use crate::state::OrderState;
use crate::table::OpcodeTable;
use swapvm_amm::{CorrectionPolicy, PairSide};
use swapvm_codec::{decode_at, Address};
use tracing::trace;

/// Deepest nesting of `run_remaining` calls in one walk
pub const MAX_CALL_DEPTH: usize = 64;

/// How a walk treats its results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// Results are committed
    Swap,
    /// Results are discarded
    Quote,
    /// Discarded, and the walk halts right after the swap instruction
    Probe,
}

/// Collaborators and tuning shared by every handler in a walk
#[derive(Clone, Copy)]
pub struct ExecutionEnv<'a> {
    pub clock: &'a dyn Clock,
    pub fee_provider: &'a dyn FeeProvider,
    pub ledger: &'a dyn TokenLedger,
    pub correction: CorrectionPolicy,
    pub max_bisection_steps: u32,
}

/// Order fields the walk needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderInfo {
    pub hash: OrderHash,
    pub maker: Address,
}

pub struct ExecutionContext<'a> {
    program: &'a [u8],
    table: &'a OpcodeTable,
    env: ExecutionEnv<'a>,
    state: &'a mut OrderState,

    pub order: OrderInfo,
    pub taker: Address,
    pub token_in: Address,
    pub token_out: Address,
    pub exact_in: bool,
    /// Given for ExactIn, computed by the swap instruction for ExactOut
    pub amount_in: u128,
    /// Given for ExactOut, computed by the swap instruction for ExactIn
    pub amount_out: u128,

    balances: Option<(u128, u128)>,
    pc: usize,
    next_pc: usize,
    depth: usize,
    halted: bool,
    mode: WalkMode,
    swap: Option<Quote>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        program: &'a [u8],
        table: &'a OpcodeTable,
        env: ExecutionEnv<'a>,
        state: &'a mut OrderState,
        order: OrderInfo,
        request: &SwapRequest,
        mode: WalkMode,
    ) -> Self {
        let (amount_in, amount_out) = if request.exact_in {
            (request.amount, 0)
        } else {
            (0, request.amount)
        };
        Self {
            program,
            table,
            env,
            state,
            order,
            taker: request.taker,
            token_in: request.token_in,
            token_out: request.token_out,
            exact_in: request.exact_in,
            amount_in,
            amount_out,
            balances: None,
            pc: 0,
            next_pc: 0,
            depth: 0,
            halted: false,
            mode,
            swap: None,
        }
    }

    pub fn program(&self) -> &'a [u8] {
        self.program
    }

    pub fn table(&self) -> &'a OpcodeTable {
        self.table
    }

    pub fn env(&self) -> &ExecutionEnv<'a> {
        &self.env
    }

    pub fn state(&self) -> &OrderState {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut OrderState {
        &mut *self.state
    }

    pub fn mode(&self) -> WalkMode {
        self.mode
    }

    /// Quotes and probes never commit
    pub fn is_static(&self) -> bool {
        self.mode != WalkMode::Swap
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// Offset of the instruction currently executing
    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn next_pc(&self) -> usize {
        self.next_pc
    }

    pub(crate) fn enter(&mut self, pc: usize, next_pc: usize) {
        self.pc = pc;
        self.next_pc = next_pc;
    }

    /// Requested amount: input for ExactIn, output for ExactOut
    pub fn requested_amount(&self) -> u128 {
        if self.exact_in {
            self.amount_in
        } else {
            self.amount_out
        }
    }

    /// Taker's side relative to the pair's address ordering
    pub fn pair_side(&self) -> PairSide {
        if self.token_in < self.token_out {
            PairSide::SellLower
        } else {
            PairSide::SellGreater
        }
    }

    /// Running `(balance_in, balance_out)`
    pub fn balances(&self) -> VmResult<(u128, u128)> {
        self.balances
            .ok_or(VmError::BalancesNotSet { pc: self.pc })
    }

    pub fn set_balances(&mut self, balance_in: u128, balance_out: u128) {
        self.balances = Some((balance_in, balance_out));
    }

    pub fn fee_query(&self) -> FeeQuery {
        FeeQuery {
            order_hash: self.order.hash,
            maker: self.order.maker,
            taker: self.taker,
            token_in: self.token_in,
            token_out: self.token_out,
            amount: self.requested_amount(),
            exact_in: self.exact_in,
        }
    }

    /// Move the program counter forward to `target`
    pub fn jump_to(&mut self, target: usize) -> VmResult<()> {
        check_jump(self.program, self.pc, target)?;
        trace!(pc = self.pc, target, "jump");
        self.next_pc = target;
        Ok(())
    }

    /// Execute the rest of the program, then leave the counter at its end
    pub fn run_remaining(&mut self) -> VmResult<()> {
        if self.depth >= MAX_CALL_DEPTH {
            return Err(VmError::CallDepthExceeded { depth: self.depth + 1 });
        }
        let (resume_pc, start) = (self.pc, self.next_pc);
        self.depth += 1;
        let result = interpreter::run(self, start);
        self.depth -= 1;
        result?;
        self.pc = resume_pc;
        self.next_pc = self.program.len();
        Ok(())
    }

    pub fn swap_pc(&self) -> Option<usize> {
        self.swap.map(|swap| swap.swap_pc)
    }

    /// Fail if a swap instruction already ran in this walk
    pub fn ensure_no_swap(&self) -> VmResult<()> {
        match self.swap {
            Some(swap) => Err(VmError::SwapAlreadyExecuted {
                first_pc: swap.swap_pc,
                pc: self.pc,
            }),
            None => Ok(()),
        }
    }

    /// Store the amounts priced by the swap instruction at the current pc
    pub fn record_swap(&mut self, amount_in: u128, amount_out: u128) -> VmResult<()> {
        self.ensure_no_swap()?;
        self.amount_in = amount_in;
        self.amount_out = amount_out;
        self.swap = Some(Quote {
            amount_in,
            amount_out,
            swap_pc: self.pc,
        });
        trace!(pc = self.pc, amount_in, amount_out, "swap priced");
        if self.mode == WalkMode::Probe {
            self.halt();
        }
        Ok(())
    }

    /// Amounts as priced at the swap instruction, before outer wrappers
    pub fn swap_record(&self) -> Option<Quote> {
        self.swap
    }

    /// Final amounts of a completed walk
    pub fn finish(&self) -> VmResult<Quote> {
        let swap = self.swap.ok_or(VmError::SwapAmountsNotComputed)?;
        Ok(Quote {
            amount_in: self.amount_in,
            amount_out: self.amount_out,
            swap_pc: swap.swap_pc,
        })
    }
}

/// Jumps only move forward and land on an instruction boundary or the
/// program end
///
/// `pc` must itself be a boundary. Boundaries are found by framing forward
/// from `pc`, so bytes inside an instruction's arguments are never a target.
pub fn check_jump(program: &[u8], pc: usize, target: usize) -> VmResult<()> {
    if target <= pc {
        return Err(VmError::BackwardJump { pc, target });
    }
    if target > program.len() {
        return Err(VmError::JumpOutOfRange {
            pc,
            target,
            program_len: program.len(),
        });
    }

    let mut cursor = pc;
    while cursor < target {
        cursor = decode_at(program, cursor)?.next_pc();
    }
    if cursor != target {
        return Err(VmError::JumpIntoInstruction { pc, target });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 0: {0x45, 2, ..}  4: {0x45, 0}  6: {0x45, 4, ..}  12: end
    const FRAMED: [u8; 12] = [0x45, 2, 0xAA, 0xBB, 0x45, 0, 0x45, 4, 1, 2, 3, 4];

    #[test]
    fn test_check_jump_direction_and_range() {
        assert_eq!(
            check_jump(&FRAMED, 4, 4),
            Err(VmError::BackwardJump { pc: 4, target: 4 })
        );
        assert_eq!(
            check_jump(&FRAMED, 4, 0),
            Err(VmError::BackwardJump { pc: 4, target: 0 })
        );
        assert_eq!(
            check_jump(&FRAMED, 4, 13),
            Err(VmError::JumpOutOfRange {
                pc: 4,
                target: 13,
                program_len: 12
            })
        );
    }

    #[test]
    fn test_check_jump_lands_on_boundaries() {
        assert!(check_jump(&FRAMED, 0, 4).is_ok());
        assert!(check_jump(&FRAMED, 0, 6).is_ok());
        assert!(check_jump(&FRAMED, 0, 12).is_ok());
        assert!(check_jump(&FRAMED, 4, 12).is_ok());

        for target in [1, 2, 3, 5, 7, 8, 11] {
            assert_eq!(
                check_jump(&FRAMED, 0, target),
                Err(VmError::JumpIntoInstruction { pc: 0, target }),
                "target {target}"
            );
        }
    }

    #[test]
    fn test_check_jump_over_truncated_tail() {
        // last instruction claims 9 argument bytes but only 1 follows
        let program = [0x45, 0, 0x45, 9, 0xFF];
        assert!(matches!(
            check_jump(&program, 0, 5),
            Err(VmError::Program(_))
        ));
        assert!(check_jump(&program, 0, 2).is_ok());
    }
}
