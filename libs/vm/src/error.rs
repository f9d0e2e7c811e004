//! VM error types
//!
//! Every crate below the VM has its own error enum; `VmError` wraps them via
//! `#[from]` and adds the failures that only make sense during a walk
//! (predicates, jumps, thresholds, external calls). Any error aborts the walk
//! and discards the scratch state.

use crate::order::OrderHash;
use swapvm_amm::CurveError;
use swapvm_codec::{Address, ArgsError, ProgramError};
use swapvm_math::MathError;
use thiserror::Error;

/// Persistent per-order state errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Balance of {token} is uninitialized for this order")]
    UninitializedBalance { token: Address },

    #[error("Liquidity scale is uninitialized for this order")]
    UninitializedScale,

    #[error("Unknown order {hash}")]
    UnknownOrder { hash: OrderHash },

    #[error("Tracked balance of {token} would overflow")]
    BalanceOverflow { token: Address },

    #[error("Tracked balance of {token} is {balance}, cannot release {amount}")]
    InsufficientTrackedBalance {
        token: Address,
        balance: u128,
        amount: u128,
    },
}

/// Errors raised while validating or walking a program
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error(transparent)]
    Program(#[from] ProgramError),

    #[error(transparent)]
    Args(#[from] ArgsError),

    #[error(transparent)]
    Curve(#[from] CurveError),

    #[error(transparent)]
    Math(#[from] MathError),

    #[error(transparent)]
    State(#[from] StateError),

    /// Handler rejected its arguments during a validation pass
    #[error("Invalid {instruction} at pc {pc}: {source}")]
    Validation {
        pc: usize,
        instruction: &'static str,
        source: Box<VmError>,
    },

    #[error("Opcode {opcode:#04x} registered twice")]
    DuplicateOpcode { opcode: u8 },

    #[error("Decay period must be non-zero")]
    ZeroDecayPeriod,

    #[error("Initial liquidity must be non-zero")]
    ZeroInitialLiquidity,

    #[error("Minimum supply share {min_share} exceeds 1e18")]
    InvalidMinShare { min_share: u64 },

    #[error("Duplicate balance entry for {token}")]
    DuplicateBalance { token: Address },

    #[error("Token {token} has no balance entry")]
    TokenNotInBalances { token: Address },

    #[error("Swap instruction at pc {pc} ran before any balances were set")]
    BalancesNotSet { pc: usize },

    #[error("Swap already executed at pc {first_pc}, second swap at pc {pc}")]
    SwapAlreadyExecuted { first_pc: usize, pc: usize },

    #[error("Program finished without computing swap amounts")]
    SwapAmountsNotComputed,

    #[error("Jump at pc {pc} to {target} is not forward")]
    BackwardJump { pc: usize, target: usize },

    #[error("Jump at pc {pc} to {target} lands past program end {program_len}")]
    JumpOutOfRange {
        pc: usize,
        target: usize,
        program_len: usize,
    },

    #[error("Jump at pc {pc} to {target} lands inside an instruction")]
    JumpIntoInstruction { pc: usize, target: usize },

    #[error("Nested instruction depth {depth} exceeds maximum")]
    CallDepthExceeded { depth: usize },

    #[error("Order expired at {deadline}, now {now}")]
    DeadlineExpired { deadline: u64, now: u64 },

    #[error("Taker balance of {token} is {balance}, minimum {min}")]
    TakerBalanceTooLow {
        token: Address,
        balance: u128,
        min: u128,
    },

    #[error("Taker share of {token} supply is {share}, minimum {min_share}")]
    TakerShareTooLow {
        token: Address,
        share: u128,
        min_share: u64,
    },

    #[error("External call to {target} failed: {reason}")]
    ExternalCall { target: Address, reason: String },

    #[error("Swap amount {amount} violates threshold {threshold}")]
    ThresholdNotMet { amount: u128, threshold: u128 },

    #[error("Token in and token out are both {token}")]
    IdenticalTokens { token: Address },

    #[error("Requested amount must be non-zero")]
    ZeroAmount,
}

impl VmError {
    pub fn external(target: Address, reason: impl Into<String>) -> Self {
        Self::ExternalCall {
            target,
            reason: reason.into(),
        }
    }

    pub fn validation(pc: usize, instruction: &'static str, source: VmError) -> Self {
        Self::Validation {
            pc,
            instruction,
            source: Box::new(source),
        }
    }

    /// Innermost error, looking through validation wrappers
    pub fn root_cause(&self) -> &VmError {
        match self {
            Self::Validation { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Program counter of a framing or validation failure
    pub fn pc(&self) -> Option<usize> {
        match self {
            Self::Program(err) => Some(err.pc()),
            Self::Validation { pc, .. } => Some(*pc),
            _ => None,
        }
    }
}

pub type VmResult<T> = std::result::Result<T, VmError>;
pub type StateResult<T> = std::result::Result<T, StateError>;
