//! # Opcode Registry - Standard SwapVM Instruction Set
//!
//! ## Purpose
//!
//! Wire values for the standard instruction set, grouped by family:
//!
//! ```text
//! 0x01-0x0F  balances     0x10-0x1F  swap curves     0x20-0x2F  fees
//! 0x30-0x3F  balance adjusters (decay, concentration)
//! 0x40-0x4F  controls (predicates, jumps, salt)
//! ```
//!
//! The registry only names opcodes. Whether an opcode is executable is decided
//! by the opcode table the engine is built with, which may omit or add entries.

use num_enum::TryFromPrimitive;

/// Standard SwapVM opcodes
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum Opcode {
    // Balances
    StaticBalances = 0x01,
    DynamicBalances = 0x02,

    // Swap curves
    ConstantProductSwap = 0x10,
    LimitSwap = 0x11,
    DensitySwap = 0x12,

    // Fees
    FlatFeeAmountIn = 0x20,
    FlatFeeAmountOut = 0x21,
    DynamicFeeAmountIn = 0x22,

    // Balance adjusters
    Decay = 0x30,
    Concentrate = 0x31,

    // Controls
    Deadline = 0x40,
    OnlyTakerBalanceGte = 0x41,
    OnlyTakerSupplyShareGte = 0x42,
    Jump = 0x43,
    JumpIfTokenIn = 0x44,
    Salt = 0x45,
}

impl Opcode {
    pub fn name(&self) -> &'static str {
        match self {
            Opcode::StaticBalances => "StaticBalances",
            Opcode::DynamicBalances => "DynamicBalances",
            Opcode::ConstantProductSwap => "ConstantProductSwap",
            Opcode::LimitSwap => "LimitSwap",
            Opcode::DensitySwap => "DensitySwap",
            Opcode::FlatFeeAmountIn => "FlatFeeAmountIn",
            Opcode::FlatFeeAmountOut => "FlatFeeAmountOut",
            Opcode::DynamicFeeAmountIn => "DynamicFeeAmountIn",
            Opcode::Decay => "Decay",
            Opcode::Concentrate => "Concentrate",
            Opcode::Deadline => "Deadline",
            Opcode::OnlyTakerBalanceGte => "OnlyTakerBalanceGte",
            Opcode::OnlyTakerSupplyShareGte => "OnlyTakerSupplyShareGte",
            Opcode::Jump => "Jump",
            Opcode::JumpIfTokenIn => "JumpIfTokenIn",
            Opcode::Salt => "Salt",
        }
    }

    /// True for the instructions that compute swap amounts
    pub fn is_swap(&self) -> bool {
        matches!(
            self,
            Opcode::ConstantProductSwap | Opcode::LimitSwap | Opcode::DensitySwap
        )
    }

    pub fn all() -> Vec<Opcode> {
        vec![
            Opcode::StaticBalances,
            Opcode::DynamicBalances,
            Opcode::ConstantProductSwap,
            Opcode::LimitSwap,
            Opcode::DensitySwap,
            Opcode::FlatFeeAmountIn,
            Opcode::FlatFeeAmountOut,
            Opcode::DynamicFeeAmountIn,
            Opcode::Decay,
            Opcode::Concentrate,
            Opcode::Deadline,
            Opcode::OnlyTakerBalanceGte,
            Opcode::OnlyTakerSupplyShareGte,
            Opcode::Jump,
            Opcode::JumpIfTokenIn,
            Opcode::Salt,
        ]
    }
}

/// Human-readable name for any opcode byte
pub fn opcode_name(opcode: u8) -> &'static str {
    Opcode::try_from(opcode).map_or("Unknown", |op| op.name())
}
