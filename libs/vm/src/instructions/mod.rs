//! # Standard Instruction Set
//!
//! ## Purpose
//!
//! Handlers for every standard opcode, grouped by family:
//!
//! - [`balances`]: static and tracked balances
//! - [`swap`]: constant product (alpha power curve), limit price, density curve
//! - [`fee`]: flat input/output fees and provider-quoted input fees
//! - [`decay`]: time-decaying balance offsets
//! - [`concentrate`]: virtual liquidity scaling
//! - [`controls`]: deadline, taker predicates, jumps, salt
//!
//! Every handler parses its arguments through a single `parse` function used by
//! both `validate` and `execute`, so a program that passed validation cannot
//! be read differently at execution time.

pub mod balances;
pub mod concentrate;
pub mod controls;
pub mod decay;
pub mod fee;
pub mod swap;

pub use balances::{DynamicBalances, StaticBalances};
pub use concentrate::Concentrate;
pub use controls::{Deadline, Jump, JumpIfTokenIn, OnlyTakerBalanceGte, OnlyTakerSupplyShareGte, Salt};
pub use decay::Decay;
pub use fee::{DynamicFeeAmountIn, FlatFeeAmountIn, FlatFeeAmountOut};
pub use swap::{ConstantProductSwap, DensitySwap, LimitSwap};

use crate::table::{OpcodeTable, OpcodeTableBuilder};
use swapvm_codec::Opcode;

impl OpcodeTableBuilder {
    /// Builder preloaded with the standard instruction set
    pub fn standard() -> Self {
        Self::new()
            .replace(Opcode::StaticBalances as u8, StaticBalances)
            .replace(Opcode::DynamicBalances as u8, DynamicBalances)
            .replace(Opcode::ConstantProductSwap as u8, ConstantProductSwap)
            .replace(Opcode::LimitSwap as u8, LimitSwap)
            .replace(Opcode::DensitySwap as u8, DensitySwap)
            .replace(Opcode::FlatFeeAmountIn as u8, FlatFeeAmountIn)
            .replace(Opcode::FlatFeeAmountOut as u8, FlatFeeAmountOut)
            .replace(Opcode::DynamicFeeAmountIn as u8, DynamicFeeAmountIn)
            .replace(Opcode::Decay as u8, Decay)
            .replace(Opcode::Concentrate as u8, Concentrate)
            .replace(Opcode::Deadline as u8, Deadline)
            .replace(Opcode::OnlyTakerBalanceGte as u8, OnlyTakerBalanceGte)
            .replace(Opcode::OnlyTakerSupplyShareGte as u8, OnlyTakerSupplyShareGte)
            .replace(Opcode::Jump as u8, Jump)
            .replace(Opcode::JumpIfTokenIn as u8, JumpIfTokenIn)
            .replace(Opcode::Salt as u8, Salt)
    }
}

/// Frozen table with the standard instruction set
pub fn standard_table() -> OpcodeTable {
    OpcodeTableBuilder::standard().build()
}
