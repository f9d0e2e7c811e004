//! # Program Builder - Standard Instruction Encoding
//!
//! ## Purpose
//!
//! Assembles programs from typed instruction parameters so makers and tests
//! never hand-encode bytes. Each method appends one
//! `{opcode, args_len, args}` record; arguments are big-endian and addresses
//! are 20 raw bytes.
//!
//! ## Usage
//!
//! ```
//! use swapvm_codec::{Address, ProgramBuilder};
//!
//! let (a, b) = (Address::from_low_byte(1), Address::from_low_byte(2));
//! let program = ProgramBuilder::new()
//!     .static_balances(&[(a, 1_000), (b, 1_000)])
//!     .unwrap()
//!     .constant_product_swap(Some(997_000_000_000_000_000))
//!     .build();
//! assert_eq!(program[0], 0x01);
//! ```

use crate::address::{Address, ADDRESS_LEN};
use crate::args::ArgsWriter;
use crate::error::{BuildError, BuildResult};
use crate::opcode::Opcode;
use crate::parser::{HEADER_SIZE, MAX_ARGS_LEN};
use bytes::{BufMut, Bytes, BytesMut};

/// Encoded size of one `(token, amount)` balance entry
pub const BALANCE_ENTRY_SIZE: usize = ADDRESS_LEN + 16;

/// Most balance entries a single balances instruction can carry
pub const MAX_BALANCE_ENTRIES: usize = (MAX_ARGS_LEN - 1) / BALANCE_ENTRY_SIZE;

/// Appends encoded instructions to a growing program buffer
#[derive(Debug, Default, Clone)]
pub struct ProgramBuilder {
    buf: BytesMut,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset at which the next instruction will start
    pub fn pc(&self) -> usize {
        self.buf.len()
    }

    /// Append a raw instruction
    pub fn push(mut self, opcode: u8, args: &[u8]) -> BuildResult<Self> {
        if args.len() > MAX_ARGS_LEN {
            return Err(BuildError::ArgsTooLong {
                opcode,
                len: args.len(),
            });
        }
        self.buf.reserve(HEADER_SIZE + args.len());
        self.buf.put_u8(opcode);
        self.buf.put_u8(args.len() as u8);
        self.buf.put_slice(args);
        Ok(self)
    }

    /// Append a fixed-layout instruction whose size is known to fit
    fn fixed(mut self, opcode: Opcode, args: ArgsWriter) -> Self {
        debug_assert!(args.len() <= MAX_ARGS_LEN);
        self.buf.put_u8(opcode as u8);
        self.buf.put_u8(args.len() as u8);
        self.buf.put_slice(&args.into_bytes());
        self
    }

    fn balances(self, opcode: Opcode, entries: &[(Address, u128)]) -> BuildResult<Self> {
        if entries.len() > MAX_BALANCE_ENTRIES {
            return Err(BuildError::TooManyBalances {
                count: entries.len(),
                max: MAX_BALANCE_ENTRIES,
            });
        }
        let mut args = ArgsWriter::new().u8(entries.len() as u8);
        for (token, amount) in entries {
            args = args.address(token).u128(*amount);
        }
        Ok(self.fixed(opcode, args))
    }

    pub fn static_balances(self, entries: &[(Address, u128)]) -> BuildResult<Self> {
        self.balances(Opcode::StaticBalances, entries)
    }

    pub fn dynamic_balances(self, entries: &[(Address, u128)]) -> BuildResult<Self> {
        self.balances(Opcode::DynamicBalances, entries)
    }

    /// `None` encodes the fee-free curve (alpha = 1)
    pub fn constant_product_swap(self, alpha: Option<u64>) -> Self {
        let args = match alpha {
            Some(alpha) => ArgsWriter::new().u64(alpha),
            None => ArgsWriter::new(),
        };
        self.fixed(Opcode::ConstantProductSwap, args)
    }

    pub fn limit_swap(self, lower_token_price: u128) -> Self {
        self.fixed(Opcode::LimitSwap, ArgsWriter::new().u128(lower_token_price))
    }

    pub fn density_swap(self, params: &DensitySwapArgs) -> Self {
        let args = ArgsWriter::new()
            .u128(params.base_price)
            .u64(params.amplitude)
            .u128(params.capacity)
            .u16(params.spread_bps)
            .u8(params.shape)
            .u64(params.shape_param);
        self.fixed(Opcode::DensitySwap, args)
    }

    pub fn flat_fee_amount_in(self, fee_bps: u16) -> Self {
        self.fixed(Opcode::FlatFeeAmountIn, ArgsWriter::new().u16(fee_bps))
    }

    pub fn flat_fee_amount_out(self, fee_bps: u16) -> Self {
        self.fixed(Opcode::FlatFeeAmountOut, ArgsWriter::new().u16(fee_bps))
    }

    pub fn dynamic_fee_amount_in(self, provider: &Address) -> Self {
        self.fixed(
            Opcode::DynamicFeeAmountIn,
            ArgsWriter::new().address(provider),
        )
    }

    pub fn decay(self, period: u16) -> Self {
        self.fixed(Opcode::Decay, ArgsWriter::new().u16(period))
    }

    pub fn concentrate(self, delta_lt: u128, delta_gt: u128, initial_liquidity: u128) -> Self {
        let args = ArgsWriter::new()
            .u128(delta_lt)
            .u128(delta_gt)
            .u128(initial_liquidity);
        self.fixed(Opcode::Concentrate, args)
    }

    pub fn deadline(self, deadline: u64) -> Self {
        self.fixed(Opcode::Deadline, ArgsWriter::new().u64(deadline))
    }

    pub fn only_taker_balance_gte(self, token: &Address, min: u128) -> Self {
        self.fixed(
            Opcode::OnlyTakerBalanceGte,
            ArgsWriter::new().address(token).u128(min),
        )
    }

    pub fn only_taker_supply_share_gte(self, token: &Address, min_share: u64) -> Self {
        self.fixed(
            Opcode::OnlyTakerSupplyShareGte,
            ArgsWriter::new().address(token).u64(min_share),
        )
    }

    pub fn jump(self, target: u16) -> Self {
        self.fixed(Opcode::Jump, ArgsWriter::new().u16(target))
    }

    pub fn jump_if_token_in(self, token: &Address, target: u16) -> Self {
        self.fixed(
            Opcode::JumpIfTokenIn,
            ArgsWriter::new().address(token).u16(target),
        )
    }

    pub fn salt(self, salt: &[u8]) -> BuildResult<Self> {
        self.push(Opcode::Salt as u8, salt)
    }

    pub fn build(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Parameters of a density swap instruction, as encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DensitySwapArgs {
    pub base_price: u128,
    pub amplitude: u64,
    pub capacity: u128,
    pub spread_bps: u16,
    pub shape: u8,
    pub shape_param: u64,
}
