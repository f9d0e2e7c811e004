//! # SwapVM Program Codec - Instruction Framing and Encoding
//!
//! ## Purpose
//!
//! Rules layer for SwapVM programs: the byte layout of instructions, the
//! bounds-checked decoder the interpreter walks with, typed big-endian
//! argument readers, the standard opcode registry and a builder that encodes
//! programs from typed parameters.
//!
//! ## Program Format
//!
//! ```text
//! ┌────────┬──────────┬──────────────────┐┌────────┬──────────┬───── ─ ─
//! │ opcode │ args_len │ args[args_len]   ││ opcode │ args_len │ ...
//! │  u8    │   u8     │ big-endian fields││  u8    │   u8     │
//! └────────┴──────────┴──────────────────┘└────────┴──────────┴───── ─ ─
//! ```
//!
//! No separators and no overall length prefix: the program ends where the
//! buffer ends.
//!
//! ## What This Crate Does NOT Contain
//!
//! - Instruction semantics or the opcode table (belong in `swapvm`)
//! - Curve math (belongs in `swapvm-amm`)

pub mod address;
pub mod args;
pub mod builder;
pub mod error;
pub mod opcode;
pub mod parser;

pub use address::{Address, ADDRESS_LEN};
pub use args::{ArgsReader, ArgsWriter};
pub use builder::{DensitySwapArgs, ProgramBuilder, BALANCE_ENTRY_SIZE, MAX_BALANCE_ENTRIES};
pub use error::{ArgsError, ArgsResult, BuildError, BuildResult, ProgramError, ProgramResult};
pub use opcode::{opcode_name, Opcode};
pub use parser::{
    decode_at, disassemble, instruction_boundaries, instructions, validate_framing, Instructions,
    RawInstruction, HEADER_SIZE, MAX_ARGS_LEN,
};

pub use bytes::Bytes;
