//! Program-level errors for instruction framing and argument decoding
//!
//! Every framing error carries the program counter of the offending
//! instruction so that a maker can locate the bad byte in their program.

use thiserror::Error;

/// Program framing errors, raised before any handler runs
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgramError {
    /// Fewer than two bytes remain for the instruction header
    #[error("Malformed instruction at pc {pc}: header needs 2 bytes, program has {program_len}")]
    MalformedInstruction { pc: usize, program_len: usize },

    /// Declared argument length runs past the end of the program
    #[error("Arguments exceed program at pc {pc}: {args_len} bytes declared, {available} available")]
    ArgsExceedProgram {
        pc: usize,
        args_len: usize,
        available: usize,
    },

    /// Opcode has no registered handler
    #[error("Invalid opcode {opcode:#04x} at pc {pc}")]
    InvalidOpcode { opcode: u8, pc: usize },
}

impl ProgramError {
    pub fn malformed(pc: usize, program_len: usize) -> Self {
        Self::MalformedInstruction { pc, program_len }
    }

    pub fn args_exceed(pc: usize, args_len: usize, available: usize) -> Self {
        Self::ArgsExceedProgram {
            pc,
            args_len,
            available,
        }
    }

    /// Program counter of the offending instruction
    pub fn pc(&self) -> usize {
        match self {
            Self::MalformedInstruction { pc, .. }
            | Self::ArgsExceedProgram { pc, .. }
            | Self::InvalidOpcode { pc, .. } => *pc,
        }
    }
}

/// Instruction argument decoding errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArgsError {
    /// Not enough bytes left for the next field
    #[error("Truncated arguments: {field} needs {need} bytes at offset {offset}, {got} remain")]
    Truncated {
        field: &'static str,
        need: usize,
        got: usize,
        offset: usize,
    },

    /// Bytes left over after the last field of a fixed layout
    #[error("Unexpected trailing argument bytes: {extra} after offset {offset}")]
    TrailingBytes { extra: usize, offset: usize },

    /// Field decoded but its value is not acceptable
    #[error("Invalid argument {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

impl ArgsError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Program construction errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Arguments do not fit the one-byte length field
    #[error("Arguments for opcode {opcode:#04x} are {len} bytes, maximum is 255")]
    ArgsTooLong { opcode: u8, len: usize },

    /// Balance list does not fit a single instruction
    #[error("Too many balance entries: {count}, maximum is {max}")]
    TooManyBalances { count: usize, max: usize },
}

pub type ProgramResult<T> = std::result::Result<T, ProgramError>;
pub type ArgsResult<T> = std::result::Result<T, ArgsError>;
pub type BuildResult<T> = std::result::Result<T, BuildError>;
