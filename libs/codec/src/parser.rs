//! # Instruction Parser - Bounds-Checked Program Framing
//!
//! ## Purpose
//!
//! Splits a program into `{opcode: u8, args_len: u8, args: [u8; args_len]}`
//! records. Programs come from untrusted makers, so every header and every
//! argument slice is checked against the buffer before it is touched:
//!
//! - fewer than 2 bytes at `pc` → [`ProgramError::MalformedInstruction`]
//! - `pc + 2 + args_len` past the end → [`ProgramError::ArgsExceedProgram`]
//!
//! Decoding never allocates and never panics, whatever the input bytes.

use crate::error::{ProgramError, ProgramResult};
use crate::opcode::opcode_name;
use std::fmt;

/// Size of the `{opcode, args_len}` header
pub const HEADER_SIZE: usize = 2;

/// Largest argument payload expressible by the length byte
pub const MAX_ARGS_LEN: usize = u8::MAX as usize;

/// One decoded instruction, borrowing its arguments from the program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInstruction<'a> {
    pub pc: usize,
    pub opcode: u8,
    pub args: &'a [u8],
}

impl RawInstruction<'_> {
    /// Offset of the instruction that follows this one
    #[inline]
    pub fn next_pc(&self) -> usize {
        self.pc + HEADER_SIZE + self.args.len()
    }
}

impl fmt::Display for RawInstruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}: {} ({:#04x}) [{}]",
            self.pc,
            opcode_name(self.opcode),
            self.opcode,
            hex::encode(self.args)
        )
    }
}

/// Decode the instruction starting at `pc`
pub fn decode_at(program: &[u8], pc: usize) -> ProgramResult<RawInstruction<'_>> {
    let header_end = pc
        .checked_add(HEADER_SIZE)
        .ok_or_else(|| ProgramError::malformed(pc, program.len()))?;
    if header_end > program.len() {
        return Err(ProgramError::malformed(pc, program.len()));
    }

    let opcode = program[pc];
    let args_len = program[pc + 1] as usize;
    let available = program.len() - header_end;
    if args_len > available {
        return Err(ProgramError::args_exceed(pc, args_len, available));
    }

    Ok(RawInstruction {
        pc,
        opcode,
        args: &program[header_end..header_end + args_len],
    })
}

/// Iterator over the instructions of a program
///
/// Yields each instruction in order; on the first framing error it yields
/// that error once and then stops.
pub struct Instructions<'a> {
    program: &'a [u8],
    pc: usize,
    failed: bool,
}

impl<'a> Iterator for Instructions<'a> {
    type Item = ProgramResult<RawInstruction<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pc >= self.program.len() {
            return None;
        }
        match decode_at(self.program, self.pc) {
            Ok(instruction) => {
                self.pc = instruction.next_pc();
                Some(Ok(instruction))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Walk every instruction of `program` from the start
pub fn instructions(program: &[u8]) -> Instructions<'_> {
    Instructions {
        program,
        pc: 0,
        failed: false,
    }
}

/// Check the framing of the whole program; returns the instruction count
pub fn validate_framing(program: &[u8]) -> ProgramResult<usize> {
    let mut count = 0;
    for instruction in instructions(program) {
        instruction?;
        count += 1;
    }
    Ok(count)
}

/// Program counters at which an instruction starts
pub fn instruction_boundaries(program: &[u8]) -> ProgramResult<Vec<usize>> {
    instructions(program)
        .map(|instruction| instruction.map(|i| i.pc))
        .collect()
}

/// One line per instruction, for diagnostics
pub fn disassemble(program: &[u8]) -> String {
    let mut out = String::new();
    for instruction in instructions(program) {
        match instruction {
            Ok(instruction) => out.push_str(&format!("{instruction}\n")),
            Err(err) => out.push_str(&format!("error: {err}\n")),
        }
    }
    out
}
