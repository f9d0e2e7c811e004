//! Program-counter-driven dispatch loop
//!
//! Each step re-checks framing (header, body) and resolves the opcode before
//! the handler sees any bytes, so a malformed program fails with the offending
//! pc no matter which path through it a walk takes.

use crate::context::ExecutionContext;
use crate::error::{VmError, VmResult};
use crate::table::OpcodeTable;
use swapvm_codec::{decode_at, instructions};
use tracing::{trace, warn};

/// Walk `ctx`'s program from `start_pc` to the end or until halted
pub fn run(ctx: &mut ExecutionContext<'_>, start_pc: usize) -> VmResult<()> {
    let program = ctx.program();
    let table = ctx.table();
    let mut pc = start_pc;

    while pc < program.len() && !ctx.is_halted() {
        let instruction = decode_at(program, pc)?;
        let handler = table.resolve(instruction.opcode, pc)?;
        trace!(pc, instruction = handler.name(), args_len = instruction.args.len(), "dispatch");

        ctx.enter(pc, instruction.next_pc());
        handler.execute(ctx, instruction.args)?;
        pc = ctx.next_pc();
    }
    Ok(())
}

/// Static validation pass over a whole program
///
/// Checks framing, opcode registration and every handler's argument rules.
/// Returns the instruction count.
pub fn validate_program(program: &[u8], table: &OpcodeTable) -> VmResult<usize> {
    let mut count = 0;
    for instruction in instructions(program) {
        let instruction = instruction?;
        let handler = table.resolve(instruction.opcode, instruction.pc)?;
        handler
            .validate_at(instruction.pc, program, instruction.args)
            .map_err(|err| {
                warn!(pc = instruction.pc, instruction = handler.name(), error = %err, "program rejected");
                VmError::validation(instruction.pc, handler.name(), err)
            })?;
        count += 1;
    }
    Ok(count)
}

/// Framing and opcode checks only, no handler validation
pub fn validate_opcodes(program: &[u8], table: &OpcodeTable) -> VmResult<usize> {
    let mut count = 0;
    for instruction in instructions(program) {
        let instruction = instruction?;
        table.resolve(instruction.opcode, instruction.pc)?;
        count += 1;
    }
    Ok(count)
}
