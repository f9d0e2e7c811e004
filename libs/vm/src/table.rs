//! # Opcode Table - Frozen Instruction Dispatch
//!
//! ## Purpose
//!
//! Maps opcode bytes to [`Instruction`] handlers. A table is assembled with
//! [`OpcodeTableBuilder`] and frozen into an immutable [`OpcodeTable`] that is
//! shared across threads behind an `Arc`. Lookups for opcodes past the end of
//! the table or in unregistered slots are typed errors, never panics.
//!
//! ## Integration Points
//!
//! - `interpreter::run` resolves every decoded opcode here
//! - `instructions::standard_table` registers the built-in instruction set
//! - Embedders may register additional handlers on free opcodes

use crate::context::ExecutionContext;
use crate::error::{VmError, VmResult};
use std::fmt;
use std::sync::Arc;
use swapvm_codec::ProgramError;

/// One instruction handler
pub trait Instruction: Send + Sync {
    fn name(&self) -> &'static str;

    /// Argument checks that need no execution context
    fn validate(&self, args: &[u8]) -> VmResult<()>;

    /// Checks that also depend on where the instruction sits in its program
    fn validate_at(&self, pc: usize, program: &[u8], args: &[u8]) -> VmResult<()> {
        let _ = (pc, program);
        self.validate(args)
    }

    fn execute(&self, ctx: &mut ExecutionContext<'_>, args: &[u8]) -> VmResult<()>;
}

/// Immutable opcode → handler table
#[derive(Clone)]
pub struct OpcodeTable {
    slots: Box<[Option<Arc<dyn Instruction>>]>,
}

impl OpcodeTable {
    pub fn builder() -> OpcodeTableBuilder {
        OpcodeTableBuilder::new()
    }

    /// One past the highest registered opcode
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, opcode: u8) -> Option<&Arc<dyn Instruction>> {
        self.slots.get(opcode as usize).and_then(Option::as_ref)
    }

    /// Handler for `opcode`, or `InvalidOpcode` carrying the instruction's pc
    pub fn resolve(&self, opcode: u8, pc: usize) -> VmResult<&dyn Instruction> {
        self.get(opcode)
            .map(|handler| &**handler)
            .ok_or_else(|| ProgramError::InvalidOpcode { opcode, pc }.into())
    }

    /// Registered `(opcode, name)` pairs in opcode order
    pub fn registered(&self) -> impl Iterator<Item = (u8, &'static str)> + '_ {
        self.slots.iter().enumerate().filter_map(|(opcode, slot)| {
            slot.as_ref().map(|handler| (opcode as u8, handler.name()))
        })
    }
}

impl fmt::Debug for OpcodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.registered()
                    .map(|(opcode, name)| (format!("{opcode:#04x}"), name)),
            )
            .finish()
    }
}

/// Mutable table under construction
#[derive(Default)]
pub struct OpcodeTableBuilder {
    slots: Vec<Option<Arc<dyn Instruction>>>,
}

impl OpcodeTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler on a free opcode
    pub fn register(
        self,
        opcode: u8,
        handler: impl Instruction + 'static,
    ) -> VmResult<Self> {
        self.register_arc(opcode, Arc::new(handler))
    }

    pub fn register_arc(mut self, opcode: u8, handler: Arc<dyn Instruction>) -> VmResult<Self> {
        if self.is_registered(opcode) {
            return Err(VmError::DuplicateOpcode { opcode });
        }
        self.set(opcode, handler);
        Ok(self)
    }

    /// Register or overwrite a handler
    pub fn replace(mut self, opcode: u8, handler: impl Instruction + 'static) -> Self {
        self.set(opcode, Arc::new(handler));
        self
    }

    pub fn is_registered(&self, opcode: u8) -> bool {
        matches!(self.slots.get(opcode as usize), Some(Some(_)))
    }

    fn set(&mut self, opcode: u8, handler: Arc<dyn Instruction>) {
        let index = opcode as usize;
        if self.slots.len() <= index {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(handler);
    }

    pub fn build(self) -> OpcodeTable {
        OpcodeTable {
            slots: self.slots.into_boxed_slice(),
        }
    }
}
