//! Bounds and opcode safety of program walks
//!
//! Programs come from makers and are untrusted. Whatever the bytes, a walk
//! must end in a result or a typed error that names the offending pc.

use proptest::prelude::*;
use std::sync::Arc;
use swapvm::{
    validate_program, Engine, ExecutionContext, Instruction, ManualClock, OpcodeTable, Order,
    SwapRequest, VmError, VmResult,
};
use swapvm_codec::{instruction_boundaries, Address, Opcode, ProgramBuilder, ProgramError};

const NOW: u64 = 1_700_000_000;

fn tokens() -> (Address, Address) {
    (Address::from_low_byte(0xA), Address::from_low_byte(0xB))
}

fn engine() -> Engine {
    Engine::builder()
        .clock(Arc::new(ManualClock::new(NOW)))
        .build()
}

fn request() -> SwapRequest {
    let (a, b) = tokens();
    SwapRequest::exact_in(Address::from_low_byte(0x7), a, b, 100)
}

fn sample_program() -> Vec<u8> {
    let (a, b) = tokens();
    ProgramBuilder::new()
        .static_balances(&[(a, 1_000_000), (b, 1_000_000)])
        .unwrap()
        .deadline(NOW + 60)
        .flat_fee_amount_in(30)
        .decay(120)
        .concentrate(10_000, 20_000, 30_000)
        .constant_product_swap(Some(997_000_000_000_000_000))
        .salt(b"nonce")
        .unwrap()
        .build()
        .to_vec()
}

#[test]
fn test_sample_program_quotes() {
    let quote = engine()
        .quote(&Order::new(Address::ZERO, sample_program()), &request())
        .unwrap();
    assert_eq!(quote.amount_in, 100);
    assert!(quote.amount_out > 0 && quote.amount_out < 100);
}

#[test]
fn test_every_truncation_fails_cleanly() {
    let program = sample_program();
    let boundaries = instruction_boundaries(&program).unwrap();
    let swap_pc = boundaries[5];
    let engine = engine();

    for cut in 0..program.len() {
        let order = Order::new(Address::ZERO, program[..cut].to_vec());
        let result = engine.quote(&order, &request());

        if boundaries.contains(&cut) {
            if cut > swap_pc {
                assert!(result.is_ok(), "cut {cut} keeps the swap");
            } else {
                assert_eq!(result, Err(VmError::SwapAmountsNotComputed), "cut {cut}");
            }
            continue;
        }

        let start = *boundaries.iter().filter(|&&pc| pc < cut).last().unwrap();
        match result {
            Err(VmError::Program(ProgramError::MalformedInstruction { pc, program_len })) => {
                assert_eq!((pc, program_len), (start, cut));
            }
            Err(VmError::Program(ProgramError::ArgsExceedProgram { pc, .. })) => {
                assert_eq!(pc, start);
            }
            other => panic!("cut {cut}: unexpected {other:?}"),
        }
        assert_eq!(
            validate_program(&program[..cut], engine.table())
                .unwrap_err()
                .pc(),
            Some(start)
        );
    }
}

#[test]
fn test_every_unregistered_opcode_is_rejected() {
    let engine = engine();
    let prefix = ProgramBuilder::new().salt(&[1, 2, 3]).unwrap().build();

    for opcode in 0..=u8::MAX {
        let mut program = prefix.to_vec();
        program.extend_from_slice(&[opcode, 0]);
        let order = Order::new(Address::ZERO, program.clone());
        let result = engine.quote(&order, &request());

        if Opcode::try_from(opcode).is_ok() {
            assert!(
                !matches!(result, Err(VmError::Program(ProgramError::InvalidOpcode { .. }))),
                "{opcode:#04x} is registered"
            );
        } else {
            let expected = VmError::Program(ProgramError::InvalidOpcode {
                opcode,
                pc: prefix.len(),
            });
            assert_eq!(result, Err(expected.clone()));
            assert_eq!(engine.validate_program(&program), Err(expected));
        }
    }
}

struct Nop;

impl Instruction for Nop {
    fn name(&self) -> &'static str {
        "Nop"
    }

    fn validate(&self, _args: &[u8]) -> VmResult<()> {
        Ok(())
    }

    fn execute(&self, _ctx: &mut ExecutionContext<'_>, _args: &[u8]) -> VmResult<()> {
        Ok(())
    }
}

#[test]
fn test_opcodes_past_table_end() {
    let table = OpcodeTable::builder().register(0x02, Nop).unwrap().build();
    assert_eq!(table.len(), 3);

    for opcode in [0x00u8, 0x01, 0x03, 0x10, 0xFF] {
        assert_eq!(
            validate_program(&[0x02, 0x00, opcode, 0x00], &table),
            Err(VmError::Program(ProgramError::InvalidOpcode { opcode, pc: 2 }))
        );
    }
    assert_eq!(validate_program(&[0x02, 0x00, 0x02, 0x01, 0xAA], &table), Ok(2));
}

#[test]
fn test_nested_walk_depth_is_bounded() {
    let (a, b) = tokens();
    let mut builder = ProgramBuilder::new()
        .static_balances(&[(a, 1_000), (b, 1_000)])
        .unwrap();
    for _ in 0..100 {
        builder = builder.flat_fee_amount_in(1);
    }
    let program = builder.constant_product_swap(None).build();

    let result = engine().quote(&Order::new(Address::ZERO, program), &request());
    assert!(matches!(result, Err(VmError::CallDepthExceeded { .. })));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_unknown_opcode_after_valid_prefix(
        salt in proptest::collection::vec(any::<u8>(), 0..64),
        opcode in any::<u8>(),
        tail in proptest::collection::vec(any::<u8>(), 0..16),
    ) {
        prop_assume!(Opcode::try_from(opcode).is_err());
        let mut program = ProgramBuilder::new().salt(&salt).unwrap().build().to_vec();
        let pc = program.len();
        program.push(opcode);
        program.push(tail.len() as u8);
        program.extend_from_slice(&tail);

        let result = engine().quote(&Order::new(Address::ZERO, program), &request());
        prop_assert_eq!(
            result,
            Err(VmError::Program(ProgramError::InvalidOpcode { opcode, pc }))
        );
    }

    #[test]
    fn prop_salted_garbage_is_framed(bytes in proptest::collection::vec(any::<u8>(), 0..300)) {
        // Salt-only opcodes exercise framing without any pricing
        let table = OpcodeTable::builder().register(Opcode::Salt as u8, Nop).unwrap().build();
        match validate_program(&bytes, &table) {
            Ok(count) => prop_assert!(count <= bytes.len() / 2),
            Err(err) => prop_assert!(err.pc().map_or(false, |pc| pc < bytes.len())),
        }
    }
}
