//! The oracle must stop at the first instruction where the CPU under test
//! diverges from the reference model, naming the offending field.

mod common;

use common::{image, setup_with, Fault, FaultKind, ModelCpu};
use oracle6502::{Field, Flag, MemoryImage, Oracle, OracleError, Register, Step};

fn faulty(memory: MemoryImage, at: u16, kind: FaultKind) -> Oracle<ModelCpu> {
    let dut = ModelCpu::new(&memory).with_fault(Fault { at, kind });
    setup_with(dut, memory)
}

#[test]
fn test_fault_free_model_passes() {
    // LDA #$60; STA $10; END
    let memory = image(&[0xA9, 0x60, 0x85, 0x10, 0x04]);
    let mut oracle = setup_with(ModelCpu::new(&memory), memory);

    assert_eq!(oracle.run().unwrap().instructions, 2);
}

#[test]
fn test_unaffected_flag_change() {
    // LDA #$60 must leave C alone
    let mut oracle = faulty(image(&[0xA9, 0x60, 0x04]), 0x0600, FaultKind::FlipFlag(Flag::C));

    let err = oracle.step().unwrap_err();
    assert!(matches!(
        err,
        OracleError::StateMismatch {
            field: Field::Flag(Flag::C),
            expected: 0,
            observed: 1
        }
    ));
}

#[test]
fn test_wrong_asserted_flag() {
    let mut oracle = faulty(image(&[0xA9, 0x60, 0x04]), 0x0600, FaultKind::FlipFlag(Flag::Z));

    let err = oracle.step().unwrap_err();
    assert!(matches!(
        err,
        OracleError::StateMismatch {
            field: Field::Flag(Flag::Z),
            expected: 0,
            observed: 1
        }
    ));
}

#[test]
fn test_unaffected_register_change() {
    let mut oracle = faulty(
        image(&[0xA9, 0x60, 0x04]),
        0x0600,
        FaultKind::CorruptRegister(Register::Y),
    );

    let err = oracle.step().unwrap_err();
    assert!(matches!(
        err,
        OracleError::StateMismatch {
            field: Field::Register(Register::Y),
            expected: 0x00,
            observed: 0x01
        }
    ));
}

#[test]
fn test_wrong_asserted_register() {
    let mut oracle = faulty(
        image(&[0xA9, 0x60, 0x04]),
        0x0600,
        FaultKind::CorruptRegister(Register::ACC),
    );

    let err = oracle.step().unwrap_err();
    assert!(matches!(
        err,
        OracleError::StateMismatch {
            field: Field::Register(Register::ACC),
            expected: 0x60,
            observed: 0x61
        }
    ));
}

#[test]
fn test_stray_write() {
    // NOP must not write anywhere
    let mut oracle = faulty(
        image(&[0xEA, 0x04]),
        0x0600,
        FaultKind::StrayWrite {
            address: 0x0200,
            value: 0x00,
        },
    );

    let err = oracle.step().unwrap_err();
    assert!(matches!(
        err,
        OracleError::StateMismatch {
            field: Field::Memory(0x0200),
            expected: 0xFF,
            observed: 0x00
        }
    ));
}

#[test]
fn test_wrong_written_value() {
    // LDA #$60; STA $10
    let mut oracle = faulty(
        image(&[0xA9, 0x60, 0x85, 0x10, 0x04]),
        0x0602,
        FaultKind::WrongWriteValue,
    );

    assert!(matches!(oracle.step().unwrap(), Step::Verified(_)));
    let err = oracle.step().unwrap_err();
    assert!(matches!(
        err,
        OracleError::StateMismatch {
            field: Field::Memory(0x0010),
            expected: 0x60,
            observed: 0x61
        }
    ));
}

#[test]
fn test_instruction_finishes_early() {
    // LDA #$60; ASL A: the model starts ASL during LDA's last cycle
    let mut oracle = faulty(
        image(&[0xA9, 0x60, 0x0A, 0x04]),
        0x0600,
        FaultKind::DropCycle,
    );

    let err = oracle.step().unwrap_err();
    assert!(matches!(
        err,
        OracleError::StateMismatch {
            field: Field::Register(Register::PC),
            expected: 0x0602,
            observed: 0x0603
        }
    ));
}

#[test]
fn test_instruction_finishes_late() {
    let mut oracle = faulty(
        image(&[0xA9, 0x60, 0x04]),
        0x0600,
        FaultKind::ExtraCycle,
    );

    let err = oracle.step().unwrap_err();
    assert!(matches!(
        err,
        OracleError::StateMismatch {
            field: Field::Register(Register::PC),
            expected: 0x0602,
            observed: 0x0600
        }
    ));
}

#[test]
fn test_run_stops_at_first_failure() {
    // NOP; NOP (faulty); NOP; END
    let mut oracle = faulty(
        image(&[0xEA, 0xEA, 0xEA, 0x04]),
        0x0601,
        FaultKind::FlipFlag(Flag::V),
    );

    assert!(oracle.run().is_err());
    assert_eq!(oracle.instructions(), 1);
    assert_eq!(oracle.cursor(), 0x0601);
}
