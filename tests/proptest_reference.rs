//! Property-based tests for reference model invariants.
//!
//! These tests use proptest to check that every catalog entry agrees with the
//! reference model on which state it touches, across arbitrary registers,
//! flags and operand bytes.

mod common;

use common::ModelCpu;
use oracle6502::{
    execute, lookup, resolve, CpuSnapshot, Flag, MemoryBus, MemoryImage, Mnemonic, Oracle,
    OracleConfig, Register, Step, CATALOG,
};
use proptest::prelude::*;

/// Every opcode with semantics.
fn real_opcodes() -> Vec<u8> {
    CATALOG
        .iter()
        .filter(|d| d.mnemonic != Mnemonic::End)
        .map(|d| d.opcode)
        .collect()
}

fn branch_opcodes() -> Vec<u8> {
    CATALOG
        .iter()
        .filter(|d| d.mnemonic.is_branch())
        .map(|d| d.opcode)
        .collect()
}

fn any_flags() -> impl Strategy<Value = Flag> {
    any::<u8>().prop_map(Flag::from_bits_truncate)
}

fn any_snapshot() -> impl Strategy<Value = CpuSnapshot> {
    snapshot_with_sp(any::<u8>())
}

fn snapshot_with_sp(sp: impl Strategy<Value = u8>) -> impl Strategy<Value = CpuSnapshot> {
    (any::<u8>(), any::<u8>(), any::<u8>(), sp, any_flags())
        .prop_map(|(acc, x, y, sp, flags)| CpuSnapshot::new(0x0600, acc, x, y, sp, flags))
}

/// Pulls read `SP + 1` without wrapping to 0x0000, so a push at SP=0x00 is
/// not undone by the matching pull.
fn round_trip_snapshot() -> impl Strategy<Value = CpuSnapshot> {
    snapshot_with_sp(0x01u8..=0xFF)
}

/// Memory with the instruction at 0x0600 and a fixed pseudo-random pattern
/// elsewhere, so pointers and operands vary with the operand bytes.
fn image(opcode: u8, operand: [u8; 2], seed: u8) -> MemoryImage {
    let mut memory = MemoryImage::new();
    for address in 0..=0xFFFFu16 {
        let mixed = (address as u8) ^ (address >> 8) as u8;
        memory.write(address, mixed.wrapping_mul(31).wrapping_add(seed));
    }
    memory
        .load_program(&[opcode, operand[0], operand[1]], 0x0600)
        .unwrap();
    memory
}

fn with_writes(memory: &MemoryImage, writes: &[(u16, u8)]) -> MemoryImage {
    let mut next = memory.clone();
    for &(address, value) in writes {
        next.write(address, value);
    }
    next
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// The model asserts exactly the declared sets, and everything else is
    /// carried over unchanged by `apply`.
    #[test]
    fn prop_asserted_sets_match_catalog(
        opcode in prop::sample::select(real_opcodes()),
        operand in any::<[u8; 2]>(),
        seed in any::<u8>(),
        before in any_snapshot(),
    ) {
        let memory = image(opcode, operand, seed);
        let descriptor = lookup(0x0600, opcode).unwrap();
        let resolved = resolve(descriptor, 0x0600, &memory, before.acc(), before.x(), before.y());
        let expected = execute(descriptor, 0x0600, &before, resolved, &memory).unwrap();

        prop_assert_eq!(expected.asserted_registers(), descriptor.affected_registers);
        prop_assert_eq!(expected.asserted_flags(), descriptor.affected_flags);

        let after = before.apply(&expected);
        for register in Register::all().difference(descriptor.affected_registers).iter() {
            prop_assert_eq!(after.register(register), before.register(register));
        }
        for flag in Flag::all().difference(descriptor.affected_flags).iter() {
            prop_assert_eq!(after.flag(flag), before.flag(flag));
        }
    }

    /// Stores and read-modify-write instructions write exactly their
    /// resolved target, once.
    #[test]
    fn prop_memory_writes_hit_only_the_target(
        opcode in prop::sample::select(real_opcodes()),
        operand in any::<[u8; 2]>(),
        seed in any::<u8>(),
        before in any_snapshot(),
    ) {
        let memory = image(opcode, operand, seed);
        let descriptor = lookup(0x0600, opcode).unwrap();
        let resolved = resolve(descriptor, 0x0600, &memory, before.acc(), before.x(), before.y());
        let expected = execute(descriptor, 0x0600, &before, resolved, &memory).unwrap();

        let writes_target = matches!(
            descriptor.mnemonic,
            Mnemonic::Sta | Mnemonic::Stx | Mnemonic::Sty | Mnemonic::Inc | Mnemonic::Dec
        ) || (matches!(
            descriptor.mnemonic,
            Mnemonic::Asl | Mnemonic::Lsr | Mnemonic::Rol | Mnemonic::Ror
        ) && resolved.target().is_some());

        if writes_target {
            let target = resolved.target().unwrap();
            prop_assert_eq!(expected.memory_writes().len(), 1);
            prop_assert_eq!(expected.memory_writes()[0].0, target);
        }
    }

    #[test]
    fn prop_pha_pla_round_trip(before in round_trip_snapshot(), seed in any::<u8>()) {
        let memory = image(0x48, [0, 0], seed);
        let pha = lookup(0x0600, 0x48).unwrap();
        let operand = resolve(pha, 0x0600, &memory, 0, 0, 0);
        let pushed = execute(pha, 0x0600, &before, operand, &memory).unwrap();

        let mut memory = with_writes(&memory, pushed.memory_writes());
        memory.write(0x0600, 0x68);
        let mid = before.apply(&pushed);
        let pla = lookup(0x0600, 0x68).unwrap();
        let operand = resolve(pla, 0x0600, &memory, 0, 0, 0);
        let pulled = execute(pla, 0x0600, &mid, operand, &memory).unwrap();
        let after = mid.apply(&pulled);

        prop_assert_eq!(after.acc(), before.acc());
        prop_assert_eq!(after.sp(), before.sp());
    }

    #[test]
    fn prop_php_plp_round_trip(before in round_trip_snapshot(), seed in any::<u8>()) {
        let memory = image(0x08, [0, 0], seed);
        let php = lookup(0x0600, 0x08).unwrap();
        let operand = resolve(php, 0x0600, &memory, 0, 0, 0);
        let pushed = execute(php, 0x0600, &before, operand, &memory).unwrap();

        let mut memory = with_writes(&memory, pushed.memory_writes());
        memory.write(0x0600, 0x28);
        let mid = before.apply(&pushed);
        let plp = lookup(0x0600, 0x28).unwrap();
        let operand = resolve(plp, 0x0600, &memory, 0, 0, 0);
        let pulled = execute(plp, 0x0600, &mid, operand, &memory).unwrap();
        let after = mid.apply(&pulled);

        prop_assert_eq!(after.flags(), before.flags());
        prop_assert_eq!(after.sp(), before.sp());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A taken branch costs exactly one cycle more than the same branch
    /// not taken, measured on the bus.
    #[test]
    fn prop_taken_branch_costs_one_cycle(
        opcode in prop::sample::select(branch_opcodes()),
        // 0xFE and 0xFF would land on the branch itself
        offset in 0x00u8..=0xFD,
    ) {
        let mut cycles = Vec::new();
        for flags in [Flag::empty(), Flag::all()] {
            // Every cell outside the branch holds END
            let mut memory = MemoryImage::new();
            memory.load_program(&vec![0x04; 0x1_0000], 0x0000).unwrap();
            memory.load_program(&[opcode, offset], 0x0600).unwrap();

            let dut = ModelCpu::new(&memory)
                .with_registers(0, 0, 0, 0xFF, flags)
                .with_fill_cycles(0);
            let config = OracleConfig { reset_fill_cycles: 0, ..OracleConfig::default() };
            let mut oracle = Oracle::new(dut, memory, config);

            match oracle.step().unwrap() {
                Step::Verified(report) => cycles.push(report.cycles),
                Step::Terminated => prop_assert!(false, "branch was not executed"),
            }
            prop_assert_eq!(oracle.step().unwrap(), Step::Terminated);
        }

        // Exactly one of the two flag settings takes the branch
        prop_assert_eq!(cycles.iter().sum::<u32>(), 1 + 2);
    }
}
