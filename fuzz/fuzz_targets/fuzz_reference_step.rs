//! Fuzz target for the resolver and reference model.
//!
//! Builds an arbitrary pre-instruction state and memory contents, predicts
//! one instruction and checks the prediction against the catalog entry. The
//! reference model must never panic and must assert exactly the declared
//! registers and flags.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use oracle6502::{
    execute, lookup, resolve, CpuSnapshot, Flag, MemoryBus, MemoryImage, Mnemonic, Vector,
    PROGRAM_BASE,
};

/// Arbitrary register file at an instruction boundary
#[derive(Debug, Arbitrary)]
struct FuzzCpuState {
    acc: u8,
    x: u8,
    y: u8,
    sp: u8,
    /// Packed NV-BDIZC byte
    status: u8,
}

/// Memory regions the addressing modes reach most often
#[derive(Debug, Arbitrary)]
struct FuzzMemory {
    /// Opcode and operand bytes at the program base
    instruction_bytes: [u8; 3],
    zero_page: [u8; 256],
    /// Cells just above the zero page, reached by unwrapped pointer and pull reads
    page_one: [u8; 16],
    main_memory: [u8; 256],
    irq_vector: u16,
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    cpu_state: FuzzCpuState,
    memory: FuzzMemory,
}

fuzz_target!(|input: FuzzInput| {
    let mut memory = MemoryImage::new();

    for (i, &byte) in input.memory.zero_page.iter().enumerate() {
        memory.write(i as u16, byte);
    }
    for (i, &byte) in input.memory.page_one.iter().enumerate() {
        memory.write(0x0100 + i as u16, byte);
    }
    for (i, &byte) in input.memory.main_memory.iter().enumerate() {
        memory.write(0x4000 + i as u16, byte);
    }
    memory.set_vector(Vector::Irq, input.memory.irq_vector);
    if memory
        .load_program(&input.memory.instruction_bytes, PROGRAM_BASE)
        .is_err()
    {
        return;
    }

    let state = &input.cpu_state;
    let before = CpuSnapshot::new(
        PROGRAM_BASE,
        state.acc,
        state.x,
        state.y,
        state.sp,
        Flag::from_bits_truncate(state.status),
    );

    // Unmapped bytes are a clean error, never a panic
    let Ok(descriptor) = lookup(PROGRAM_BASE, input.memory.instruction_bytes[0]) else {
        return;
    };
    if descriptor.mnemonic == Mnemonic::End {
        return;
    }

    let operand = resolve(descriptor, PROGRAM_BASE, &memory, before.acc(), before.x(), before.y());
    let expected = execute(descriptor, PROGRAM_BASE, &before, operand, &memory)
        .expect("every catalog entry has semantics");

    assert_eq!(expected.asserted_registers(), descriptor.affected_registers);
    assert_eq!(expected.asserted_flags(), descriptor.affected_flags);
    assert!(expected.memory_writes().len() <= 3);

    // Branch penalty only ever applies to branches
    assert!(!expected.branch_taken() || descriptor.mnemonic.is_branch());
});
