//! # Verifier
//!
//! Compares the observed post-instruction state of the CPU under test against
//! the reference model's expectation.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. Memory: every expected write holds its value, and every other cell the
//!    CPU wrote during the instruction still holds its pre-instruction value.
//! 2. Registers and flags outside the catalog's declared sets are unchanged.
//! 3. Every register and flag the model asserted on matches.
//! 4. The asserted sets equal the declared sets exactly.
//!
//! Only journaled cells can differ from the pre-instruction image, so the
//! memory check costs one comparison per write instead of one per cell.

use crate::cpu::{CpuSnapshot, Flag, Register};
use crate::instructions::ExpectedState;
use crate::memory::{MemoryBus, MemoryImage};
use crate::opcodes::OpcodeDescriptor;
use crate::{Field, OracleError, Result};

fn mismatch(field: Field, expected: u16, observed: u16) -> Result<()> {
    if expected == observed {
        Ok(())
    } else {
        Err(OracleError::StateMismatch {
            field,
            expected,
            observed,
        })
    }
}

fn check_memory(expected: &ExpectedState, memory: &MemoryImage) -> Result<()> {
    let writes = expected.memory_writes();

    for (index, &(address, value)) in writes.iter().enumerate() {
        // Only the last expected write to a cell is visible afterwards
        if writes[index + 1..].iter().any(|&(later, _)| later == address) {
            continue;
        }
        mismatch(
            Field::Memory(address),
            u16::from(value),
            u16::from(memory.read(address)),
        )?;
    }

    for record in memory.journal() {
        if writes.iter().any(|&(address, _)| address == record.address) {
            continue;
        }
        mismatch(
            Field::Memory(record.address),
            u16::from(memory.value_before_step(record.address)),
            u16::from(memory.read(record.address)),
        )?;
    }

    Ok(())
}

fn check_unaffected(
    descriptor: &OpcodeDescriptor,
    before: &CpuSnapshot,
    observed: &CpuSnapshot,
) -> Result<()> {
    for register in Register::all()
        .difference(descriptor.affected_registers)
        .iter()
    {
        mismatch(
            Field::Register(register),
            before.register(register),
            observed.register(register),
        )?;
    }

    for flag in Flag::all().difference(descriptor.affected_flags).iter() {
        mismatch(
            Field::Flag(flag),
            u16::from(before.flag(flag)),
            u16::from(observed.flag(flag)),
        )?;
    }

    Ok(())
}

fn check_asserted(expected: &ExpectedState, observed: &CpuSnapshot) -> Result<()> {
    for register in expected.asserted_registers().iter() {
        if let Some(value) = expected.register(register) {
            mismatch(Field::Register(register), value, observed.register(register))?;
        }
    }

    for flag in expected.asserted_flags().iter() {
        if let Some(value) = expected.flag(flag) {
            mismatch(
                Field::Flag(flag),
                u16::from(value),
                u16::from(observed.flag(flag)),
            )?;
        }
    }

    Ok(())
}

fn check_declared(descriptor: &OpcodeDescriptor, expected: &ExpectedState) -> Result<()> {
    let asserted_registers = expected.asserted_registers();
    let asserted_flags = expected.asserted_flags();

    if asserted_registers == descriptor.affected_registers
        && asserted_flags == descriptor.affected_flags
    {
        return Ok(());
    }

    Err(OracleError::CatalogModelDrift {
        mnemonic: descriptor.mnemonic,
        declared_registers: descriptor.affected_registers,
        asserted_registers,
        declared_flags: descriptor.affected_flags,
        asserted_flags,
    })
}

/// Verifies one executed instruction.
///
/// `memory` is the image after the instruction's cycles, with its journal
/// covering exactly those cycles.
pub fn verify(
    descriptor: &OpcodeDescriptor,
    before: &CpuSnapshot,
    expected: &ExpectedState,
    observed: &CpuSnapshot,
    memory: &MemoryImage,
) -> Result<()> {
    check_memory(expected, memory)?;
    check_unaffected(descriptor, before, observed)?;
    check_asserted(expected, observed)?;
    check_declared(descriptor, expected)
}
