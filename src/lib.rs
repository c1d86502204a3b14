//! # 6502 Verification Oracle
//!
//! A cycle-synchronized golden reference model for checking 6502-compatible CPU
//! implementations instruction by instruction.
//!
//! The oracle serves every bus transaction of the CPU under test from its own
//! memory image, predicts the outcome of each instruction with a pure reference
//! model, and compares the CPU's registers, flags and memory side effects
//! against that prediction after the instruction's cycles have elapsed. The
//! first mismatch aborts the run.
//!
//! ## Quick Start
//!
//! ```rust
//! use oracle6502::{lookup, resolve, execute, CpuSnapshot, Flag, MemoryImage};
//!
//! // INC $0A with mem[0x0A] = 0x05
//! let mut memory = MemoryImage::with_program(&[0xE6, 0x0A, 0x04]).unwrap();
//! memory.load_program(&[0x05], 0x000A).unwrap();
//!
//! let before = CpuSnapshot::new(0x0600, 0x00, 0x00, 0x00, 0xFF, Flag::empty());
//! let inc = lookup(0x0600, 0xE6).unwrap();
//! let operand = resolve(inc, 0x0600, &memory, before.acc(), before.x(), before.y());
//! let expected = execute(inc, 0x0600, &before, operand, &memory).unwrap();
//!
//! assert_eq!(expected.memory_writes(), &[(0x000A, 0x06)]);
//! assert_eq!(expected.flag(Flag::Z), Some(false));
//! ```
//!
//! Driving a real design goes through [`Oracle`], which is generic over any
//! binding implementing [`CpuPins`] and [`RegisterProbe`].
//!
//! ## Modules
//!
//! - `opcodes` - Instruction catalog and opcode lookup
//! - `addressing` - Addressing modes and the operand resolver
//! - `memory` - MemoryBus trait and the journaled memory image
//! - `cpu` - Register/flag sets and CPU snapshots
//! - `scheduler` - Clock-edge driven bus servicing
//! - `verifier` - Expected vs observed comparison
//! - `oracle` - Reset, step and run loop

pub mod addressing;
pub mod cpu;
pub mod memory;
pub mod opcodes;
pub mod oracle;
pub mod scheduler;
pub mod verifier;

// Reference model; the entry point and its output type are re-exported below
mod instructions;

use std::fmt;

// Re-export public API
pub use addressing::{resolve, AddressingMode, ResolvedOperand};
pub use cpu::{CpuSnapshot, Flag, Register, RegisterProbe};
pub use instructions::{execute, ExpectedState};
pub use memory::{MemoryBus, MemoryImage, Vector, WriteRecord, PROGRAM_BASE};
pub use opcodes::{lookup, Mnemonic, OpcodeDescriptor, CATALOG, OPCODE_TABLE};
pub use oracle::{InstructionReport, Oracle, OracleConfig, RunSummary, Step};
pub use scheduler::{BusDirection, BusTransaction, CpuPins, CpuUnderTest, CycleScheduler};
pub use verifier::verify;

/// A piece of CPU state compared by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// One register.
    Register(Register),
    /// One status flag.
    Flag(Flag),
    /// One memory cell.
    Memory(u16),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Register(register) => f.write_str(register.name()),
            Field::Flag(flag) => write!(f, "flag {}", flag.name()),
            Field::Memory(address) => write!(f, "mem[0x{address:04X}]"),
        }
    }
}

/// Errors that abort a verification run.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The byte at the program cursor is not in the catalog.
    #[error("invalid opcode 0x{opcode:02X} found at address 0x{address:04X}")]
    UnknownOpcode { address: u16, opcode: u8 },

    /// A semantic function needed an effective address its mode does not produce.
    #[error("{mnemonic} cannot use addressing mode {mode:?}")]
    UnresolvedAddressingMode {
        mnemonic: Mnemonic,
        mode: AddressingMode,
    },

    /// No semantic function exists for the mnemonic.
    #[error("no validator for {0}")]
    NoValidator(Mnemonic),

    /// Observed state differs from the reference model.
    #[error("{field} mismatch: expected 0x{expected:02X}, observed 0x{observed:02X}")]
    StateMismatch {
        field: Field,
        expected: u16,
        observed: u16,
    },

    /// The reference model checked a different set of registers or flags than
    /// the catalog declares for the opcode.
    #[error(
        "{mnemonic} declares registers {declared_registers:?} and flags {declared_flags:?} \
         but the reference model asserted registers {asserted_registers:?} and flags {asserted_flags:?}"
    )]
    CatalogModelDrift {
        mnemonic: Mnemonic,
        declared_registers: Register,
        asserted_registers: Register,
        declared_flags: Flag,
        asserted_flags: Flag,
    },

    /// A program image does not fit between its base address and 0xFFFF.
    #[error("program image of {len} bytes does not fit at base 0x{base:04X}")]
    ImageTooLarge { len: usize, base: u16 },

    /// A program image file could not be read.
    #[error("failed to read program image: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, OracleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_display() {
        assert_eq!(Field::Register(Register::ACC).to_string(), "ACC");
        assert_eq!(Field::Flag(Flag::C).to_string(), "flag C");
        assert_eq!(Field::Memory(0x00FF).to_string(), "mem[0x00FF]");
    }

    #[test]
    fn test_state_mismatch_message() {
        let err = OracleError::StateMismatch {
            field: Field::Register(Register::X),
            expected: 0x10,
            observed: 0x11,
        };
        assert_eq!(err.to_string(), "X mismatch: expected 0x10, observed 0x11");
    }
}
