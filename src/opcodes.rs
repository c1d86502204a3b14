//! # Instruction Catalog
//!
//! This module contains the opcode catalog that serves as the single source of
//! truth for every instruction the CPU under test is expected to execute.
//!
//! Each entry records:
//! - Mnemonic (instruction name)
//! - Addressing mode
//! - Instruction size in bytes
//! - Cycle count of the CPU under test (branch-taken and reset penalties are
//!   added by the scheduler)
//! - The flags and registers the instruction is allowed to change
//!
//! Several cycle counts are lower than the historical NMOS figures. They are the
//! timings of the implementation being verified and must not be "corrected":
//! single-byte implied instructions take 1 cycle instead of 2, read-modify-write
//! instructions lose one cycle (two for indexed forms), stack pushes and pulls
//! take 2, `STA (zp,X)`/`STA (zp),Y` take 5, `BRK` takes 6 and `RTS` takes 3.
//! An untaken branch takes 1 cycle and a taken branch 2.
//!
//! Byte 0x04 is not an instruction. It terminates a verification run.

use std::fmt;

use crate::addressing::AddressingMode;
use crate::cpu::{Flag, Register};
use crate::{OracleError, Result};

/// Instruction name, one variant per semantic function of the reference model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    /// Run terminator, not a real instruction.
    End,
}

impl Mnemonic {
    /// Upper-case assembler name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Mnemonic::Adc => "ADC",
            Mnemonic::And => "AND",
            Mnemonic::Asl => "ASL",
            Mnemonic::Bcc => "BCC",
            Mnemonic::Bcs => "BCS",
            Mnemonic::Beq => "BEQ",
            Mnemonic::Bit => "BIT",
            Mnemonic::Bmi => "BMI",
            Mnemonic::Bne => "BNE",
            Mnemonic::Bpl => "BPL",
            Mnemonic::Brk => "BRK",
            Mnemonic::Bvc => "BVC",
            Mnemonic::Bvs => "BVS",
            Mnemonic::Clc => "CLC",
            Mnemonic::Cld => "CLD",
            Mnemonic::Cli => "CLI",
            Mnemonic::Clv => "CLV",
            Mnemonic::Cmp => "CMP",
            Mnemonic::Cpx => "CPX",
            Mnemonic::Cpy => "CPY",
            Mnemonic::Dec => "DEC",
            Mnemonic::Dex => "DEX",
            Mnemonic::Dey => "DEY",
            Mnemonic::Eor => "EOR",
            Mnemonic::Inc => "INC",
            Mnemonic::Inx => "INX",
            Mnemonic::Iny => "INY",
            Mnemonic::Jmp => "JMP",
            Mnemonic::Jsr => "JSR",
            Mnemonic::Lda => "LDA",
            Mnemonic::Ldx => "LDX",
            Mnemonic::Ldy => "LDY",
            Mnemonic::Lsr => "LSR",
            Mnemonic::Nop => "NOP",
            Mnemonic::Ora => "ORA",
            Mnemonic::Pha => "PHA",
            Mnemonic::Php => "PHP",
            Mnemonic::Pla => "PLA",
            Mnemonic::Plp => "PLP",
            Mnemonic::Rol => "ROL",
            Mnemonic::Ror => "ROR",
            Mnemonic::Rti => "RTI",
            Mnemonic::Rts => "RTS",
            Mnemonic::Sbc => "SBC",
            Mnemonic::Sec => "SEC",
            Mnemonic::Sed => "SED",
            Mnemonic::Sei => "SEI",
            Mnemonic::Sta => "STA",
            Mnemonic::Stx => "STX",
            Mnemonic::Sty => "STY",
            Mnemonic::Tax => "TAX",
            Mnemonic::Tay => "TAY",
            Mnemonic::Tsx => "TSX",
            Mnemonic::Txa => "TXA",
            Mnemonic::Txs => "TXS",
            Mnemonic::Tya => "TYA",
            Mnemonic::End => "END",
        }
    }

    /// True for the eight conditional branches.
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Mnemonic::Bpl
                | Mnemonic::Bmi
                | Mnemonic::Bvc
                | Mnemonic::Bvs
                | Mnemonic::Bcc
                | Mnemonic::Bcs
                | Mnemonic::Bne
                | Mnemonic::Beq
        )
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one opcode.
///
/// # Examples
///
/// ```
/// use oracle6502::{lookup, AddressingMode, Flag, Mnemonic, Register};
///
/// let lda_imm = lookup(0x0600, 0xA9).unwrap();
/// assert_eq!(lda_imm.mnemonic, Mnemonic::Lda);
/// assert_eq!(lda_imm.addressing_mode, AddressingMode::Immediate);
/// assert_eq!(lda_imm.base_cycles, 2);
/// assert_eq!(lda_imm.size_bytes, 2);
/// assert_eq!(lda_imm.affected_flags, Flag::N | Flag::Z);
/// assert_eq!(lda_imm.affected_registers, Register::PC | Register::ACC);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeDescriptor {
    /// Opcode byte.
    pub opcode: u8,

    /// Instruction name.
    pub mnemonic: Mnemonic,

    /// Addressing mode for this instruction.
    pub addressing_mode: AddressingMode,

    /// Total instruction size in bytes (opcode + operands), 1-3.
    ///
    /// BRK is declared as 2 bytes: the byte after it is a padding signature.
    pub size_bytes: u8,

    /// Cycles consumed by the CPU under test, before branch and reset penalties.
    pub base_cycles: u8,

    /// Status flags the instruction may change.
    pub affected_flags: Flag,

    /// Registers the instruction may change.
    pub affected_registers: Register,
}

impl fmt::Display for OpcodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?} (0x{:02X})",
            self.mnemonic, self.addressing_mode, self.opcode
        )
    }
}

const fn op(
    opcode: u8,
    mnemonic: Mnemonic,
    addressing_mode: AddressingMode,
    size_bytes: u8,
    base_cycles: u8,
    affected_flags: Flag,
    affected_registers: Register,
) -> OpcodeDescriptor {
    OpcodeDescriptor {
        opcode,
        mnemonic,
        addressing_mode,
        size_bytes,
        base_cycles,
        affected_flags,
        affected_registers,
    }
}

const NONE: Flag = Flag::empty();
const NZ: Flag = Flag::N.union(Flag::Z);
const NZC: Flag = NZ.union(Flag::C);
const NZCV: Flag = NZC.union(Flag::V);
const NVZ: Flag = NZ.union(Flag::V);
const STATUS: Flag = Flag::all();

const PC: Register = Register::PC;
const PC_ACC: Register = Register::PC.union(Register::ACC);
const PC_X: Register = Register::PC.union(Register::X);
const PC_Y: Register = Register::PC.union(Register::Y);
const PC_SP: Register = Register::PC.union(Register::SP);
const PC_SP_ACC: Register = PC_SP.union(Register::ACC);

use AddressingMode::{
    Absolute as Abs, AbsoluteX as AbsX, AbsoluteY as AbsY, Accumulator as Acc, Immediate as Imm,
    Implicit as Impl, Indirect as Ind, IndirectX as IndX, IndirectY as IndY, Relative as Rel,
    ZeroPage as Zpg, ZeroPageX as ZpgX, ZeroPageY as ZpgY,
};
use Mnemonic::*;

/// Every opcode the oracle understands, in catalog order.
pub const CATALOG: &[OpcodeDescriptor] = &[
    op(0xA9, Lda, Imm, 2, 2, NZ, PC_ACC),
    op(0xA5, Lda, Zpg, 2, 3, NZ, PC_ACC),
    op(0xB5, Lda, ZpgX, 2, 3, NZ, PC_ACC),
    op(0xAD, Lda, Abs, 3, 4, NZ, PC_ACC),
    op(0xBD, Lda, AbsX, 3, 4, NZ, PC_ACC),
    op(0xB9, Lda, AbsY, 3, 4, NZ, PC_ACC),
    op(0xA1, Lda, IndX, 2, 5, NZ, PC_ACC),
    op(0xB1, Lda, IndY, 2, 5, NZ, PC_ACC),
    op(0x85, Sta, Zpg, 2, 3, NONE, PC),
    op(0x95, Sta, ZpgX, 2, 3, NONE, PC),
    op(0x8D, Sta, Abs, 3, 4, NONE, PC),
    op(0x9D, Sta, AbsX, 3, 4, NONE, PC),
    op(0x99, Sta, AbsY, 3, 4, NONE, PC),
    op(0x81, Sta, IndX, 2, 5, NONE, PC),
    op(0x91, Sta, IndY, 2, 5, NONE, PC),
    op(0x69, Adc, Imm, 2, 2, NZCV, PC_ACC),
    op(0x65, Adc, Zpg, 2, 3, NZCV, PC_ACC),
    op(0x75, Adc, ZpgX, 2, 3, NZCV, PC_ACC),
    op(0x6D, Adc, Abs, 3, 4, NZCV, PC_ACC),
    op(0x7D, Adc, AbsX, 3, 4, NZCV, PC_ACC),
    op(0x79, Adc, AbsY, 3, 4, NZCV, PC_ACC),
    op(0x61, Adc, IndX, 2, 5, NZCV, PC_ACC),
    op(0x71, Adc, IndY, 2, 5, NZCV, PC_ACC),
    op(0xE9, Sbc, Imm, 2, 2, NZCV, PC_ACC),
    op(0xE5, Sbc, Zpg, 2, 3, NZCV, PC_ACC),
    op(0xF5, Sbc, ZpgX, 2, 3, NZCV, PC_ACC),
    op(0xED, Sbc, Abs, 3, 4, NZCV, PC_ACC),
    op(0xFD, Sbc, AbsX, 3, 4, NZCV, PC_ACC),
    op(0xF9, Sbc, AbsY, 3, 4, NZCV, PC_ACC),
    op(0xE1, Sbc, IndX, 2, 5, NZCV, PC_ACC),
    op(0xF1, Sbc, IndY, 2, 5, NZCV, PC_ACC),
    op(0x09, Ora, Imm, 2, 2, NZ, PC_ACC),
    op(0x05, Ora, Zpg, 2, 3, NZ, PC_ACC),
    op(0x15, Ora, ZpgX, 2, 3, NZ, PC_ACC),
    op(0x0D, Ora, Abs, 3, 4, NZ, PC_ACC),
    op(0x1D, Ora, AbsX, 3, 4, NZ, PC_ACC),
    op(0x19, Ora, AbsY, 3, 4, NZ, PC_ACC),
    op(0x01, Ora, IndX, 2, 5, NZ, PC_ACC),
    op(0x11, Ora, IndY, 2, 5, NZ, PC_ACC),
    op(0x29, And, Imm, 2, 2, NZ, PC_ACC),
    op(0x25, And, Zpg, 2, 3, NZ, PC_ACC),
    op(0x35, And, ZpgX, 2, 3, NZ, PC_ACC),
    op(0x2D, And, Abs, 3, 4, NZ, PC_ACC),
    op(0x3D, And, AbsX, 3, 4, NZ, PC_ACC),
    op(0x39, And, AbsY, 3, 4, NZ, PC_ACC),
    op(0x21, And, IndX, 2, 5, NZ, PC_ACC),
    op(0x31, And, IndY, 2, 5, NZ, PC_ACC),
    op(0x49, Eor, Imm, 2, 2, NZ, PC_ACC),
    op(0x45, Eor, Zpg, 2, 3, NZ, PC_ACC),
    op(0x55, Eor, ZpgX, 2, 3, NZ, PC_ACC),
    op(0x4D, Eor, Abs, 3, 4, NZ, PC_ACC),
    op(0x5D, Eor, AbsX, 3, 4, NZ, PC_ACC),
    op(0x59, Eor, AbsY, 3, 4, NZ, PC_ACC),
    op(0x41, Eor, IndX, 2, 5, NZ, PC_ACC),
    op(0x51, Eor, IndY, 2, 5, NZ, PC_ACC),
    op(0xC9, Cmp, Imm, 2, 2, NZC, PC),
    op(0xC5, Cmp, Zpg, 2, 3, NZC, PC),
    op(0xD5, Cmp, ZpgX, 2, 3, NZC, PC),
    op(0xCD, Cmp, Abs, 3, 4, NZC, PC),
    op(0xDD, Cmp, AbsX, 3, 4, NZC, PC),
    op(0xD9, Cmp, AbsY, 3, 4, NZC, PC),
    op(0xC1, Cmp, IndX, 2, 5, NZC, PC),
    op(0xD1, Cmp, IndY, 2, 5, NZC, PC),
    op(0xC0, Cpy, Imm, 2, 2, NZC, PC),
    op(0xC4, Cpy, Zpg, 2, 3, NZC, PC),
    op(0xCC, Cpy, Abs, 3, 4, NZC, PC),
    op(0xE0, Cpx, Imm, 2, 2, NZC, PC),
    op(0xE4, Cpx, Zpg, 2, 3, NZC, PC),
    op(0xEC, Cpx, Abs, 3, 4, NZC, PC),
    op(0xA0, Ldy, Imm, 2, 2, NZ, PC_Y),
    op(0xA4, Ldy, Zpg, 2, 3, NZ, PC_Y),
    op(0xB4, Ldy, ZpgX, 2, 3, NZ, PC_Y),
    op(0xAC, Ldy, Abs, 3, 4, NZ, PC_Y),
    op(0xBC, Ldy, AbsX, 3, 4, NZ, PC_Y),
    op(0xA2, Ldx, Imm, 2, 2, NZ, PC_X),
    op(0xA6, Ldx, Zpg, 2, 3, NZ, PC_X),
    op(0xB6, Ldx, ZpgY, 2, 3, NZ, PC_X),
    op(0xAE, Ldx, Abs, 3, 4, NZ, PC_X),
    op(0xBE, Ldx, AbsY, 3, 4, NZ, PC_X),
    op(0x84, Sty, Zpg, 2, 3, NONE, PC),
    op(0x94, Sty, ZpgX, 2, 3, NONE, PC),
    op(0x8C, Sty, Abs, 3, 4, NONE, PC),
    op(0x86, Stx, Zpg, 2, 3, NONE, PC),
    op(0x96, Stx, ZpgY, 2, 3, NONE, PC),
    op(0x8E, Stx, Abs, 3, 4, NONE, PC),
    op(0xE6, Inc, Zpg, 2, 4, NZ, PC),
    op(0xF6, Inc, ZpgX, 2, 4, NZ, PC),
    op(0xEE, Inc, Abs, 3, 5, NZ, PC),
    op(0xFE, Inc, AbsX, 3, 5, NZ, PC),
    op(0xC6, Dec, Zpg, 2, 4, NZ, PC),
    op(0xD6, Dec, ZpgX, 2, 4, NZ, PC),
    op(0xCE, Dec, Abs, 3, 5, NZ, PC),
    op(0xDE, Dec, AbsX, 3, 5, NZ, PC),
    op(0x0A, Asl, Acc, 1, 1, NZC, PC_ACC),
    op(0x06, Asl, Zpg, 2, 4, NZC, PC),
    op(0x16, Asl, ZpgX, 2, 4, NZC, PC),
    op(0x0E, Asl, Abs, 3, 5, NZC, PC),
    op(0x1E, Asl, AbsX, 3, 5, NZC, PC),
    op(0x2A, Rol, Acc, 1, 1, NZC, PC_ACC),
    op(0x26, Rol, Zpg, 2, 4, NZC, PC),
    op(0x36, Rol, ZpgX, 2, 4, NZC, PC),
    op(0x2E, Rol, Abs, 3, 5, NZC, PC),
    op(0x3E, Rol, AbsX, 3, 5, NZC, PC),
    op(0x4A, Lsr, Acc, 1, 1, NZC, PC_ACC),
    op(0x46, Lsr, Zpg, 2, 4, NZC, PC),
    op(0x56, Lsr, ZpgX, 2, 4, NZC, PC),
    op(0x4E, Lsr, Abs, 3, 5, NZC, PC),
    op(0x5E, Lsr, AbsX, 3, 5, NZC, PC),
    op(0x6A, Ror, Acc, 1, 1, NZC, PC_ACC),
    op(0x66, Ror, Zpg, 2, 4, NZC, PC),
    op(0x76, Ror, ZpgX, 2, 4, NZC, PC),
    op(0x6E, Ror, Abs, 3, 5, NZC, PC),
    op(0x7E, Ror, AbsX, 3, 5, NZC, PC),
    op(0x38, Sec, Impl, 1, 1, Flag::C, PC),
    op(0x18, Clc, Impl, 1, 1, Flag::C, PC),
    op(0x78, Sei, Impl, 1, 1, Flag::I, PC),
    op(0x58, Cli, Impl, 1, 1, Flag::I, PC),
    op(0xF8, Sed, Impl, 1, 1, Flag::D, PC),
    op(0xD8, Cld, Impl, 1, 1, Flag::D, PC),
    op(0xB8, Clv, Impl, 1, 1, Flag::V, PC),
    op(0xE8, Inx, Impl, 1, 1, NZ, PC_X),
    op(0xC8, Iny, Impl, 1, 1, NZ, PC_Y),
    op(0xCA, Dex, Impl, 1, 1, NZ, PC_X),
    op(0x88, Dey, Impl, 1, 1, NZ, PC_Y),
    op(0x08, Php, Impl, 1, 2, NONE, PC_SP),
    op(0x48, Pha, Impl, 1, 2, NONE, PC_SP),
    op(0x68, Pla, Impl, 1, 2, NZ, PC_SP_ACC),
    op(0x28, Plp, Impl, 1, 2, STATUS, PC_SP),
    op(0xAA, Tax, Impl, 1, 1, NZ, PC_X),
    op(0xA8, Tay, Impl, 1, 1, NZ, PC_Y),
    op(0x8A, Txa, Impl, 1, 1, NZ, PC_ACC),
    op(0x98, Tya, Impl, 1, 1, NZ, PC_ACC),
    op(0xBA, Tsx, Impl, 1, 1, NZ, PC_X),
    op(0x9A, Txs, Impl, 1, 1, NONE, PC_SP),
    op(0x4C, Jmp, Abs, 3, 3, NONE, PC),
    op(0x6C, Jmp, Ind, 3, 5, NONE, PC),
    op(0x00, Brk, Impl, 2, 6, Flag::I, PC_SP),
    op(0x40, Rti, Impl, 1, 4, STATUS, PC_SP),
    op(0x20, Jsr, Abs, 3, 5, NONE, PC_SP),
    op(0x60, Rts, Impl, 1, 3, NONE, PC_SP),
    op(0x10, Bpl, Rel, 2, 1, NONE, PC),
    op(0x30, Bmi, Rel, 2, 1, NONE, PC),
    op(0x50, Bvc, Rel, 2, 1, NONE, PC),
    op(0x70, Bvs, Rel, 2, 1, NONE, PC),
    op(0x90, Bcc, Rel, 2, 1, NONE, PC),
    op(0xB0, Bcs, Rel, 2, 1, NONE, PC),
    op(0xD0, Bne, Rel, 2, 1, NONE, PC),
    op(0xF0, Beq, Rel, 2, 1, NONE, PC),
    op(0x24, Bit, Zpg, 2, 3, NVZ, PC),
    op(0x2C, Bit, Abs, 3, 4, NVZ, PC),
    op(0xEA, Nop, Impl, 1, 2, NONE, PC),
    op(0x04, End, Impl, 1, 1, NONE, Register::empty()),
];

const fn build_table() -> [Option<OpcodeDescriptor>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < CATALOG.len() {
        let descriptor = CATALOG[i];
        assert!(
            table[descriptor.opcode as usize].is_none(),
            "duplicate opcode in catalog"
        );
        table[descriptor.opcode as usize] = Some(descriptor);
        i += 1;
    }
    table
}

/// 256-entry lookup table indexed by opcode byte. Unmapped bytes are `None`.
pub static OPCODE_TABLE: [Option<OpcodeDescriptor>; 256] = build_table();

/// Looks up the descriptor of the opcode fetched from `address`.
///
/// Returns `UnknownOpcode` if the byte is not in the catalog.
pub fn lookup(address: u16, opcode: u8) -> Result<&'static OpcodeDescriptor> {
    OPCODE_TABLE[opcode as usize]
        .as_ref()
        .ok_or(OracleError::UnknownOpcode { address, opcode })
}
