//! # Reference Model
//!
//! Pure semantic functions computing the expected outcome of one instruction
//! from the pre-instruction snapshot, the resolved operand and the
//! pre-instruction memory image. Nothing here touches the CPU under test.
//!
//! ## Categories
//!
//! - **alu**: Arithmetic and logic operations (ADC, SBC, AND, ORA, EOR, CMP, CPX, CPY, BIT)
//! - **branches**: Conditional branch instructions (BCC, BCS, BEQ, BNE, BMI, BPL, BVC, BVS)
//! - **shifts**: Shift and rotate operations (ASL, LSR, ROL, ROR)
//! - **load_store**: Load and store instructions (LDA, LDX, LDY, STA, STX, STY)
//! - **inc_dec**: Increment and decrement operations (INC, DEC, INX, INY, DEX, DEY)
//! - **control**: Control flow instructions (JMP, JSR, RTS, RTI, BRK, NOP)
//! - **stack**: Stack operations (PHA, PHP, PLA, PLP)
//! - **flags**: Status flag manipulation (CLC, SEC, CLI, SEI, CLD, SED, CLV)
//! - **transfer**: Register transfer operations (TAX, TAY, TXA, TYA, TSX, TXS)
//!
//! Every function records exactly the registers, flags and memory cells it
//! asserts on in an [`ExpectedState`]. The verifier later compares those
//! asserted sets against the catalog declaration.

pub(crate) mod alu;
pub(crate) mod branches;
pub(crate) mod control;
pub(crate) mod flags;
pub(crate) mod inc_dec;
pub(crate) mod load_store;
pub(crate) mod shifts;
pub(crate) mod stack;
pub(crate) mod transfer;

use crate::addressing::ResolvedOperand;
use crate::cpu::{CpuSnapshot, Flag, Register};
use crate::memory::MemoryBus;
use crate::opcodes::{Mnemonic, OpcodeDescriptor};
use crate::{OracleError, Result};

/// Expected post-instruction state.
///
/// Registers and flags left as `None`/unasserted were not checked by the
/// reference model; the verifier requires them to be unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpectedState {
    pc: Option<u16>,
    acc: Option<u8>,
    x: Option<u8>,
    y: Option<u8>,
    sp: Option<u8>,
    asserted_flags: Flag,
    flag_values: Flag,
    memory_writes: Vec<(u16, u8)>,
    branch_taken: bool,
}

impl ExpectedState {
    pub(crate) fn set_pc(&mut self, value: u16) {
        self.pc = Some(value);
    }

    pub(crate) fn set_acc(&mut self, value: u8) {
        self.acc = Some(value);
    }

    pub(crate) fn set_x(&mut self, value: u8) {
        self.x = Some(value);
    }

    pub(crate) fn set_y(&mut self, value: u8) {
        self.y = Some(value);
    }

    pub(crate) fn set_sp(&mut self, value: u8) {
        self.sp = Some(value);
    }

    pub(crate) fn set_flag(&mut self, flag: Flag, value: bool) {
        self.asserted_flags.insert(flag);
        self.flag_values.set(flag, value);
    }

    /// Asserts N and Z from a result byte.
    pub(crate) fn set_nz(&mut self, value: u8) {
        self.set_flag(Flag::N, value & 0x80 != 0);
        self.set_flag(Flag::Z, value == 0);
    }

    pub(crate) fn write(&mut self, address: u16, value: u8) {
        self.memory_writes.push((address, value));
    }

    pub(crate) fn take_branch(&mut self) {
        self.branch_taken = true;
    }

    /// Expected program counter.
    pub fn pc(&self) -> Option<u16> {
        self.pc
    }

    /// Expected accumulator.
    pub fn acc(&self) -> Option<u8> {
        self.acc
    }

    /// Expected X register.
    pub fn x(&self) -> Option<u8> {
        self.x
    }

    /// Expected Y register.
    pub fn y(&self) -> Option<u8> {
        self.y
    }

    /// Expected stack pointer.
    pub fn sp(&self) -> Option<u8> {
        self.sp
    }

    /// Expected value of one register, widened to 16 bits.
    pub fn register(&self, register: Register) -> Option<u16> {
        match register {
            Register::PC => self.pc,
            Register::ACC => self.acc.map(u16::from),
            Register::X => self.x.map(u16::from),
            Register::Y => self.y.map(u16::from),
            Register::SP => self.sp.map(u16::from),
            _ => None,
        }
    }

    /// Expected value of one flag, if asserted.
    pub fn flag(&self, flag: Flag) -> Option<bool> {
        self.asserted_flags
            .contains(flag)
            .then(|| self.flag_values.contains(flag))
    }

    /// Flags the model asserted on.
    pub fn asserted_flags(&self) -> Flag {
        self.asserted_flags
    }

    /// Values of the asserted flags; bits outside `asserted_flags` are clear.
    pub fn flag_values(&self) -> Flag {
        self.flag_values
    }

    /// Registers the model asserted on.
    pub fn asserted_registers(&self) -> Register {
        let mut asserted = Register::empty();
        asserted.set(Register::PC, self.pc.is_some());
        asserted.set(Register::ACC, self.acc.is_some());
        asserted.set(Register::X, self.x.is_some());
        asserted.set(Register::Y, self.y.is_some());
        asserted.set(Register::SP, self.sp.is_some());
        asserted
    }

    /// Memory cells the instruction must write, in write order.
    pub fn memory_writes(&self) -> &[(u16, u8)] {
        &self.memory_writes
    }

    /// True when a conditional branch was taken (one extra cycle).
    pub fn branch_taken(&self) -> bool {
        self.branch_taken
    }
}

/// Inputs of one semantic function.
pub(crate) struct Context<'a, M: MemoryBus> {
    pub descriptor: &'a OpcodeDescriptor,
    pub opcode_address: u16,
    pub before: &'a CpuSnapshot,
    pub operand: ResolvedOperand,
    pub memory: &'a M,
}

impl<M: MemoryBus> Context<'_, M> {
    /// Effective address; fails for modes that produce none.
    pub fn target(&self) -> Result<u16> {
        self.operand
            .target()
            .ok_or(OracleError::UnresolvedAddressingMode {
                mnemonic: self.descriptor.mnemonic,
                mode: self.descriptor.addressing_mode,
            })
    }

    /// Operand fetched from memory; fails for modes that fetch nothing.
    pub fn value(&self) -> Result<u8> {
        self.target()?;
        Ok(self.operand.value())
    }

    /// Address of the next sequential instruction.
    pub fn fallthrough(&self) -> u16 {
        self.opcode_address
            .wrapping_add(u16::from(self.descriptor.size_bytes))
    }
}

/// Computes the expected outcome of the instruction at `opcode_address`.
///
/// The program counter defaults to the next sequential instruction when the
/// semantic function does not redirect it. The END sentinel has no semantics
/// and yields `NoValidator`.
///
/// # Examples
///
/// ```
/// use oracle6502::{execute, lookup, resolve, CpuSnapshot, Flag, MemoryImage};
///
/// // LDA #$60
/// let mem = MemoryImage::with_program(&[0xA9, 0x60]).unwrap();
/// let before = CpuSnapshot::new(0x0600, 0x00, 0x00, 0x00, 0xFF, Flag::empty());
/// let lda = lookup(0x0600, 0xA9).unwrap();
/// let operand = resolve(lda, 0x0600, &mem, before.acc(), before.x(), before.y());
///
/// let expected = execute(lda, 0x0600, &before, operand, &mem).unwrap();
/// assert_eq!(expected.acc(), Some(0x60));
/// assert_eq!(expected.pc(), Some(0x0602));
/// assert_eq!(expected.flag(Flag::N), Some(false));
/// ```
pub fn execute<M: MemoryBus>(
    descriptor: &OpcodeDescriptor,
    opcode_address: u16,
    before: &CpuSnapshot,
    operand: ResolvedOperand,
    memory: &M,
) -> Result<ExpectedState> {
    let ctx = Context {
        descriptor,
        opcode_address,
        before,
        operand,
        memory,
    };
    let mut expected = ExpectedState::default();
    let out = &mut expected;

    match descriptor.mnemonic {
        Mnemonic::Adc => alu::execute_adc(&ctx, out)?,
        Mnemonic::Sbc => alu::execute_sbc(&ctx, out)?,
        Mnemonic::And => alu::execute_and(&ctx, out)?,
        Mnemonic::Ora => alu::execute_ora(&ctx, out)?,
        Mnemonic::Eor => alu::execute_eor(&ctx, out)?,
        Mnemonic::Cmp => alu::execute_cmp(&ctx, out)?,
        Mnemonic::Cpx => alu::execute_cpx(&ctx, out)?,
        Mnemonic::Cpy => alu::execute_cpy(&ctx, out)?,
        Mnemonic::Bit => alu::execute_bit(&ctx, out)?,
        Mnemonic::Lda => load_store::execute_lda(&ctx, out)?,
        Mnemonic::Ldx => load_store::execute_ldx(&ctx, out)?,
        Mnemonic::Ldy => load_store::execute_ldy(&ctx, out)?,
        Mnemonic::Sta => load_store::execute_sta(&ctx, out)?,
        Mnemonic::Stx => load_store::execute_stx(&ctx, out)?,
        Mnemonic::Sty => load_store::execute_sty(&ctx, out)?,
        Mnemonic::Inc => inc_dec::execute_inc(&ctx, out)?,
        Mnemonic::Dec => inc_dec::execute_dec(&ctx, out)?,
        Mnemonic::Inx => inc_dec::execute_inx(&ctx, out),
        Mnemonic::Iny => inc_dec::execute_iny(&ctx, out),
        Mnemonic::Dex => inc_dec::execute_dex(&ctx, out),
        Mnemonic::Dey => inc_dec::execute_dey(&ctx, out),
        Mnemonic::Asl => shifts::execute_asl(&ctx, out)?,
        Mnemonic::Lsr => shifts::execute_lsr(&ctx, out)?,
        Mnemonic::Rol => shifts::execute_rol(&ctx, out)?,
        Mnemonic::Ror => shifts::execute_ror(&ctx, out)?,
        Mnemonic::Sec => flags::execute_sec(&ctx, out),
        Mnemonic::Clc => flags::execute_clc(&ctx, out),
        Mnemonic::Sei => flags::execute_sei(&ctx, out),
        Mnemonic::Cli => flags::execute_cli(&ctx, out),
        Mnemonic::Sed => flags::execute_sed(&ctx, out),
        Mnemonic::Cld => flags::execute_cld(&ctx, out),
        Mnemonic::Clv => flags::execute_clv(&ctx, out),
        Mnemonic::Tax => transfer::execute_tax(&ctx, out),
        Mnemonic::Tay => transfer::execute_tay(&ctx, out),
        Mnemonic::Txa => transfer::execute_txa(&ctx, out),
        Mnemonic::Tya => transfer::execute_tya(&ctx, out),
        Mnemonic::Tsx => transfer::execute_tsx(&ctx, out),
        Mnemonic::Txs => transfer::execute_txs(&ctx, out),
        Mnemonic::Pha => stack::execute_pha(&ctx, out),
        Mnemonic::Php => stack::execute_php(&ctx, out),
        Mnemonic::Pla => stack::execute_pla(&ctx, out),
        Mnemonic::Plp => stack::execute_plp(&ctx, out),
        Mnemonic::Jmp => control::execute_jmp(&ctx, out)?,
        Mnemonic::Jsr => control::execute_jsr(&ctx, out)?,
        Mnemonic::Rts => control::execute_rts(&ctx, out),
        Mnemonic::Rti => control::execute_rti(&ctx, out),
        Mnemonic::Brk => control::execute_brk(&ctx, out),
        Mnemonic::Nop => control::execute_nop(&ctx, out),
        Mnemonic::Bpl
        | Mnemonic::Bmi
        | Mnemonic::Bvc
        | Mnemonic::Bvs
        | Mnemonic::Bcc
        | Mnemonic::Bcs
        | Mnemonic::Bne
        | Mnemonic::Beq => branches::execute_branch(&ctx, out)?,
        Mnemonic::End => return Err(OracleError::NoValidator(Mnemonic::End)),
    }

    if expected.pc.is_none() {
        expected.pc = Some(ctx.fallthrough());
    }

    Ok(expected)
}
