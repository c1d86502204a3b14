//! # CPU State
//!
//! This module contains the register/flag vocabulary shared by the catalog, the
//! reference model and the verifier, and the immutable [`CpuSnapshot`] captured
//! from the CPU under test before each instruction.
//!
//! ## State
//!
//! - **Registers**: Accumulator (ACC), index registers (X, Y)
//! - **Program counter** (PC): 16-bit address of next instruction
//! - **Stack pointer** (SP): 8-bit, used directly as the stack cell address
//! - **Status flags**: N, V, B, D, I, Z, C
//!
//! The CPU under test exposes its state through the [`RegisterProbe`] trait,
//! which keeps the oracle independent of any particular simulator binding.

use std::fmt;

use bitflags::bitflags;

use crate::instructions::ExpectedState;

bitflags! {
    /// Status flags, laid out at their bit positions in the packed status byte.
    ///
    /// Bit 5 has no flag; it reads as 1 whenever the status byte is pushed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Flag: u8 {
        const N = 0b1000_0000;
        const V = 0b0100_0000;
        const B = 0b0001_0000;
        const D = 0b0000_1000;
        const I = 0b0000_0100;
        const Z = 0b0000_0010;
        const C = 0b0000_0001;
    }
}

bitflags! {
    /// Register set used for declared and asserted side effects.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Register: u8 {
        const PC = 0b0000_0001;
        const ACC = 0b0000_0010;
        const X = 0b0000_0100;
        const Y = 0b0000_1000;
        const SP = 0b0001_0000;
    }
}

/// Bit 5 of a pushed status byte.
pub const UNUSED_BIT: u8 = 0b0010_0000;

impl Flag {
    /// Single-letter name of a single flag.
    pub fn name(self) -> &'static str {
        match self {
            Flag::N => "N",
            Flag::V => "V",
            Flag::B => "B",
            Flag::D => "D",
            Flag::I => "I",
            Flag::Z => "Z",
            Flag::C => "C",
            _ => "?",
        }
    }
}

impl Register {
    /// Name of a single register.
    pub fn name(self) -> &'static str {
        match self {
            Register::PC => "PC",
            Register::ACC => "ACC",
            Register::X => "X",
            Register::Y => "Y",
            Register::SP => "SP",
            _ => "?",
        }
    }
}

/// Typed read access to the architectural state of the CPU under test.
///
/// Implement this for whatever simulator binding drives the design; the oracle
/// only ever reads state through it.
pub trait RegisterProbe {
    /// Program counter.
    fn pc(&self) -> u16;

    /// Accumulator.
    fn acc(&self) -> u8;

    /// X index register.
    fn x(&self) -> u8;

    /// Y index register.
    fn y(&self) -> u8;

    /// Stack pointer.
    fn sp(&self) -> u8;

    /// Current value of one status flag.
    fn flag(&self, flag: Flag) -> bool;

    /// Captures every register and flag at once.
    fn snapshot(&self) -> CpuSnapshot {
        let mut flags = Flag::empty();
        for flag in Flag::all().iter() {
            flags.set(flag, self.flag(flag));
        }
        CpuSnapshot {
            pc: self.pc(),
            acc: self.acc(),
            x: self.x(),
            y: self.y(),
            sp: self.sp(),
            flags,
        }
    }
}

/// Immutable capture of the CPU state at an instruction boundary.
///
/// # Examples
///
/// ```
/// use oracle6502::{CpuSnapshot, Flag};
///
/// let state = CpuSnapshot::new(0x0600, 0x00, 0x00, 0x00, 0xFF, Flag::I | Flag::C);
///
/// // Bits 5 and 4 always read as 1 in the pushed byte
/// assert_eq!(state.status_byte(), 0b0011_0101);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuSnapshot {
    pc: u16,
    acc: u8,
    x: u8,
    y: u8,
    sp: u8,
    flags: Flag,
}

impl CpuSnapshot {
    /// Creates a snapshot from raw register values.
    pub const fn new(pc: u16, acc: u8, x: u8, y: u8, sp: u8, flags: Flag) -> Self {
        Self {
            pc,
            acc,
            x,
            y,
            sp,
            flags,
        }
    }

    /// Returns the program counter value.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Returns the accumulator value.
    pub fn acc(&self) -> u8 {
        self.acc
    }

    /// Returns the X index register value.
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Returns the Y index register value.
    pub fn y(&self) -> u8 {
        self.y
    }

    /// Returns the stack pointer value.
    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// Returns all status flags.
    pub fn flags(&self) -> Flag {
        self.flags
    }

    /// Returns true if `flag` is set.
    pub fn flag(&self, flag: Flag) -> bool {
        self.flags.contains(flag)
    }

    /// Value of one register, widened to 16 bits.
    pub fn register(&self, register: Register) -> u16 {
        match register {
            Register::PC => self.pc,
            Register::ACC => u16::from(self.acc),
            Register::X => u16::from(self.x),
            Register::Y => u16::from(self.y),
            Register::SP => u16::from(self.sp),
            _ => 0,
        }
    }

    /// Returns the status register as it is pushed by PHP and BRK.
    ///
    /// Bit layout (NV1BDIZC) with bits 5 and 4 forced to 1:
    /// - Bit 7: N (Negative)
    /// - Bit 6: V (Overflow)
    /// - Bit 5: (unused, always 1)
    /// - Bit 4: B (Break, always 1 when pushed)
    /// - Bit 3: D (Decimal)
    /// - Bit 2: I (Interrupt Disable)
    /// - Bit 1: Z (Zero)
    /// - Bit 0: C (Carry)
    pub fn status_byte(&self) -> u8 {
        self.flags.bits() | UNUSED_BIT | Flag::B.bits()
    }

    /// Returns a copy with N/V/D/I/Z/C restored from a pulled status byte.
    ///
    /// The break flag keeps its current value.
    pub fn with_status(&self, status: u8) -> Self {
        let pulled = Flag::from_bits_truncate(status).difference(Flag::B);
        let kept = self.flags.intersection(Flag::B);
        Self {
            flags: pulled.union(kept),
            ..*self
        }
    }

    /// Predicts the post-instruction state by overlaying every value the
    /// reference model asserted on.
    pub fn apply(&self, expected: &ExpectedState) -> Self {
        let mut next = *self;
        if let Some(pc) = expected.pc() {
            next.pc = pc;
        }
        if let Some(acc) = expected.acc() {
            next.acc = acc;
        }
        if let Some(x) = expected.x() {
            next.x = x;
        }
        if let Some(y) = expected.y() {
            next.y = y;
        }
        if let Some(sp) = expected.sp() {
            next.sp = sp;
        }
        for flag in expected.asserted_flags().iter() {
            next.flags.set(flag, expected.flag_values().contains(flag));
        }
        next
    }
}

impl RegisterProbe for CpuSnapshot {
    fn pc(&self) -> u16 {
        self.pc
    }

    fn acc(&self) -> u8 {
        self.acc
    }

    fn x(&self) -> u8 {
        self.x
    }

    fn y(&self) -> u8 {
        self.y
    }

    fn sp(&self) -> u8 {
        self.sp
    }

    fn flag(&self, flag: Flag) -> bool {
        self.flags.contains(flag)
    }

    fn snapshot(&self) -> CpuSnapshot {
        *self
    }
}

impl fmt::Display for CpuSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PC={:04X} ACC={:02X} X={:02X} Y={:02X} SP={:02X} ",
            self.pc, self.acc, self.x, self.y, self.sp
        )?;
        for (letter, flag) in [
            ('N', Flag::N),
            ('V', Flag::V),
            ('B', Flag::B),
            ('D', Flag::D),
            ('I', Flag::I),
            ('Z', Flag::Z),
            ('C', Flag::C),
        ] {
            let shown = if self.flag(flag) {
                letter
            } else {
                letter.to_ascii_lowercase()
            };
            write!(f, "{shown}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_register_packing() {
        let state = CpuSnapshot::new(0, 0, 0, 0, 0xFF, Flag::N | Flag::V | Flag::D | Flag::Z);

        assert_eq!(state.status_byte(), 0b1111_1010);
        assert_eq!(CpuSnapshot::default().status_byte(), 0b0011_0000);
    }

    #[test]
    fn test_with_status_keeps_break_flag() {
        let cleared = CpuSnapshot::default();
        let restored = cleared.with_status(0xFF);

        assert!(restored.flag(Flag::N));
        assert!(restored.flag(Flag::V));
        assert!(restored.flag(Flag::D));
        assert!(restored.flag(Flag::I));
        assert!(restored.flag(Flag::Z));
        assert!(restored.flag(Flag::C));
        assert!(!restored.flag(Flag::B));

        let with_break = CpuSnapshot::new(0, 0, 0, 0, 0, Flag::B);
        assert!(with_break.with_status(0x00).flag(Flag::B));
    }

    #[test]
    fn test_snapshot_display() {
        let state = CpuSnapshot::new(0x0600, 0xC0, 0x01, 0x02, 0xFD, Flag::N | Flag::I);
        assert_eq!(
            state.to_string(),
            "PC=0600 ACC=C0 X=01 Y=02 SP=FD NvbdIzc"
        );
    }

    #[test]
    fn test_register_widening() {
        let state = CpuSnapshot::new(0x1234, 0x56, 0x78, 0x9A, 0xBC, Flag::empty());

        assert_eq!(state.register(Register::PC), 0x1234);
        assert_eq!(state.register(Register::ACC), 0x56);
        assert_eq!(state.register(Register::SP), 0xBC);
    }
}
