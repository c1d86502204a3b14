//! # Memory Bus Abstraction
//!
//! This module provides the `MemoryBus` trait used by the resolver and the
//! reference model, and `MemoryImage`, the 64KB array the oracle serves to the
//! CPU under test.
//!
//! ## Design Principles
//!
//! - The resolver and reference model only read memory; they never mutate it.
//! - The image is mutated by bus writes from the CPU under test, and every such
//!   write is journaled so the verifier can check side effects without copying
//!   the whole address space each instruction.
//! - Bus-side accesses use the raw address driven by the CPU. Addresses past
//!   0xFFFF read as 0xFF and writes to them are dropped.

use std::path::Path;

use log::trace;

use crate::{OracleError, Result};

/// Size of the address space.
pub const MEMORY_SIZE: usize = 0x1_0000;

/// Value returned for reads outside the address space.
pub const OUT_OF_RANGE: u8 = 0xFF;

/// Fill value of memory not covered by the program image.
pub const UNPROGRAMMED: u8 = 0xFF;

/// Load and entry address of the program image.
pub const PROGRAM_BASE: u16 = 0x0600;

/// Memory bus trait for reading and writing bytes.
///
/// # Examples
///
/// ```
/// use oracle6502::{MemoryBus, MemoryImage};
///
/// let mut mem = MemoryImage::new();
///
/// mem.write(0x1234, 0x42);
/// assert_eq!(mem.read(0x1234), 0x42);
/// ```
pub trait MemoryBus {
    /// Reads a byte from the specified 16-bit address.
    fn read(&self, addr: u16) -> u8;

    /// Writes a byte to the specified 16-bit address.
    fn write(&mut self, addr: u16, value: u8);

    /// Reads a little-endian word. The high byte comes from `addr + 1`
    /// wrapping only at the top of the address space, never within a page.
    fn read_word(&self, addr: u16) -> u16 {
        let low = u16::from(self.read(addr));
        let high = u16::from(self.read(addr.wrapping_add(1)));
        (high << 8) | low
    }
}

/// The three hardware vectors at the top of memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vector {
    /// Non-maskable interrupt, 0xFFFA/0xFFFB.
    Nmi,
    /// Reset, 0xFFFC/0xFFFD.
    Reset,
    /// Interrupt request and BRK, 0xFFFE/0xFFFF.
    Irq,
}

impl Vector {
    /// Address of the vector's low byte.
    pub const fn address(self) -> u16 {
        match self {
            Vector::Nmi => 0xFFFA,
            Vector::Reset => 0xFFFC,
            Vector::Irq => 0xFFFE,
        }
    }
}

/// One journaled bus write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord {
    /// Written address.
    pub address: u16,
    /// Cell value before this write.
    pub previous: u8,
    /// Value written.
    pub value: u8,
}

/// Flat 64KB memory with a write journal.
///
/// # Memory Layout
///
/// - 0x0600: program image (execution starts here, not at the reset vector)
/// - 0xFFFA-0xFFFF: NMI, reset and IRQ vectors
/// - everything else not loaded reads as 0xFF
///
/// # Examples
///
/// ```
/// use oracle6502::{MemoryBus, MemoryImage, PROGRAM_BASE};
///
/// // LDA #$60; ASL A; END
/// let mem = MemoryImage::with_program(&[0xA9, 0x60, 0x0A, 0x04]).unwrap();
///
/// assert_eq!(mem.read(PROGRAM_BASE), 0xA9);
/// assert_eq!(mem.read(0x0000), 0xFF);
/// ```
#[derive(Clone, Debug)]
pub struct MemoryImage {
    data: Box<[u8; MEMORY_SIZE]>,
    journal: Vec<WriteRecord>,
}

impl MemoryImage {
    /// Creates an image with every cell unprogrammed (0xFF).
    pub fn new() -> Self {
        Self {
            data: Box::new([UNPROGRAMMED; MEMORY_SIZE]),
            journal: Vec::new(),
        }
    }

    /// Creates an image with `program` loaded at [`PROGRAM_BASE`].
    pub fn with_program(program: &[u8]) -> Result<Self> {
        let mut image = Self::new();
        image.load_program(program, PROGRAM_BASE)?;
        Ok(image)
    }

    /// Reads a raw program image from disk and loads it at [`PROGRAM_BASE`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let program = std::fs::read(path)?;
        Self::with_program(&program)
    }

    /// Copies `program` verbatim into memory starting at `base`.
    ///
    /// Loading does not go through the journal.
    pub fn load_program(&mut self, program: &[u8], base: u16) -> Result<()> {
        let start = usize::from(base);
        let end = start + program.len();
        if end > MEMORY_SIZE {
            return Err(OracleError::ImageTooLarge {
                len: program.len(),
                base,
            });
        }
        self.data[start..end].copy_from_slice(program);
        Ok(())
    }

    /// Reads one of the hardware vectors.
    pub fn vector(&self, vector: Vector) -> u16 {
        self.read_word(vector.address())
    }

    /// Points one of the hardware vectors at `target`.
    pub fn set_vector(&mut self, vector: Vector, target: u16) {
        let [low, high] = target.to_le_bytes();
        self.write(vector.address(), low);
        self.write(vector.address() + 1, high);
    }

    /// Serves a read driven by the CPU under test.
    pub fn bus_read(&self, address: u32) -> u8 {
        match u16::try_from(address) {
            Ok(addr) => self.read(addr),
            Err(_) => OUT_OF_RANGE,
        }
    }

    /// Stores a write driven by the CPU under test and journals it.
    ///
    /// Writes outside the address space are ignored.
    pub fn bus_write(&mut self, address: u32, value: u8) {
        let Ok(addr) = u16::try_from(address) else {
            trace!("dropped write of 0x{value:02X} to out-of-range address 0x{address:X}");
            return;
        };
        let previous = self.read(addr);
        self.journal.push(WriteRecord {
            address: addr,
            previous,
            value,
        });
        self.write(addr, value);
    }

    /// Clears the journal at an instruction boundary.
    pub fn begin_step(&mut self) {
        self.journal.clear();
    }

    /// Bus writes since the last [`begin_step`](Self::begin_step), oldest first.
    pub fn journal(&self) -> &[WriteRecord] {
        &self.journal
    }

    /// Value `address` held when the current step began.
    pub fn value_before_step(&self, address: u16) -> u8 {
        self.journal
            .iter()
            .find(|record| record.address == address)
            .map_or_else(|| self.read(address), |record| record.previous)
    }
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBus for MemoryImage {
    fn read(&self, addr: u16) -> u8 {
        self.data[usize::from(addr)]
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.data[usize::from(addr)] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_starts_unprogrammed() {
        let mem = MemoryImage::new();

        assert_eq!(mem.read(0x0000), 0xFF);
        assert_eq!(mem.read(0xFFFF), 0xFF);
        assert!(mem.journal().is_empty());
    }

    #[test]
    fn test_program_loads_at_base() {
        let mem = MemoryImage::with_program(&[0xE6, 0x0A, 0x04]).unwrap();

        assert_eq!(mem.read(0x05FF), 0xFF);
        assert_eq!(mem.read(0x0600), 0xE6);
        assert_eq!(mem.read(0x0601), 0x0A);
        assert_eq!(mem.read(0x0602), 0x04);
        assert_eq!(mem.read(0x0603), 0xFF);
    }

    #[test]
    fn test_program_too_large() {
        let program = vec![0xEA; MEMORY_SIZE - usize::from(PROGRAM_BASE) + 1];
        let err = MemoryImage::with_program(&program).unwrap_err();

        assert!(matches!(err, OracleError::ImageTooLarge { base: 0x0600, .. }));
    }

    #[test]
    fn test_out_of_range_bus_access() {
        let mut mem = MemoryImage::new();
        mem.write(0x0000, 0x12);

        assert_eq!(mem.bus_read(0x1_0000), OUT_OF_RANGE);
        mem.bus_write(0x1_0000, 0x34);

        assert_eq!(mem.read(0x0000), 0x12);
        assert!(mem.journal().is_empty());
    }

    #[test]
    fn test_journal_tracks_first_previous_value() {
        let mut mem = MemoryImage::new();
        mem.write(0x0010, 0x05);
        mem.begin_step();

        mem.bus_write(0x0010, 0x06);
        mem.bus_write(0x0010, 0x07);

        assert_eq!(mem.journal().len(), 2);
        assert_eq!(mem.value_before_step(0x0010), 0x05);
        assert_eq!(mem.value_before_step(0x0011), 0xFF);
        assert_eq!(mem.read(0x0010), 0x07);

        mem.begin_step();
        assert!(mem.journal().is_empty());
    }

    #[test]
    fn test_vectors_are_little_endian() {
        let mut mem = MemoryImage::new();
        mem.set_vector(Vector::Irq, 0x1234);

        assert_eq!(mem.read(0xFFFE), 0x34);
        assert_eq!(mem.read(0xFFFF), 0x12);
        assert_eq!(mem.vector(Vector::Irq), 0x1234);
        assert_eq!(mem.vector(Vector::Nmi), 0xFFFF);
    }
}
