//! # Stack Operations
//!
//! This module implements stack manipulation instructions:
//! - PHA: Push Accumulator on Stack
//! - PHP: Push Processor Status on Stack
//! - PLA: Pull Accumulator from Stack
//! - PLP: Pull Processor Status from Stack
//!
//! The stack grows downward. The stack pointer is used directly as the address
//! of the next free cell, so a push writes to `SP` and a pull reads from
//! `SP + 1`. Pull addresses are formed on 16 bits and do not wrap within the
//! zero page; the pointer itself wraps modulo 256.

use super::{Context, ExpectedState};
use crate::cpu::{CpuSnapshot, Flag};
use crate::memory::MemoryBus;

/// Address of the cell `offset` bytes above the stack pointer.
pub(crate) fn stack_cell(sp: u8, offset: u16) -> u16 {
    u16::from(sp).wrapping_add(offset)
}

/// Asserts every flag from a pulled status byte. B must keep its value.
pub(crate) fn restore_status(status: u8, before: &CpuSnapshot, out: &mut ExpectedState) {
    let restored = before.with_status(status);
    for flag in Flag::all().iter() {
        out.set_flag(flag, restored.flag(flag));
    }
}

/// Executes the PHA (Push Accumulator) instruction.
///
/// Writes ACC to `SP` and decrements SP. No flags affected.
pub(crate) fn execute_pha<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let sp = ctx.before.sp();
    out.write(stack_cell(sp, 0), ctx.before.acc());
    out.set_sp(sp.wrapping_sub(1));
}

/// Executes the PHP (Push Processor Status) instruction.
///
/// The pushed byte always has bits 5 and 4 set.
pub(crate) fn execute_php<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let sp = ctx.before.sp();
    out.write(stack_cell(sp, 0), ctx.before.status_byte());
    out.set_sp(sp.wrapping_sub(1));
}

/// Executes the PLA (Pull Accumulator) instruction.
pub(crate) fn execute_pla<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let sp = ctx.before.sp();
    let value = ctx.memory.read(stack_cell(sp, 1));
    out.set_acc(value);
    out.set_nz(value);
    out.set_sp(sp.wrapping_add(1));
}

/// Executes the PLP (Pull Processor Status) instruction.
///
/// N, V, D, I, Z and C come from the pulled byte; B and bit 5 are ignored.
pub(crate) fn execute_plp<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let sp = ctx.before.sp();
    let status = ctx.memory.read(stack_cell(sp, 1));
    restore_status(status, ctx.before, out);
    out.set_sp(sp.wrapping_add(1));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_cell_does_not_wrap_into_zero_page() {
        assert_eq!(stack_cell(0xFF, 0), 0x00FF);
        assert_eq!(stack_cell(0xFF, 1), 0x0100);
        assert_eq!(stack_cell(0xFE, 3), 0x0101);
    }

    #[test]
    fn test_restore_status_keeps_break() {
        let mut out = ExpectedState::default();
        restore_status(0xFF, &CpuSnapshot::default(), &mut out);

        assert_eq!(out.asserted_flags(), Flag::all());
        assert_eq!(out.flag(Flag::B), Some(false));
        assert_eq!(out.flag(Flag::N), Some(true));
        assert_eq!(out.flag(Flag::C), Some(true));

        let mut out = ExpectedState::default();
        let with_break = CpuSnapshot::new(0x0600, 0, 0, 0, 0xFF, Flag::B | Flag::C);
        restore_status(0x00, &with_break, &mut out);
        assert_eq!(out.flag(Flag::B), Some(true));
        assert_eq!(out.flag(Flag::Z), Some(false));
        assert_eq!(out.flag(Flag::C), Some(false));
    }
}
