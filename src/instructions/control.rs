//! # Control Flow Instructions
//!
//! This module implements program flow control:
//! - JMP: Jump (absolute and indirect)
//! - JSR: Jump to Subroutine
//! - RTS: Return from Subroutine
//! - RTI: Return from Interrupt
//! - BRK: Force Break
//! - NOP: No Operation
//!
//! Return addresses are pushed high byte first, so the high byte lands at
//! `SP` and the low byte at `SP - 1`.

use super::stack::{restore_status, stack_cell};
use super::{Context, ExpectedState};
use crate::cpu::Flag;
use crate::memory::{MemoryBus, Vector};
use crate::Result;

/// Pushes a return address as two writes, high byte first.
fn push_word(sp: u8, value: u16, out: &mut ExpectedState) {
    let [low, high] = value.to_le_bytes();
    out.write(stack_cell(sp, 0), high);
    out.write(stack_cell(sp.wrapping_sub(1), 0), low);
}

/// Reads a little-endian word from the two cells `offset` and `offset + 1`
/// above the stack pointer.
fn pull_word<M: MemoryBus>(memory: &M, sp: u8, offset: u16) -> u16 {
    let low = memory.read(stack_cell(sp, offset));
    let high = memory.read(stack_cell(sp, offset + 1));
    u16::from_le_bytes([low, high])
}

/// Executes the JMP instruction. The resolver already followed the pointer
/// for the indirect form.
pub(crate) fn execute_jmp<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    out.set_pc(ctx.target()?);
    Ok(())
}

/// Executes the JSR (Jump to Subroutine) instruction.
///
/// Pushes the pre-instruction PC + 2 (the instruction's last byte), then jumps.
pub(crate) fn execute_jsr<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    let target = ctx.target()?;
    let sp = ctx.before.sp();
    push_word(sp, ctx.before.pc().wrapping_add(2), out);
    out.set_sp(sp.wrapping_sub(2));
    out.set_pc(target);
    Ok(())
}

/// Executes the RTS (Return from Subroutine) instruction.
///
/// Pulls the return address and resumes one byte past it.
pub(crate) fn execute_rts<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let sp = ctx.before.sp();
    let address = pull_word(ctx.memory, sp, 1);
    out.set_pc(address.wrapping_add(1));
    out.set_sp(sp.wrapping_add(2));
}

/// Executes the RTI (Return from Interrupt) instruction.
///
/// Pulls status, then the exact return address (no +1 adjustment).
pub(crate) fn execute_rti<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let sp = ctx.before.sp();
    let status = ctx.memory.read(stack_cell(sp, 1));
    restore_status(status, ctx.before, out);
    out.set_pc(pull_word(ctx.memory, sp, 2));
    out.set_sp(sp.wrapping_add(3));
}

/// Executes the BRK (Force Break) instruction.
///
/// Pushes PC + 2 and the status byte (bits 5 and 4 set), sets I and jumps
/// through the IRQ vector at 0xFFFE/0xFFFF.
pub(crate) fn execute_brk<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let sp = ctx.before.sp();
    push_word(sp, ctx.before.pc().wrapping_add(2), out);
    out.write(stack_cell(sp.wrapping_sub(2), 0), ctx.before.status_byte());
    out.set_sp(sp.wrapping_sub(3));
    out.set_flag(Flag::I, true);
    out.set_pc(ctx.memory.read_word(Vector::Irq.address()));
}

/// Executes the NOP instruction.
pub(crate) fn execute_nop<M: MemoryBus>(_ctx: &Context<'_, M>, _out: &mut ExpectedState) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryImage;

    #[test]
    fn test_push_word_high_byte_first() {
        let mut out = ExpectedState::default();
        push_word(0xFF, 0x0602, &mut out);

        assert_eq!(out.memory_writes(), &[(0x00FF, 0x06), (0x00FE, 0x02)]);
    }

    #[test]
    fn test_pull_word_little_endian() {
        let mut mem = MemoryImage::new();
        mem.write(0x00FE, 0x34);
        mem.write(0x00FF, 0x12);

        assert_eq!(pull_word(&mem, 0xFD, 1), 0x1234);
    }
}
