//! # Shift and Rotate Instructions
//!
//! This module implements bit shift and rotate operations:
//! - ASL: Arithmetic Shift Left
//! - LSR: Logical Shift Right
//! - ROL: Rotate Left through carry
//! - ROR: Rotate Right through carry
//!
//! The accumulator form updates ACC; every other form writes the result back
//! to the resolved memory target.

use super::{Context, ExpectedState};
use crate::addressing::AddressingMode;
use crate::cpu::Flag;
use crate::memory::MemoryBus;
use crate::Result;

/// Shifts the operand with `op`, which returns `(result, carry_out)`.
fn shift<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
    op: fn(u8, bool) -> (u8, bool),
) -> Result<()> {
    let carry_in = ctx.before.flag(Flag::C);

    let result = if ctx.descriptor.addressing_mode == AddressingMode::Accumulator {
        let (result, carry) = op(ctx.before.acc(), carry_in);
        out.set_acc(result);
        out.set_flag(Flag::C, carry);
        result
    } else {
        let target = ctx.target()?;
        let (result, carry) = op(ctx.operand.value(), carry_in);
        out.write(target, result);
        out.set_flag(Flag::C, carry);
        result
    };

    out.set_nz(result);
    Ok(())
}

pub(crate) fn execute_asl<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    shift(ctx, out, |value, _| (value << 1, value & 0x80 != 0))
}

pub(crate) fn execute_lsr<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    shift(ctx, out, |value, _| (value >> 1, value & 0x01 != 0))
}

pub(crate) fn execute_rol<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    shift(ctx, out, |value, carry| {
        ((value << 1) | u8::from(carry), value & 0x80 != 0)
    })
}

pub(crate) fn execute_ror<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    shift(ctx, out, |value, carry| {
        ((value >> 1) | (u8::from(carry) << 7), value & 0x01 != 0)
    })
}
