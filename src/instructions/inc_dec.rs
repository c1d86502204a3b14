//! # Increment and Decrement Instructions
//!
//! This module implements:
//! - INC, DEC: Read-modify-write on the resolved memory target
//! - INX, INY, DEX, DEY: Index register increment/decrement
//!
//! All results wrap modulo 256 and set N and Z.

use super::{Context, ExpectedState};
use crate::memory::MemoryBus;
use crate::Result;

pub(crate) fn execute_inc<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    let target = ctx.target()?;
    let result = ctx.operand.value().wrapping_add(1);
    out.write(target, result);
    out.set_nz(result);
    Ok(())
}

pub(crate) fn execute_dec<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    let target = ctx.target()?;
    let result = ctx.operand.value().wrapping_sub(1);
    out.write(target, result);
    out.set_nz(result);
    Ok(())
}

pub(crate) fn execute_inx<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let result = ctx.before.x().wrapping_add(1);
    out.set_x(result);
    out.set_nz(result);
}

pub(crate) fn execute_iny<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let result = ctx.before.y().wrapping_add(1);
    out.set_y(result);
    out.set_nz(result);
}

pub(crate) fn execute_dex<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let result = ctx.before.x().wrapping_sub(1);
    out.set_x(result);
    out.set_nz(result);
}

pub(crate) fn execute_dey<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let result = ctx.before.y().wrapping_sub(1);
    out.set_y(result);
    out.set_nz(result);
}
