//! # Load and Store Instructions
//!
//! This module implements register loads and stores:
//! - LDA, LDX, LDY: Load a register from memory, setting N and Z
//! - STA, STX, STY: Store a register to memory, no flags affected

use super::{Context, ExpectedState};
use crate::memory::MemoryBus;
use crate::Result;

pub(crate) fn execute_lda<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    let value = ctx.value()?;
    out.set_acc(value);
    out.set_nz(value);
    Ok(())
}

pub(crate) fn execute_ldx<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    let value = ctx.value()?;
    out.set_x(value);
    out.set_nz(value);
    Ok(())
}

pub(crate) fn execute_ldy<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    let value = ctx.value()?;
    out.set_y(value);
    out.set_nz(value);
    Ok(())
}

pub(crate) fn execute_sta<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    out.write(ctx.target()?, ctx.before.acc());
    Ok(())
}

pub(crate) fn execute_stx<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    out.write(ctx.target()?, ctx.before.x());
    Ok(())
}

pub(crate) fn execute_sty<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    out.write(ctx.target()?, ctx.before.y());
    Ok(())
}
