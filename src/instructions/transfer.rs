//! # Register Transfer Instructions
//!
//! This module implements register-to-register copies:
//! - TAX, TAY: Accumulator to index register
//! - TXA, TYA: Index register to accumulator
//! - TSX: Stack pointer to X
//! - TXS: X to stack pointer (the only transfer that leaves N and Z alone)

use super::{Context, ExpectedState};
use crate::memory::MemoryBus;

pub(crate) fn execute_tax<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let value = ctx.before.acc();
    out.set_x(value);
    out.set_nz(value);
}

pub(crate) fn execute_tay<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let value = ctx.before.acc();
    out.set_y(value);
    out.set_nz(value);
}

pub(crate) fn execute_txa<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let value = ctx.before.x();
    out.set_acc(value);
    out.set_nz(value);
}

pub(crate) fn execute_tya<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let value = ctx.before.y();
    out.set_acc(value);
    out.set_nz(value);
}

pub(crate) fn execute_tsx<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    let value = ctx.before.sp();
    out.set_x(value);
    out.set_nz(value);
}

pub(crate) fn execute_txs<M: MemoryBus>(ctx: &Context<'_, M>, out: &mut ExpectedState) {
    out.set_sp(ctx.before.x());
}
