//! # Status Flag Manipulation Instructions
//!
//! This module implements instructions that directly modify processor status flags:
//! - CLC: Clear Carry Flag
//! - SEC: Set Carry Flag
//! - CLI: Clear Interrupt Disable
//! - SEI: Set Interrupt Disable
//! - CLV: Clear Overflow Flag
//! - CLD: Clear Decimal Mode
//! - SED: Set Decimal Mode
//!
//! Each sets exactly one flag to a fixed value and has no other effect.

use super::{Context, ExpectedState};
use crate::cpu::Flag;
use crate::memory::MemoryBus;

pub(crate) fn execute_sec<M: MemoryBus>(_ctx: &Context<'_, M>, out: &mut ExpectedState) {
    out.set_flag(Flag::C, true);
}

pub(crate) fn execute_clc<M: MemoryBus>(_ctx: &Context<'_, M>, out: &mut ExpectedState) {
    out.set_flag(Flag::C, false);
}

pub(crate) fn execute_sei<M: MemoryBus>(_ctx: &Context<'_, M>, out: &mut ExpectedState) {
    out.set_flag(Flag::I, true);
}

pub(crate) fn execute_cli<M: MemoryBus>(_ctx: &Context<'_, M>, out: &mut ExpectedState) {
    out.set_flag(Flag::I, false);
}

pub(crate) fn execute_sed<M: MemoryBus>(_ctx: &Context<'_, M>, out: &mut ExpectedState) {
    out.set_flag(Flag::D, true);
}

pub(crate) fn execute_cld<M: MemoryBus>(_ctx: &Context<'_, M>, out: &mut ExpectedState) {
    out.set_flag(Flag::D, false);
}

pub(crate) fn execute_clv<M: MemoryBus>(_ctx: &Context<'_, M>, out: &mut ExpectedState) {
    out.set_flag(Flag::V, false);
}
