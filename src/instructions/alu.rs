//! # ALU (Arithmetic Logic Unit) Instructions
//!
//! This module implements arithmetic and logical operations:
//! - ADC: Add with Carry (binary and decimal)
//! - SBC: Subtract with Carry (binary and decimal)
//! - AND, ORA, EOR: Bitwise logic on the accumulator
//! - CMP, CPX, CPY: Register compares
//! - BIT: Bit test
//!
//! In decimal mode the overflow flag is undefined on the original part; here
//! it is always expected to be clear.

use super::{Context, ExpectedState};
use crate::cpu::Flag;
use crate::memory::MemoryBus;
use crate::Result;

/// Result of an 8-bit add or subtract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Sum {
    pub result: u8,
    pub carry: bool,
    pub overflow: bool,
}

/// Overflow occurs when both addends share a sign and the result does not.
fn signed_overflow(lhs: u8, rhs: u8, result: u8) -> bool {
    let lhs_sign = lhs & 0x80 != 0;
    let rhs_sign = rhs & 0x80 != 0;
    let result_sign = result & 0x80 != 0;
    lhs_sign == rhs_sign && result_sign != lhs_sign
}

/// Binary `a + value + carry`.
pub(crate) fn add_binary(a: u8, value: u8, carry: bool) -> Sum {
    let wide = u16::from(a) + u16::from(value) + u16::from(carry);
    let result = wide as u8;
    Sum {
        result,
        carry: wide > 0xFF,
        overflow: signed_overflow(a, value, result),
    }
}

/// Binary `a - value - !carry`. Carry set means no borrow occurred.
///
/// Overflow uses the same sign rule as addition, applied to `a` and `value`
/// themselves rather than to the complemented operand.
pub(crate) fn sub_binary(a: u8, value: u8, carry: bool) -> Sum {
    let borrow = i16::from(!carry);
    let wide = i16::from(a) - i16::from(value) - borrow;
    let result = wide as u8;
    Sum {
        result,
        carry: wide >= 0,
        overflow: signed_overflow(a, value, result),
    }
}

/// BCD `a + value + carry` with per-nibble +6 correction.
pub(crate) fn add_decimal(a: u8, value: u8, carry: bool) -> Sum {
    let mut low = u16::from(a & 0x0F) + u16::from(value & 0x0F) + u16::from(carry);
    if low > 9 {
        low += 6;
    }

    let mut high = u16::from(a >> 4) + u16::from(value >> 4) + u16::from(low > 0x0F);
    let carry_out = high > 9;
    if carry_out {
        high += 6;
    }

    Sum {
        result: ((high << 4) | (low & 0x0F)) as u8,
        carry: carry_out,
        overflow: false,
    }
}

/// BCD `a - value - !carry` with per-nibble -6 correction on borrow.
pub(crate) fn sub_decimal(a: u8, value: u8, carry: bool) -> Sum {
    let borrow = i16::from(!carry);

    let mut low = i16::from(a & 0x0F) - i16::from(value & 0x0F) - borrow;
    let low_borrow = low < 0;
    if low_borrow {
        low -= 6;
    }

    let mut high = i16::from(a >> 4) - i16::from(value >> 4) - i16::from(low_borrow);
    let high_borrow = high < 0;
    if high_borrow {
        high -= 6;
    }

    Sum {
        result: ((high << 4) | (low & 0x0F)) as u8,
        carry: !high_borrow,
        overflow: false,
    }
}

fn record_sum(sum: Sum, out: &mut ExpectedState) {
    out.set_acc(sum.result);
    out.set_nz(sum.result);
    out.set_flag(Flag::C, sum.carry);
    out.set_flag(Flag::V, sum.overflow);
}

/// ADC: binary or BCD addition depending on the D flag.
pub(crate) fn execute_adc<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    let value = ctx.value()?;
    let a = ctx.before.acc();
    let carry = ctx.before.flag(Flag::C);

    let sum = if ctx.before.flag(Flag::D) {
        add_decimal(a, value, carry)
    } else {
        add_binary(a, value, carry)
    };
    record_sum(sum, out);
    Ok(())
}

/// SBC: binary or BCD subtraction depending on the D flag.
pub(crate) fn execute_sbc<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    let value = ctx.value()?;
    let a = ctx.before.acc();
    let carry = ctx.before.flag(Flag::C);

    let sum = if ctx.before.flag(Flag::D) {
        sub_decimal(a, value, carry)
    } else {
        sub_binary(a, value, carry)
    };
    record_sum(sum, out);
    Ok(())
}

fn logical<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
    op: fn(u8, u8) -> u8,
) -> Result<()> {
    let result = op(ctx.before.acc(), ctx.value()?);
    out.set_acc(result);
    out.set_nz(result);
    Ok(())
}

pub(crate) fn execute_and<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    logical(ctx, out, |a, m| a & m)
}

pub(crate) fn execute_ora<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    logical(ctx, out, |a, m| a | m)
}

pub(crate) fn execute_eor<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    logical(ctx, out, |a, m| a ^ m)
}

/// Unsigned compare: flags from `register - value` wrapped to 8 bits.
fn compare(register: u8, value: u8, out: &mut ExpectedState) {
    let result = register.wrapping_sub(value);
    out.set_nz(result);
    out.set_flag(Flag::C, register >= value);
}

pub(crate) fn execute_cmp<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    compare(ctx.before.acc(), ctx.value()?, out);
    Ok(())
}

pub(crate) fn execute_cpx<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    compare(ctx.before.x(), ctx.value()?, out);
    Ok(())
}

pub(crate) fn execute_cpy<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    compare(ctx.before.y(), ctx.value()?, out);
    Ok(())
}

/// BIT: N and V from operand bits 7 and 6, Z from `A & operand`.
pub(crate) fn execute_bit<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    let value = ctx.value()?;
    out.set_flag(Flag::N, value & 0x80 != 0);
    out.set_flag(Flag::V, value & 0x40 != 0);
    out.set_flag(Flag::Z, ctx.before.acc() & value == 0);
    Ok(())
}
