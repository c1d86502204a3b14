//! # Branch Instructions
//!
//! This module implements the eight conditional branches:
//! - BPL/BMI: Branch on N clear/set
//! - BVC/BVS: Branch on V clear/set
//! - BCC/BCS: Branch on C clear/set
//! - BNE/BEQ: Branch on Z clear/set
//!
//! All branches use relative addressing; the resolver has already computed
//! the target from the signed offset. A taken branch costs one extra cycle.

use super::{Context, ExpectedState};
use crate::cpu::Flag;
use crate::memory::MemoryBus;
use crate::opcodes::Mnemonic;
use crate::{OracleError, Result};

/// Flag tested by a branch mnemonic and the value that takes it.
fn condition(mnemonic: Mnemonic) -> Option<(Flag, bool)> {
    match mnemonic {
        Mnemonic::Bpl => Some((Flag::N, false)),
        Mnemonic::Bmi => Some((Flag::N, true)),
        Mnemonic::Bvc => Some((Flag::V, false)),
        Mnemonic::Bvs => Some((Flag::V, true)),
        Mnemonic::Bcc => Some((Flag::C, false)),
        Mnemonic::Bcs => Some((Flag::C, true)),
        Mnemonic::Bne => Some((Flag::Z, false)),
        Mnemonic::Beq => Some((Flag::Z, true)),
        _ => None,
    }
}

pub(crate) fn execute_branch<M: MemoryBus>(
    ctx: &Context<'_, M>,
    out: &mut ExpectedState,
) -> Result<()> {
    let mnemonic = ctx.descriptor.mnemonic;
    let (flag, when) = condition(mnemonic).ok_or(OracleError::NoValidator(mnemonic))?;
    let target = ctx.target()?;

    if ctx.before.flag(flag) == when {
        out.set_pc(target);
        out.take_branch();
    } else {
        out.set_pc(ctx.fallthrough());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_branch_has_a_condition() {
        for mnemonic in [
            Mnemonic::Bpl,
            Mnemonic::Bmi,
            Mnemonic::Bvc,
            Mnemonic::Bvs,
            Mnemonic::Bcc,
            Mnemonic::Bcs,
            Mnemonic::Bne,
            Mnemonic::Beq,
        ] {
            assert!(mnemonic.is_branch());
            assert!(condition(mnemonic).is_some());
        }
        assert_eq!(condition(Mnemonic::Jmp), None);
    }
}
