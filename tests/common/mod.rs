//! A behavioral CPU under test for integration tests.
//!
//! `ModelCpu` implements the bus pins and register probe of a design that
//! follows the catalog timing exactly: each instruction issues padding reads
//! first and its memory writes last, and its registers become visible after
//! the instruction's final rising edge. Faults can be injected at a given
//! opcode address to prove the oracle catches each kind of divergence.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::time::Duration;

use oracle6502::{
    execute, lookup, resolve, BusDirection, CpuPins, CpuSnapshot, Flag, MemoryBus, MemoryImage,
    Mnemonic, Oracle, OracleConfig, Register, RegisterProbe, PROGRAM_BASE,
};

/// Kinds of misbehavior the model can exhibit for one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Toggle one flag in the committed state.
    FlipFlag(Flag),
    /// Increment one register in the committed state.
    CorruptRegister(Register),
    /// Issue an additional write.
    StrayWrite { address: u16, value: u8 },
    /// Flip bit 0 of every written byte.
    WrongWriteValue,
    /// Finish one cycle early.
    DropCycle,
    /// Take one cycle longer.
    ExtraCycle,
}

/// A fault fired by the instruction at `at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fault {
    pub at: u16,
    pub kind: FaultKind,
}

#[derive(Debug, Clone, Copy)]
struct BusOp {
    address: u32,
    direction: BusDirection,
    data: u8,
}

pub struct ModelCpu {
    initial: CpuSnapshot,
    state: CpuSnapshot,
    pending: Option<CpuSnapshot>,
    memory: MemoryImage,
    ops: VecDeque<BusOp>,
    current: Option<BusOp>,
    reset_n: bool,
    ready: bool,
    fill_pending: bool,
    fill_cycles: u32,
    fault: Option<Fault>,
    pub edges: u64,
    pub settle_waits: u64,
    pub data_in: Vec<u8>,
}

pub const FILL_CYCLES: u32 = 3;

impl ModelCpu {
    /// A model that sees the same memory contents as the oracle.
    pub fn new(memory: &MemoryImage) -> Self {
        let initial = CpuSnapshot::new(PROGRAM_BASE, 0x00, 0x00, 0x00, 0xFF, Flag::empty());
        Self {
            initial,
            state: initial,
            pending: None,
            memory: memory.clone(),
            ops: VecDeque::new(),
            current: None,
            reset_n: true,
            ready: false,
            fill_pending: false,
            fill_cycles: FILL_CYCLES,
            fault: None,
            edges: 0,
            settle_waits: 0,
            data_in: Vec::new(),
        }
    }

    /// Registers loaded on reset. The PC is always forced to the program base.
    pub fn with_registers(mut self, acc: u8, x: u8, y: u8, sp: u8, flags: Flag) -> Self {
        self.initial = CpuSnapshot::new(PROGRAM_BASE, acc, x, y, sp, flags);
        self.state = self.initial;
        self
    }

    /// Pipeline fill cycles taken by the first instruction after reset.
    pub fn with_fill_cycles(mut self, cycles: u32) -> Self {
        self.fill_cycles = cycles;
        self
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    pub fn state(&self) -> CpuSnapshot {
        self.state
    }

    fn plan(&mut self) {
        let pc = self.state.pc();
        let fill = if std::mem::take(&mut self.fill_pending) {
            self.fill_cycles
        } else {
            0
        };

        let Ok(descriptor) = lookup(pc, self.memory.read(pc)) else {
            self.push_reads(pc, 1);
            return;
        };

        if descriptor.mnemonic == Mnemonic::End {
            self.push_reads(pc, u32::from(descriptor.base_cycles) + fill);
            return;
        }

        let before = self.state;
        let operand = resolve(descriptor, pc, &self.memory, before.acc(), before.x(), before.y());
        let Ok(expected) = execute(descriptor, pc, &before, operand, &self.memory) else {
            self.push_reads(pc, 1);
            return;
        };

        let mut cycles =
            u32::from(descriptor.base_cycles) + fill + u32::from(expected.branch_taken());
        let mut writes = expected.memory_writes().to_vec();
        let mut next = before.apply(&expected);

        if let Some(fault) = self.fault.filter(|fault| fault.at == pc) {
            self.fault = None;
            match fault.kind {
                FaultKind::FlipFlag(flag) => {
                    next = CpuSnapshot::new(
                        next.pc(),
                        next.acc(),
                        next.x(),
                        next.y(),
                        next.sp(),
                        next.flags().symmetric_difference(flag),
                    );
                }
                FaultKind::CorruptRegister(register) => {
                    let bump = |value: u8, which: Register| {
                        if which == register {
                            value.wrapping_add(1)
                        } else {
                            value
                        }
                    };
                    let pc = if register == Register::PC {
                        next.pc().wrapping_add(1)
                    } else {
                        next.pc()
                    };
                    next = CpuSnapshot::new(
                        pc,
                        bump(next.acc(), Register::ACC),
                        bump(next.x(), Register::X),
                        bump(next.y(), Register::Y),
                        bump(next.sp(), Register::SP),
                        next.flags(),
                    );
                }
                FaultKind::StrayWrite { address, value } => writes.push((address, value)),
                FaultKind::WrongWriteValue => {
                    for write in &mut writes {
                        write.1 ^= 0x01;
                    }
                }
                FaultKind::DropCycle => cycles -= 1,
                FaultKind::ExtraCycle => cycles += 1,
            }
        }

        for &(address, value) in &writes {
            self.memory.write(address, value);
        }

        let write_count = u32::try_from(writes.len()).unwrap_or(u32::MAX);
        self.push_reads(pc, cycles.saturating_sub(write_count));
        for &(address, value) in writes.iter().take(cycles as usize) {
            self.ops.push_back(BusOp {
                address: u32::from(address),
                direction: BusDirection::Write,
                data: value,
            });
        }
        self.pending = Some(next);
    }

    fn push_reads(&mut self, pc: u16, count: u32) {
        for offset in 0..count {
            self.ops.push_back(BusOp {
                address: u32::from(pc.wrapping_add(offset as u16)),
                direction: BusDirection::Read,
                data: 0,
            });
        }
    }
}

impl CpuPins for ModelCpu {
    fn wait_rising_edge(&mut self) {
        self.edges += 1;

        if !self.reset_n {
            self.state = self.initial;
            self.pending = None;
            self.ops.clear();
            self.current = None;
            self.fill_pending = true;
            return;
        }
        if !self.ready {
            return;
        }

        if self.ops.is_empty() {
            self.plan();
        }
        self.current = self.ops.pop_front();
        if self.ops.is_empty() {
            if let Some(next) = self.pending.take() {
                self.state = next;
            }
        }
    }

    fn wait_settle(&mut self, delay: Duration) {
        assert!(delay > Duration::ZERO);
        self.settle_waits += 1;
    }

    fn address(&self) -> u32 {
        self.current.map_or(0, |op| op.address)
    }

    fn direction(&self) -> BusDirection {
        self.current.map_or(BusDirection::Read, |op| op.direction)
    }

    fn data_out(&self) -> u8 {
        self.current.map_or(0, |op| op.data)
    }

    fn drive_data_in(&mut self, value: u8) {
        self.data_in.push(value);
    }

    fn set_reset_n(&mut self, level: bool) {
        self.reset_n = level;
    }

    fn set_ready(&mut self, level: bool) {
        self.ready = level;
    }
}

impl RegisterProbe for ModelCpu {
    fn pc(&self) -> u16 {
        self.state.pc()
    }

    fn acc(&self) -> u8 {
        self.state.acc()
    }

    fn x(&self) -> u8 {
        self.state.x()
    }

    fn y(&self) -> u8 {
        self.state.y()
    }

    fn sp(&self) -> u8 {
        self.state.sp()
    }

    fn flag(&self, flag: Flag) -> bool {
        self.state.flag(flag)
    }
}

/// Memory image with `program` at the program base.
pub fn image(program: &[u8]) -> MemoryImage {
    MemoryImage::with_program(program).unwrap()
}

/// Oracle over a fault-free model sharing `memory`.
pub fn setup(memory: MemoryImage) -> Oracle<ModelCpu> {
    let dut = ModelCpu::new(&memory);
    Oracle::new(dut, memory, OracleConfig::default())
}

/// Oracle over `dut`, which must have been built from the same `memory`.
pub fn setup_with(dut: ModelCpu, memory: MemoryImage) -> Oracle<ModelCpu> {
    Oracle::new(dut, memory, OracleConfig::default())
}
