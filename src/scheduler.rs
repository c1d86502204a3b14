//! # Cycle Scheduler
//!
//! Drives the CPU under test one clock cycle at a time and services exactly one
//! bus transaction per cycle from the oracle's memory image.
//!
//! Every cycle follows the same sequence:
//!
//! 1. Wait for the rising clock edge.
//! 2. Wait a short settle delay so the CPU's own outputs are stable.
//! 3. Sample the address and direction pins.
//! 4. Read: drive the memory byte onto the data input. Write: store the data
//!    output into memory.
//!
//! The scheduler also owns the reset sequence and the one-off pipeline fill
//! cycles that follow it.

use std::time::Duration;

use log::{debug, trace};

use crate::cpu::RegisterProbe;
use crate::memory::MemoryImage;
use crate::opcodes::OpcodeDescriptor;

/// Direction of one bus cycle, as seen from the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusDirection {
    /// The CPU reads; the oracle drives the data input.
    Read,
    /// The CPU writes; the oracle stores the data output.
    Write,
}

/// One serviced bus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusTransaction {
    /// Address driven by the CPU.
    pub address: u32,
    /// Cycle direction.
    pub direction: BusDirection,
    /// Byte returned to the CPU (read) or taken from it (write).
    pub data: u8,
}

/// Bus, clock and reset signals of the CPU under test.
///
/// The waits suspend the caller until the simulated time has advanced; they
/// are the only points where the oracle yields to the simulator.
pub trait CpuPins {
    /// Blocks until the next rising clock edge.
    fn wait_rising_edge(&mut self);

    /// Blocks for `delay` of simulated time after an edge.
    fn wait_settle(&mut self, delay: Duration);

    /// Address output.
    fn address(&self) -> u32;

    /// Read/write signal.
    fn direction(&self) -> BusDirection;

    /// Data output, meaningful during a write cycle.
    fn data_out(&self) -> u8;

    /// Drives the data input for the current read cycle.
    fn drive_data_in(&mut self, value: u8);

    /// Active-low reset input.
    fn set_reset_n(&mut self, level: bool);

    /// Ready input.
    fn set_ready(&mut self, level: bool);
}

/// A CPU under test: bus pins plus register visibility.
pub trait CpuUnderTest: CpuPins + RegisterProbe {}

impl<T: CpuPins + RegisterProbe> CpuUnderTest for T {}

/// Per-instruction cycle budget and bus servicing.
#[derive(Debug, Clone)]
pub struct CycleScheduler {
    settle_delay: Duration,
    reset_edges: u32,
    reset_fill_cycles: u32,
    pending_fill: u32,
    total_cycles: u64,
}

impl CycleScheduler {
    /// Creates a scheduler with the given reset and settle timing.
    pub fn new(reset_edges: u32, reset_fill_cycles: u32, settle_delay: Duration) -> Self {
        Self {
            settle_delay,
            reset_edges,
            reset_fill_cycles,
            pending_fill: 0,
            total_cycles: 0,
        }
    }

    /// Holds reset low for the configured number of rising edges with RDY
    /// high, then releases it and arms the pipeline fill cycles.
    ///
    /// No bus transactions are serviced while reset is held.
    pub fn reset<P: CpuPins + ?Sized>(&mut self, pins: &mut P) {
        pins.set_ready(true);
        pins.set_reset_n(false);
        for _ in 0..self.reset_edges {
            pins.wait_rising_edge();
        }
        pins.set_reset_n(true);

        self.pending_fill = self.reset_fill_cycles;
        debug!(
            "reset held for {} edges, {} fill cycles pending",
            self.reset_edges, self.pending_fill
        );
    }

    /// True until the first instruction after reset has been scheduled.
    pub fn fill_pending(&self) -> bool {
        self.pending_fill > 0
    }

    /// Cycles the next instruction consumes: the catalog count, plus the fill
    /// cycles once after reset, plus one for a taken branch.
    pub fn cycles_for(&mut self, descriptor: &OpcodeDescriptor, branch_taken: bool) -> u32 {
        let fill = std::mem::take(&mut self.pending_fill);
        u32::from(descriptor.base_cycles) + fill + u32::from(branch_taken)
    }

    /// Services one bus transaction.
    pub fn service_cycle<P: CpuPins + ?Sized>(
        &mut self,
        pins: &mut P,
        memory: &mut MemoryImage,
    ) -> BusTransaction {
        pins.wait_rising_edge();
        pins.wait_settle(self.settle_delay);

        let address = pins.address();
        let direction = pins.direction();
        let data = match direction {
            BusDirection::Read => {
                let value = memory.bus_read(address);
                pins.drive_data_in(value);
                value
            }
            BusDirection::Write => {
                let value = pins.data_out();
                memory.bus_write(address, value);
                value
            }
        };

        self.total_cycles += 1;
        trace!(
            "cycle {}: {:?} 0x{:04X} = 0x{:02X}",
            self.total_cycles,
            direction,
            address,
            data
        );

        BusTransaction {
            address,
            direction,
            data,
        }
    }

    /// Services `count` consecutive cycles.
    pub fn run_cycles<P: CpuPins + ?Sized>(
        &mut self,
        pins: &mut P,
        memory: &mut MemoryImage,
        count: u32,
    ) -> Vec<BusTransaction> {
        let mut transactions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            transactions.push(self.service_cycle(&mut *pins, &mut *memory));
        }
        transactions
    }

    /// Cycles serviced since construction, excluding reset edges.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }
}
