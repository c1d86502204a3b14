//! # Oracle Session
//!
//! Ties the catalog, resolver, reference model, scheduler and verifier into a
//! run over one program image.
//!
//! ## Per-instruction flow
//!
//! 1. Snapshot the CPU under test.
//! 2. Look up the opcode at the program cursor.
//! 3. Resolve the operand and compute the expected state.
//! 4. Service the instruction's bus cycles.
//! 5. Verify, log the pass marker and advance the cursor.
//!
//! Every failure is logged at error level and returned; the session does not
//! try to continue past it.

use std::time::Duration;

use log::{debug, error, info, trace};

use crate::addressing::resolve;
use crate::cpu::RegisterProbe;
use crate::instructions::execute;
use crate::memory::{MemoryBus, MemoryImage, PROGRAM_BASE};
use crate::opcodes::{lookup, Mnemonic, OpcodeDescriptor};
use crate::scheduler::{BusTransaction, CpuUnderTest, CycleScheduler};
use crate::verifier::verify;
use crate::Result;

/// Run parameters. `Default` gives the standard harness timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleConfig {
    /// Address of the first instruction.
    pub program_base: u16,
    /// Rising edges with reset held low.
    pub reset_edges: u32,
    /// Extra cycles consumed by the first instruction after reset.
    pub reset_fill_cycles: u32,
    /// Delay between a rising edge and sampling the bus.
    pub settle_delay: Duration,
    /// Stops [`Oracle::run`] after this many verified instructions.
    pub max_instructions: Option<u64>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            program_base: PROGRAM_BASE,
            reset_edges: 5,
            reset_fill_cycles: 3,
            settle_delay: Duration::from_nanos(1),
            max_instructions: None,
        }
    }
}

/// Details of one verified instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionReport {
    /// Opcode address.
    pub address: u16,
    /// Catalog entry that was executed.
    pub descriptor: &'static OpcodeDescriptor,
    /// Cycles consumed, fill and branch cycles included.
    pub cycles: u32,
    /// Bus cycles serviced, in order.
    pub transactions: Vec<BusTransaction>,
}

/// Outcome of [`Oracle::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The instruction matched the reference model.
    Verified(InstructionReport),
    /// The END sentinel was reached; its cycles have been consumed.
    Terminated,
}

/// Totals of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Instructions verified, END excluded.
    pub instructions: u64,
    /// Bus cycles serviced, END included.
    pub cycles: u64,
}

/// Verification session for one CPU under test and one memory image.
///
/// # Examples
///
/// ```no_run
/// use oracle6502::{CpuUnderTest, MemoryImage, Oracle, OracleConfig};
///
/// fn check<D: CpuUnderTest>(dut: D) -> oracle6502::Result<()> {
///     let memory = MemoryImage::from_file("test.bin")?;
///     let mut oracle = Oracle::new(dut, memory, OracleConfig::default());
///     let summary = oracle.run()?;
///     println!("{} instructions in {} cycles", summary.instructions, summary.cycles);
///     Ok(())
/// }
/// ```
pub struct Oracle<D: CpuUnderTest> {
    dut: D,
    memory: MemoryImage,
    config: OracleConfig,
    scheduler: CycleScheduler,
    cursor: u16,
    instructions: u64,
    needs_reset: bool,
    terminated: bool,
}

impl<D: CpuUnderTest> Oracle<D> {
    /// Creates a session. The CPU is not reset until [`reset`](Self::reset)
    /// or the first [`step`](Self::step).
    pub fn new(dut: D, memory: MemoryImage, config: OracleConfig) -> Self {
        let scheduler = CycleScheduler::new(
            config.reset_edges,
            config.reset_fill_cycles,
            config.settle_delay,
        );
        Self {
            dut,
            memory,
            cursor: config.program_base,
            config,
            scheduler,
            instructions: 0,
            needs_reset: true,
            terminated: false,
        }
    }

    /// Resets the CPU under test and rewinds the cursor to the program base.
    pub fn reset(&mut self) {
        self.scheduler.reset(&mut self.dut);
        self.cursor = self.config.program_base;
        self.needs_reset = false;
        self.terminated = false;
        debug!("reset released, execution starts at 0x{:04X}", self.cursor);
    }

    /// Executes and verifies one instruction.
    ///
    /// Once END has been reached every further call returns
    /// [`Step::Terminated`] without clocking the CPU until the next reset.
    pub fn step(&mut self) -> Result<Step> {
        if self.needs_reset {
            self.reset();
        }
        if self.terminated {
            return Ok(Step::Terminated);
        }
        self.step_inner().inspect_err(|err| error!("{err}"))
    }

    fn step_inner(&mut self) -> Result<Step> {
        let address = self.cursor;
        let descriptor = lookup(address, self.memory.read(address))?;

        if descriptor.mnemonic == Mnemonic::End {
            let cycles = self.scheduler.cycles_for(descriptor, false);
            self.memory.begin_step();
            self.scheduler.run_cycles(&mut self.dut, &mut self.memory, cycles);
            debug!("END reached at 0x{address:04X}");
            self.terminated = true;
            return Ok(Step::Terminated);
        }

        let before = self.dut.snapshot();
        trace!("{before}");
        let operand = resolve(
            descriptor,
            address,
            &self.memory,
            before.acc(),
            before.x(),
            before.y(),
        );
        let expected = execute(descriptor, address, &before, operand, &self.memory)?;

        self.memory.begin_step();
        let cycles = self.scheduler.cycles_for(descriptor, expected.branch_taken());
        let transactions = self
            .scheduler
            .run_cycles(&mut self.dut, &mut self.memory, cycles);

        let observed = self.dut.snapshot();
        verify(descriptor, &before, &expected, &observed, &self.memory)?;

        info!("mem[0x{address:04X}]: {descriptor} OK");
        self.cursor = observed.pc();
        self.instructions += 1;

        Ok(Step::Verified(InstructionReport {
            address,
            descriptor,
            cycles,
            transactions,
        }))
    }

    /// Resets if needed, then steps until END or the configured instruction cap.
    pub fn run(&mut self) -> Result<RunSummary> {
        if self.needs_reset {
            self.reset();
        }
        let start_instructions = self.instructions;
        let start_cycles = self.scheduler.total_cycles();

        loop {
            if let Some(limit) = self.config.max_instructions {
                if self.instructions - start_instructions >= limit {
                    debug!("instruction limit of {limit} reached");
                    break;
                }
            }
            if self.step()? == Step::Terminated {
                break;
            }
        }

        let summary = RunSummary {
            instructions: self.instructions - start_instructions,
            cycles: self.scheduler.total_cycles() - start_cycles,
        };
        debug!(
            "run finished: {} instructions, {} cycles",
            summary.instructions, summary.cycles
        );
        Ok(summary)
    }

    /// The oracle's memory image.
    pub fn memory(&self) -> &MemoryImage {
        &self.memory
    }

    /// The CPU under test.
    pub fn dut(&self) -> &D {
        &self.dut
    }

    /// Mutable access to the CPU under test.
    pub fn dut_mut(&mut self) -> &mut D {
        &mut self.dut
    }

    /// True once END has been reached.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Address of the next instruction to verify.
    pub fn cursor(&self) -> u16 {
        self.cursor
    }

    /// Bus cycles serviced so far, reset edges excluded.
    pub fn total_cycles(&self) -> u64 {
        self.scheduler.total_cycles()
    }

    /// Instructions verified so far.
    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    /// Ends the session, returning the CPU under test and the memory image.
    pub fn into_parts(self) -> (D, MemoryImage) {
        (self.dut, self.memory)
    }
}
