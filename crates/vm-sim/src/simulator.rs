//! The driver loop: owns the data path and control unit,
//! asserts the interrupt line from the input schedule, and enforces the
//! instruction-count ceiling.

use vm_isa::{Error, Instruction, Result, Word, DEFAULT_INSTRUCTION_LIMIT};

use crate::control_unit::{ControlUnit, StepOutcome};
use crate::data_path::DataPath;
use crate::devices::{InputPort, OutputEvent, OutputPort};
use crate::trace::TraceEntry;

/// The outcome of a clean run: total elapsed ticks and everything written to
/// the output port, in write order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    /// Ticks elapsed across the whole run.
    pub total_ticks: u64,
    /// Every value the program wrote to the output port.
    pub output: Vec<OutputEvent>,
}

/// Drives a [`DataPath`]/[`ControlUnit`] pair to completion.
pub struct Simulator {
    dp: DataPath,
    cu: ControlUnit,
    limit: u64,
    instructions_executed: u64,
}

impl Simulator {
    /// Build a simulator over already-loaded memories (see
    /// [`crate::loader::load`]), with the default instruction-count ceiling.
    #[must_use]
    pub fn new(imem: Vec<Instruction>, dmem: Vec<Word>, input: InputPort, entry_pc: u16) -> Self {
        Self::with_limit(imem, dmem, input, entry_pc, DEFAULT_INSTRUCTION_LIMIT)
    }

    /// Build a simulator with an explicit instruction-count ceiling.
    #[must_use]
    pub fn with_limit(imem: Vec<Instruction>, dmem: Vec<Word>, input: InputPort, entry_pc: u16, limit: u64) -> Self {
        Self {
            dp: DataPath::new(imem, dmem, input, OutputPort::default(), entry_pc),
            cu: ControlUnit::new(),
            limit,
            instructions_executed: 0,
        }
    }

    /// Run to completion: `hlt`, input exhaustion, an arithmetic error, or
    /// the instruction ceiling all end the run.
    ///
    /// # Errors
    ///
    /// Propagates [`vm_isa::Error::InputExhausted`] and
    /// [`vm_isa::Error::ArithmeticError`] raised by an executed instruction,
    /// and raises [`vm_isa::Error::InstructionLimitExceeded`] if the
    /// instruction ceiling is reached before `hlt`.
    pub fn run(&mut self) -> Result<SimulationReport> {
        loop {
            self.assert_irq_if_due();
            self.log_state();

            match self.cu.execute(&mut self.dp)? {
                StepOutcome::Continue => {}
                StepOutcome::Halted => break,
            }

            self.instructions_executed += 1;
            if self.instructions_executed >= self.limit {
                return Err(Error::InstructionLimitExceeded { limit: self.limit });
            }
        }

        Ok(SimulationReport { total_ticks: self.cu.tick, output: self.dp.output.events().to_vec() })
    }

    /// Read a data-memory cell, for inspecting final machine state after a
    /// run (e.g. in tests).
    #[must_use]
    pub fn dmem(&self, addr: u16) -> Word {
        self.dp.dmem[addr as usize]
    }

    /// The stack pointer's current value.
    #[must_use]
    pub fn sp(&self) -> u16 {
        self.dp.sp
    }

    /// Latch `IRQ` if the input schedule's head is due: its tick has arrived
    /// and the control unit hasn't already latched a pending interrupt.
    fn assert_irq_if_due(&mut self) {
        if let Some(head) = self.dp.input.peek() {
            if head.tick <= self.cu.tick {
                self.cu.irq = true;
            }
        }
    }

    fn log_state(&self) {
        let instr = self.dp.imem[self.dp.pc as usize];
        let mem_at_arg = instr.arg.and_then(|a| {
            let addr = a as usize;
            if instr.opcode.accesses_dmem() && addr < self.dp.dmem.len() {
                Some(self.dp.dmem[addr])
            } else {
                None
            }
        });
        let entry = TraceEntry {
            tick: self.cu.tick,
            pc: self.dp.pc,
            ar: self.dp.ar,
            acc: self.dp.acc,
            ei: self.cu.ei,
            interrupt: self.cu.irq,
            instr,
            mem_at_arg,
        };
        log::debug!("{entry}");
    }
}
