//! The control unit: decodes `IR`, sequences the data path's
//! micro-operations per instruction, counts ticks, and owns the interrupt
//! protocol.

use crate::alu::AluOp;
use crate::data_path::{AccSelector, ArSelector, DataPath, MemKind, PcSelector, SpSelector};
use vm_isa::{Opcode, Result};

/// What happened after one call to [`ControlUnit::execute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The machine is still running.
    Continue,
    /// `hlt` was executed; the machine has stopped.
    Halted,
}

/// Sequences data-path micro-ops to execute one instruction per call,
/// counts ticks, and drives the interrupt protocol.
#[derive(Debug, Clone, Copy)]
pub struct ControlUnit {
    /// Interrupts enabled. `true` on cold boot.
    pub ei: bool,
    /// Interrupt pending, latched by the driver and cleared by a completed
    /// `iret`.
    pub irq: bool,
    /// Total ticks elapsed.
    pub tick: u64,
}

impl Default for ControlUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlUnit {
    /// A fresh control unit: interrupts enabled, no pending interrupt, tick
    /// zero.
    #[must_use]
    pub fn new() -> Self {
        Self { ei: true, irq: false, tick: 0 }
    }

    /// Execute exactly one instruction: fetch, decode, dispatch, poll for
    /// interrupts, and enter one if due.
    ///
    /// # Errors
    ///
    /// Propagates [`vm_isa::Error::InputExhausted`] or
    /// [`vm_isa::Error::ArithmeticError`] raised by the instruction's
    /// micro-ops.
    pub fn execute(&mut self, dp: &mut DataPath) -> Result<StepOutcome> {
        dp.read_mem(MemKind::Instruction)?;
        self.tick += 1;
        let instr = dp.ir;

        if instr.opcode.is_basic() {
            let outcome = self.execute_basic(dp, instr)?;
            if outcome == StepOutcome::Halted {
                return Ok(outcome);
            }
            dp.latch_pc(PcSelector::Advance);
        } else if instr.opcode.is_control_flow() {
            self.execute_control_flow(dp, instr);
        } else {
            self.execute_stack(dp, instr)?;
            if instr.opcode != Opcode::Iret {
                dp.latch_pc(PcSelector::Advance);
            }
        }

        self.tick += 1;
        if self.ei && self.irq {
            log::debug!("-----------Interrupt-Started-----------");
            self.enter_interrupt(dp)?;
        }
        Ok(StepOutcome::Continue)
    }

    fn execute_basic(&mut self, dp: &mut DataPath, instr: vm_isa::Instruction) -> Result<StepOutcome> {
        if instr.address_type.is_indirect() {
            self.resolve_indirect(dp, instr)?;
        } else {
            dp.latch_ar(ArSelector::Address(arg_addr(instr)));
            self.tick += 1;
        }

        match instr.opcode {
            Opcode::Load => {
                dp.read_mem(MemKind::Data)?;
                dp.latch_acc(AccSelector::FromDr);
                self.tick += 1;
            }
            Opcode::Store => {
                dp.write_dmem();
                self.tick += 1;
            }
            Opcode::Add | Opcode::Sub | Opcode::Mod => {
                dp.read_mem(MemKind::Data)?;
                dp.latch_alu();
                self.tick += 1;
                let op = match instr.opcode {
                    Opcode::Add => AluOp::Add,
                    Opcode::Sub => AluOp::Sub,
                    Opcode::Mod => AluOp::Mod,
                    _ => unreachable!("filtered above"),
                };
                dp.alu.apply(op)?;
                dp.latch_acc(AccSelector::FromAlu);
                self.tick += 1;
            }
            Opcode::Cmp => {
                dp.read_mem(MemKind::Data)?;
                dp.latch_alu();
                self.tick += 1;
                dp.alu.apply(AluOp::Cmp)?;
                self.tick += 1;
            }
            Opcode::Ei => {
                self.ei = true;
                self.tick += 1;
            }
            Opcode::Di => {
                self.ei = false;
                self.tick += 1;
            }
            Opcode::Hlt => return Ok(StepOutcome::Halted),
            _ => unreachable!("non-basic opcode in execute_basic"),
        }
        Ok(StepOutcome::Continue)
    }

    /// Indirect address resolution: `AR := IR.arg; DR := DMEM[AR]; AR := DR.val`.
    ///
    /// When `IR.arg == 0` the intermediate read dispatches to the input
    /// device.
    fn resolve_indirect(&mut self, dp: &mut DataPath, instr: vm_isa::Instruction) -> Result<()> {
        dp.latch_ar(ArSelector::Address(arg_addr(instr)));
        self.tick += 1;
        dp.read_mem(MemKind::Data)?;
        dp.latch_ar(ArSelector::Indirect);
        self.tick += 1;
        Ok(())
    }

    fn execute_control_flow(&mut self, dp: &mut DataPath, instr: vm_isa::Instruction) {
        let target = arg_addr(instr);
        match instr.opcode {
            Opcode::Jmp => {
                dp.latch_pc(PcSelector::JumpTaken(target));
                self.tick += 1;
            }
            Opcode::Jz | Opcode::Jnz | Opcode::Jn | Opcode::Jnn => {
                self.tick += 1;
                let taken = match instr.opcode {
                    Opcode::Jz => dp.alu.zero,
                    Opcode::Jnz => !dp.alu.zero,
                    Opcode::Jn => dp.alu.negative,
                    Opcode::Jnn => !dp.alu.negative,
                    _ => unreachable!("filtered above"),
                };
                if taken {
                    dp.latch_pc(PcSelector::JumpTaken(target));
                } else {
                    dp.latch_pc(PcSelector::Advance);
                }
                self.tick += 1;
            }
            _ => unreachable!("non-control-flow opcode"),
        }
    }

    fn execute_stack(&mut self, dp: &mut DataPath, instr: vm_isa::Instruction) -> Result<()> {
        match instr.opcode {
            Opcode::Push => {
                dp.latch_sp(SpSelector::Decrement);
                dp.latch_ar(ArSelector::Stack);
                dp.write_dmem();
                self.tick += 1;
            }
            Opcode::Pop => {
                dp.latch_ar(ArSelector::Stack);
                self.tick += 1;
                dp.read_mem(MemKind::Data)?;
                dp.latch_acc(AccSelector::FromDr);
                dp.latch_sp(SpSelector::Increment);
                self.tick += 1;
            }
            Opcode::Iret => {
                dp.latch_ar(ArSelector::Stack);
                self.tick += 1;
                dp.read_mem(MemKind::Data)?;
                dp.latch_sp(SpSelector::Increment);
                self.tick += 1;
                dp.latch_pc(PcSelector::Iret);
                self.ei = true;
                self.irq = false;
                self.tick += 1;
                log::debug!("-----------Interrupt-Ended-----------");
            }
            _ => unreachable!("non-stack opcode"),
        }
        Ok(())
    }

    /// Synchronous interrupt entry at an instruction boundary: disable interrupts, save only `PC`, and dispatch to the ISR
    /// via the interrupt vector cell. `IRQ` stays latched until `iret`
    /// clears it.
    fn enter_interrupt(&mut self, dp: &mut DataPath) -> Result<()> {
        self.ei = false;

        dp.latch_acc(AccSelector::Interrupt);
        dp.latch_sp(SpSelector::Decrement);
        self.tick += 1;
        dp.latch_ar(ArSelector::Stack);
        dp.write_dmem();
        self.tick += 1;

        dp.latch_ar(ArSelector::Interrupt);
        self.tick += 1;
        dp.read_mem(MemKind::Data)?;
        self.tick += 1;
        dp.latch_acc(AccSelector::FromDr);
        self.tick += 1;
        dp.latch_pc(PcSelector::Iret);
        self.tick += 1;

        log::debug!("-----------Execute-ISR-----------");
        Ok(())
    }
}

fn arg_addr(instr: vm_isa::Instruction) -> u16 {
    instr.arg.unwrap_or(0) as u16
}
