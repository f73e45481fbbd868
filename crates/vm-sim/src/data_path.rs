//! The data path: registers, the two memories, and the
//! micro-operations the control unit sequences.

use crate::alu::Alu;
use crate::devices::{InputPort, OutputPort};
use vm_isa::{Instruction, Result, Word, INPUT_PORT, INTERRUPT_VECTOR, MEM_SIZE, OUTPUT_PORT, STACK_EMPTY};

/// Selects what `latch_pc` does this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcSelector {
    /// `PC := PC + 1` — every basic instruction and `push`/`pop`.
    Advance,
    /// `PC := target` — a taken control-flow instruction.
    JumpTaken(u16),
    /// `PC := DR.val` — `iret`.
    Iret,
}

/// Selects what `latch_ar` does this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArSelector {
    /// `AR := IR.arg` — address instructions.
    Address(u16),
    /// `AR := SP` — stack instructions.
    Stack,
    /// `AR := DR.val` — indirect address resolution.
    Indirect,
    /// `AR := 2` — interrupt vector lookup.
    Interrupt,
}

/// Selects what `latch_acc` does this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccSelector {
    /// `ACC := {num, PC}` — interrupt entry snapshot.
    Interrupt,
    /// `ACC := DR` — `load`/`pop`.
    FromDr,
    /// `ACC := {num, ALU.O}` — arithmetic opcodes.
    FromAlu,
}

/// Selects what `latch_sp` does this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpSelector {
    /// `push`/interrupt entry: predecrement.
    Decrement,
    /// `pop`/`iret`: postincrement.
    Increment,
}

/// Which memory a read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemKind {
    /// Instruction memory.
    Instruction,
    /// Data memory (dispatches to the input device at `AR == 0`).
    Data,
}

/// Registers, memories, and devices; the data path a control unit drives.
pub struct DataPath {
    /// Program counter, an index into `IMEM`.
    pub pc: u16,
    /// Address register, an index into `DMEM`.
    pub ar: u16,
    /// Accumulator.
    pub acc: Word,
    /// Stack pointer, empty-descending, initial value `MEM_SIZE`.
    pub sp: u16,
    /// Instruction register: the currently decoded instruction.
    pub ir: Instruction,
    /// Data register: the last word read from `DMEM` or the input device.
    pub dr: Word,

    /// Instruction memory.
    pub imem: Vec<Instruction>,
    /// Data memory.
    pub dmem: Vec<Word>,
    /// The arithmetic/logic unit.
    pub alu: Alu,

    /// The input device, mapped at `DMEM[0]`.
    pub input: InputPort,
    /// The output device, mapped at `DMEM[1]`.
    pub output: OutputPort,
}

impl DataPath {
    /// Build a fresh data path over the given memories.
    ///
    /// Memories must already be `MEM_SIZE` cells; callers build them via
    /// [`crate::loader::Loader`].
    #[must_use]
    pub fn new(imem: Vec<Instruction>, dmem: Vec<Word>, input: InputPort, output: OutputPort, entry_pc: u16) -> Self {
        debug_assert_eq!(imem.len(), MEM_SIZE);
        debug_assert_eq!(dmem.len(), MEM_SIZE);
        Self {
            pc: entry_pc,
            ar: 0,
            acc: Word::Num(0),
            sp: STACK_EMPTY,
            ir: imem[entry_pc as usize],
            dr: Word::Num(0),
            imem,
            dmem,
            alu: Alu::default(),
            input,
            output,
        }
    }

    /// `latch_pc`.
    pub fn latch_pc(&mut self, sel: PcSelector) {
        self.pc = match sel {
            PcSelector::Advance => self.pc + 1,
            PcSelector::JumpTaken(target) => target,
            PcSelector::Iret => self.dr.value() as u16,
        };
    }

    /// `latch_ar`.
    pub fn latch_ar(&mut self, sel: ArSelector) {
        self.ar = match sel {
            ArSelector::Address(arg) => arg,
            ArSelector::Stack => self.sp,
            ArSelector::Indirect => self.dr.value() as u16,
            ArSelector::Interrupt => INTERRUPT_VECTOR,
        };
    }

    /// `latch_acc`.
    pub fn latch_acc(&mut self, sel: AccSelector) {
        self.acc = match sel {
            AccSelector::Interrupt => Word::Num(i64::from(self.pc)),
            AccSelector::FromDr => self.dr,
            AccSelector::FromAlu => Word::Num(self.alu.o),
        };
    }

    /// `latch_sp`.
    pub fn latch_sp(&mut self, sel: SpSelector) {
        self.sp = match sel {
            SpSelector::Decrement => self.sp - 1,
            SpSelector::Increment => self.sp + 1,
        };
    }

    /// `latch_alu`: `ALU.L := ACC.val; ALU.R := DR.val`.
    pub fn latch_alu(&mut self) {
        self.alu.l = self.acc.value();
        self.alu.r = self.dr.value();
    }

    /// `read_mem`: fetch `IMEM[PC]` into `IR`, or dispatch a `DMEM` read
    /// through the input device at `AR == 0`.
    ///
    /// # Errors
    ///
    /// Returns [`vm_isa::Error::InputExhausted`] reading `DMEM[0]` with no
    /// input left.
    pub fn read_mem(&mut self, kind: MemKind) -> Result<()> {
        match kind {
            MemKind::Instruction => self.ir = self.imem[self.pc as usize],
            MemKind::Data => {
                self.dr = if self.ar == INPUT_PORT {
                    self.input.send_char()?
                } else {
                    self.dmem[self.ar as usize]
                };
            }
        }
        Ok(())
    }

    /// `write_dmem`: write `ACC` to `DMEM[AR]`, or dispatch to the output
    /// device at `AR == 1`.
    pub fn write_dmem(&mut self) {
        if self.ar == OUTPUT_PORT {
            self.output.write(self.acc);
        } else {
            self.dmem[self.ar as usize] = self.acc;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vm_isa::{AddressType, InputSchedule, Opcode};

    fn blank_path() -> DataPath {
        DataPath::new(
            vec![Instruction::bare(Opcode::Hlt); MEM_SIZE],
            vec![Word::Num(0); MEM_SIZE],
            InputPort::new(InputSchedule::default()),
            OutputPort::default(),
            0,
        )
    }

    #[test]
    fn latch_pc_advance_increments() {
        let mut dp = blank_path();
        dp.pc = 5;
        dp.latch_pc(PcSelector::Advance);
        assert_eq!(dp.pc, 6);
    }

    #[test]
    fn latch_pc_jump_taken_sets_target() {
        let mut dp = blank_path();
        dp.latch_pc(PcSelector::JumpTaken(99));
        assert_eq!(dp.pc, 99);
    }

    #[test]
    fn latch_pc_iret_reads_dr() {
        let mut dp = blank_path();
        dp.dr = Word::Num(42);
        dp.latch_pc(PcSelector::Iret);
        assert_eq!(dp.pc, 42);
    }

    #[test]
    fn latch_sp_decrement_then_increment_restores() {
        let mut dp = blank_path();
        let start = dp.sp;
        dp.latch_sp(SpSelector::Decrement);
        assert_eq!(dp.sp, start - 1);
        dp.latch_sp(SpSelector::Increment);
        assert_eq!(dp.sp, start);
    }

    #[test]
    fn write_dmem_to_output_port_does_not_touch_memory() {
        let mut dp = blank_path();
        dp.ar = OUTPUT_PORT;
        dp.acc = Word::Char('x' as u32);
        dp.write_dmem();
        assert_eq!(dp.dmem[OUTPUT_PORT as usize], Word::Num(0));
        assert_eq!(dp.output.events().len(), 1);
    }

    #[test]
    fn write_dmem_to_ordinary_cell_stores_acc() {
        let mut dp = blank_path();
        dp.ar = 10;
        dp.acc = Word::Num(7);
        dp.write_dmem();
        assert_eq!(dp.dmem[10], Word::Num(7));
    }

    #[test]
    fn read_mem_from_input_port_consumes_device() {
        let sched = InputSchedule::from_pairs(vec![(0, "h".into())]).unwrap();
        let mut dp = blank_path();
        dp.input = InputPort::new(sched);
        dp.ar = INPUT_PORT;
        dp.read_mem(MemKind::Data).unwrap();
        assert_eq!(dp.dr, Word::Char('h' as u32));
    }

    #[test]
    fn read_mem_instruction_advances_ir() {
        let mut dp = blank_path();
        dp.imem[3] = Instruction::with_arg(Opcode::Load, 1, AddressType::Direct);
        dp.pc = 3;
        dp.read_mem(MemKind::Instruction).unwrap();
        assert_eq!(dp.ir, Instruction::with_arg(Opcode::Load, 1, AddressType::Direct));
    }
}
