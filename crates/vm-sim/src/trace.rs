//! Execution trace formatting: one line per executed
//! instruction, recording the machine's full visible state before dispatch.

use std::fmt;

use vm_isa::{Instruction, Word};

/// One line of the execution trace: the machine's state immediately after
/// fetch, before the instruction's micro-ops run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    /// Ticks elapsed before this instruction began.
    pub tick: u64,
    /// `PC` at fetch.
    pub pc: u16,
    /// `AR` at fetch (typically stale from the previous instruction).
    pub ar: u16,
    /// `ACC` at fetch.
    pub acc: Word,
    /// Whether interrupts are enabled.
    pub ei: bool,
    /// Whether an interrupt is pending.
    pub interrupt: bool,
    /// The fetched instruction.
    pub instr: Instruction,
    /// `DMEM[instr.arg]`, when the instruction names a direct address.
    pub mem_at_arg: Option<Word>,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arg = match self.instr.arg {
            Some(a) => a.to_string(),
            None => "null".to_string(),
        };
        let mem = match self.mem_at_arg {
            Some(w) => w.value().to_string(),
            None => "null".to_string(),
        };
        write!(
            f,
            "tick:{} pc:{} ar:{} acc:{} ei:{} interrupt:{}  Opcode:{} Arg:{} Mem[arg]:{}",
            self.tick,
            self.pc,
            self.ar,
            self.acc.value(),
            self.ei,
            self.interrupt,
            self.instr.opcode.mnemonic(),
            arg,
            mem,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vm_isa::{AddressType, Opcode};

    #[test]
    fn bare_instruction_formats_null_arg_and_mem() {
        let entry = TraceEntry {
            tick: 4,
            pc: 1,
            ar: 0,
            acc: Word::Num(0),
            ei: true,
            interrupt: false,
            instr: Instruction::bare(Opcode::Hlt),
            mem_at_arg: None,
        };
        let line = entry.to_string();
        assert!(line.starts_with("tick:4 pc:1 ar:0 acc:0 ei:true interrupt:false"));
        assert!(line.ends_with("Opcode:hlt Arg:null Mem[arg]:null"));
    }

    #[test]
    fn addressed_instruction_reports_its_arg_and_memory_cell() {
        let entry = TraceEntry {
            tick: 10,
            pc: 2,
            ar: 10,
            acc: Word::Num(7),
            ei: true,
            interrupt: false,
            instr: Instruction::with_arg(Opcode::Load, 10, AddressType::Direct),
            mem_at_arg: Some(Word::Num(7)),
        };
        let line = entry.to_string();
        assert!(line.contains("acc:7"));
        assert!(line.contains("Opcode:load Arg:10 Mem[arg]:7"));
    }
}
