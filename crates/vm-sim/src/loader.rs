//! The loader: places the ISR and program images into the
//! single memory space at runtime offsets, rewriting addresses as it goes.

use vm_isa::{DataRecord, Instruction, Word, INTERRUPT_VECTOR, MEM_SIZE};

/// Incrementally places assembled images into `IMEM`/`DMEM`.
///
/// Cells 0, 1, 2 of `DMEM` are reserved (input port, output port, interrupt
/// vector), so the data cursor starts past them; the instruction cursor
/// starts at 0. Each call to [`Loader::load_segment`] copies one image in
/// and advances both cursors, returning the instruction-memory address the
/// segment's first instruction landed at.
pub struct Loader {
    imem: Vec<Instruction>,
    dmem: Vec<Word>,
    instr_cursor: u16,
    data_cursor: u16,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// Start a fresh load with both memories initialized empty (`Hlt` /
    /// `Num(0)`) and the cursors at their reserved starting points.
    #[must_use]
    pub fn new() -> Self {
        Self {
            imem: vec![Instruction::bare(vm_isa::Opcode::Hlt); MEM_SIZE],
            dmem: vec![Word::Num(0); MEM_SIZE],
            instr_cursor: 0,
            data_cursor: vm_isa::RESERVED_CELLS,
        }
    }

    /// Copy one image's data and instructions in at the current cursors,
    /// relocating `l2l` data references and address/jump operands by the
    /// offsets the segment landed at. Returns the segment's entry point.
    ///
    /// A DMEM-accessing operand is only shifted by `data_offset` when it's
    /// marked [`Instruction::relocatable`] — i.e. it names a position in this
    /// segment's own data. An absolute operand (a memory-mapped port
    /// address written directly in source) is left untouched.
    pub fn load_segment(&mut self, instructions: &[Instruction], data: &[DataRecord]) -> u16 {
        let data_offset = self.data_cursor;
        for rec in data {
            let mut word = rec.to_word();
            if rec.l2l {
                word = match word {
                    Word::Num(v) => Word::Num(v + i64::from(data_offset)),
                    Word::Char(v) => Word::Char(v + u32::from(data_offset)),
                };
            }
            self.dmem[self.data_cursor as usize] = word;
            self.data_cursor += 1;
        }

        let instr_offset = self.instr_cursor;
        let entry = instr_offset;
        for instr in instructions {
            let arg = instr.arg.map(|a| {
                if instr.opcode.accesses_dmem() && instr.relocatable {
                    a + i64::from(data_offset)
                } else if instr.opcode.is_control_flow() {
                    a + i64::from(instr_offset)
                } else {
                    a
                }
            });
            self.imem[self.instr_cursor as usize] = Instruction {
                opcode: instr.opcode,
                arg,
                address_type: instr.address_type,
                relocatable: instr.relocatable,
            };
            self.instr_cursor += 1;
        }

        entry
    }

    /// Finalize the load: write the ISR's entry point into the interrupt
    /// vector cell and return the finished memories.
    #[must_use]
    pub fn finish(mut self, isr_entry: u16) -> (Vec<Instruction>, Vec<Word>) {
        self.dmem[INTERRUPT_VECTOR as usize] = Word::Num(i64::from(isr_entry));
        (self.imem, self.dmem)
    }
}

/// Load the ISR followed by the program, producing finished memories and the
/// program's entry point (where `PC` is initialized).
#[must_use]
pub fn load(
    isr_instructions: &[Instruction],
    isr_data: &[DataRecord],
    program_instructions: &[Instruction],
    program_data: &[DataRecord],
) -> (Vec<Instruction>, Vec<Word>, u16) {
    let mut loader = Loader::new();
    let isr_entry = loader.load_segment(isr_instructions, isr_data);
    let program_entry = loader.load_segment(program_instructions, program_data);
    let (imem, dmem) = loader.finish(isr_entry);
    (imem, dmem, program_entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vm_isa::{AddressType, DataType, Opcode};

    #[test]
    fn isr_and_program_land_in_disjoint_contiguous_ranges() {
        let isr_instrs = vec![Instruction::bare(Opcode::Iret)];
        let isr_data: Vec<DataRecord> = vec![];
        let prog_instrs = vec![
            Instruction::with_arg(Opcode::Load, 0, AddressType::Direct),
            Instruction::bare(Opcode::Hlt),
        ];
        let prog_data = vec![DataRecord {
            name: "x".into(),
            word_type: DataType::Num,
            val: 5,
            l2l: false,
        }];

        let (imem, dmem, entry) = load(&isr_instrs, &isr_data, &prog_instrs, &prog_data);

        // ISR at [0, 1), program at [1, 3).
        assert_eq!(imem[0], Instruction::bare(Opcode::Iret));
        assert_eq!(entry, 1);
        assert_eq!(imem[1].opcode, Opcode::Load);
        // Program's data landed at cursor 3 (cells 0..3 reserved).
        assert_eq!(imem[1].arg, Some(3));
        assert_eq!(dmem[3], Word::Num(5));
        // Interrupt vector points at the ISR entry.
        assert_eq!(dmem[2], Word::Num(0));
    }

    #[test]
    fn literal_port_addresses_are_left_absolute_by_relocation() {
        // The bundled ISR shape: `load 0; store 1; iret`, written as bare
        // numerals rather than resolved labels. Both must stay 0 and 1 even
        // though the ISR's own data offset is 3.
        let isr_instrs = vec![
            Instruction::with_literal_arg(Opcode::Load, 0, AddressType::Direct),
            Instruction::with_literal_arg(Opcode::Store, 1, AddressType::Direct),
            Instruction::bare(Opcode::Iret),
        ];
        let (imem, _, _) = load(&isr_instrs, &[], &[], &[]);
        assert_eq!(imem[0].arg, Some(0));
        assert_eq!(imem[1].arg, Some(1));
    }

    #[test]
    fn jump_targets_are_rewritten_by_instruction_offset() {
        let isr_instrs = vec![Instruction::bare(Opcode::Iret), Instruction::bare(Opcode::Iret)];
        let prog_instrs = vec![Instruction::with_arg(Opcode::Jmp, 0, AddressType::Direct)];
        let (imem, _, entry) = load(&isr_instrs, &[], &prog_instrs, &[]);
        assert_eq!(entry, 2);
        // A jump to 0 within the program now targets instr_offset + 0 = 2.
        assert_eq!(imem[2].arg, Some(2));
    }

    #[test]
    fn l2l_data_is_relocated_by_the_data_offset() {
        let data = vec![
            DataRecord { name: "word".into(), word_type: DataType::Char, val: 104, l2l: false },
            DataRecord { name: "ptr".into(), word_type: DataType::Num, val: 0, l2l: true },
        ];
        let (_, dmem, _) = load(&[], &[], &[], &data);
        // "ptr" referenced label at relative position 0, relocated by the
        // data segment's load offset (3, since cells 0..3 are reserved).
        assert_eq!(dmem[4], Word::Num(3));
    }
}
