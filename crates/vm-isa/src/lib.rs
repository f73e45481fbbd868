//! Shared types for the tick-accurate accumulator VM: the word/opcode/
//! instruction data model, the JSON image formats, and the YAML input
//! schedule format.

mod data;
mod error;
mod image;
mod instruction;
mod opcode;
mod schedule;
mod word;

pub use data::{DataRecord, DataType};
pub use error::{Error, Result};
pub use image::{parse_data, parse_instructions, read_data, read_instructions, write_data, write_instructions};
pub use instruction::{AddressType, Instruction};
pub use opcode::Opcode;
pub use schedule::{InputSchedule, ScheduledInput};
pub use word::Word;

/// Number of cells in each of `IMEM`/`DMEM`.
pub const MEM_SIZE: usize = 2048;

/// `DMEM[0]`: the memory-mapped input port.
pub const INPUT_PORT: u16 = 0;
/// `DMEM[1]`: the memory-mapped output port.
pub const OUTPUT_PORT: u16 = 1;
/// `DMEM[2]`: the interrupt vector cell, holding the ISR entry address.
pub const INTERRUPT_VECTOR: u16 = 2;
/// Number of global, non-relocatable cells at the bottom of `DMEM`
/// (input port, output port, interrupt vector). Every segment's own data
/// is loaded starting at this offset.
pub const RESERVED_CELLS: u16 = 3;

/// `SP`'s value when the stack is empty.
pub const STACK_EMPTY: u16 = MEM_SIZE as u16;

/// The driver's default hard ceiling on executed instructions.
pub const DEFAULT_INSTRUCTION_LIMIT: u64 = 100_000;
