//! Two-pass assembler for the accumulator VM's source dialect: source text in, instruction and data records out.

mod translator;

pub use translator::assemble;
