//! Tick-accurate simulator for the accumulator-based virtual machine
//!: ALU, memory-mapped devices, data path, loader, control
//! unit, trace formatting, and the driver loop.

mod alu;
mod control_unit;
mod data_path;
mod devices;
mod loader;
mod simulator;
mod trace;

pub use alu::{Alu, AluOp};
pub use control_unit::{ControlUnit, StepOutcome};
pub use data_path::{AccSelector, ArSelector, DataPath, MemKind, PcSelector, SpSelector};
pub use devices::{InputPort, OutputEvent, OutputPort};
pub use loader::{load, Loader};
pub use simulator::{SimulationReport, Simulator};
pub use trace::TraceEntry;
