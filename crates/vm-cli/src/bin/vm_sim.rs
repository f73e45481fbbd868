//! `vm-sim`: load an assembled program and ISR, run it against a timed
//! input schedule, and report its output.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use vm_isa::{DEFAULT_INSTRUCTION_LIMIT, MEM_SIZE};
use vm_sim::{InputPort, Simulator};

const DEFAULT_ISR_INSTRUCTIONS: &str = include_str!("../../../../isr/instr.json");
const DEFAULT_ISR_DATA: &str = include_str!("../../../../isr/data.json");

/// Tick-accurate simulator for the accumulator VM.
#[derive(Debug, Parser)]
#[command(name = "vm-sim", version, about)]
struct Args {
    /// Assembled instruction image (JSON).
    instructions: PathBuf,
    /// Assembled data image (JSON).
    data: PathBuf,
    /// Timed input schedule (YAML).
    input: PathBuf,

    /// Interrupt Service Routine's instruction image. Defaults to the
    /// bundled echo-and-return routine (`load 0; store 1; iret`).
    #[arg(long)]
    isr_instr: Option<PathBuf>,
    /// Interrupt Service Routine's data image.
    #[arg(long)]
    isr_data: Option<PathBuf>,
    /// Hard ceiling on executed instructions before aborting.
    #[arg(long, default_value_t = DEFAULT_INSTRUCTION_LIMIT)]
    limit: u64,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("vm-sim: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> vm_isa::Result<()> {
    let program_instructions = vm_isa::read_instructions(&args.instructions)?;
    let program_data = vm_isa::read_data(&args.data)?;

    let isr_instructions = match &args.isr_instr {
        Some(path) => vm_isa::read_instructions(path)?,
        None => vm_isa::parse_instructions(DEFAULT_ISR_INSTRUCTIONS)?,
    };
    let isr_data = match &args.isr_data {
        Some(path) => vm_isa::read_data(path)?,
        None => vm_isa::parse_data(DEFAULT_ISR_DATA)?,
    };

    let (imem, dmem, entry) = vm_sim::load(&isr_instructions, &isr_data, &program_instructions, &program_data);
    debug_assert_eq!(imem.len(), MEM_SIZE);
    debug_assert_eq!(dmem.len(), MEM_SIZE);

    let schedule = vm_isa::InputSchedule::load(&args.input)?;
    let mut sim = Simulator::with_limit(imem, dmem, InputPort::new(schedule), entry, args.limit);
    let report = sim.run()?;

    log::info!("halted after {} ticks", report.total_ticks);
    for event in &report.output {
        match event {
            vm_sim::OutputEvent::Char(ch) => print!("{ch}"),
            vm_sim::OutputEvent::Num(n) => print!("{n}"),
        }
    }
    Ok(())
}
