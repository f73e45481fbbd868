//! `vm-asm`: translate a source program into its instruction and data
//! images.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Two-pass assembler for the accumulator VM's source dialect.
#[derive(Debug, Parser)]
#[command(name = "vm-asm", version, about)]
struct Args {
    /// Path to the `.asm` source file.
    program: PathBuf,
    /// Where to write the assembled instruction image (JSON).
    out_instructions: PathBuf,
    /// Where to write the assembled data image (JSON).
    out_data: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("vm-asm: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> vm_isa::Result<()> {
    let source = std::fs::read_to_string(&args.program)?;
    let (instructions, data) = vm_asm::assemble(&source)?;
    vm_isa::write_instructions(&instructions, &args.out_instructions)?;
    vm_isa::write_data(&data, &args.out_data)?;
    log::info!(
        "assembled {} instructions, {} data words",
        instructions.len(),
        data.len()
    );
    Ok(())
}
