//! cmmap - Infernal alignment to Traveler mapping
//!
//! Reads the first alignment block of an Infernal aligned FASTA file and
//! writes the template to target structure tree mapping.
//!
//! ## Usage
//!
//! ```bash
//! cmmap -i alignment.afa                 # mapping on standard output
//! cmmap -i alignment.afa -o target.map   # mapping into a file
//! ```

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use cmmap::map_file;
use cmmap::output::write_mapping;

/// cmmap - Convert an Infernal structural alignment into a tree mapping
///
/// The mapping lists, for every node of the template structure tree, the
/// matching node of the target tree, followed by the nodes only present in
/// the target.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Infernal aligned FASTA file (.afa) with the alignment
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input: PathBuf,

    /// Output file for the Traveler mapping (standard output if omitted)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    output: Option<PathBuf>,
}

/// Computes the mapping and writes it to the requested destination.
fn run(args: &Args) -> Result<()> {
    let mapping = map_file(&args.input)
        .with_context(|| format!("Failed to map alignment {:?}", args.input))?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Unable to create output file {:?}", path))?;
            write_mapping(&mut BufWriter::new(file), &mapping)
                .with_context(|| format!("Failed to write mapping to {:?}", path))?;
            info!("Wrote {} mapping entries to {:?}", mapping.len(), path);
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write_mapping(&mut handle, &mapping).context("Failed to write mapping")?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so they never mix with a mapping written to stdout
    if let Err(e) = TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
