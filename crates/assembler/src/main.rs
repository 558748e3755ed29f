//! CLI entry point for the asm12 assembler binary.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use asm12::assembler::assemble;
use asm12::errors::AssembleError;
use asm12::output::FileSink;
use asm12::source::open_source;
use asm12_isa as _;
use clap::Parser;
use thiserror as _;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
#[cfg(test)]
use tempfile as _;

/// Source file extension.
const SOURCE_EXTENSION: &str = "as";

/// Assembles asm12 source files into object, entry and extern files.
#[derive(Debug, Parser)]
#[command(name = "asm12", version, about)]
struct Cli {
    /// Source files; `.as` is appended when missing.
    #[arg(required = true, value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Directory for the `.ob`, `.ent` and `.ext` files [default: next to each source]
    #[arg(short, long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

/// Source path and artifact base path for one input.
#[derive(Debug, PartialEq, Eq)]
struct InputPaths {
    source: PathBuf,
    base: PathBuf,
}

fn input_paths(input: &Path, out_dir: Option<&Path>) -> InputPaths {
    let base = if input.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
        input.with_extension("")
    } else {
        input.to_path_buf()
    };

    let mut source = base.clone().into_os_string();
    source.push(".");
    source.push(SOURCE_EXTENSION);

    let base = match (out_dir, base.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => base,
    };

    InputPaths {
        source: PathBuf::from(source),
        base,
    }
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Assembles one input; `Ok(false)` means the source had errors.
fn run_file(input: &Path, out_dir: Option<&Path>) -> Result<bool, AssembleError> {
    let paths = input_paths(input, out_dir);
    let name = display_name(&paths.source);

    let mut source = open_source(&paths.source)?;
    let assembly = assemble(&name, &mut source)?;
    assembly.emit(&mut FileSink::new(&paths.base))?;

    if assembly.is_success() {
        println!("File '{name}' has been assembled successfully!");
    }
    Ok(assembly.is_success())
}

fn init_tracing(level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let mut failed = false;
    for input in &cli.inputs {
        match run_file(input, cli.out_dir.as_deref()) {
            Ok(true) => {}
            Ok(false) => failed = true,
            Err(e) => {
                tracing::error!("{e}");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
