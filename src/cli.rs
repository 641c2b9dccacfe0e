mod bench;
mod dot;
mod table;

pub use bench::BenchCli;
pub use dot::DotCli;
pub use table::{Format, TableCli};

use anyhow::Context;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    process::ExitCode,
};

/// Initializes logging.
///
/// Warnings are shown by default; `RUST_LOG` selects other levels.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

/// Runs the body of a command-line tool, reporting a failure on standard error.
pub fn main_with(run: impl FnOnce() -> anyhow::Result<()>) -> ExitCode {
    init_logger();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Opens the output file, or standard output if there is none.
fn create_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("failed to create '{}'", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}
