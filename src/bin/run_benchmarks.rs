use clap::Parser;
use std::process::ExitCode;
use xtools::{BenchCli, main_with};

fn main() -> ExitCode {
    let cli = BenchCli::parse();
    main_with(|| cli.run())
}
