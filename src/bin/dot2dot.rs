use clap::Parser;
use std::process::ExitCode;
use xtools::{DotCli, main_with};

fn main() -> ExitCode {
    let cli = DotCli::parse();
    main_with(|| cli.run())
}
