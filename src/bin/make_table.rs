use clap::Parser;
use std::process::ExitCode;
use xtools::{TableCli, main_with};

fn main() -> ExitCode {
    let cli = TableCli::parse();
    main_with(|| cli.run())
}
