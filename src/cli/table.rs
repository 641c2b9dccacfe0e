use super::create_output;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::{io::Write, path::PathBuf};
use xtools_bench::Results;
use xtools_table::{Table, TableDescription};

/// Output format of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// LaTeX tabular
    Latex,
    /// Comma-separated values
    Csv,
}

/// Renders benchmark results as a table.
#[derive(Debug, Parser)]
#[command(name = "make_table", author, version, about, long_about = None)]
pub struct TableCli {
    /// Benchmark results (JSON); several files are merged
    #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
    pub results: Vec<PathBuf>,
    /// Table description (JSON)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub table: PathBuf,
    /// Write the table to this file instead of standard output
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
    /// Show a placeholder for values that cannot be computed
    #[arg(short = 'i', long = "ignore-unknown")]
    pub ignore_unknown: bool,
    /// Only output the tabular environment
    #[arg(long)]
    pub tabular_only: bool,
    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Latex)]
    pub format: Format,
}

impl TableCli {
    /// Builds the table and writes it out.
    pub fn run(&self) -> anyhow::Result<()> {
        let results = self.merged_results()?;
        let mut description = TableDescription::load(&self.table).with_context(|| {
            format!("failed to load table description '{}'", self.table.display())
        })?;
        description.parameters.ignore_unknown_values |= self.ignore_unknown;
        description.parameters.tabular_only |= self.tabular_only;

        let table = Table::build(&results, &description)?;
        let mut out = create_output(self.output.as_deref())?;
        match self.format {
            Format::Latex => out.write_all(table.to_latex().as_bytes())?,
            Format::Csv => table.write_csv(&mut out)?,
        }
        out.flush()?;
        Ok(())
    }

    /// Reads all the results files, merging them into the first one.
    fn merged_results(&self) -> anyhow::Result<Results> {
        let mut merged: Option<Results> = None;
        for path in &self.results {
            let results = Results::load(path)
                .with_context(|| format!("failed to load results '{}'", path.display()))?;
            match merged.as_mut() {
                Some(merged) => merged
                    .merge(results)
                    .with_context(|| format!("cannot merge results '{}'", path.display()))?,
                None => merged = Some(results),
            }
        }
        merged.context("no results to tabulate")
    }
}
