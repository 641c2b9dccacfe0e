use super::create_output;
use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::{io::Write, path::PathBuf, time::Duration};
use xtools_bench::{BenchmarkSpec, Observer, ProcessExecutor, Status, run_benchmark};

/// Runs verification programs over the configurations of generated models
/// and records their statistics as JSON.
#[derive(Debug, Parser)]
#[command(name = "run_benchmarks", author, version, about, long_about = None)]
pub struct BenchCli {
    /// Benchmark specification (JSON)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub spec: PathBuf,
    /// Write the results to this file instead of standard output
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
    /// Pretty-print the results
    #[arg(long)]
    pub pretty: bool,
    /// Do not show progress
    #[arg(short, long)]
    pub quiet: bool,
}

impl BenchCli {
    /// Runs the benchmark and writes its results.
    pub fn run(&self) -> anyhow::Result<()> {
        let spec = BenchmarkSpec::load(&self.spec)
            .with_context(|| format!("failed to load benchmark '{}'", self.spec.display()))?;
        info!(target: "run_benchmarks", "running benchmark '{}'", spec.name);
        let mut executor = ProcessExecutor::default();
        let results = if self.quiet {
            run_benchmark(&spec, &mut executor, &mut ())
        } else {
            let mut spinner = Spinner::new();
            let results = run_benchmark(&spec, &mut executor, &mut spinner);
            spinner.bar.finish_and_clear();
            results
        }
        .with_context(|| format!("benchmark '{}' failed", spec.name))?;

        let mut out = create_output(self.output.as_deref())?;
        results.write(&mut out, self.pretty)?;
        writeln!(out)?;
        out.flush()?;
        Ok(())
    }
}

/// Shows the run in progress on standard error.
struct Spinner {
    bar: ProgressBar,
    failures: u64,
}

impl Spinner {
    fn new() -> Self {
        let style = ProgressStyle::with_template(
            "[{elapsed_precise}] {spinner} {pos} runs ({prefix} unsuccessful), {msg}",
        )
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = ProgressBar::new_spinner()
            .with_style(style)
            .with_prefix("0");
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar, failures: 0 }
    }
}

impl Observer for Spinner {
    fn building(&mut self, test_case: &str) {
        self.bar.set_message(format!("building {test_case}"));
    }

    fn running(&mut self, test_case: &str, program: &str) {
        self.bar.set_message(format!("{program} on {test_case}"));
    }

    fn finished(&mut self, _test_case: &str, _program: &str, status: Status) {
        self.bar.inc(1);
        if status != Status::Success {
            self.failures += 1;
            self.bar.set_prefix(self.failures.to_string());
        }
    }
}
