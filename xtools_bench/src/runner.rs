//! Execution of a benchmark specification.
//!
//! Every model is built once per configuration of its matrix,
//! and every program is run on each built model, strictly in sequence.
//! Runs go from pending to running to one of the terminal [`Status`]es.
//!
//! When `skip_on_timeout` is set, a program that times out on a configuration
//! is not run again on the following configurations of the same model:
//! they record [`Status::Skipped`] instead.
//! If the model declares a reset column, a change of value in that column
//! clears the skip flags of all programs.

use crate::{
    BenchError, BenchmarkSpec, Executor, ModelSpec, Outcome, Results, RunResult, Status,
    extract_stats, parse_stats,
};
use log::{error, info};
use std::collections::HashSet;

/// Receives progress notifications from [`run_benchmark`].
///
/// All methods do nothing by default.
pub trait Observer {
    /// A model instance is about to be built.
    fn building(&mut self, _test_case: &str) {}

    /// A program is about to run (or be skipped) on a model instance.
    fn running(&mut self, _test_case: &str, _program: &str) {}

    /// A program reached its terminal status on a model instance.
    fn finished(&mut self, _test_case: &str, _program: &str, _status: Status) {}
}

impl Observer for () {}

/// Iterates over the configurations of a matrix, i.e., the cross-product of its columns,
/// with the first column varying slowest.
///
/// An empty matrix has exactly one, empty, configuration;
/// a matrix with an empty column has none.
pub fn configurations(matrix: &[Vec<String>]) -> impl Iterator<Item = Vec<&str>> {
    let mut indices = vec![0usize; matrix.len()];
    let mut done = matrix.iter().any(Vec::is_empty);
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let config: Vec<&str> = indices
            .iter()
            .zip(matrix)
            .map(|(&i, column)| column[i].as_str())
            .collect();
        // Advance like an odometer, last column first.
        done = true;
        for (idx, column) in indices.iter_mut().zip(matrix).rev() {
            *idx += 1;
            if *idx < column.len() {
                done = false;
                break;
            }
            *idx = 0;
        }
        Some(config)
    })
}

/// Fully-qualified name of a model instance.
pub fn test_case_name(model: &str, config: &[&str]) -> String {
    std::iter::once(model)
        .chain(config.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// The set of programs that must not run on the current model instance.
#[derive(Debug, Default)]
struct SkipState<'a> {
    timed_out: HashSet<&'a str>,
    reset_value: Option<&'a str>,
}

impl<'a> SkipState<'a> {
    /// Clears all flags if `value` differs from the value of the previous configuration.
    fn observe_reset(&mut self, value: &'a str) {
        if self.reset_value != Some(value) {
            if !self.timed_out.is_empty() {
                info!(target: "runner", "reset column changed to '{value}', clearing skip flags");
            }
            self.timed_out.clear();
        }
        self.reset_value = Some(value);
    }
}

/// Runs all the experiments of a benchmark.
///
/// A model build failure aborts the benchmark;
/// program failures and timeouts are recorded in the results.
pub fn run_benchmark<E, O>(
    spec: &BenchmarkSpec,
    executor: &mut E,
    observer: &mut O,
) -> Result<Results, BenchError>
where
    E: Executor + ?Sized,
    O: Observer + ?Sized,
{
    spec.validate()?;
    let mut results = Results::new(spec.name.as_str());
    for (model_name, model) in spec.models.iter() {
        run_model(spec, model_name, model, executor, observer, &mut results)?;
    }
    Ok(results)
}

fn run_model<E, O>(
    spec: &BenchmarkSpec,
    model_name: &str,
    model: &ModelSpec,
    executor: &mut E,
    observer: &mut O,
    results: &mut Results,
) -> Result<(), BenchError>
where
    E: Executor + ?Sized,
    O: Observer + ?Sized,
{
    let reset_column = model.reset_column().map_err(|column| BenchError::ResetColumn {
        model: model_name.to_owned(),
        column,
        columns: model.matrix.len(),
    })?;
    let mut skip = SkipState::default();
    for config in configurations(&model.matrix) {
        if let Some(column) = reset_column {
            skip.observe_reset(config[column]);
        }
        let test_case = test_case_name(model_name, &config);
        info!(target: "runner", "building model {test_case}");
        observer.building(&test_case);
        let args = model
            .args
            .iter()
            .cloned()
            .chain(config.iter().map(|value| value.to_string()))
            .collect::<Vec<_>>();
        let built = executor.build(&model.cmd, &args)?;
        // Results keep one entry per instance, even with no programs.
        results.stats.insert(test_case.clone(), Default::default());

        for (program_name, program) in spec.programs.iter() {
            observer.running(&test_case, program_name);
            let result = if spec.skip_on_timeout && skip.timed_out.contains(program_name.as_str()) {
                RunResult::new(Status::Skipped)
            } else {
                info!(target: "runner", "running {program_name} on {test_case}");
                match executor.run(&program.cmd, &program.args, &built, spec.timeout) {
                    Ok(Outcome::Exited {
                        success: true,
                        stdout,
                    }) => RunResult {
                        status: Status::Success,
                        stats: extract_stats(&parse_stats(&stdout), &program.stats),
                    },
                    Ok(Outcome::Exited { success: false, .. }) => RunResult::new(Status::Error),
                    Ok(Outcome::TimedOut) => {
                        skip.timed_out.insert(program_name.as_str());
                        RunResult::new(Status::Timeout)
                    }
                    Err(err) => {
                        error!(target: "runner", "{program_name} on {test_case}: {err}");
                        RunResult::new(Status::Error)
                    }
                }
            };
            info!(target: "runner", "{program_name} on {test_case}: {}", result.status);
            observer.finished(&test_case, program_name, result.status);
            results.record(&test_case, program_name, result);
        }
    }
    Ok(())
}
