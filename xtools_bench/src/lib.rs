//! Benchmark runner for model-checking tools.
//!
//! A [`BenchmarkSpec`] lists models, generated by build commands over a matrix of
//! configurations, and programs to run on each generated model.
//! [`run_benchmark`] builds every model instance, runs every program on it with a
//! time limit, and collects the statistics the programs print into [`Results`].
//!
//! Result files can be merged with [`Results::merge`] before table generation.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod process;
mod results;
mod runner;
mod spec;
mod stats;

pub use process::*;
pub use results::*;
pub use runner::*;
pub use spec::*;
pub use stats::*;

use thiserror::Error;
use xtools_core::JsonError;

/// The error type for running benchmarks.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Reading an input file failed.
    #[error(transparent)]
    Json(#[from] JsonError),
    /// Writing results failed.
    #[error("failed to write results")]
    Write(#[from] serde_json::Error),
    /// A command could not be started.
    #[error("failed to run '{0}'")]
    Spawn(String, #[source] std::io::Error),
    /// The output of a command could not be collected.
    #[error("lost the output of '{0}'")]
    Pipe(String),
    /// Waiting for or killing a process failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// A model build command did not succeed.
    #[error("model build '{cmd}' failed with {}", .code.map_or("a signal".to_owned(), |c| format!("return code {c}")))]
    Build {
        /// The build command.
        cmd: String,
        /// Its exit code, unless it was killed by a signal.
        code: Option<i32>,
    },
    /// A model's reset column does not index its matrix.
    #[error("reset_skip of model '{model}' is {column}, it should be between 0 and {}", .columns.saturating_sub(1))]
    ResetColumn {
        /// The model.
        model: String,
        /// The declared reset column.
        column: usize,
        /// The number of matrix columns.
        columns: usize,
    },
}
