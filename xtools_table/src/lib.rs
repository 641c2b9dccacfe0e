//! LaTeX table generation from benchmark results.
//!
//! A [`TableDescription`] lists the rows (test cases) and the columns (usually programs)
//! of a table; each column is made of sub-columns, whose values are computed from a
//! run's statistics by an [`Expression`].
//! [`Table::build`] evaluates a description over [`Results`](xtools_bench::Results),
//! and the resulting [`Table`] is written out as LaTeX or CSV.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv_export;
mod description;
mod expression;
mod latex;
mod table;

pub use description::*;
pub use expression::*;
pub use table::*;

use std::path::PathBuf;
use thiserror::Error;
use xtools_core::JsonError;

/// The error type for table generation.
#[derive(Debug, Error)]
pub enum TableError {
    /// Reading an input file failed.
    #[error(transparent)]
    Json(#[from] JsonError),
    /// The rows file of a description has not been read.
    #[error("rows file '{}' has not been loaded", .0.display())]
    UnresolvedRows(PathBuf),
    /// A cell value cannot be computed.
    #[error("cannot compute {column}/{sub_column} in row {row}")]
    Eval {
        /// Row of the cell.
        row: String,
        /// Column of the cell.
        column: String,
        /// Sub-column of the cell.
        sub_column: String,
        /// Why evaluation failed.
        #[source]
        source: EvalError,
    },
    /// Writing CSV failed.
    #[error("failed to write CSV")]
    Csv(#[from] csv::Error),
    /// Writing output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
