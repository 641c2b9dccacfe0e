//! xtools is a set of auxiliary tools for benchmarking model checkers:
//!
//! - `run_benchmarks` runs verification programs over generated models and records their statistics;
//! - `make_table` renders recorded statistics as a LaTeX (or CSV) table;
//! - `dot2dot` rewrites attributes of Graphviz graphs according to conditional rules.
//!
//! The tools only communicate through JSON files.
//! This crate holds their command-line interfaces;
//! the functionality lives in the [`xtools_bench`], [`xtools_table`] and [`xtools_dot`] crates.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cli;

pub use cli::*;
pub use xtools_bench;
pub use xtools_core;
pub use xtools_dot;
pub use xtools_table;
