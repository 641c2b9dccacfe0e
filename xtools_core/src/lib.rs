//! Shared plumbing for the xtools benchmarking utilities.
//!
//! The tools exchange data only through JSON files whose object keys carry
//! meaning through their order (models, programs, table columns, style rules).
//! [`Named`] is the insertion-ordered map used to read and write such objects,
//! and [`load_json`] reads any of the input files.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod json;

pub use indexmap::IndexMap;
pub use json::*;

/// A map from names to values that remembers the order in which names were first inserted.
///
/// JSON objects deserialize with their keys in document order and serialize back in the same order.
/// A repeated key keeps its first position and takes the last value.
pub type Named<T> = IndexMap<String, T>;
