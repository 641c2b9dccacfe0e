//! Benchmark specification files.
//!
//! A specification names a benchmark, the models to generate (each through a
//! build command and a matrix of configuration values), and the programs to run
//! on every generated model.

use crate::BenchError;
use serde::{Deserialize, Deserializer, de::Error};
use std::{path::Path, time::Duration};
use xtools_core::{Named, load_json};

/// A benchmark specification, as read from its JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct BenchmarkSpec {
    /// Name of the benchmark, carried over to the results.
    pub name: String,
    /// Time limit for each program run.
    #[serde(default, deserialize_with = "timeout")]
    pub timeout: Option<Duration>,
    /// Stop running a program on further configurations of a model once it timed out.
    #[serde(default, deserialize_with = "flag")]
    pub skip_on_timeout: bool,
    /// Models, in order of execution.
    pub models: Named<ModelSpec>,
    /// Programs, in order of execution.
    pub programs: Named<ProgramSpec>,
}

/// How to generate the instances of a model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSpec {
    /// Build command, writing the model on its standard output.
    pub cmd: String,
    /// Arguments always passed to the build command, before the configuration values.
    #[serde(default)]
    pub args: Vec<String>,
    /// Configuration values, one list per argument position.
    /// The instances are the cross-product of the lists.
    #[serde(default, deserialize_with = "matrix")]
    pub matrix: Vec<Vec<String>>,
    /// Column of the matrix whose value changes clear the skip flags.
    #[serde(default)]
    pub reset_skip: Option<usize>,
}

/// An external program run on each model instance.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramSpec {
    /// Program command, reading the model on its standard input.
    pub cmd: String,
    /// Arguments to the program.
    #[serde(default)]
    pub args: Vec<String>,
    /// Statistics keys to keep from the program's output.
    #[serde(default)]
    pub stats: Vec<String>,
}

impl BenchmarkSpec {
    /// Reads a specification from a JSON file.
    pub fn load(path: &Path) -> Result<Self, BenchError> {
        let spec: Self = load_json(path)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Checks the constraints that deserialization cannot express.
    pub fn validate(&self) -> Result<(), BenchError> {
        for (name, model) in self.models.iter() {
            model.reset_column().map_err(|column| BenchError::ResetColumn {
                model: name.to_owned(),
                column,
                columns: model.matrix.len(),
            })?;
        }
        Ok(())
    }
}

impl ModelSpec {
    /// The validated reset column, or the offending index.
    pub(crate) fn reset_column(&self) -> Result<Option<usize>, usize> {
        match self.reset_skip {
            Some(column) if column >= self.matrix.len() => Err(column),
            column => Ok(column),
        }
    }
}

// Hand-written specifications are loose about JSON types:
// `"timeout": "60"`, `"skip_on_timeout": "True"`, numeric matrix cells.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl Loose {
    fn into_text(self) -> String {
        match self {
            Loose::Bool(b) => b.to_string(),
            Loose::Number(n) => n.to_string(),
            Loose::Text(s) => s,
        }
    }
}

fn timeout<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
    let secs = match Option::<Loose>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(Loose::Number(n)) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom(format!("invalid timeout {n}")))?,
        Some(Loose::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("invalid timeout '{s}'")))?,
        Some(Loose::Bool(b)) => return Err(D::Error::custom(format!("invalid timeout {b}"))),
    };
    Duration::try_from_secs_f64(secs)
        .map(Some)
        .map_err(|_| D::Error::custom(format!("invalid timeout {secs}")))
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Loose::deserialize(deserializer)? {
        Loose::Bool(b) => Ok(b),
        Loose::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
        Loose::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
        other => Err(D::Error::custom(format!(
            "expected a boolean, found '{}'",
            other.into_text()
        ))),
    }
}

fn matrix<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error> {
    let matrix = Vec::<Vec<Loose>>::deserialize(deserializer)?;
    Ok(matrix
        .into_iter()
        .map(|column| column.into_iter().map(Loose::into_text).collect())
        .collect())
}
