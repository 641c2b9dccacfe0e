//! Benchmark results, as produced by the runner and consumed by table generation.

use crate::BenchError;
use serde::{Deserialize, Serialize};
use std::{fmt, io::Write, path::Path};
use thiserror::Error;
use xtools_core::{Named, load_json};

/// Terminal status of a program run on a model instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The program terminated with exit code 0.
    Success,
    /// The program terminated with a non-zero exit code, or could not be started.
    Error,
    /// The program was killed on reaching the time limit.
    Timeout,
    /// The program was not run because it timed out on a previous configuration.
    Skipped,
}

impl Status {
    /// The status as written in result files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::Error => "error",
            Status::Timeout => "timeout",
            Status::Skipped => "skipped",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one program on one model instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// How the run ended.
    pub status: Status,
    /// Statistics reported by the program, only filled on success.
    #[serde(flatten)]
    pub stats: Named<String>,
}

impl RunResult {
    /// A result carrying only a status.
    pub fn new(status: Status) -> Self {
        Self {
            status,
            stats: Named::new(),
        }
    }
}

/// Results of a whole benchmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Results {
    /// Name of the benchmark.
    pub name: String,
    /// Test case (fully-qualified model instance name) to program name to run result.
    pub stats: Named<Named<RunResult>>,
}

/// The error type for merging result sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    /// Both result sets hold a run of the same program on the same test case.
    #[error("duplicate results for program '{program}' on test case '{test_case}'")]
    Duplicate {
        /// The shared test case.
        test_case: String,
        /// The shared program.
        program: String,
    },
}

impl Results {
    /// Creates empty results for the named benchmark.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: Named::new(),
        }
    }

    /// Reads results from a JSON file.
    pub fn load(path: &Path) -> Result<Self, BenchError> {
        Ok(load_json(path)?)
    }

    /// Writes results as JSON.
    pub fn write<W: Write>(&self, writer: W, pretty: bool) -> Result<(), BenchError> {
        if pretty {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_json::to_writer(writer, self)?;
        }
        Ok(())
    }

    /// Records the result of `program` on `test_case`.
    pub fn record(&mut self, test_case: &str, program: &str, result: RunResult) {
        self.stats
            .entry(test_case.to_owned())
            .or_default()
            .insert(program.to_owned(), result);
    }

    /// Result of `program` on `test_case`, if any.
    pub fn get(&self, test_case: &str, program: &str) -> Option<&RunResult> {
        self.stats
            .get(test_case)
            .and_then(|programs| programs.get(program))
    }

    /// Adds all the runs of `other` into `self`.
    ///
    /// Test cases appearing in only one of the two sets are carried over as they are,
    /// and a test case appearing in both collects the programs of both.
    /// The same program on the same test case in both sets is an error,
    /// in which case `self` is left untouched.
    /// The name of `self` is kept.
    pub fn merge(&mut self, other: Results) -> Result<(), MergeError> {
        for (test_case, programs) in other.stats.iter() {
            if let Some(own) = self.stats.get(test_case) {
                if let Some(program) = programs.keys().find(|p| own.contains_key(p.as_str())) {
                    return Err(MergeError::Duplicate {
                        test_case: test_case.to_owned(),
                        program: program.to_owned(),
                    });
                }
            }
        }
        for (test_case, programs) in other.stats {
            for (program, result) in programs {
                self.record(&test_case, &program, result);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(pairs: &[(&str, &str)]) -> RunResult {
        RunResult {
            status: Status::Success,
            stats: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn json_layout() {
        let mut results = Results::new("bench");
        results.record("m 1", "reach", success(&[("STATES", "10"), ("TIME", "0.5")]));
        results.record("m 1", "live", RunResult::new(Status::Timeout));
        let json = serde_json::to_string(&results).unwrap();
        assert_eq!(
            json,
            r#"{"name":"bench","stats":{"m 1":{"reach":{"status":"success","STATES":"10","TIME":"0.5"},"live":{"status":"timeout"}}}}"#
        );
        let back: Results = serde_json::from_str(&json).unwrap();
        assert_eq!(back, results);
    }

    #[test]
    fn unknown_status_rejected() {
        let res: Result<Results, _> =
            serde_json::from_str(r#"{"name":"b","stats":{"m":{"p":{"status":"crashed"}}}}"#);
        assert!(res.is_err());
    }

    #[test]
    fn merge_is_union() {
        let mut left = Results::new("left");
        left.record("a", "p", success(&[("X", "1")]));
        left.record("shared", "p", RunResult::new(Status::Error));
        let mut right = Results::new("right");
        right.record("b", "p", success(&[("X", "2")]));
        right.record("shared", "q", RunResult::new(Status::Skipped));

        left.merge(right.clone()).unwrap();
        assert_eq!(left.name, "left");
        assert_eq!(
            left.stats.keys().map(String::as_str).collect::<Vec<_>>(),
            ["a", "shared", "b"]
        );
        assert_eq!(left.stats.get("b"), right.stats.get("b"));
        assert_eq!(left.get("shared", "q").unwrap().status, Status::Skipped);
        assert_eq!(left.get("shared", "p").unwrap().status, Status::Error);
    }

    #[test]
    fn merge_duplicate_fails() {
        let mut left = Results::new("left");
        left.record("a", "p", success(&[("X", "1")]));
        let mut right = Results::new("right");
        right.record("b", "p", success(&[]));
        right.record("a", "p", success(&[("X", "2")]));
        let before = left.clone();

        assert_eq!(
            left.merge(right),
            Err(MergeError::Duplicate {
                test_case: "a".to_owned(),
                program: "p".to_owned()
            })
        );
        assert_eq!(left, before);
    }
}
