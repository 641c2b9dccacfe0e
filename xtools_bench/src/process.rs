//! Invocation of external commands.

use crate::BenchError;
use log::{debug, trace};
use std::{
    io::{ErrorKind, Read, Write},
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

/// How a program run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The program terminated by itself.
    Exited {
        /// Whether the exit code was 0.
        success: bool,
        /// Everything the program wrote on its standard output.
        stdout: String,
    },
    /// The program did not terminate in time and was killed.
    TimedOut,
}

/// Runs the commands of a benchmark.
///
/// [`ProcessExecutor`] spawns actual processes;
/// other implementations can stand in for them.
pub trait Executor {
    /// Runs a model build command and returns its standard output.
    ///
    /// A build that does not succeed is an error.
    fn build(&mut self, cmd: &str, args: &[String]) -> Result<Vec<u8>, BenchError>;

    /// Runs a program with `input` on its standard input, within `timeout` if given.
    fn run(
        &mut self,
        cmd: &str,
        args: &[String],
        input: &[u8],
        timeout: Option<Duration>,
    ) -> Result<Outcome, BenchError>;
}

/// Spawns the commands as child processes.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    poll_interval: Duration,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl ProcessExecutor {
    /// Creates an executor checking for termination every `poll_interval`.
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }
}

impl Executor for ProcessExecutor {
    fn build(&mut self, cmd: &str, args: &[String]) -> Result<Vec<u8>, BenchError> {
        debug!(target: "process", "building: {cmd} {}", args.join(" "));
        let output = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|err| BenchError::Spawn(cmd.to_owned(), err))?;
        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(BenchError::Build {
                cmd: cmd.to_owned(),
                code: output.status.code(),
            })
        }
    }

    fn run(
        &mut self,
        cmd: &str,
        args: &[String],
        input: &[u8],
        timeout: Option<Duration>,
    ) -> Result<Outcome, BenchError> {
        debug!(target: "process", "running: {cmd} {}", args.join(" "));
        let mut child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| BenchError::Spawn(cmd.to_owned(), err))?;

        // Both pipes are serviced off the polling loop,
        // otherwise a child filling its stdout pipe would never terminate.
        let stdin = child.stdin.take();
        let input = input.to_vec();
        let writer = thread::spawn(move || {
            if let Some(mut stdin) = stdin {
                match stdin.write_all(&input) {
                    // The program may legitimately stop reading its input.
                    Err(err) if err.kind() == ErrorKind::BrokenPipe => {}
                    Err(err) => trace!(target: "process", "failed writing input: {err}"),
                    Ok(()) => {}
                }
            }
        });
        let stdout = child.stdout.take();
        let reader = thread::spawn(move || -> std::io::Result<Vec<u8>> {
            let mut buf = Vec::new();
            if let Some(mut stdout) = stdout {
                stdout.read_to_end(&mut buf)?;
            }
            Ok(buf)
        });

        let start = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if timeout.is_some_and(|timeout| start.elapsed() >= timeout) {
                debug!(target: "process", "{cmd} timed out, killing it");
                child.kill()?;
                child.wait()?;
                // Helper threads are left to finish on their own:
                // a grandchild process may still hold the pipes open.
                return Ok(Outcome::TimedOut);
            }
            thread::sleep(self.poll_interval);
        };

        let _ = writer.join();
        let stdout = reader
            .join()
            .map_err(|_| BenchError::Pipe(cmd.to_owned()))??;
        Ok(Outcome::Exited {
            success: status.success(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_owned(), script.to_owned()]
    }

    #[test]
    fn build_captures_stdout() {
        let mut exec = ProcessExecutor::default();
        let out = exec.build("sh", &sh("echo model")).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "model\n");
    }

    #[test]
    fn build_failure() {
        let mut exec = ProcessExecutor::default();
        assert!(matches!(
            exec.build("sh", &sh("exit 3")),
            Err(BenchError::Build { code: Some(3), .. })
        ));
    }

    #[test]
    fn run_feeds_input() {
        let mut exec = ProcessExecutor::default();
        let outcome = exec
            .run("sh", &sh("wc -c | tr -d ' '"), b"abcd", Some(Duration::from_secs(10)))
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Exited {
                success: true,
                stdout: "4\n".to_owned()
            }
        );
    }

    #[test]
    fn run_failure() {
        let mut exec = ProcessExecutor::default();
        let outcome = exec.run("sh", &sh("exit 1"), b"", None).unwrap();
        assert!(matches!(outcome, Outcome::Exited { success: false, .. }));
    }

    #[test]
    fn run_timeout() {
        let mut exec = ProcessExecutor::default();
        let start = Instant::now();
        let outcome = exec
            .run("sleep", &["5".to_owned()], b"", Some(Duration::from_millis(200)))
            .unwrap();
        assert_eq!(outcome, Outcome::TimedOut);
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn run_missing_command() {
        let mut exec = ProcessExecutor::default();
        assert!(matches!(
            exec.run("/nonexistent/program", &[], b"", None),
            Err(BenchError::Spawn(..))
        ));
    }
}
