// src/extract/runner.rs
//! Out-of-process parser invocation.
//!
//! `<runtime> <script> <file> <true|false>`; the last argument is the
//! parser's tolerance switch.

use super::framing::parse_units;
use super::{ExtractionFailure, UnitExtractor};
use crate::config::ParserConfig;
use crate::error::{JsgramError, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

/// Exit codes the parser uses for "could not parse this input".
/// 8 is what older Node releases return for an uncaught exception.
const PARSE_FAILURE_CODES: &[i32] = &[1, 8];

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Raw result of one parser run.
#[derive(Debug, Clone)]
pub struct ParserOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// The external parser, invoked once per file.
#[derive(Debug, Clone)]
pub struct ExternalParser {
    program: String,
    runtime_args: Vec<String>,
    script: PathBuf,
    tolerant: bool,
    timeout: Duration,
}

impl ExternalParser {
    /// `runtime` is split with shell quoting rules, so it may carry flags.
    ///
    /// # Errors
    /// Returns `Config` if `runtime` is empty or badly quoted.
    pub fn new(runtime: &str, script: impl Into<PathBuf>) -> Result<Self> {
        let parts = shell_words::split(runtime)
            .map_err(|e| JsgramError::Config(format!("invalid parser runtime '{runtime}': {e}")))?;
        let Some((program, runtime_args)) = parts.split_first() else {
            return Err(JsgramError::Config("parser runtime is empty".to_string()));
        };
        Ok(Self {
            program: program.clone(),
            runtime_args: runtime_args.to_vec(),
            script: script.into(),
            tolerant: false,
            timeout: Duration::from_secs(30),
        })
    }

    /// # Errors
    /// Returns `Config` if the configured runtime is unusable.
    pub fn from_config(config: &ParserConfig) -> Result<Self> {
        Ok(Self::new(&config.runtime, &config.script)?
            .with_tolerance(config.tolerant)
            .with_timeout(Duration::from_secs(config.timeout_secs)))
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerant: bool) -> Self {
        self.tolerant = tolerant;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.runtime_args)
            .arg(&self.script)
            .arg(path)
            .arg(if self.tolerant { "true" } else { "false" })
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        cmd
    }

    /// Runs the parser on `path` and captures its output.
    ///
    /// # Errors
    /// Returns `SystemError` if the process cannot be spawned or waited on,
    /// or if it or anything it started outlives the timeout (all are killed).
    pub fn run(&self, path: &Path) -> std::result::Result<ParserOutput, ExtractionFailure> {
        let deadline = Instant::now() + self.timeout;
        let mut child = self
            .command(path)
            .spawn()
            .map_err(|e| ExtractionFailure::SystemError(format!("failed to spawn {}: {e}", self.program)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExtractionFailure::SystemError("failed to open stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExtractionFailure::SystemError("failed to open stderr".into()))?;
        let stdout = spawn_reader(stdout);
        let stderr = spawn_reader(stderr);

        let status = wait_until(&mut child, deadline, self.timeout)?;
        // Descendants may still hold the pipes after the parser exits.
        let (stdout, stderr) = match (collect(&stdout, deadline), collect(&stderr, deadline)) {
            (Some(out), Some(err)) => (out, err),
            _ => {
                kill_group(&mut child);
                return Err(timed_out(self.timeout));
            }
        };

        Ok(ParserOutput {
            code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

impl UnitExtractor for ExternalParser {
    fn extract(&self, path: &Path) -> std::result::Result<Vec<String>, ExtractionFailure> {
        let output = self.run(path)?;
        if !output.stderr.trim().is_empty() {
            tracing::debug!(file = %path.display(), stderr = %output.stderr.trim(), "Parser stderr");
        }
        classify(output.code, &output.stdout)
    }
}

/// Maps the parser's exit code and stdout onto the extraction outcome.
///
/// # Errors
/// - parse-failure code with empty stdout: `NotParseable`
/// - parse-failure code with some stdout: `PartiallyParseable`
/// - any other non-zero code, or death by signal: `SystemError`
pub fn classify(code: Option<i32>, stdout: &str) -> std::result::Result<Vec<String>, ExtractionFailure> {
    match code {
        Some(0) => Ok(parse_units(stdout)),
        Some(c) if PARSE_FAILURE_CODES.contains(&c) => {
            if stdout.trim().is_empty() {
                Err(ExtractionFailure::NotParseable)
            } else {
                Err(ExtractionFailure::PartiallyParseable)
            }
        }
        Some(c) => Err(ExtractionFailure::SystemError(format!(
            "parser exited with code {c}"
        ))),
        None => Err(ExtractionFailure::SystemError(
            "parser terminated by a signal".to_string(),
        )),
    }
}

/// Reads `input` to the end on its own thread.
fn spawn_reader<R: Read + Send + 'static>(mut input: R) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = input.read_to_end(&mut buf);
        let _ = tx.send(buf);
    });
    rx
}

/// `None` if the pipe is still open at `deadline`.
fn collect(rx: &Receiver<Vec<u8>>, deadline: Instant) -> Option<Vec<u8>> {
    rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
        .ok()
}

fn timed_out(timeout: Duration) -> ExtractionFailure {
    ExtractionFailure::SystemError(format!(
        "parser killed after {}s timeout",
        timeout.as_secs_f64()
    ))
}

/// Kills the parser and every process in its group.
fn kill_group(child: &mut Child) {
    #[cfg(unix)]
    {
        let _ = Command::new("kill")
            .args(["-KILL", "--", &format!("-{}", child.id())])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
    }
    let _ = child.kill();
    let _ = child.wait();
}

/// Polls the child until it exits; kills its group at `deadline`.
fn wait_until(
    child: &mut Child,
    deadline: Instant,
    timeout: Duration,
) -> std::result::Result<ExitStatus, ExtractionFailure> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    kill_group(child);
                    return Err(timed_out(timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => return Err(ExtractionFailure::SystemError(format!("wait failed: {e}"))),
        }
    }
}
