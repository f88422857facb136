//! Script execution.
//!
//! Each script runs as its own child process under a time budget. Only a
//! normal exit produces a [`CollectionResult`]; every other outcome leaves the
//! caller's previous data in place.

use super::output::scan_lines;
use super::CollectionResult;
use bytes::Bytes;
use crate::config::ExporterConfig;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// How a single script execution ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The process exited with a status code.
    Exited(CollectionResult),
    /// The time budget ran out and the process was killed.
    TimedOut,
    /// The process could not be started.
    SpawnFailed(String),
    /// Waiting for the process or collecting its output failed.
    WaitFailed(String),
    /// The process ended without an exit code (e.g. killed by a signal).
    Signaled,
}

impl RunOutcome {
    /// Outcome name used as a metric label.
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Exited(_) => "exited",
            RunOutcome::TimedOut => "timeout",
            RunOutcome::SpawnFailed(_) => "spawn_failed",
            RunOutcome::WaitFailed(_) => "wait_failed",
            RunOutcome::Signaled => "signaled",
        }
    }

    /// The result to store, if the outcome produced one.
    pub fn into_result(self) -> Option<CollectionResult> {
        match self {
            RunOutcome::Exited(result) => Some(result),
            _ => None,
        }
    }
}

/// Every label [`RunOutcome::label`] can return.
pub const RUN_OUTCOMES: [&str; 5] = ["exited", "timeout", "spawn_failed", "wait_failed", "signaled"];

/// Runs scripts through an interpreter with a timeout.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    interpreter: String,
    timeout: Duration,
    max_line_bytes: usize,
}

impl ScriptRunner {
    /// Creates a runner handing each script to `interpreter`, killing it
    /// after `timeout` and accepting output lines up to `max_line_bytes`.
    pub fn new(interpreter: impl Into<String>, timeout: Duration, max_line_bytes: usize) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
            max_line_bytes,
        }
    }

    /// Creates a runner from the interpreter, timeout and line limit settings.
    pub fn from_config(config: &ExporterConfig) -> Self {
        Self::new(
            config.interpreter.clone(),
            config.timeout(),
            config.max_line_bytes,
        )
    }

    /// Executes `<interpreter> <script>` and classifies the outcome.
    ///
    /// The child gets no stdin. If the timeout elapses first the pending wait
    /// is dropped, which kills the child.
    pub async fn run(&self, script: &Path) -> RunOutcome {
        let child = Command::new(&self.interpreter)
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!(script = %script.display(), error = %e, "Error executing script");
                return RunOutcome::SpawnFailed(e.to_string());
            }
        };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!(script = %script.display(), error = %e, "Error executing script");
                return RunOutcome::WaitFailed(e.to_string());
            }
            Err(_) => {
                tracing::warn!(
                    script = %script.display(),
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Script timed out and was killed"
                );
                return RunOutcome::TimedOut;
            }
        };

        let Some(exit_status) = output.status.code() else {
            tracing::warn!(
                script = %script.display(),
                status = %output.status,
                "Script terminated without an exit code"
            );
            return RunOutcome::Signaled;
        };

        if exit_status != 0 {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::debug!(
                script = %script.display(),
                exit_code = exit_status,
                stderr = %stderr.trim(),
                "Script exited with non-zero status"
            );
        }

        let stdout = Bytes::from(output.stdout);
        let scanned = scan_lines(&stdout, self.max_line_bytes);
        if let Some(ref error) = scanned.error {
            tracing::warn!(script = %script.display(), error = %error, "Error scanning script output");
        }

        tracing::trace!(
            script = %script.display(),
            exit_code = exit_status,
            lines = scanned.lines.len(),
            "Script collected"
        );

        RunOutcome::Exited(CollectionResult {
            metric_lines: scanned.lines,
            exit_status,
            access_failed: false,
            parse_failed: scanned.error.is_some(),
        })
    }
}
