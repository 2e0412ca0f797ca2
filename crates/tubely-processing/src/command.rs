//! Subprocess execution for media tools.

use crate::error::{ProcessingError, ProcessingResult};
use crate::gate::ProcessingGate;
use std::ffi::OsStr;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Reject tool paths containing shell metacharacters or traversal sequences.
pub fn validate_tool_path(path: &str) -> ProcessingResult<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.is_empty() || path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ProcessingError::InvalidToolPath(path.to_string()));
    }
    if path.contains("..") {
        return Err(ProcessingError::InvalidToolPath(path.to_string()));
    }
    if !path
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | '\\' | ':'))
    {
        return Err(ProcessingError::InvalidToolPath(path.to_string()));
    }
    Ok(())
}

/// Why a tool run produced no usable output.
#[derive(Debug)]
pub enum ToolFailure {
    /// The binary could not be started.
    Spawn(std::io::Error),
    /// The process exceeded the timeout and was killed.
    TimedOut(Duration),
    Gate(ProcessingError),
}

impl ToolFailure {
    /// Convert into a [`ProcessingError`], using `on_failure` for spawn errors.
    pub fn into_processing_error(
        self,
        tool: &str,
        on_failure: impl FnOnce(String) -> ProcessingError,
    ) -> ProcessingError {
        match self {
            ToolFailure::Spawn(e) => on_failure(format!("Failed to execute {}: {}", tool, e)),
            ToolFailure::TimedOut(timeout) => ProcessingError::Timeout {
                tool: tool.to_string(),
                timeout,
            },
            ToolFailure::Gate(e) => e,
        }
    }
}

/// Runs media tools under the concurrency gate with a hard timeout.
///
/// Children are spawned with `kill_on_drop`, so an elapsed timeout (or a
/// dropped request future) terminates the process.
#[derive(Clone, Debug)]
pub struct ToolRunner {
    gate: ProcessingGate,
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(gate: ProcessingGate, timeout: Duration) -> Self {
        Self { gate, timeout }
    }

    #[tracing::instrument(skip(self, args), fields(
        process.executable.path = %program,
        timeout_secs = self.timeout.as_secs()
    ))]
    pub async fn run<I, S>(&self, program: &str, args: I) -> Result<Output, ToolFailure>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(ToolFailure::Gate)?;

        let start = std::time::Instant::now();
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(ToolFailure::Spawn)?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                tracing::debug!(
                    exit_code = ?output.status.code(),
                    duration_ms = start.elapsed().as_millis(),
                    "Tool finished"
                );
                Ok(output)
            }
            Ok(Err(e)) => Err(ToolFailure::Spawn(e)),
            Err(_) => {
                tracing::warn!(
                    duration_ms = start.elapsed().as_millis(),
                    "Tool timed out and was killed"
                );
                Err(ToolFailure::TimedOut(self.timeout))
            }
        }
    }
}

/// Last few lines of a tool's stderr, for error messages.
pub(crate) fn stderr_tail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().rev().take(5).collect();
    lines.into_iter().rev().collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tool_path() {
        assert!(validate_tool_path("ffprobe").is_ok());
        assert!(validate_tool_path("/usr/local/bin/ffmpeg").is_ok());
        assert!(validate_tool_path("").is_err());
        assert!(validate_tool_path("ffmpeg; rm -rf /").is_err());
        assert!(validate_tool_path("../bin/ffmpeg").is_err());
        assert!(validate_tool_path("ff mpeg").is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let runner = ToolRunner::new(ProcessingGate::new(1), Duration::from_secs(5));
        let result = runner
            .run("tubely-definitely-not-installed", ["-version"])
            .await;
        assert!(matches!(result, Err(ToolFailure::Spawn(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_kills_process() {
        let gate = ProcessingGate::new(1);
        let runner = ToolRunner::new(gate.clone(), Duration::from_millis(100));

        let start = std::time::Instant::now();
        let result = runner.run("sleep", ["5"]).await;

        assert!(matches!(result, Err(ToolFailure::TimedOut(_))));
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(gate.available(), 1, "permit released after timeout");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_maps_to_processing_timeout() {
        let runner = ToolRunner::new(ProcessingGate::new(1), Duration::from_millis(50));
        let err = runner
            .run("sleep", ["5"])
            .await
            .unwrap_err()
            .into_processing_error("ffmpeg", ProcessingError::Transcode);
        assert!(matches!(err, ProcessingError::Timeout { ref tool, .. } if tool == "ffmpeg"));
    }
}
