//! External adb command execution
//!
//! Every interaction with the adb tool goes through [`AdbRunner`]. It spawns
//! one child process per invocation, optionally delivers a payload on stdin,
//! and captures stdout and stderr merged into a single string under an output
//! ceiling. This is the only suspension point in the system: callers await one
//! invocation to completion before issuing the next.

use std::process::Stdio;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use crate::tool::locate_adb;
use serde::Serialize;
use wadb_core::prelude::*;

/// Default ceiling for captured output (5 MiB). A runaway command (logcat
/// piped through a shell target, a device dumping its screen) must be cut
/// off, never buffered unbounded.
pub const DEFAULT_MAX_OUTPUT: usize = 5 * 1024 * 1024;

const READ_CHUNK: usize = 8 * 1024;

/// A single external command invocation. Immutable once constructed.
///
/// Arguments are passed to process creation as a vector -- they are never
/// interpolated into a shell string, so untrusted identifiers (pairing codes,
/// package names, user-entered hosts) cannot inject commands.
#[derive(Debug, Clone)]
pub struct AdbInvocation {
    args: Vec<String>,
    stdin_payload: Option<String>,
    max_output: Option<usize>,
}

impl AdbInvocation {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            stdin_payload: None,
            max_output: None,
        }
    }

    /// Deliver `payload` on the child's stdin, terminated by a newline.
    /// The stream is closed after the single write.
    pub fn with_stdin(mut self, payload: impl Into<String>) -> Self {
        self.stdin_payload = Some(payload.into());
        self
    }

    /// Override the output ceiling for this invocation only.
    pub fn with_max_output(mut self, max_output: usize) -> Self {
        self.max_output = Some(max_output);
        self
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Outcome of an invocation at a presentation boundary.
///
/// Always produced: a failing process never leaves the caller without the
/// output it managed to write. Absence of output is an empty string, not an
/// error.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl CommandOutcome {
    pub fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(output) => Self {
                success: true,
                output,
                error: None,
            },
            Err(err) => Self {
                success: false,
                output: err.captured_output().unwrap_or_default().to_string(),
                error: Some(err.to_string()),
            },
        }
    }
}

/// Session context for adb invocations: the resolved program and the default
/// output ceiling. Constructed per caller, passed explicitly -- there is no
/// process-wide instance.
#[derive(Debug, Clone)]
pub struct AdbRunner {
    program: String,
    max_output: usize,
}

impl AdbRunner {
    /// Runner using the adb binary found on this system.
    pub fn new() -> Self {
        Self::with_program(locate_adb())
    }

    /// Runner using an explicit program path (settings override, tests).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            max_output: DEFAULT_MAX_OUTPUT,
        }
    }

    pub fn with_max_output(mut self, max_output: usize) -> Self {
        self.max_output = max_output;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run an adb invocation to completion.
    ///
    /// Resolves with the merged output on exit code zero. A nonzero exit
    /// fails with [`Error::CommandFailed`] carrying whatever output was
    /// captured; a spawn failure with `NotFound` maps to [`Error::AdbNotFound`].
    pub async fn run(&self, invocation: &AdbInvocation) -> Result<String> {
        match self.run_program(&self.program, invocation).await {
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::AdbNotFound)
            }
            other => other,
        }
    }

    /// Run an arbitrary program with the invocation's arguments.
    ///
    /// Used for the platform-shell passthrough; everything else goes through
    /// [`AdbRunner::run`].
    pub async fn run_program(&self, program: &str, invocation: &AdbInvocation) -> Result<String> {
        let cap = invocation.max_output.unwrap_or(self.max_output);

        debug!("Running: {} {}", program, invocation.args.join(" "));

        let mut command = Command::new(program);
        command
            .args(&invocation.args)
            .stdin(if invocation.stdin_payload.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn()?;

        if let Some(payload) = &invocation.stdin_payload {
            let mut stdin = child.stdin.take().expect("stdin was configured");
            stdin.write_all(payload.as_bytes()).await?;
            stdin.write_all(b"\n").await?;
            stdin.shutdown().await?;
        }

        let stdout = child.stdout.take().expect("stdout was configured");
        let stderr = child.stderr.take().expect("stderr was configured");

        // Drain both pipes concurrently so a chatty stderr cannot deadlock a
        // full stdout pipe. On a cap overrun the child is dropped and killed.
        let (out, err_out) = tokio::try_join!(read_capped(stdout, cap), read_capped(stderr, cap))?;

        if out.len() + err_out.len() > cap {
            return Err(Error::OutputTooLarge { limit: cap });
        }

        let status = child.wait().await?;

        let mut output = String::from_utf8_lossy(&out).into_owned();
        output.push_str(&String::from_utf8_lossy(&err_out));

        if status.success() {
            Ok(output)
        } else {
            let message = match status.code() {
                Some(code) => format!("{program} exited with code {code}"),
                None => format!("{program} terminated by signal"),
            };
            Err(Error::command_failed(message, output))
        }
    }
}

impl Default for AdbRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a stream to EOF, failing once more than `cap` bytes have arrived.
async fn read_capped<R>(mut reader: R, cap: usize) -> Result<Vec<u8>>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        if buf.len() + n > cap {
            return Err(Error::OutputTooLarge { limit: cap });
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_is_plain_argv() {
        let inv = AdbInvocation::new(["pair", "192.168.1.5:37099"]);
        assert_eq!(inv.args(), ["pair", "192.168.1.5:37099"]);
        assert!(inv.stdin_payload.is_none());
        assert!(inv.max_output.is_none());
    }

    #[test]
    fn test_invocation_builders() {
        let inv = AdbInvocation::new(["pair", "192.168.1.5:37099"])
            .with_stdin("123456")
            .with_max_output(1024);
        assert_eq!(inv.stdin_payload.as_deref(), Some("123456"));
        assert_eq!(inv.max_output, Some(1024));
    }

    #[test]
    fn test_outcome_from_ok() {
        let outcome = CommandOutcome::from_result(Ok("connected".to_string()));
        assert!(outcome.success);
        assert_eq!(outcome.output, "connected");
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_outcome_from_command_failure_keeps_output() {
        let err = Error::command_failed("adb exited with code 1", "error: device unauthorized");
        let outcome = CommandOutcome::from_result(Err(err));
        assert!(!outcome.success);
        assert_eq!(outcome.output, "error: device unauthorized");
        assert!(outcome.error.unwrap().contains("code 1"));
    }

    #[test]
    fn test_outcome_from_other_failure_has_empty_output() {
        let outcome = CommandOutcome::from_result(Err(Error::AdbNotFound));
        assert!(!outcome.success);
        assert!(outcome.output.is_empty());
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn test_read_capped_under_limit() {
        let data = vec![b'x'; 100];
        let read = read_capped(&data[..], 100).await.unwrap();
        assert_eq!(read.len(), 100);
    }

    #[tokio::test]
    async fn test_read_capped_over_limit() {
        let data = vec![b'x'; 200];
        let err = read_capped(&data[..], 100).await.unwrap_err();
        assert!(matches!(err, Error::OutputTooLarge { limit: 100 }));
    }
}
