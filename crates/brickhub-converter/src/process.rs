//! External process execution.
//!
//! Runs renderer binaries as child processes with a timeout and captured
//! output. The exit status is the only thing interpreted here; checking
//! for the produced files is left to the callers.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, error};

use crate::error::ConversionError;

/// Captured result of a successful process run.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

/// Runs external programs with a fixed timeout.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    /// Maximum number of stderr characters kept in a [`ConversionError::ProcessFailed`].
    const STDERR_LIMIT: usize = 2000;

    /// Create a runner that kills children after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Create a runner from a timeout in seconds.
    pub fn with_timeout_seconds(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }

    /// Run `program` with `args` and wait for it to exit.
    ///
    /// Fails on spawn errors, non-zero exit, signal termination and timeout.
    pub async fn run<I, S>(&self, program: &Path, args: I) -> Result<ProcessOutput, ConversionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect();

        debug!(
            program = %program.display(),
            args = ?args,
            timeout_s = self.timeout.as_secs(),
            "Spawning process"
        );

        let mut cmd = Command::new(program);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                error!(program = %program.display(), "Executable not found");
                return Err(ConversionError::ProgramNotFound {
                    program: program.to_path_buf(),
                });
            }
            Ok(Err(e)) => {
                error!(program = %program.display(), error = %e, "Failed to run process");
                return Err(ConversionError::Io(e));
            }
            Err(_) => {
                error!(
                    program = %program.display(),
                    timeout_s = self.timeout.as_secs(),
                    "Process timed out, killed"
                );
                return Err(ConversionError::Timeout {
                    program: program.to_path_buf(),
                    timeout_seconds: self.timeout.as_secs(),
                });
            }
        };

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !stderr.is_empty() {
            debug!(program = %program.display(), stderr = %stderr, "Process stderr output");
        }

        if output.status.success() {
            debug!(
                program = %program.display(),
                elapsed_ms = duration.as_millis() as u64,
                "Process completed"
            );
            return Ok(ProcessOutput {
                stdout,
                stderr,
                duration,
            });
        }

        match output.status.code() {
            Some(code) => {
                error!(
                    program = %program.display(),
                    code,
                    elapsed_ms = duration.as_millis() as u64,
                    stderr = %stderr.chars().take(500).collect::<String>(),
                    "Process failed"
                );
                Err(ConversionError::ProcessFailed {
                    program: program.to_path_buf(),
                    code,
                    stderr: stderr.chars().take(Self::STDERR_LIMIT).collect(),
                })
            }
            None => {
                error!(program = %program.display(), "Process was killed by a signal");
                Err(ConversionError::ProcessKilled {
                    program: program.to_path_buf(),
                })
            }
        }
    }

    /// Check whether `program` can be executed.
    ///
    /// Paths with a directory component must point at an existing file;
    /// bare names are looked up on `PATH`.
    pub async fn is_available(program: &Path) -> bool {
        if program.components().count() > 1 || program.is_absolute() {
            return tokio::fs::metadata(program)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
        }

        let lookup = if cfg!(target_os = "windows") {
            "where"
        } else {
            "which"
        };

        Command::new(lookup)
            .arg(program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::with_timeout_seconds(300)
    }
}

/// Render `prefix` + `path` as one command-line flag, e.g. `-SaveDir=/media/images`.
pub(crate) fn path_flag(prefix: &str, path: &Path) -> String {
    format!("{prefix}{}", path.display())
}

/// Turn an owned path into a process argument.
pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_success_captures_output() {
        let runner = ProcessRunner::with_timeout_seconds(10);
        let out = runner
            .run(Path::new("/bin/sh"), ["-c", "echo hello; echo oops >&2"])
            .await
            .expect("run");
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_process_failed() {
        let runner = ProcessRunner::with_timeout_seconds(10);
        let err = runner
            .run(Path::new("/bin/sh"), ["-c", "echo broken >&2; exit 3"])
            .await
            .expect_err("should fail");
        match err {
            ConversionError::ProcessFailed { code, stderr, .. } => {
                assert_eq!(code, 3);
                assert_eq!(stderr.trim(), "broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program() {
        let runner = ProcessRunner::with_timeout_seconds(10);
        let err = runner
            .run(Path::new("/nonexistent/ldview"), Vec::<String>::new())
            .await
            .expect_err("should fail");
        assert!(matches!(err, ConversionError::ProgramNotFound { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = ProcessRunner::new(Duration::from_millis(200));
        let err = runner
            .run(Path::new("/bin/sh"), ["-c", "sleep 5"])
            .await
            .expect_err("should time out");
        assert!(matches!(err, ConversionError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_is_available() {
        assert!(ProcessRunner::is_available(Path::new("/bin/sh")).await);
        assert!(!ProcessRunner::is_available(Path::new("/nonexistent/povray")).await);
    }

    #[test]
    fn test_path_flag() {
        assert_eq!(
            path_flag("-ExportsDir=", Path::new("/srv/media/models")),
            "-ExportsDir=/srv/media/models"
        );
    }
}
