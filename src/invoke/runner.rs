use crate::plan::CommandPlan;
use serde::Serialize;
use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// What a finished (or failed to start) subprocess left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput {
    /// `None` when the process could not be spawned, was killed by a signal or
    /// ran past its timeout.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub(crate) fn not_run(stderr: String) -> Self {
        Self {
            exit_code: None,
            stdout: String::new(),
            stderr,
        }
    }
}

/// Runs an external program to completion.
///
/// Implementations never fail: spawn errors and timeouts are reported through
/// the returned [`ToolOutput`].
pub trait ToolRunner: Send + Sync {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> impl Future<Output = ToolOutput> + Send;

    fn run_plan(
        &self,
        plan: &CommandPlan,
        timeout: Duration,
    ) -> impl Future<Output = ToolOutput> + Send {
        let args = plan.arg_texts();
        async move { self.run(&plan.program, &args, timeout).await }
    }
}

/// [`ToolRunner`] backed by `tokio::process`. The child is killed when the
/// timeout elapses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String], timeout: Duration) -> ToolOutput {
        debug!(program, ?args, "spawning tool");
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(error) => {
                warn!(program, %error, "failed to spawn tool");
                return ToolOutput::not_run(format!("failed to spawn {program}: {error}"));
            }
        };

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => ToolOutput {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            },
            Ok(Err(error)) => {
                warn!(program, %error, "failed to collect tool output");
                ToolOutput::not_run(format!("failed to wait for {program}: {error}"))
            }
            Err(_) => {
                warn!(program, ?timeout, "tool timed out");
                ToolOutput::not_run(format!(
                    "{program} timed out after {}s",
                    timeout.as_secs()
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_program_is_reported_not_raised() {
        let output = ProcessRunner
            .run(
                "definitely-not-a-real-tool-7f3a",
                &["-ver".to_string()],
                Duration::from_secs(5),
            )
            .await;
        assert!(!output.success());
        assert_eq!(output.exit_code, None);
        assert!(output.stderr.contains("failed to spawn"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_and_streams_are_captured() {
        let output = ProcessRunner
            .run(
                "sh",
                &["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()],
                Duration::from_secs(5),
            )
            .await;
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_reported() {
        let output = ProcessRunner
            .run(
                "sleep",
                &["5".to_string()],
                Duration::from_millis(100),
            )
            .await;
        assert_eq!(output.exit_code, None);
        assert!(output.stderr.contains("timed out"));
    }
}
