//! The seam between the runner and the external load engine.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// What one engine invocation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub success: bool,
    /// `None` when the process was killed or timed out.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub duration: Duration,
}

impl ExecutionOutcome {
    /// An outcome for a process that ran to completion.
    #[must_use]
    pub fn finished(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            success: exit_code == Some(0),
            exit_code,
            stdout,
            stderr,
            timed_out: false,
            duration,
        }
    }

    /// An outcome for a process that hit its wall-clock ceiling.
    ///
    /// Keeps whatever the process printed before it was killed and appends
    /// a timeout note to stderr.
    #[must_use]
    pub fn timed_out(stdout: String, mut stderr: String, duration: Duration) -> Self {
        if !stderr.is_empty() && !stderr.ends_with('\n') {
            stderr.push('\n');
        }
        stderr.push_str(&format!(
            "execution timed out after {}s",
            duration.as_secs()
        ));
        Self {
            success: false,
            exit_code: None,
            stdout,
            stderr,
            timed_out: true,
            duration,
        }
    }

    /// Short status for the summary table.
    #[must_use]
    pub fn status_label(&self) -> String {
        if self.timed_out {
            "timeout".to_string()
        } else {
            match self.exit_code {
                Some(code) => format!("exit {code}"),
                None => "killed".to_string(),
            }
        }
    }
}

/// Runs one generated script.
///
/// A script that fails or times out is an `Ok` outcome with
/// `success == false`; `Err` means the engine could not be started.
#[async_trait]
pub trait LoadEngine: Send + Sync {
    /// Name used in log lines and error messages.
    fn name(&self) -> &str;

    async fn execute(
        &self,
        script: &Path,
        env: &BTreeMap<String, String>,
    ) -> Result<ExecutionOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finished_success_requires_zero_exit() {
        let ok = ExecutionOutcome::finished(Some(0), String::new(), String::new(), Duration::ZERO);
        let failed =
            ExecutionOutcome::finished(Some(99), String::new(), String::new(), Duration::ZERO);
        let killed = ExecutionOutcome::finished(None, String::new(), String::new(), Duration::ZERO);

        assert!(ok.success);
        assert!(!failed.success);
        assert!(!killed.success);
        assert_eq!(failed.status_label(), "exit 99");
        assert_eq!(killed.status_label(), "killed");
    }

    #[test]
    fn test_timed_out_outcome() {
        let outcome = ExecutionOutcome::timed_out(
            "running (0m04.0s)\n".to_string(),
            "level=warn msg=slow".to_string(),
            Duration::from_secs(5),
        );
        assert!(!outcome.success);
        assert!(outcome.timed_out);
        assert_eq!(outcome.status_label(), "timeout");
        assert_eq!(outcome.stdout, "running (0m04.0s)\n");
        assert_eq!(
            outcome.stderr,
            "level=warn msg=slow\nexecution timed out after 5s"
        );
    }
}
