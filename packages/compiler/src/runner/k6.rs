//! k6 subprocess engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use super::engine::{ExecutionOutcome, LoadEngine};
use crate::config::RunnerConfig;
use crate::error::{CompilerError, Result};

/// How long to wait for the output pipes to close after a kill.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Runs scripts with `k6 run -e KEY=VALUE ... <script>`.
#[derive(Debug, Clone)]
pub struct K6Engine {
    binary: PathBuf,
    timeout: Duration,
}

impl K6Engine {
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(config.k6_binary.clone(), config.timeout)
    }

    /// Arguments passed to the binary, in order.
    #[must_use]
    pub fn command_args(script: &Path, env: &BTreeMap<String, String>) -> Vec<String> {
        let mut args = vec!["run".to_string()];
        for (key, value) in env {
            args.push("-e".to_string());
            args.push(format!("{key}={value}"));
        }
        args.push(script.to_string_lossy().into_owned());
        args
    }
}

#[async_trait]
impl LoadEngine for K6Engine {
    fn name(&self) -> &str {
        "k6"
    }

    async fn execute(
        &self,
        script: &Path,
        env: &BTreeMap<String, String>,
    ) -> Result<ExecutionOutcome> {
        let args = Self::command_args(script, env);
        // Values may carry credentials, so only keys are logged.
        tracing::debug!(
            binary = %self.binary.display(),
            script = %script.display(),
            env_keys = ?env.keys().collect::<Vec<_>>(),
            "running k6"
        );

        let mut command = Command::new(&self.binary);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let started = Instant::now();
        let mut child = command.spawn().map_err(|source| CompilerError::Engine {
            engine: self.binary.display().to_string(),
            source,
        })?;
        let stdout_task = tokio::spawn(drain(child.stdout.take()));
        let stderr_task = tokio::spawn(drain(child.stderr.take()));

        let waited = tokio::time::timeout(self.timeout, child.wait()).await;
        let status = match waited {
            Ok(status) => status.map_err(|source| CompilerError::Engine {
                engine: self.binary.display().to_string(),
                source,
            })?,
            Err(_) => {
                if let Err(error) = child.kill().await {
                    tracing::warn!(error = %error, "failed to kill timed out k6 process");
                }
                tracing::warn!(
                    script = %script.display(),
                    timeout_secs = self.timeout.as_secs(),
                    "k6 timed out, process killed"
                );
                let stdout = collect(stdout_task).await;
                let stderr = collect(stderr_task).await;
                return Ok(ExecutionOutcome::timed_out(
                    stdout,
                    stderr,
                    started.elapsed(),
                ));
            }
        };

        let stdout = collect(stdout_task).await;
        let stderr = collect(stderr_task).await;
        let outcome = ExecutionOutcome::finished(status.code(), stdout, stderr, started.elapsed());
        tracing::info!(
            script = %script.display(),
            exit_code = ?outcome.exit_code,
            elapsed_ms = outcome.duration.as_millis() as u64,
            "k6 finished"
        );
        Ok(outcome)
    }
}

/// Read a pipe to its end. Bytes read before an error are kept.
async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> Vec<u8> {
    let mut buffer = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(error) = pipe.read_to_end(&mut buffer).await {
            tracing::debug!(error = %error, "output pipe closed with error");
        }
    }
    buffer
}

async fn collect(task: JoinHandle<Vec<u8>>) -> String {
    match tokio::time::timeout(DRAIN_GRACE, task).await {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(error)) => {
            tracing::debug!(error = %error, "output reader task failed");
            String::new()
        }
        Err(_) => {
            tracing::debug!("output pipe still open after grace period");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args_order() {
        let env = BTreeMap::from([
            ("USERNAME".to_string(), "alice".to_string()),
            ("BASE_URL".to_string(), "http://api".to_string()),
        ]);
        let args = K6Engine::command_args(Path::new("generated/smoke.js"), &env);
        assert_eq!(
            args,
            vec![
                "run",
                "-e",
                "BASE_URL=http://api",
                "-e",
                "USERNAME=alice",
                "generated/smoke.js",
            ]
        );
    }

    #[test]
    fn test_from_config() {
        let config = RunnerConfig::default()
            .with_k6_binary("/opt/k6")
            .with_timeout(Duration::from_secs(7));
        let engine = K6Engine::from_config(&config);
        assert_eq!(engine.binary, PathBuf::from("/opt/k6"));
        assert_eq!(engine.timeout, Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_missing_binary_is_engine_error() {
        let engine = K6Engine::new("/nonexistent/bdd-k6-test-binary", Duration::from_secs(5));
        let result = engine
            .execute(Path::new("script.js"), &BTreeMap::new())
            .await;
        assert!(matches!(result, Err(CompilerError::Engine { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failed_outcome() {
        // `false` ignores its arguments and exits 1.
        let engine = K6Engine::new("false", Duration::from_secs(5));
        let outcome = engine
            .execute(Path::new("script.js"), &BTreeMap::new())
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(1));
        assert!(!outcome.timed_out);
    }

    #[cfg(unix)]
    fn fake_engine(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-k6");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_output_of_finished_run() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_engine(dir.path(), "echo \"args: $*\"\necho 'checks failed' >&2\nexit 99");
        let engine = K6Engine::new(binary, Duration::from_secs(5));
        let env = BTreeMap::from([("VUS".to_string(), "3".to_string())]);
        let outcome = engine.execute(Path::new("smoke.js"), &env).await.unwrap();

        assert_eq!(outcome.exit_code, Some(99));
        assert_eq!(outcome.stdout, "args: run -e VUS=3 smoke.js\n");
        assert_eq!(outcome.stderr, "checks failed\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_keeps_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_engine(
            dir.path(),
            "echo 'k6 progress'\necho 'warming up' >&2\nexec sleep 5",
        );
        let engine = K6Engine::new(binary, Duration::from_secs(1));
        let outcome = engine
            .execute(Path::new("script.js"), &BTreeMap::new())
            .await
            .unwrap();

        assert!(outcome.timed_out);
        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, None);
        assert_eq!(outcome.stdout, "k6 progress\n");
        assert!(outcome.stderr.starts_with("warming up\n"));
        assert!(outcome.stderr.ends_with("execution timed out after 1s"));
    }
}
