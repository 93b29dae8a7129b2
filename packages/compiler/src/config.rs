//! Configuration constants, defaults and validation functions.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{CompilerError, Result};

/// File extension of scenario-description files (without the dot).
pub const FEATURE_EXTENSION: &str = "feature";

/// Directory generated scripts are written to when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Directory (relative to the k6 working directory) for HTML/JSON reports.
pub const DEFAULT_REPORT_DIR: &str = "reports";

/// Import root of the hand-written helper library, relative to generated scripts.
pub const DEFAULT_LIB_DIR: &str = "../lib";

/// Name of the load-generation engine binary.
pub const DEFAULT_K6_BINARY: &str = "k6";

/// Wall-clock ceiling for a single engine invocation (30 minutes).
pub const EXECUTION_TIMEOUT_SECS: u64 = 30 * 60;

/// Target API used when no `BASE_URL` is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Credential pair used when none is configured.
pub const DEFAULT_USERNAME: &str = "loadtest@example.com";
pub const DEFAULT_PASSWORD: &str = "loadtest123";

/// Virtual users when a scenario does not set `vus`.
pub const DEFAULT_VUS: u32 = 1;

/// Duration when a scenario does not set `duration`.
pub const DEFAULT_DURATION: &str = "30s";

/// Iterations for a fixed profile when a scenario does not set `iterations`.
pub const DEFAULT_ITERATIONS: u32 = 1;

/// Seconds assumed when a `duration` value cannot be parsed.
pub const FALLBACK_DURATION_SECS: u64 = 60;

/// Longest total duration that still yields a fixed-iteration profile.
pub const FIXED_PROFILE_MAX_SECS: u64 = 30;

/// Environment variable name pattern for `--env KEY=VALUE`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static ENV_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Validate and split a `KEY=VALUE` pair.
///
/// The value may be empty and may itself contain `=`.
///
/// # Examples
/// ```
/// use bdd_k6_compiler::config::validate_env_pair;
///
/// assert_eq!(
///     validate_env_pair("BASE_URL=http://api:8080").unwrap(),
///     ("BASE_URL".to_string(), "http://api:8080".to_string())
/// );
/// assert!(validate_env_pair("no-equals-sign").is_err());
/// ```
pub fn validate_env_pair(pair: &str) -> Result<(String, String)> {
    let Some((key, value)) = pair.split_once('=') else {
        return Err(CompilerError::InvalidEnvPair(pair.to_string()));
    };
    let key = key.trim();
    if !ENV_KEY_PATTERN.is_match(key) {
        return Err(CompilerError::InvalidEnvPair(pair.to_string()));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Merge explicit overrides over a default environment. Overrides win.
pub fn merge_env(
    defaults: &BTreeMap<String, String>,
    overrides: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = defaults.clone();
    for (key, value) in overrides {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Settings for executing generated scripts.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub k6_binary: PathBuf,
    pub timeout: Duration,
    pub base_url: String,
    pub username: String,
    pub password: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            k6_binary: PathBuf::from(DEFAULT_K6_BINARY),
            timeout: Duration::from_secs(EXECUTION_TIMEOUT_SECS),
            base_url: DEFAULT_BASE_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

impl RunnerConfig {
    /// Read settings from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        let k6_binary = std::env::var("K6_BINARY")
            .unwrap_or_else(|_| DEFAULT_K6_BINARY.into())
            .into();

        let timeout_secs: u64 = std::env::var("K6_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(EXECUTION_TIMEOUT_SECS);

        let base_url = std::env::var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let username =
            std::env::var("API_USERNAME").unwrap_or_else(|_| DEFAULT_USERNAME.into());
        let password =
            std::env::var("API_PASSWORD").unwrap_or_else(|_| DEFAULT_PASSWORD.into());

        Self {
            k6_binary,
            timeout: Duration::from_secs(timeout_secs),
            base_url,
            username,
            password,
        }
    }

    #[must_use]
    pub fn with_k6_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.k6_binary = binary.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Environment passed to every script before caller overrides.
    #[must_use]
    pub fn default_env(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("BASE_URL".to_string(), self.base_url.clone()),
            ("USERNAME".to_string(), self.username.clone()),
            ("PASSWORD".to_string(), self.password.clone()),
        ])
    }
}
