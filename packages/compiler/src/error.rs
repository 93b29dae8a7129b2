//! Error types for the compiler.
//!
//! Fatal conditions (bad target, parse failure, unwritable output) are
//! `CompilerError` variants. Unrecognized steps and failed executions are
//! not errors: they are recorded as values and reported at the end of a run.

use std::path::PathBuf;

use thiserror::Error;

/// What kind of filesystem entry a missing path was expected to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
    FileOrDirectory,
}

impl PathKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "feature file",
            Self::Directory => "directory",
            Self::FileOrDirectory => "feature file or directory",
        }
    }
}

/// Main error type for the compiler library.
#[derive(Debug, Error)]
pub enum CompilerError {
    /// Feature text could not be derived from the Gherkin grammar.
    #[error("Failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// A referenced path does not exist.
    #[error("{} not found: {}", .kind.as_str(), .path.display())]
    NotFound { path: PathBuf, kind: PathKind },

    /// Directory exists but holds no feature files.
    #[error("No .feature files found in {}", .0.display())]
    NoFeatureFiles(PathBuf),

    /// Parsing succeeded but nothing was left to generate.
    #[error("No scenarios to generate")]
    NoScenarios,

    /// `# language:` directive names a dialect Gherkin does not know.
    #[error("Unsupported Gherkin language: '{0}'")]
    UnsupportedLanguage(String),

    /// Output directory or script file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    GenerationIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed `--env` argument.
    #[error("Invalid environment pair: '{0}'. Expected KEY=VALUE (e.g., BASE_URL=http://localhost:3000)")]
    InvalidEnvPair(String),

    /// The load engine binary could not be started at all.
    #[error("Failed to start {engine}: {source}")]
    Engine {
        engine: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for compiler operations.
pub type Result<T> = std::result::Result<T, CompilerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = CompilerError::Parse {
            path: PathBuf::from("features/search.feature"),
            message: "unexpected token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse features/search.feature: unexpected token"
        );
    }

    #[test]
    fn test_not_found_display() {
        let err = CompilerError::NotFound {
            path: PathBuf::from("missing"),
            kind: PathKind::Directory,
        };
        assert_eq!(err.to_string(), "directory not found: missing");
    }

    #[test]
    fn test_invalid_env_pair_display() {
        let err = CompilerError::InvalidEnvPair("NOVALUE".to_string());
        assert!(err.to_string().contains("NOVALUE"));
        assert!(err.to_string().contains("KEY=VALUE"));
    }
}
