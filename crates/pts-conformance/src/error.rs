#![forbid(unsafe_code)]

use std::path::PathBuf;

use pts_random::RandomError;
use thiserror::Error;

use crate::oracle::DiagnosticBundle;

/// Every way a corpus generation run can stop.
///
/// All variants are terminal: the builder returns the first one it hits and
/// nothing is persisted.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid generation parameters: {0}")]
    InvalidParams(String),

    #[error("malformed problem instance at line {line}: {detail}")]
    MalformedInstance { line: usize, detail: String },

    #[error("random stream rejected draw: {0}")]
    Random(#[from] RandomError),

    #[error("failed to invoke `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("build step reported errors\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    BuildFailed { stdout: String, stderr: String },

    #[error("{0}")]
    Mismatch(Box<DiagnosticBundle>),

    #[error("duplicate corpus case name: {0}")]
    DuplicateCase(String),

    #[error("failed {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corpus json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("logging already initialized: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),
}

impl HarnessError {
    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::InvalidParams(_) => "harness_params_invalid",
            Self::MalformedInstance { .. } => "harness_instance_malformed",
            Self::Random(err) => err.reason_code(),
            Self::Spawn { .. } => "harness_spawn_failed",
            Self::BuildFailed { .. } => "harness_build_failed",
            Self::Mismatch(bundle) => bundle.kind.reason_code(),
            Self::DuplicateCase(_) => "harness_duplicate_case",
            Self::Io { .. } => "harness_io_failed",
            Self::Json(_) => "harness_json_invalid",
            Self::Logging(_) => "harness_logging_failed",
        }
    }

    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}
