#![forbid(unsafe_code)]

use tracing::{info, warn};

use crate::error::HarnessError;
use crate::solver::{SolverOutput, run_shell};

/// The precondition gate that produces the solver executables.
pub trait BuildStep {
    fn describe(&self) -> &str {
        "in-process build"
    }

    fn run(&self) -> Result<SolverOutput, HarnessError>;
}

/// Runs a shell command line such as `make build`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuildStep {
    command: String,
}

impl CommandBuildStep {
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl BuildStep for CommandBuildStep {
    fn describe(&self) -> &str {
        &self.command
    }

    fn run(&self) -> Result<SolverOutput, HarnessError> {
        run_shell(&self.command, None)
    }
}

/// For runs where the solvers are already built or live in-process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipBuild;

impl BuildStep for SkipBuild {
    fn describe(&self) -> &str {
        "skip"
    }

    fn run(&self) -> Result<SolverOutput, HarnessError> {
        Ok(SolverOutput::default())
    }
}

impl<F> BuildStep for F
where
    F: Fn() -> Result<SolverOutput, HarnessError>,
{
    fn run(&self) -> Result<SolverOutput, HarnessError> {
        self()
    }
}

/// Runs the build and applies the gate: anything on stderr is fatal, stdout
/// is only echoed.
pub fn run_build_gate(step: &dyn BuildStep) -> Result<SolverOutput, HarnessError> {
    info!(step = step.describe(), "building");
    let output = step.run()?;

    if !output.stdout.is_empty() {
        info!(stdout = %output.stdout.trim_end(), "build output");
    }
    if !output.stderr.is_empty() {
        return Err(HarnessError::BuildFailed {
            stdout: output.stdout,
            stderr: output.stderr,
        });
    }
    if output.exit_code.is_some_and(|code| code != 0) {
        warn!(
            exit_code = output.exit_code,
            "build exited non-zero with an empty error stream"
        );
    }
    Ok(output)
}
