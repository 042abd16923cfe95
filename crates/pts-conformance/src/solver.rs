#![forbid(unsafe_code)]

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::error::HarnessError;

/// Everything a solver invocation produced, decoded as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolverOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
}

impl SolverOutput {
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(0),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// A black-box answer producer: problem instance text in, answer text out.
///
/// `run` blocks until the solver has finished and both streams are fully
/// collected. A solver that crashes still returns `Ok`; only failing to start
/// it at all is an error.
pub trait Solver {
    fn name(&self) -> &str;

    fn run(&self, input: &str) -> Result<SolverOutput, HarnessError>;
}

/// Runs a shell command line as a child process per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSolver {
    name: String,
    command: String,
}

impl CommandSolver {
    #[must_use]
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
        }
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Solver for CommandSolver {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, input: &str) -> Result<SolverOutput, HarnessError> {
        run_shell(&self.command, Some(input))
    }
}

/// In-process solver backed by a closure. `Ok` text becomes stdout, `Err`
/// text becomes stderr with exit code 1.
pub struct FnSolver<F> {
    name: String,
    func: F,
}

impl<F> FnSolver<F>
where
    F: Fn(&str) -> Result<String, String>,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Solver for FnSolver<F>
where
    F: Fn(&str) -> Result<String, String>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, input: &str) -> Result<SolverOutput, HarnessError> {
        let started = Instant::now();
        let (stdout, stderr, exit_code) = match (self.func)(input) {
            Ok(stdout) => (stdout, String::new(), 0),
            Err(stderr) => (String::new(), stderr, 1),
        };
        Ok(SolverOutput {
            stdout,
            stderr,
            exit_code: Some(exit_code),
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(unix)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(command_line);
    command
}

#[cfg(windows)]
fn shell_command(command_line: &str) -> Command {
    let mut command = Command::new("cmd");
    command.arg("/C").arg(command_line);
    command
}

/// Runs `command_line` through the platform shell, optionally feeding `stdin`,
/// and waits for it to exit.
///
/// Input is written from a scoped helper thread while the caller drains
/// stdout and stderr, so a child that answers before reading all of its input
/// cannot wedge on a full pipe.
pub fn run_shell(command_line: &str, stdin: Option<&str>) -> Result<SolverOutput, HarnessError> {
    let spawn_err = |source| HarnessError::Spawn {
        command: command_line.to_string(),
        source,
    };

    let started = Instant::now();
    let mut child = shell_command(command_line)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_err)?;

    let output = std::thread::scope(|scope| {
        if let (Some(mut pipe), Some(text)) = (child.stdin.take(), stdin) {
            scope.spawn(move || {
                // Broken pipe here means the child exited early; its streams
                // and exit status already tell the story.
                let _ = pipe.write_all(text.as_bytes());
            });
        }
        child.wait_with_output()
    })
    .map_err(spawn_err)?;

    Ok(SolverOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::{CommandSolver, FnSolver, Solver, SolverOutput, run_shell};
    use crate::error::HarnessError;

    #[test]
    fn fn_solver_maps_ok_to_stdout() {
        let solver = FnSolver::new("echo", |input: &str| Ok(input.to_uppercase()));
        let out = solver.run("abc\n").expect("in-process run");
        assert_eq!(solver.name(), "echo");
        assert_eq!(out.stdout, "ABC\n");
        assert!(out.stderr.is_empty());
        assert_eq!(out.exit_code, Some(0));
    }

    #[test]
    fn fn_solver_maps_err_to_stderr() {
        let solver = FnSolver::new("crash", |_: &str| Err("boom".to_string()));
        let out = solver.run("1\n").expect("in-process run");
        assert!(out.stdout.is_empty());
        assert_eq!(out.stderr, "boom");
        assert_eq!(out.exit_code, Some(1));
    }

    #[test]
    fn ok_constructor_sets_success_exit() {
        let out = SolverOutput::ok("3\n");
        assert_eq!(out.exit_code, Some(0));
        assert_eq!(out.elapsed_ms(), 0.0);
    }

    #[cfg(unix)]
    #[test]
    fn command_solver_pipes_stdin_to_stdout() {
        let solver = CommandSolver::new("cat", "cat");
        let out = solver.run("1\n1\n1\n1\n").expect("cat runs");
        assert_eq!(out.stdout, "1\n1\n1\n1\n");
        assert_eq!(out.exit_code, Some(0));
        assert_eq!(solver.command(), "cat");
    }

    #[cfg(unix)]
    #[test]
    fn command_solver_captures_stderr_and_status() {
        let solver = CommandSolver::new("fails", "echo oops >&2; exit 3");
        let out = solver.run("ignored\n").expect("shell runs");
        assert!(out.stdout.is_empty());
        assert_eq!(out.stderr.trim(), "oops");
        assert_eq!(out.exit_code, Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn large_input_does_not_deadlock() {
        let input: String = (0..200_000).map(|i| format!("{i}\n")).collect();
        let out = run_shell("cat", Some(&input)).expect("cat runs");
        assert_eq!(out.stdout.len(), input.len());
    }

    #[cfg(unix)]
    #[test]
    fn child_that_ignores_stdin_still_completes() {
        let input: String = "9\n".repeat(100_000);
        let out = run_shell("echo done", Some(&input)).expect("echo runs");
        assert_eq!(out.stdout, "done\n");
    }

    #[test]
    fn run_without_stdin_uses_null_input() {
        let out = run_shell("echo built", None).expect("echo runs");
        assert_eq!(out.stdout.trim(), "built");
    }

    #[test]
    fn spawn_error_variant_names_command() {
        let err = HarnessError::Spawn {
            command: "./missing".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("./missing"));
        assert_eq!(err.reason_code(), "harness_spawn_failed");
    }
}
