#![forbid(unsafe_code)]

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::HarnessError;
use crate::solver::{Solver, SolverOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// The two stdout texts differ in at least one byte.
    Disagreement,
    /// Both solvers agreed on producing nothing.
    EmptyOutput,
}

impl MismatchKind {
    #[must_use]
    pub const fn reason_code(self) -> &'static str {
        match self {
            Self::Disagreement => "oracle_output_disagreement",
            Self::EmptyOutput => "oracle_output_empty",
        }
    }
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disagreement => write!(f, "solver outputs differ"),
            Self::EmptyOutput => write!(f, "solvers produced empty output"),
        }
    }
}

/// Byte-exact agreement plus non-emptiness. Symmetric in its arguments.
pub fn compare_outputs(lhs: &str, rhs: &str) -> Result<(), MismatchKind> {
    if lhs != rhs {
        Err(MismatchKind::Disagreement)
    } else if lhs.is_empty() {
        Err(MismatchKind::EmptyOutput)
    } else {
        Ok(())
    }
}

/// Everything an operator needs to replay a disagreement by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticBundle {
    pub case_name: String,
    pub kind: MismatchKind,
    pub lhs_solver: String,
    pub rhs_solver: String,
    pub lhs: SolverOutput,
    pub rhs: SolverOutput,
    pub input: String,
}

fn exit_label(code: Option<i32>) -> String {
    code.map_or_else(|| "signal".to_string(), |code| code.to_string())
}

impl fmt::Display for DiagnosticBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "oracle mismatch on {} [{}]: {}",
            self.case_name,
            self.kind.reason_code(),
            self.kind
        )?;
        for (name, output) in [(&self.lhs_solver, &self.lhs), (&self.rhs_solver, &self.rhs)] {
            writeln!(f)?;
            writeln!(f, "{name} (exit {})", exit_label(output.exit_code))?;
            writeln!(f, "{}", output.stdout)?;
            writeln!(f)?;
            writeln!(f, "{name} error")?;
            writeln!(f, "{}", output.stderr)?;
        }
        writeln!(f)?;
        writeln!(f, "Input")?;
        write!(f, "{}", self.input)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleVerdict {
    pub expected_output: String,
    pub lhs_elapsed: Duration,
    pub rhs_elapsed: Duration,
}

/// Runs two solvers on the same input, one after the other, and accepts the
/// answer only when they agree on a non-empty output.
#[derive(Clone, Copy)]
pub struct DifferentialOracle<'a> {
    lhs: &'a dyn Solver,
    rhs: &'a dyn Solver,
}

impl<'a> DifferentialOracle<'a> {
    #[must_use]
    pub fn new(lhs: &'a dyn Solver, rhs: &'a dyn Solver) -> Self {
        Self { lhs, rhs }
    }

    #[must_use]
    pub fn solver_names(&self) -> (&str, &str) {
        (self.lhs.name(), self.rhs.name())
    }

    pub fn check(&self, case_name: &str, input: &str) -> Result<OracleVerdict, HarnessError> {
        let lhs = self.lhs.run(input)?;
        let rhs = self.rhs.run(input)?;

        match compare_outputs(&lhs.stdout, &rhs.stdout) {
            Ok(()) => {
                debug!(
                    case = case_name,
                    lhs_ms = lhs.elapsed_ms(),
                    rhs_ms = rhs.elapsed_ms(),
                    "solvers agree"
                );
                Ok(OracleVerdict {
                    lhs_elapsed: lhs.elapsed,
                    rhs_elapsed: rhs.elapsed,
                    expected_output: lhs.stdout,
                })
            }
            Err(kind) => {
                error!(
                    case = case_name,
                    reason_code = kind.reason_code(),
                    lhs = self.lhs.name(),
                    rhs = self.rhs.name(),
                    "oracle mismatch"
                );
                Err(HarnessError::Mismatch(Box::new(DiagnosticBundle {
                    case_name: case_name.to_string(),
                    kind,
                    lhs_solver: self.lhs.name().to_string(),
                    rhs_solver: self.rhs.name().to_string(),
                    lhs,
                    rhs,
                    input: input.to_string(),
                })))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DifferentialOracle, MismatchKind, compare_outputs};
    use crate::error::HarnessError;
    use crate::reference::{brute_force_solver, merge_count_solver};
    use crate::solver::FnSolver;
    use proptest::prelude::*;

    #[test]
    fn agreeing_non_empty_outputs_pass() {
        assert_eq!(compare_outputs("3\n", "3\n"), Ok(()));
    }

    #[test]
    fn trailing_newline_difference_is_a_disagreement() {
        assert_eq!(
            compare_outputs("3\n", "3"),
            Err(MismatchKind::Disagreement)
        );
    }

    #[test]
    fn agreed_empty_output_is_rejected() {
        assert_eq!(compare_outputs("", ""), Err(MismatchKind::EmptyOutput));
    }

    #[test]
    fn oracle_returns_shared_output() {
        let lhs = brute_force_solver();
        let rhs = merge_count_solver();
        let oracle = DifferentialOracle::new(&lhs, &rhs);
        let verdict = oracle
            .check("edge", "1\n3\n1\n2\n3\n3\n2\n1\n")
            .expect("reference solvers agree");
        assert_eq!(verdict.expected_output, "3\n");
        assert_eq!(
            oracle.solver_names(),
            ("reference-brute-force", "reference-merge-count")
        );
    }

    #[test]
    fn mismatch_bundle_carries_both_sides_and_input() {
        let lhs = brute_force_solver();
        let rhs = FnSolver::new("off-by-one", |_: &str| Ok("4\n".to_string()));
        let oracle = DifferentialOracle::new(&lhs, &rhs);
        let input = "1\n3\n1\n2\n3\n3\n2\n1\n";

        let err = oracle.check("small-test-0", input).expect_err("must disagree");
        let bundle = match err {
            HarnessError::Mismatch(bundle) => bundle,
            other => panic!("expected mismatch, got {other}"),
        };
        assert_eq!(bundle.kind, MismatchKind::Disagreement);
        assert_eq!(bundle.case_name, "small-test-0");
        assert_eq!(bundle.lhs.stdout, "3\n");
        assert_eq!(bundle.rhs.stdout, "4\n");
        assert_eq!(bundle.input, input);

        let rendered = bundle.to_string();
        assert!(rendered.contains("reference-brute-force"));
        assert!(rendered.contains("off-by-one error"));
        assert!(rendered.contains("oracle_output_disagreement"));
        assert!(rendered.ends_with(input));
    }

    #[test]
    fn crashing_solvers_surface_as_empty_output() {
        let lhs = FnSolver::new("crash-a", |_: &str| Err("segfault".to_string()));
        let rhs = FnSolver::new("crash-b", |_: &str| Err("panic".to_string()));
        let oracle = DifferentialOracle::new(&lhs, &rhs);
        let err = oracle.check("edge", "1\n1\n1\n1\n").expect_err("empty");
        assert_eq!(err.reason_code(), "oracle_output_empty");
        let rendered = err.to_string();
        assert!(rendered.contains("segfault"));
        assert!(rendered.contains("panic"));
    }

    proptest! {
        #[test]
        fn verdict_is_symmetric(lhs in "[0-9\n]{0,6}", rhs in "[0-9\n]{0,6}") {
            prop_assert_eq!(
                compare_outputs(&lhs, &rhs).is_ok(),
                compare_outputs(&rhs, &lhs).is_ok()
            );
        }

        #[test]
        fn swapping_solvers_keeps_outcome(lhs_answer in "[0-3]\n", rhs_answer in "[0-3]\n") {
            let a = FnSolver::new("a", move |_: &str| Ok(lhs_answer.clone()));
            let b = FnSolver::new("b", move |_: &str| Ok(rhs_answer.clone()));
            let forward = DifferentialOracle::new(&a, &b).check("case", "1\n1\n1\n1\n");
            let backward = DifferentialOracle::new(&b, &a).check("case", "1\n1\n1\n1\n");
            prop_assert_eq!(forward.is_ok(), backward.is_ok());
        }
    }
}
