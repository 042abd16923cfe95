#![forbid(unsafe_code)]

use std::path::PathBuf;

use crate::corpus::TierPlan;
use crate::solver::CommandSolver;

pub const SMALL_TEST_COUNT: usize = 100;
pub const MEDIUM_TEST_COUNT: usize = 50;
pub const LARGE_TEST_COUNT: usize = 10;
pub const SEED: u64 = 1234;
pub const TEST_FILE: &str = "tests.json";

pub const BUILD_COMMAND: &str = "make build";
pub const SOLVER_A_NAME: &str = "Python";
pub const SOLVER_A_COMMAND: &str = "python3 points.py";
pub const SOLVER_B_NAME: &str = "C++";
pub const SOLVER_B_COMMAND: &str = "./Points";

pub const BUILD_COMMAND_ENV: &str = "PTS_BUILD_COMMAND";
pub const SOLVER_A_ENV: &str = "PTS_SOLVER_A";
pub const SOLVER_B_ENV: &str = "PTS_SOLVER_B";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverSpec {
    pub name: String,
    pub command: String,
}

impl SolverSpec {
    #[must_use]
    pub fn to_solver(&self) -> CommandSolver {
        CommandSolver::new(&self.name, &self.command)
    }
}

/// Everything one generation run needs, passed explicitly to the builder and
/// persister instead of living in process-wide globals.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub corpus_path: PathBuf,
    pub seed: u64,
    pub build_command: String,
    pub solver_a: SolverSpec,
    pub solver_b: SolverSpec,
    pub schedule: Vec<TierPlan>,
}

impl HarnessConfig {
    /// The fixed constants, with the three command lines overridable through
    /// `PTS_BUILD_COMMAND`, `PTS_SOLVER_A` and `PTS_SOLVER_B`.
    #[must_use]
    pub fn default_paths() -> Self {
        Self {
            corpus_path: PathBuf::from(TEST_FILE),
            seed: SEED,
            build_command: resolve_command(BUILD_COMMAND_ENV, BUILD_COMMAND),
            solver_a: SolverSpec {
                name: SOLVER_A_NAME.to_string(),
                command: resolve_command(SOLVER_A_ENV, SOLVER_A_COMMAND),
            },
            solver_b: SolverSpec {
                name: SOLVER_B_NAME.to_string(),
                command: resolve_command(SOLVER_B_ENV, SOLVER_B_COMMAND),
            },
            schedule: TierPlan::default_schedule(),
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::default_paths()
    }
}

fn resolve_command(var: &str, fallback: &str) -> String {
    std::env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::{HarnessConfig, SEED, TEST_FILE, resolve_command};
    use crate::solver::Solver;

    #[test]
    fn defaults_use_fixed_constants() {
        let cfg = HarnessConfig::default_paths();
        assert_eq!(cfg.seed, SEED);
        assert_eq!(cfg.corpus_path, std::path::PathBuf::from(TEST_FILE));
        assert_eq!(cfg.schedule.len(), 3);
        assert_eq!(cfg.solver_a.to_solver().name(), "Python");
        assert_eq!(cfg.solver_b.to_solver().name(), "C++");
    }

    #[test]
    fn unset_or_blank_override_falls_back() {
        assert_eq!(
            resolve_command("PTS_TEST_SURELY_UNSET_VARIABLE", "./Points"),
            "./Points"
        );
    }
}
