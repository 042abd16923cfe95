#![forbid(unsafe_code)]

pub mod build_step;
pub mod builder;
pub mod config;
pub mod corpus;
pub mod error;
pub mod generator;
pub mod log;
pub mod oracle;
pub mod persist;
pub mod reference;
pub mod solver;
pub mod telemetry;

pub use crate::builder::{BuilderConfig, CorpusBuildReport, CorpusBuilder, RunPhase, WaveReport};
pub use crate::config::HarnessConfig;
pub use crate::corpus::{Corpus, NamedTestCase, TestCase, Tier, TierPlan};
pub use crate::error::HarnessError;
pub use crate::generator::{GenerationParams, generate_instance, parse_instance};
pub use crate::oracle::{DiagnosticBundle, DifferentialOracle, MismatchKind};
pub use crate::persist::PersistReport;
pub use crate::solver::{CommandSolver, FnSolver, Solver, SolverOutput};

use crate::build_step::{BuildStep, CommandBuildStep};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSummary {
    pub build: CorpusBuildReport,
    pub persisted: PersistReport,
}

/// Builds the corpus with the given collaborators and writes it to
/// `cfg.corpus_path`. Nothing is written unless every case passed.
pub fn generate_corpus_with(
    cfg: &HarnessConfig,
    build: &dyn BuildStep,
    lhs: &dyn Solver,
    rhs: &dyn Solver,
) -> Result<GenerationSummary, HarnessError> {
    let report = CorpusBuilder::new(BuilderConfig::from(cfg)).run(build, lhs, rhs)?;
    let persisted = persist::write_corpus(&cfg.corpus_path, &report.corpus)?;
    info!(
        path = %persisted.path.display(),
        cases = persisted.case_count,
        bytes = persisted.bytes,
        sha256 = %persisted.sha256,
        "wrote corpus"
    );
    Ok(GenerationSummary {
        build: report,
        persisted,
    })
}

/// The full run against the configured build command and solver executables.
pub fn generate_golden_corpus(cfg: &HarnessConfig) -> Result<GenerationSummary, HarnessError> {
    let build = CommandBuildStep::new(&cfg.build_command);
    let lhs = cfg.solver_a.to_solver();
    let rhs = cfg.solver_b.to_solver();
    generate_corpus_with(cfg, &build, &lhs, &rhs)
}
