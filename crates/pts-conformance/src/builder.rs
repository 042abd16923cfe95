#![forbid(unsafe_code)]

use std::fmt;

use pts_random::DeterministicRng;
use tracing::{debug, info};

use crate::build_step::{BuildStep, run_build_gate};
use crate::config::{HarnessConfig, SEED};
use crate::corpus::{Corpus, NamedTestCase, Tier, TierPlan, manual_cases};
use crate::error::HarnessError;
use crate::generator::generate_instance;
use crate::oracle::DifferentialOracle;
use crate::solver::Solver;
use crate::telemetry::{TimingRecorder, WaveTiming};

/// Where a generation run currently is. The path is strictly linear; an
/// error at any point ends the run without a corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Build,
    SeedManual,
    Wave(Tier),
    Done,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => f.write_str("build"),
            Self::SeedManual => f.write_str("seed_manual"),
            Self::Wave(tier) => write!(f, "wave({tier})"),
            Self::Done => f.write_str("done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderConfig {
    pub seed: u64,
    pub schedule: Vec<TierPlan>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            seed: SEED,
            schedule: TierPlan::default_schedule(),
        }
    }
}

impl From<&HarnessConfig> for BuilderConfig {
    fn from(cfg: &HarnessConfig) -> Self {
        Self {
            seed: cfg.seed,
            schedule: cfg.schedule.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaveReport {
    pub tier: Tier,
    pub cases: usize,
    pub timing: Option<WaveTiming>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorpusBuildReport {
    pub corpus: Corpus,
    pub manual_cases: usize,
    pub waves: Vec<WaveReport>,
}

/// Drives one generation run: build gate, manual seeds, then each wave of the
/// schedule in order. Consumed by [`CorpusBuilder::run`], so a run happens
/// at most once per builder and its random stream is never shared.
#[derive(Debug)]
pub struct CorpusBuilder {
    config: BuilderConfig,
    rng: DeterministicRng,
    phase: RunPhase,
}

impl CorpusBuilder {
    #[must_use]
    pub fn new(config: BuilderConfig) -> Self {
        let rng = DeterministicRng::new(config.seed);
        Self {
            config,
            rng,
            phase: RunPhase::Build,
        }
    }

    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn enter(&mut self, phase: RunPhase) {
        debug!(from = %self.phase, to = %phase, "phase transition");
        self.phase = phase;
    }

    pub fn run(
        mut self,
        build: &dyn BuildStep,
        lhs: &dyn Solver,
        rhs: &dyn Solver,
    ) -> Result<CorpusBuildReport, HarnessError> {
        for plan in &self.config.schedule {
            plan.params.validate()?;
        }

        run_build_gate(build)?;

        self.enter(RunPhase::SeedManual);
        let mut corpus = Corpus::new();
        let manual = manual_cases();
        let manual_count = manual.len();
        for case in manual {
            corpus.insert(case)?;
        }
        info!(cases = manual_count, "seeded manual cases");

        let oracle = DifferentialOracle::new(lhs, rhs);
        let schedule = self.config.schedule.clone();
        let mut waves = Vec::with_capacity(schedule.len());
        for plan in &schedule {
            self.enter(RunPhase::Wave(plan.tier));
            waves.push(self.run_wave(plan, &oracle, &mut corpus)?);
        }

        self.enter(RunPhase::Done);
        info!(cases = corpus.len(), "corpus complete");
        Ok(CorpusBuildReport {
            corpus,
            manual_cases: manual_count,
            waves,
        })
    }

    fn run_wave(
        &mut self,
        plan: &TierPlan,
        oracle: &DifferentialOracle<'_>,
        corpus: &mut Corpus,
    ) -> Result<WaveReport, HarnessError> {
        info!(
            tier = %plan.tier,
            iterations = plan.iterations,
            max_instances = plan.params.max_instances,
            max_elements = plan.params.max_elements,
            max_value = plan.params.max_value,
            "starting wave"
        );

        let (lhs_name, rhs_name) = oracle.solver_names();
        let mut recorder = plan
            .timed
            .then(|| TimingRecorder::new(lhs_name, rhs_name));

        for index in 0..plan.iterations {
            let name = plan.tier.case_name(index);
            let input = generate_instance(&mut self.rng, &plan.params)?;
            let verdict = oracle.check(&name, &input)?;

            if let Some(recorder) = recorder.as_mut() {
                let lhs_ms = verdict.lhs_elapsed.as_secs_f64() * 1000.0;
                let rhs_ms = verdict.rhs_elapsed.as_secs_f64() * 1000.0;
                info!(case = %name, solver = lhs_name, elapsed_ms = lhs_ms, "timed");
                info!(case = %name, solver = rhs_name, elapsed_ms = rhs_ms, "timed");
                recorder.record(lhs_ms, rhs_ms);
            }

            corpus.insert(NamedTestCase::new(name, input, verdict.expected_output))?;
        }

        let timing = recorder.map(TimingRecorder::finish);
        if let Some(timing) = &timing {
            info!(
                tier = %plan.tier,
                lhs = %timing.lhs.solver,
                lhs_p50_ms = timing.lhs.percentiles.p50_ms,
                lhs_max_ms = timing.lhs.percentiles.max_ms,
                rhs = %timing.rhs.solver,
                rhs_p50_ms = timing.rhs.percentiles.p50_ms,
                rhs_max_ms = timing.rhs.percentiles.max_ms,
                "wave timing"
            );
        }
        info!(tier = %plan.tier, cases = plan.iterations, "wave complete");

        Ok(WaveReport {
            tier: plan.tier,
            cases: plan.iterations,
            timing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BuilderConfig, CorpusBuilder, RunPhase};
    use crate::build_step::SkipBuild;
    use crate::corpus::{Tier, TierPlan};
    use crate::error::HarnessError;
    use crate::reference::{brute_force_solver, merge_count_solver};
    use crate::solver::{FnSolver, SolverOutput};

    fn quick_config(seed: u64) -> BuilderConfig {
        BuilderConfig {
            seed,
            schedule: vec![
                TierPlan::small().with_iterations(6),
                TierPlan::medium().with_iterations(2),
            ],
        }
    }

    #[test]
    fn new_builder_starts_at_build_phase() {
        let builder = CorpusBuilder::new(BuilderConfig::default());
        assert_eq!(builder.phase(), RunPhase::Build);
        assert_eq!(RunPhase::Wave(Tier::Large).to_string(), "wave(large)");
    }

    #[test]
    fn run_seeds_manual_cases_then_waves_in_order() {
        let lhs = brute_force_solver();
        let rhs = merge_count_solver();
        let report = CorpusBuilder::new(quick_config(1234))
            .run(&SkipBuild, &lhs, &rhs)
            .expect("reference solvers agree");

        let names: Vec<_> = report.corpus.names().collect();
        assert_eq!(
            names,
            vec![
                "given-test-0",
                "edge-test-0",
                "edge-test-1",
                "edge-test-2",
                "edge-test-3",
                "small-test-0",
                "small-test-1",
                "small-test-2",
                "small-test-3",
                "small-test-4",
                "small-test-5",
                "medium-test-0",
                "medium-test-1",
            ]
        );
        assert_eq!(report.manual_cases, 5);
        assert_eq!(report.waves.len(), 2);
        assert!(report.waves.iter().all(|wave| wave.timing.is_none()));
    }

    #[test]
    fn timed_wave_collects_one_sample_per_case() {
        let lhs = brute_force_solver();
        let rhs = merge_count_solver();
        let mut plan = TierPlan::small().with_iterations(3);
        plan.timed = true;
        let report = CorpusBuilder::new(BuilderConfig {
            seed: 5,
            schedule: vec![plan],
        })
        .run(&SkipBuild, &lhs, &rhs)
        .expect("agree");

        let timing = report.waves[0].timing.as_ref().expect("timed wave");
        assert_eq!(timing.lhs.samples_ms.len(), 3);
        assert_eq!(timing.rhs.samples_ms.len(), 3);
        assert_eq!(timing.lhs.solver, "reference-brute-force");
    }

    #[test]
    fn build_failure_stops_before_any_case() {
        let calls = std::cell::Cell::new(0usize);
        let counting = FnSolver::new("counting", |input: &str| {
            calls.set(calls.get() + 1);
            Ok(input.to_string())
        });
        let failing_build = || -> Result<SolverOutput, HarnessError> {
            Ok(SolverOutput {
                stderr: "make: *** No rule to make target 'build'.\n".to_string(),
                ..SolverOutput::default()
            })
        };

        let err = CorpusBuilder::new(quick_config(1))
            .run(&failing_build, &counting, &counting)
            .expect_err("build gate");
        assert_eq!(err.reason_code(), "harness_build_failed");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn empty_rhs_aborts_on_first_random_case() {
        let lhs = brute_force_solver();
        let empty = FnSolver::new("empty", |_: &str| Ok(String::new()));
        let err = CorpusBuilder::new(quick_config(1234))
            .run(&SkipBuild, &lhs, &empty)
            .expect_err("empty output must abort");
        match err {
            HarnessError::Mismatch(bundle) => {
                assert_eq!(bundle.case_name, "small-test-0");
                assert!(bundle.rhs.stdout.is_empty());
                assert!(!bundle.lhs.stdout.is_empty());
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn invalid_schedule_is_rejected_before_build() {
        let lhs = brute_force_solver();
        let mut plan = TierPlan::small();
        plan.params.max_elements = 0;
        let err = CorpusBuilder::new(BuilderConfig {
            seed: 1,
            schedule: vec![plan],
        })
        .run(&SkipBuild, &lhs, &lhs)
        .expect_err("zero elements");
        assert_eq!(err.reason_code(), "harness_params_invalid");
    }

    #[test]
    fn same_seed_reproduces_corpus() {
        let lhs = brute_force_solver();
        let rhs = merge_count_solver();
        let first = CorpusBuilder::new(quick_config(99))
            .run(&SkipBuild, &lhs, &rhs)
            .expect("first");
        let second = CorpusBuilder::new(quick_config(99))
            .run(&SkipBuild, &lhs, &rhs)
            .expect("second");
        assert_eq!(first.corpus, second.corpus);

        let other = CorpusBuilder::new(quick_config(100))
            .run(&SkipBuild, &lhs, &rhs)
            .expect("other seed");
        assert_ne!(
            first.corpus.get("small-test-0"),
            other.corpus.get("small-test-0")
        );
    }
}
