#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileSummary {
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverTiming {
    pub solver: String,
    pub samples_ms: Vec<f64>,
    pub percentiles: PercentileSummary,
}

/// Per-solver wall-clock samples for one timed wave. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveTiming {
    pub lhs: SolverTiming,
    pub rhs: SolverTiming,
}

#[derive(Debug, Clone, Default)]
pub struct TimingRecorder {
    lhs_solver: String,
    rhs_solver: String,
    lhs_ms: Vec<f64>,
    rhs_ms: Vec<f64>,
}

impl TimingRecorder {
    #[must_use]
    pub fn new(lhs_solver: &str, rhs_solver: &str) -> Self {
        Self {
            lhs_solver: lhs_solver.to_string(),
            rhs_solver: rhs_solver.to_string(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, lhs_ms: f64, rhs_ms: f64) {
        self.lhs_ms.push(lhs_ms);
        self.rhs_ms.push(rhs_ms);
    }

    #[must_use]
    pub fn finish(self) -> WaveTiming {
        WaveTiming {
            lhs: solver_timing(self.lhs_solver, self.lhs_ms),
            rhs: solver_timing(self.rhs_solver, self.rhs_ms),
        }
    }
}

fn solver_timing(solver: String, samples_ms: Vec<f64>) -> SolverTiming {
    let percentiles = summarize_samples(&samples_ms);
    SolverTiming {
        solver,
        samples_ms,
        percentiles,
    }
}

fn percentile_index(len: usize, percentile_num: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let last = len - 1;
    (last * percentile_num + 50) / 100
}

#[must_use]
pub fn summarize_samples(samples: &[f64]) -> PercentileSummary {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let at = |percentile_num| {
        sorted
            .get(percentile_index(sorted.len(), percentile_num))
            .copied()
            .unwrap_or(0.0)
    };

    PercentileSummary {
        p50_ms: at(50),
        p95_ms: at(95),
        p99_ms: at(99),
        min_ms: sorted.first().copied().unwrap_or(0.0),
        max_ms: sorted.last().copied().unwrap_or(0.0),
    }
}
