#![forbid(unsafe_code)]

use std::fmt::Write as _;

use pts_random::DeterministicRng;
use serde::{Deserialize, Serialize};

use crate::error::HarnessError;

/// Largest value range the generator will materialize as a shuffle pool.
pub const MAX_VALUE_RANGE: u64 = 1 << 26;

/// Bounds on the shape of a randomly generated problem instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub max_instances: u64,
    pub max_elements: u64,
    pub min_value: i64,
    pub max_value: i64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_instances: 20,
            max_elements: 1_000_000,
            min_value: 1,
            max_value: 1_000_000,
        }
    }
}

impl GenerationParams {
    #[must_use]
    pub const fn new(max_instances: u64, max_elements: u64, max_value: i64) -> Self {
        Self {
            max_instances,
            max_elements,
            min_value: 1,
            max_value,
        }
    }

    /// Number of distinct integers in `[min_value, max_value]`.
    #[must_use]
    pub fn value_range_len(&self) -> u64 {
        if self.min_value > self.max_value {
            0
        } else {
            self.max_value.abs_diff(self.min_value).saturating_add(1)
        }
    }

    /// A sequence cannot hold more distinct values than the range offers, so
    /// a drawn size is clamped to the range cardinality.
    #[must_use]
    pub fn effective_size(&self, drawn: u64) -> u64 {
        drawn.min(self.value_range_len())
    }

    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.max_instances == 0 {
            return Err(HarnessError::InvalidParams(
                "max_instances must be >= 1".to_string(),
            ));
        }
        if self.max_elements == 0 {
            return Err(HarnessError::InvalidParams(
                "max_elements must be >= 1".to_string(),
            ));
        }
        if self.min_value > self.max_value {
            return Err(HarnessError::InvalidParams(format!(
                "min_value={} exceeds max_value={}",
                self.min_value, self.max_value
            )));
        }
        if self.value_range_len() > MAX_VALUE_RANGE {
            return Err(HarnessError::InvalidParams(format!(
                "value range of {} exceeds limit {MAX_VALUE_RANGE}",
                self.value_range_len()
            )));
        }
        Ok(())
    }
}

/// One sub-instance: two equally sized sequences of distinct integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubInstance {
    pub first: Vec<i64>,
    pub second: Vec<i64>,
}

impl SubInstance {
    #[must_use]
    pub fn size(&self) -> usize {
        self.first.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemInstance {
    pub cases: Vec<SubInstance>,
}

impl ProblemInstance {
    /// Canonical text layout: instance count, then per instance the size
    /// followed by both sequences, one value per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.cases.len());
        for case in &self.cases {
            let _ = writeln!(out, "{}", case.size());
            for value in case.first.iter().chain(&case.second) {
                let _ = writeln!(out, "{value}");
            }
        }
        out
    }
}

/// Draws one problem instance from `rng` within `params`.
///
/// Draw order is fixed (instance count, then per instance: size, first
/// sequence, second sequence) so a given seed always yields the same text.
pub fn generate_instance(
    rng: &mut DeterministicRng,
    params: &GenerationParams,
) -> Result<String, HarnessError> {
    params.validate()?;

    let instances = rng.bounded_u64(params.max_instances)? + 1;
    let mut pool: Vec<i64> = (params.min_value..=params.max_value).collect();
    let mut out = String::new();
    let _ = writeln!(out, "{instances}");

    for _ in 0..instances {
        let drawn = rng.bounded_u64(params.max_elements)? + 1;
        let size = params.effective_size(drawn) as usize;
        let _ = writeln!(out, "{size}");

        for _ in 0..2 {
            rng.partial_shuffle(&mut pool, size)?;
            for value in &pool[..size] {
                let _ = writeln!(out, "{value}");
            }
        }
    }

    Ok(out)
}

/// Strict parser for the problem-instance text layout.
pub fn parse_instance(text: &str) -> Result<ProblemInstance, HarnessError> {
    let mut lines = text.lines().enumerate();
    let mut next_number = |what: &str| -> Result<(usize, i64), HarnessError> {
        let (idx, raw) = lines.next().ok_or_else(|| HarnessError::MalformedInstance {
            line: text.lines().count() + 1,
            detail: format!("unexpected end of input, expected {what}"),
        })?;
        let value = raw
            .trim()
            .parse::<i64>()
            .map_err(|err| HarnessError::MalformedInstance {
                line: idx + 1,
                detail: format!("invalid {what} {raw:?}: {err}"),
            })?;
        Ok((idx + 1, value))
    };

    let (_, count) = next_number("instance count")?;
    if count < 1 {
        return Err(HarnessError::MalformedInstance {
            line: 1,
            detail: format!("instance count must be >= 1, got {count}"),
        });
    }

    let mut cases = Vec::new();
    for _ in 0..count {
        let (line, size) = next_number("size")?;
        if size < 1 {
            return Err(HarnessError::MalformedInstance {
                line,
                detail: format!("size must be >= 1, got {size}"),
            });
        }
        let mut sequence = || -> Result<Vec<i64>, HarnessError> {
            (0..size)
                .map(|_| next_number("value").map(|(_, value)| value))
                .collect()
        };
        let first = sequence()?;
        let second = sequence()?;
        cases.push(SubInstance { first, second });
    }

    if let Some((idx, raw)) = lines.find(|(_, raw)| !raw.trim().is_empty()) {
        return Err(HarnessError::MalformedInstance {
            line: idx + 1,
            detail: format!("trailing content {raw:?}"),
        });
    }

    Ok(ProblemInstance { cases })
}
