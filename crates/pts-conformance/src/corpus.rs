#![forbid(unsafe_code)]

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::{LARGE_TEST_COUNT, MEDIUM_TEST_COUNT, SMALL_TEST_COUNT};
use crate::error::HarnessError;
use crate::generator::GenerationParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Small,
    Medium,
    Large,
}

impl Tier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    #[must_use]
    pub fn case_name(self, index: usize) -> String {
        format!("{}-test-{index}", self.as_str())
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generator bounds and iteration count for one randomized wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPlan {
    pub tier: Tier,
    pub params: GenerationParams,
    pub iterations: usize,
    /// Record per-solver wall-clock time for every case in the wave.
    pub timed: bool,
}

impl TierPlan {
    #[must_use]
    pub const fn small() -> Self {
        Self {
            tier: Tier::Small,
            params: GenerationParams::new(3, 10, 10),
            iterations: SMALL_TEST_COUNT,
            timed: false,
        }
    }

    #[must_use]
    pub const fn medium() -> Self {
        Self {
            tier: Tier::Medium,
            params: GenerationParams::new(10, 300, 300),
            iterations: MEDIUM_TEST_COUNT,
            timed: false,
        }
    }

    #[must_use]
    pub const fn large() -> Self {
        Self {
            tier: Tier::Large,
            params: GenerationParams::new(5, 10_000, 1_000_000),
            iterations: LARGE_TEST_COUNT,
            timed: true,
        }
    }

    #[must_use]
    pub fn default_schedule() -> Vec<Self> {
        vec![Self::small(), Self::medium(), Self::large()]
    }

    #[must_use]
    pub const fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }
}

/// The persisted record for one case: exact input text and agreed output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    #[serde(rename = "output")]
    pub expected_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTestCase {
    pub name: String,
    pub input: String,
    pub expected_output: String,
}

impl NamedTestCase {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        input: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

/// Insertion-ordered, append-only mapping from case name to test case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Corpus {
    cases: IndexMap<String, TestCase>,
}

impl Corpus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, case: NamedTestCase) -> Result<(), HarnessError> {
        if self.cases.contains_key(&case.name) {
            return Err(HarnessError::DuplicateCase(case.name));
        }
        self.cases.insert(
            case.name,
            TestCase {
                input: case.input,
                expected_output: case.expected_output,
            },
        );
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TestCase> {
        self.cases.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cases.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TestCase)> {
        self.cases.iter().map(|(name, case)| (name.as_str(), case))
    }
}

/// Hand-verified cases seeded ahead of every randomized wave. Their outputs
/// are literals, so no solver runs for them.
#[must_use]
pub fn manual_cases() -> Vec<NamedTestCase> {
    vec![
        NamedTestCase::new(
            "given-test-0",
            "2\n4\n1\n10\n8\n6\n6\n2\n5\n1\n5\n9\n21\n1\n5\n18\n2\n4\n6\n10\n1\n",
            "4\n7\n",
        ),
        // single element
        NamedTestCase::new("edge-test-0", "1\n1\n1\n1\n", "0\n"),
        // fully reversed pairing
        NamedTestCase::new("edge-test-1", "1\n3\n1\n2\n3\n3\n2\n1\n", "3\n"),
        // identical order
        NamedTestCase::new("edge-test-2", "1\n3\n1\n2\n3\n1\n2\n3\n", "0\n"),
        // descending first sequence
        NamedTestCase::new("edge-test-3", "1\n3\n3\n2\n1\n1\n2\n3\n", "3\n"),
    ]
}
