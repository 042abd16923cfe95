#![forbid(unsafe_code)]

//! Seeded random stream used by the corpus generator.
//!
//! The stream is a counter-mode splitmix64: the `n`-th draw depends only on
//! the seed and `n`, so a run seeded once at start-up replays byte-for-byte.

use thiserror::Error;

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
const MIX_CONST1: u64 = 0xBF58_476D_1CE4_E5B9;
const MIX_CONST2: u64 = 0x94D0_49BB_1331_11EB;
pub const DEFAULT_RNG_SEED: u64 = 1234;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RandomError {
    #[error("upper_bound must be > 0")]
    InvalidUpperBound,
    #[error("empty range: low={low} > high={high}")]
    EmptyRange { low: i64, high: i64 },
    #[error("cannot take {amount} items from a slice of {len}")]
    PrefixTooLong { amount: usize, len: usize },
}

impl RandomError {
    #[must_use]
    pub const fn reason_code(self) -> &'static str {
        match self {
            Self::InvalidUpperBound => "random_upper_bound_rejected",
            Self::EmptyRange { .. } => "random_range_rejected",
            Self::PrefixTooLong { .. } => "random_prefix_rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeterministicRng {
    stream_seed: u64,
    counter: u64,
}

impl DeterministicRng {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            stream_seed: seed,
            counter: 0,
        }
    }

    #[must_use]
    pub const fn from_state(seed: u64, counter: u64) -> Self {
        Self {
            stream_seed: seed,
            counter,
        }
    }

    #[must_use]
    pub const fn state(self) -> (u64, u64) {
        (self.stream_seed, self.counter)
    }

    #[must_use]
    pub fn next_u64(&mut self) -> u64 {
        self.counter = self.counter.wrapping_add(1);
        splitmix64(
            self.stream_seed
                .wrapping_add(self.counter.wrapping_mul(GOLDEN_GAMMA)),
        )
    }

    #[must_use]
    pub fn next_f64(&mut self) -> f64 {
        // High 53 bits fill the IEEE754 mantissa exactly.
        let sample = self.next_u64() >> 11;
        sample as f64 / (1u64 << 53) as f64
    }

    /// Uniform draw from `[0, upper_bound)` by rejection sampling.
    pub fn bounded_u64(&mut self, upper_bound: u64) -> Result<u64, RandomError> {
        if upper_bound == 0 {
            return Err(RandomError::InvalidUpperBound);
        }

        let threshold = u64::MAX - u64::MAX % upper_bound;

        loop {
            let candidate = self.next_u64();
            if candidate < threshold {
                return Ok(candidate % upper_bound);
            }
        }
    }

    /// Uniform draw from `[low, high]`.
    pub fn between_inclusive(&mut self, low: i64, high: i64) -> Result<i64, RandomError> {
        if low > high {
            return Err(RandomError::EmptyRange { low, high });
        }
        let span = high.abs_diff(low);
        let offset = match span.checked_add(1) {
            Some(width) => self.bounded_u64(width)?,
            None => self.next_u64(),
        };
        Ok(low.wrapping_add_unsigned(offset))
    }

    /// In-place Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) -> Result<(), RandomError> {
        for i in (1..items.len()).rev() {
            let j = self.bounded_u64((i + 1) as u64)? as usize;
            items.swap(i, j);
        }
        Ok(())
    }

    /// Forward Fisher-Yates over the first `amount` slots only.
    ///
    /// Afterwards `items[..amount]` is a uniformly random `amount`-permutation
    /// of the slice; the tail is left in an unspecified order. Costs `amount`
    /// draws instead of `items.len() - 1`.
    pub fn partial_shuffle<T>(
        &mut self,
        items: &mut [T],
        amount: usize,
    ) -> Result<(), RandomError> {
        let len = items.len();
        if amount > len {
            return Err(RandomError::PrefixTooLong { amount, len });
        }
        for i in 0..amount {
            let j = i + self.bounded_u64((len - i) as u64)? as usize;
            items.swap(i, j);
        }
        Ok(())
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(DEFAULT_RNG_SEED)
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(MIX_CONST1);
    x ^= x >> 27;
    x = x.wrapping_mul(MIX_CONST2);
    x ^ (x >> 31)
}
