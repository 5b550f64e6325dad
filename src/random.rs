// Random source abstraction
//
// Layout jitter and particle spawning both draw from a RandomSource so that
// tests can swap in a seeded or fixed sequence and assert exact output.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform random numbers in `[0, 1)`
pub trait RandomSource {
    /// Next uniform value in `[0, 1)`
    fn next_f64(&mut self) -> f64;

    /// Uniform value in `[low, high]`
    ///
    /// Returns `low` when the range is empty or inverted.
    fn range_f64(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        low + (high - low) * self.next_f64()
    }

    /// Uniform index in `0..len`
    ///
    /// Callers must not pass `len == 0`; it returns 0 in that case.
    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }

    /// Bernoulli trial with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

/// StdRng-backed random source
///
/// `from_entropy` is used in production; `seeded` gives a reproducible
/// stream (same seed, same layout and spawn sequence).
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Reproducible stream from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Non-deterministic stream seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Fixed, cycling sequence of values
///
/// Every value is clamped into `[0, 1)`. An empty sequence always yields 0.5.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
}

#[cfg(test)]
impl SequenceRandom {
    pub fn new(values: Vec<f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| if v.is_finite() { v.clamp(0.0, 0.999_999) } else { 0.5 })
            .collect();
        Self { values, cursor: 0 }
    }

    /// Sequence that always returns the same value
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

#[cfg(test)]
impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.5;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        value
    }
}
