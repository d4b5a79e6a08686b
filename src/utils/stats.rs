//! Running statistics over a stream of reals.

use crate::types::Real;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Accumulates count, min, max, mean and variance of a value stream.
///
/// An empty accumulator reports `NaN` for every statistic so that an
/// uncalibrated state can never be mistaken for a real observation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunningStats {
    count: u64,
    sum: f64,
    sum_sq: f64,
    min: Real,
    max: Real,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStats {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: Real::NAN,
            max: Real::NAN,
        }
    }

    /// Clears everything back to the empty state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Adds one observation.
    pub fn add(&mut self, value: Real) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
    }

    /// Number of observations.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns true when nothing has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Smallest observation.
    #[must_use]
    pub fn min(&self) -> Real {
        self.min
    }

    /// Largest observation.
    #[must_use]
    pub fn max(&self) -> Real {
        self.max
    }

    /// Sum of all observations.
    #[must_use]
    pub fn sum(&self) -> Real {
        self.sum
    }

    /// Arithmetic mean.
    #[must_use]
    pub fn mean(&self) -> Real {
        if self.count == 0 {
            return Real::NAN;
        }
        self.sum / self.count as f64
    }

    /// Population standard deviation.
    #[must_use]
    pub fn std_dev(&self) -> Real {
        if self.count == 0 {
            return Real::NAN;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        (self.sum_sq / n - mean * mean).max(0.0).sqrt()
    }
}
