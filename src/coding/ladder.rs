//! Exponentially spaced threshold ladder.

use crate::error::{ResinError, Result};
use crate::types::Real;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Descending thresholds over `(0, 1)` with the last entry pinned to zero.
///
/// For `L` entries and lowest non-zero threshold `low`, entry `i < L - 1`
/// equals `low^((i + 1) / (L - 1))`, so consecutive entries share the ratio
/// `low^(1 / (L - 1))`. A magnitude fires entry `i` when it is strictly
/// greater than the threshold; a magnitude of exactly zero fires nothing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThresholdLadder {
    thresholds: Vec<Real>,
}

impl ThresholdLadder {
    /// Builds a ladder of `len` thresholds.
    pub fn new(len: usize, low_threshold: Real) -> Result<Self> {
        if len == 0 {
            return Err(ResinError::Configuration {
                name: "component_half_code_length",
                message: "Must be > 0".to_string(),
            });
        }
        if !(low_threshold > 0.0 && low_threshold < 1.0) {
            return Err(ResinError::Configuration {
                name: "low_threshold",
                message: format!("Must be in (0, 1), got {low_threshold}"),
            });
        }

        let steps = (len - 1) as Real;
        let mut thresholds: Vec<Real> = (0..len - 1)
            .map(|i| low_threshold.powf((i + 1) as Real / steps))
            .collect();
        thresholds.push(0.0);

        Ok(Self { thresholds })
    }

    /// Number of thresholds.
    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    /// Always false; a ladder has at least the zero entry.
    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// The thresholds, highest first.
    pub fn thresholds(&self) -> &[Real] {
        &self.thresholds
    }

    /// Index of the first (highest) threshold the magnitude exceeds.
    pub fn classify(&self, magnitude: Real) -> Option<usize> {
        self.thresholds.iter().position(|&t| magnitude > t)
    }
}
