//! Binary feature filter.

use crate::error::{ResinError, Result};
use crate::types::Real;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pass-through filter for features that only take the values 0 and 1.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BinaryFeatureFilter {
    num_samples: u64,
}

impl BinaryFeatureFilter {
    /// Creates a new filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calibration samples seen.
    pub fn num_samples(&self) -> u64 {
        self.num_samples
    }

    /// Clears the sample counter.
    pub fn reset(&mut self) {
        self.num_samples = 0;
    }

    /// Counts a calibration sample. Binary features carry no statistics,
    /// but the sample must already be a flag.
    pub fn update(&mut self, value: Real) -> Result<()> {
        check_flag(value)?;
        self.num_samples += 1;
        Ok(())
    }

    /// Returns the value unchanged if it is exactly 0 or 1.
    pub fn apply(&self, value: Real) -> Result<Real> {
        check_flag(value)?;
        Ok(value)
    }
}

fn check_flag(value: Real) -> Result<()> {
    if value == 0.0 || value == 1.0 {
        Ok(())
    } else {
        Err(ResinError::Domain {
            value,
            message: "Binary feature accepts only 0 or 1".to_string(),
        })
    }
}
