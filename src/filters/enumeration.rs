//! Enumeration feature filter.

use crate::error::{ResinError, Result};
use crate::types::{Interval, Real};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for an [`EnumFeatureFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumFilterParams {
    /// Number of categories. Valid category indices are `0..num_categories`.
    pub num_categories: usize,
}

impl Default for EnumFilterParams {
    fn default() -> Self {
        Self { num_categories: 2 }
    }
}

/// Filter for categorical features given as zero-based integer indices.
///
/// Categories are spread evenly over the output interval: the first
/// category maps to its minimum and the last one to its maximum.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnumFeatureFilter {
    output_range: Interval,
    /// Occurrence count per category seen during calibration.
    counts: Vec<u64>,
}

impl EnumFeatureFilter {
    /// Creates a new filter.
    pub fn new(output_range: Interval, params: &EnumFilterParams) -> Result<Self> {
        if params.num_categories == 0 {
            return Err(ResinError::Configuration {
                name: "num_categories",
                message: "Must be > 0".to_string(),
            });
        }
        Ok(Self {
            output_range,
            counts: vec![0; params.num_categories],
        })
    }

    /// Number of categories.
    pub fn num_categories(&self) -> usize {
        self.counts.len()
    }

    /// Occurrence counts observed during calibration.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Clears the occurrence counts.
    pub fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = 0);
    }

    /// Validates and counts one calibration sample.
    pub fn update(&mut self, value: Real) -> Result<()> {
        let category = self.category_of(value)?;
        self.counts[category] += 1;
        Ok(())
    }

    /// Maps a category index to its point in the output interval.
    pub fn apply(&self, value: Real) -> Result<Real> {
        let category = self.category_of(value)?;
        let n = self.counts.len();
        if n == 1 {
            return Ok(self.output_range.mid());
        }
        let step = self.output_range.span() / (n - 1) as Real;
        Ok(self.output_range.min() + category as Real * step)
    }

    fn category_of(&self, value: Real) -> Result<usize> {
        if !value.is_finite() || value.fract() != 0.0 {
            return Err(ResinError::Domain {
                value,
                message: "Category must be an integral index".to_string(),
            });
        }
        if value < 0.0 || value >= self.counts.len() as Real {
            return Err(ResinError::Domain {
                value,
                message: format!(
                    "Category out of range 0..{}",
                    self.counts.len()
                ),
            });
        }
        Ok(value as usize)
    }
}
