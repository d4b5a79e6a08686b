//! Real-valued feature filter.

use crate::error::{ResinError, Result};
use crate::types::{Interval, Real};
use crate::utils::RunningStats;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for a [`RealFeatureFilter`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RealFilterParams {
    /// Calibrate a range symmetric around zero, so that zero always maps
    /// onto the midpoint of the output range.
    pub keep_sign: bool,

    /// Fraction of the calibrated span added on both sides of the range.
    /// Leaves headroom for values never seen during calibration.
    pub reserve_ratio: Real,
}

impl Default for RealFilterParams {
    fn default() -> Self {
        Self {
            keep_sign: false,
            reserve_ratio: 0.0,
        }
    }
}

impl RealFilterParams {
    /// Validates the parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.reserve_ratio.is_finite() || self.reserve_ratio < 0.0 {
            return Err(ResinError::Configuration {
                name: "reserve_ratio",
                message: format!("Must be finite and >= 0, got {}", self.reserve_ratio),
            });
        }
        Ok(())
    }
}

/// Min/max normalizer for continuous values.
///
/// Observes a calibration sample set through [`update`](Self::update) and
/// afterwards affinely maps the observed range onto the output interval.
/// Values outside the observed range are clamped.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RealFeatureFilter {
    output_range: Interval,
    keep_sign: bool,
    reserve_ratio: Real,
    stats: RunningStats,
}

impl RealFeatureFilter {
    /// Creates a new, uncalibrated filter.
    pub fn new(output_range: Interval, params: &RealFilterParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            output_range,
            keep_sign: params.keep_sign,
            reserve_ratio: params.reserve_ratio,
            stats: RunningStats::new(),
        })
    }

    /// Returns the output interval.
    pub fn output_range(&self) -> Interval {
        self.output_range
    }

    /// Returns the raw observation statistics.
    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    /// Clears the calibration statistics.
    pub fn reset(&mut self) {
        self.stats.reset();
    }

    /// Accumulates one calibration sample.
    pub fn update(&mut self, value: Real) -> Result<()> {
        if !value.is_finite() {
            return Err(ResinError::Domain {
                value,
                message: "Real feature value must be finite".to_string(),
            });
        }
        self.stats.add(value);
        Ok(())
    }

    /// Returns the calibrated input range `(low, high)`, or `None` while
    /// nothing has been observed.
    pub fn calibrated_range(&self) -> Option<(Real, Real)> {
        if self.stats.is_empty() {
            return None;
        }
        let (mut low, mut high) = if self.keep_sign {
            let m = self.stats.min().abs().max(self.stats.max().abs());
            (-m, m)
        } else {
            (self.stats.min(), self.stats.max())
        };
        let reserve = (high - low) * self.reserve_ratio;
        low -= reserve;
        high += reserve;
        Some((low, high))
    }

    /// Returns true if the calibrated range has no variance.
    pub fn is_degenerate(&self) -> bool {
        self.calibrated_range().map_or(true, |(low, high)| high <= low)
    }

    /// Maps a raw value into the output interval.
    pub fn apply(&self, value: Real) -> Real {
        match self.calibrated_range() {
            Some((low, high)) if high > low => {
                let normalized = (value - low) / (high - low);
                self.output_range
                    .clamp(self.output_range.min() + normalized * self.output_range.span())
            }
            // Uncalibrated or no variance
            _ => self.output_range.mid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calibrated(values: &[Real], params: RealFilterParams) -> RealFeatureFilter {
        let mut filter = RealFeatureFilter::new(Interval::SYMMETRIC_UNIT, &params).unwrap();
        for &v in values {
            filter.update(v).unwrap();
        }
        filter
    }

    #[test]
    fn test_min_max_mapping() {
        let filter = calibrated(&[10.0, 20.0, 15.0], RealFilterParams::default());
        assert_eq!(filter.apply(10.0), -1.0);
        assert_eq!(filter.apply(20.0), 1.0);
        assert_eq!(filter.apply(15.0), 0.0);
    }

    #[test]
    fn test_clamped() {
        let filter = calibrated(&[0.0, 1.0], RealFilterParams::default());
        assert_eq!(filter.apply(-5.0), -1.0);
        assert_eq!(filter.apply(5.0), 1.0);
    }

    #[test]
    fn test_degenerate_maps_to_mid() {
        let filter = calibrated(&[3.0, 3.0, 3.0], RealFilterParams::default());
        assert!(filter.is_degenerate());
        assert_eq!(filter.apply(3.0), 0.0);
        assert_eq!(filter.apply(100.0), 0.0);
    }

    #[test]
    fn test_uncalibrated_maps_to_mid() {
        let filter =
            RealFeatureFilter::new(Interval::UNIT, &RealFilterParams::default()).unwrap();
        assert!(filter.calibrated_range().is_none());
        assert_eq!(filter.apply(42.0), 0.5);
    }

    #[test]
    fn test_keep_sign() {
        let filter = calibrated(
            &[-2.0, 8.0],
            RealFilterParams {
                keep_sign: true,
                ..Default::default()
            },
        );
        assert_eq!(filter.calibrated_range(), Some((-8.0, 8.0)));
        assert_eq!(filter.apply(0.0), 0.0);
        assert_eq!(filter.apply(8.0), 1.0);
        assert_eq!(filter.apply(-4.0), -0.5);
    }

    #[test]
    fn test_reserve() {
        let filter = calibrated(
            &[0.0, 10.0],
            RealFilterParams {
                reserve_ratio: 0.5,
                ..Default::default()
            },
        );
        assert_eq!(filter.calibrated_range(), Some((-5.0, 15.0)));
        assert_eq!(filter.apply(5.0), 0.0);
        assert!(filter.apply(10.0) < 1.0);
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut filter =
            RealFeatureFilter::new(Interval::UNIT, &RealFilterParams::default()).unwrap();
        assert!(filter.update(Real::NAN).unwrap_err().is_domain());
        assert!(filter.update(Real::INFINITY).is_err());
    }

    #[test]
    fn test_invalid_reserve() {
        let result = RealFeatureFilter::new(
            Interval::UNIT,
            &RealFilterParams {
                reserve_ratio: -0.1,
                ..Default::default()
            },
        );
        assert!(result.unwrap_err().is_configuration());
    }
}
