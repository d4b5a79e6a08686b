//! Closed real interval.

use crate::error::{ResinError, Result};
use crate::types::Real;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Immutable closed interval `[min, max]` with `min <= max`.
///
/// Used as the output range of feature filters and as the symmetric
/// range the spike coders expect their input in.
///
/// # Example
///
/// ```rust
/// use resin::types::Interval;
///
/// let range = Interval::new(-1.0, 1.0).unwrap();
/// assert_eq!(range.span(), 2.0);
/// assert_eq!(range.mid(), 0.0);
/// assert_eq!(range.clamp(3.0), 1.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawInterval"))]
pub struct Interval {
    min: Real,
    max: Real,
}

/// Unchecked bounds as read from a serialized interval.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawInterval {
    min: Real,
    max: Real,
}

#[cfg(feature = "serde")]
impl TryFrom<RawInterval> for Interval {
    type Error = ResinError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        Interval::new(raw.min, raw.max)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::SYMMETRIC_UNIT
    }
}

impl Interval {
    /// The interval `[-1, 1]`.
    pub const SYMMETRIC_UNIT: Interval = Interval { min: -1.0, max: 1.0 };

    /// The interval `[0, 1]`.
    pub const UNIT: Interval = Interval { min: 0.0, max: 1.0 };

    /// Creates a new interval.
    pub fn new(min: Real, max: Real) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ResinError::Configuration {
                name: "interval",
                message: format!("Bounds must be finite, got [{min}, {max}]"),
            });
        }
        if min > max {
            return Err(ResinError::Configuration {
                name: "interval",
                message: format!("Min {min} is greater than max {max}"),
            });
        }
        Ok(Self { min, max })
    }

    /// Lower bound.
    #[inline]
    pub fn min(&self) -> Real {
        self.min
    }

    /// Upper bound.
    #[inline]
    pub fn max(&self) -> Real {
        self.max
    }

    /// Width of the interval.
    #[inline]
    pub fn span(&self) -> Real {
        self.max - self.min
    }

    /// Midpoint of the interval.
    #[inline]
    pub fn mid(&self) -> Real {
        self.min + self.span() / 2.0
    }

    /// Returns true if the value lies inside the closed interval.
    #[inline]
    pub fn contains(&self, value: Real) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamps the value into the interval.
    #[inline]
    pub fn clamp(&self, value: Real) -> Real {
        value.clamp(self.min, self.max)
    }

    /// Affinely maps a value from `from` onto this interval.
    ///
    /// A degenerate `from` maps everything to the midpoint.
    pub fn rescale(&self, value: Real, from: &Interval) -> Real {
        let from_span = from.span();
        if from_span <= 0.0 {
            return self.mid();
        }
        self.min + (value - from.min) / from_span * self.span()
    }

    /// Maps a value of this interval onto `[-1, 1]`, clamped.
    pub fn to_symmetric_unit(&self, value: Real) -> Real {
        Self::SYMMETRIC_UNIT.clamp(Self::SYMMETRIC_UNIT.rescale(value, self))
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create() {
        let i = Interval::new(0.0, 10.0).unwrap();
        assert_eq!(i.min(), 0.0);
        assert_eq!(i.max(), 10.0);
        assert_eq!(i.span(), 10.0);
        assert_eq!(i.mid(), 5.0);
    }

    #[test]
    fn test_invalid() {
        assert!(Interval::new(1.0, 0.0).is_err());
        assert!(Interval::new(Real::NAN, 0.0).is_err());
        assert!(Interval::new(0.0, Real::INFINITY).is_err());
    }

    #[test]
    fn test_degenerate_is_valid() {
        let i = Interval::new(2.0, 2.0).unwrap();
        assert_eq!(i.span(), 0.0);
        assert_eq!(i.mid(), 2.0);
    }

    #[test]
    fn test_rescale() {
        let from = Interval::new(0.0, 10.0).unwrap();
        let to = Interval::SYMMETRIC_UNIT;
        assert_eq!(to.rescale(0.0, &from), -1.0);
        assert_eq!(to.rescale(10.0, &from), 1.0);
        assert_eq!(to.rescale(5.0, &from), 0.0);

        let flat = Interval::new(3.0, 3.0).unwrap();
        assert_eq!(to.rescale(3.0, &flat), 0.0);
    }

    #[test]
    fn test_to_symmetric_unit() {
        let range = Interval::UNIT;
        assert_eq!(range.to_symmetric_unit(0.0), -1.0);
        assert_eq!(range.to_symmetric_unit(1.0), 1.0);
        assert_eq!(range.to_symmetric_unit(2.0), 1.0);
    }

    #[test]
    fn test_default() {
        assert_eq!(Interval::default(), Interval::SYMMETRIC_UNIT);
        assert_eq!(Interval::default().to_string(), "[-1, 1]");
    }
}
