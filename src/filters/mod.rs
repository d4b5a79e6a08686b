//! Feature filters normalizing raw field values.
//!
//! Every input field owns one filter. The filter is calibrated once over the
//! sample data ([`FeatureFilter::update`]) and then maps raw values into the
//! encoder's data range ([`FeatureFilter::apply`]).
//!
//! # Available Filters
//!
//! - [`RealFeatureFilter`]: min/max normalization of continuous values
//! - [`BinaryFeatureFilter`]: pass-through of 0/1 flags
//! - [`EnumFeatureFilter`]: categorical indices spread over the output range
//!
//! # Example
//!
//! ```rust
//! use resin::filters::{FeatureFilter, FeatureFilterParams, RealFilterParams};
//! use resin::types::Interval;
//!
//! let mut filter = FeatureFilter::new(
//!     Interval::SYMMETRIC_UNIT,
//!     &FeatureFilterParams::Real(RealFilterParams::default()),
//! ).unwrap();
//!
//! for v in [5.0, 15.0, 25.0] {
//!     filter.update(v).unwrap();
//! }
//!
//! assert_eq!(filter.apply(5.0).unwrap(), -1.0);
//! assert_eq!(filter.apply(25.0).unwrap(), 1.0);
//! ```

mod binary;
mod enumeration;
mod real;

pub use binary::BinaryFeatureFilter;
pub use enumeration::{EnumFeatureFilter, EnumFilterParams};
pub use real::{RealFeatureFilter, RealFilterParams};

use crate::error::{ResinError, Result};
use crate::types::{Interval, Real};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kind of value a field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeatureKind {
    /// Continuous value.
    Real,
    /// 0/1 flag.
    Binary,
    /// Zero-based category index.
    Enum,
}

impl std::fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureKind::Real => write!(f, "REAL"),
            FeatureKind::Binary => write!(f, "BINARY"),
            FeatureKind::Enum => write!(f, "ENUM"),
        }
    }
}

impl std::str::FromStr for FeatureKind {
    type Err = ResinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "REAL" => Ok(FeatureKind::Real),
            "BINARY" | "BIN" => Ok(FeatureKind::Binary),
            "ENUM" => Ok(FeatureKind::Enum),
            _ => Err(ResinError::Configuration {
                name: "feature_kind",
                message: format!("Unknown feature kind '{}'. Expected: REAL, BINARY, ENUM", s),
            }),
        }
    }
}

/// Filter configuration, one variant per feature kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeatureFilterParams {
    /// Continuous value normalization.
    Real(RealFilterParams),
    /// 0/1 pass-through.
    Binary,
    /// Categorical indices.
    Enum(EnumFilterParams),
}

impl Default for FeatureFilterParams {
    fn default() -> Self {
        FeatureFilterParams::Real(RealFilterParams::default())
    }
}

impl FeatureFilterParams {
    /// Default parameters for the given kind.
    pub fn for_kind(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Real => FeatureFilterParams::Real(RealFilterParams::default()),
            FeatureKind::Binary => FeatureFilterParams::Binary,
            FeatureKind::Enum => FeatureFilterParams::Enum(EnumFilterParams::default()),
        }
    }

    /// Kind configured by these parameters.
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureFilterParams::Real(_) => FeatureKind::Real,
            FeatureFilterParams::Binary => FeatureKind::Binary,
            FeatureFilterParams::Enum(_) => FeatureKind::Enum,
        }
    }
}

/// A calibrated normalizer for one field.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeatureFilter {
    /// Continuous value normalization.
    Real(RealFeatureFilter),
    /// 0/1 pass-through.
    Binary(BinaryFeatureFilter),
    /// Categorical indices.
    Enum(EnumFeatureFilter),
}

impl FeatureFilter {
    /// Creates the filter selected by the parameters.
    pub fn new(output_range: Interval, params: &FeatureFilterParams) -> Result<Self> {
        Ok(match params {
            FeatureFilterParams::Real(p) => {
                FeatureFilter::Real(RealFeatureFilter::new(output_range, p)?)
            }
            FeatureFilterParams::Binary => FeatureFilter::Binary(BinaryFeatureFilter::new()),
            FeatureFilterParams::Enum(p) => {
                FeatureFilter::Enum(EnumFeatureFilter::new(output_range, p)?)
            }
        })
    }

    /// Kind of this filter.
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureFilter::Real(_) => FeatureKind::Real,
            FeatureFilter::Binary(_) => FeatureKind::Binary,
            FeatureFilter::Enum(_) => FeatureKind::Enum,
        }
    }

    /// Number of calibration samples seen since the last reset.
    pub fn num_samples(&self) -> u64 {
        match self {
            FeatureFilter::Real(f) => f.stats().count(),
            FeatureFilter::Binary(f) => f.num_samples(),
            FeatureFilter::Enum(f) => f.counts().iter().sum(),
        }
    }

    /// Returns true once at least one calibration sample was seen.
    pub fn is_calibrated(&self) -> bool {
        self.num_samples() > 0
    }

    /// Clears the calibration statistics. Idempotent.
    pub fn reset(&mut self) {
        match self {
            FeatureFilter::Real(f) => f.reset(),
            FeatureFilter::Binary(f) => f.reset(),
            FeatureFilter::Enum(f) => f.reset(),
        }
    }

    /// Accumulates one calibration sample.
    pub fn update(&mut self, value: Real) -> Result<()> {
        match self {
            FeatureFilter::Real(f) => f.update(value),
            FeatureFilter::Binary(f) => f.update(value),
            FeatureFilter::Enum(f) => f.update(value),
        }
    }

    /// Normalizes a raw value.
    pub fn apply(&self, value: Real) -> Result<Real> {
        match self {
            FeatureFilter::Real(f) => Ok(f.apply(value)),
            FeatureFilter::Binary(f) => f.apply(value),
            FeatureFilter::Enum(f) => f.apply(value),
        }
    }
}
