//! Configuration of the input encoder.

use ahash::AHashSet;

use crate::coding::SpikingCoding;
use crate::error::{ResinError, Result};
use crate::filters::FeatureFilterParams;
use crate::input::synthetic::{GeneratorParams, TransformerParams};
use crate::pattern::{UnificationParams, VariablesSchema};
use crate::types::Interval;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where the values of a configured field come from.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FieldSource {
    /// Supplied by the caller.
    #[default]
    External,
    /// Derived from preceding fields.
    Transformed(TransformerParams),
    /// Produced by a generator.
    Generated(GeneratorParams),
}

impl FieldSource {
    /// Returns true for caller supplied fields.
    pub fn is_external(&self) -> bool {
        matches!(self, FieldSource::External)
    }
}

/// Configuration of one input field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FieldParams {
    /// Unique field name.
    pub name: String,

    /// Value source.
    pub source: FieldSource,

    /// Feature filter of the field.
    pub filter: FeatureFilterParams,

    /// Route raw values of the field to the readout layer.
    pub route_to_readout: bool,

    /// Overrides the encoder-wide spiking regime for this field.
    pub spiking_coding: Option<SpikingCoding>,
}

impl FieldParams {
    /// External real-valued field with default settings.
    pub fn external(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: FieldSource::External,
            filter: FeatureFilterParams::default(),
            route_to_readout: false,
            spiking_coding: None,
        }
    }

    /// Field derived by a transformer.
    pub fn transformed(name: impl Into<String>, transformer: TransformerParams) -> Self {
        Self {
            source: FieldSource::Transformed(transformer),
            ..Self::external(name)
        }
    }

    /// Field produced by a generator.
    pub fn generated(name: impl Into<String>, generator: GeneratorParams) -> Self {
        Self {
            source: FieldSource::Generated(generator),
            ..Self::external(name)
        }
    }

    /// Sets the feature filter.
    pub fn with_filter(mut self, filter: FeatureFilterParams) -> Self {
        self.filter = filter;
        self
    }

    /// Enables routing to the readout.
    pub fn routed(mut self) -> Self {
        self.route_to_readout = true;
        self
    }

    /// Overrides the spiking regime.
    pub fn with_spiking_coding(mut self, coding: SpikingCoding) -> Self {
        self.spiking_coding = Some(coding);
        self
    }
}

/// Per-pattern constant placed at the head of a patterned input vector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SteadyFieldParams {
    /// Unique field name.
    pub name: String,

    /// Feature kind of the steady values.
    ///
    /// Steady values are routed to the readout raw and never stimulate
    /// neurons. The filter only checks that stored values fit its kind
    /// (0/1 flags, known categories) and flags constant calibration data.
    pub filter: FeatureFilterParams,
}

impl SteadyFieldParams {
    /// Steady real-valued field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filter: FeatureFilterParams::default(),
        }
    }
}

/// Continuous feeding: one input vector per time step.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContinuousFeedingParams {
    /// Leading time steps whose neuron statistics are not recorded.
    pub boot_cycles: usize,
}

/// Patterned feeding: one multi-variable pattern per example.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PatternedFeedingParams {
    /// Number of equal segments a pattern is split into for readout sampling.
    pub slices: usize,

    /// Present every pattern forward and then backward.
    pub bidir: bool,

    /// Layout of the variables inside the pattern vector.
    pub var_schema: VariablesSchema,

    /// Unification pipeline.
    pub unification: UnificationParams,

    /// Steady fields preceding the pattern data.
    pub steady_fields: Vec<SteadyFieldParams>,
}

impl Default for PatternedFeedingParams {
    fn default() -> Self {
        Self {
            slices: 1,
            bidir: false,
            var_schema: VariablesSchema::Groupped,
            unification: UnificationParams::default(),
            steady_fields: Vec::new(),
        }
    }
}

/// Feeding regime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeedingParams {
    /// See [`ContinuousFeedingParams`].
    Continuous(ContinuousFeedingParams),
    /// See [`PatternedFeedingParams`].
    Patterned(PatternedFeedingParams),
}

impl Default for FeedingParams {
    fn default() -> Self {
        FeedingParams::Continuous(ContinuousFeedingParams::default())
    }
}

impl FeedingParams {
    /// The regime tag.
    pub fn feeding_type(&self) -> FeedingType {
        match self {
            FeedingParams::Continuous(_) => FeedingType::Continuous,
            FeedingParams::Patterned(_) => FeedingType::Patterned,
        }
    }
}

/// Tag of a feeding regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeedingType {
    /// One vector per time step.
    Continuous,
    /// One pattern per example.
    Patterned,
}

impl std::fmt::Display for FeedingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedingType::Continuous => write!(f, "continuous"),
            FeedingType::Patterned => write!(f, "patterned"),
        }
    }
}

/// Complete configuration of an [`InputEncoder`](crate::input::InputEncoder).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputEncoderParams {
    /// Feeding regime.
    pub feeding: FeedingParams,

    /// Input fields. External fields are placed first, synthetic fields
    /// follow in declaration order.
    pub fields: Vec<FieldParams>,

    /// Default spiking regime of all fields.
    pub spiking_coding: SpikingCoding,

    /// Range feature filters map onto.
    pub data_range: Interval,
}

impl Default for InputEncoderParams {
    fn default() -> Self {
        Self {
            feeding: FeedingParams::default(),
            fields: Vec::new(),
            spiking_coding: SpikingCoding::default(),
            data_range: Interval::SYMMETRIC_UNIT,
        }
    }
}

impl InputEncoderParams {
    /// Validates the field list and the feeding regime.
    pub fn validate(&self) -> Result<()> {
        if !self.fields.iter().any(|f| f.source.is_external()) {
            return Err(ResinError::Configuration {
                name: "fields",
                message: "At least one external field is required".to_string(),
            });
        }

        let steady = match &self.feeding {
            FeedingParams::Continuous(_) => &[][..],
            FeedingParams::Patterned(p) => {
                if p.slices == 0 {
                    return Err(ResinError::Configuration {
                        name: "slices",
                        message: "Must be > 0".to_string(),
                    });
                }
                p.steady_fields.as_slice()
            }
        };

        let mut names = AHashSet::with_capacity(self.fields.len() + steady.len());
        let all_names = self
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .chain(steady.iter().map(|s| s.name.as_str()));
        for name in all_names {
            if name.is_empty() {
                return Err(ResinError::Configuration {
                    name: "name",
                    message: "Field name must not be empty".to_string(),
                });
            }
            if !names.insert(name) {
                return Err(ResinError::Configuration {
                    name: "name",
                    message: format!("Duplicate field name '{name}'"),
                });
            }
        }
        Ok(())
    }

    /// Number of external fields.
    pub fn num_external_fields(&self) -> usize {
        self.fields.iter().filter(|f| f.source.is_external()).count()
    }
}
